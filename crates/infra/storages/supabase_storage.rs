use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    error::{ProvideErrorMetadata, SdkError},
    operation::put_object::PutObjectError,
    primitives::ByteStream,
};
use uuid::Uuid;

use crate::domain::repositories::storage::ImageStorageClient;

use super::s3::{S3Config, build_s3_client};

#[derive(Debug, Clone)]
pub struct SupabaseStorageConfig {
    pub endpoint: String,
    pub region: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    /// Project base URL, used to build the public URL of uploaded objects.
    pub public_base_url: String,
}

pub struct SupabaseStorageClient {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base_url: String,
}

impl SupabaseStorageClient {
    pub async fn new(config: SupabaseStorageConfig) -> Result<Self> {
        let client = build_s3_client(&S3Config {
            endpoint: config.endpoint,
            region: config.region,
            access_key: config.access_key,
            secret_key: config.secret_key,
            force_path_style: true,
            connect_timeout_secs: 10,
            read_timeout_secs: 60,
        })
        .await
        .context("failed to build Supabase s3 client")?;

        Ok(Self {
            client,
            bucket: config.bucket,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn put_public_object(
        &self,
        object_key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let body = ByteStream::from(bytes);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(object_key)
            .body(body)
            .content_type(content_type)
            .send()
            .await
            .map_err(|err| map_put_object_error(err, &self.bucket, object_key))?;

        // The bucket is public; objects resolve through the Storage public
        // path without a signed URL.
        // https://supabase.com/docs/guides/storage/s3/compatibility
        Ok(format!(
            "{}/storage/v1/object/public/{}/{}",
            self.public_base_url, self.bucket, object_key
        ))
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

#[async_trait]
impl ImageStorageClient for SupabaseStorageClient {
    async fn upload_payment_proof(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let object_key = format!(
            "payments/{}/{}.{}",
            user_id,
            Uuid::new_v4(),
            extension_for(content_type)
        );

        self.put_public_object(&object_key, bytes, content_type)
            .await
    }

    async fn upload_invoice_logo(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String> {
        let object_key = format!(
            "logos/{}/{}.{}",
            user_id,
            Uuid::new_v4(),
            extension_for(content_type)
        );

        self.put_public_object(&object_key, bytes, content_type)
            .await
    }
}

fn map_put_object_error(
    err: SdkError<PutObjectError>,
    bucket: &str,
    object_key: &str,
) -> anyhow::Error {
    if let SdkError::ServiceError(service_err) = &err {
        let raw = service_err.raw();
        let status = raw.status().as_u16();
        let code = service_err.err().code().unwrap_or("unknown");
        let message = service_err.err().message().unwrap_or_default();
        let body = raw
            .body()
            .bytes()
            .map(|b| String::from_utf8_lossy(b).trim().to_owned())
            .filter(|b| !b.is_empty())
            .unwrap_or_default();

        let mut detail = format!(
            "failed to upload image to Supabase Storage (status {}, code {})",
            status, code
        );

        if !message.is_empty() {
            detail.push_str(&format!(": {}", message));
        }

        detail.push_str(&format!(" [bucket={}, key={}]", bucket, object_key));

        if !body.is_empty() {
            // Keep a short preview of the response body for debugging.
            let preview = body.chars().take(512).collect::<String>();
            detail.push_str(&format!("; body={}", preview));
        }

        return anyhow::anyhow!(detail);
    }

    anyhow::Error::new(err).context("failed to upload image to Supabase Storage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::storage::ImageStorageClient;
    use anyhow::Result;
    use uuid::Uuid;

    #[test]
    fn extension_follows_content_type() {
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/webp"), "webp");
        assert_eq!(extension_for("application/octet-stream"), "bin");
    }

    fn load_supabase_config_from_env() -> SupabaseStorageConfig {
        dotenvy::dotenv().ok();

        let project_url =
            std::env::var("SUPABASE_PROJECT_URL").expect("SUPABASE_PROJECT_URL is required");
        let endpoint = std::env::var("SUPABASE_S3_ENDPOINT").unwrap_or_else(|_| {
            format!("{}/storage/v1/s3", project_url.trim_end_matches('/'))
        });

        SupabaseStorageConfig {
            endpoint,
            region: std::env::var("SUPABASE_S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
            bucket: std::env::var("SUPABASE_UPLOADS_BUCKET").unwrap_or_else(|_| "uploads".into()),
            access_key: std::env::var("SUPABASE_S3_ACCESS_KEY")
                .expect("SUPABASE_S3_ACCESS_KEY is required"),
            secret_key: std::env::var("SUPABASE_S3_SECRET_KEY")
                .expect("SUPABASE_S3_SECRET_KEY is required"),
            public_base_url: project_url,
        }
    }

    // Manual check: export the Supabase S3 credentials, then run:
    // cargo test -p crates supabase_storage::tests::upload_payment_proof_image -- --ignored --nocapture
    #[tokio::test]
    #[ignore = "hits real Supabase Storage and needs credentials"]
    async fn upload_payment_proof_image() -> Result<()> {
        // Smallest valid JPEG-ish payload; Supabase does not sniff contents.
        let bytes = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

        let client = SupabaseStorageClient::new(load_supabase_config_from_env()).await?;
        let public_url = client
            .upload_payment_proof(Uuid::new_v4(), bytes, "image/jpeg")
            .await?;
        println!("uploaded proof to {}", public_url);

        Ok(())
    }
}
