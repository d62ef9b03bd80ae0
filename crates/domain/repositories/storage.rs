use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// Uploads user images to object storage and returns a public URL for the
/// stored object.
#[async_trait]
pub trait ImageStorageClient {
    async fn upload_payment_proof(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;

    async fn upload_invoice_logo(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String>;
}
