use crate::config::stage::Stage;
use anyhow::{Ok, Result};

use super::config_model::DotEnvyConfig;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = super::config_model::BackendServer {
        port: std::env::var("SERVER_PORT")
            .expect("SERVER_PORT is invalid")
            .parse()?,
        body_limit: std::env::var("SERVER_BODY_LIMIT")
            .expect("SERVER_BODY_LIMIT is invalid")
            .parse()?,
        timeout: std::env::var("SERVER_TIMEOUT")
            .expect("SERVER_TIMEOUT is invalid")
            .parse()?,
    };

    let database = super::config_model::Database {
        url: std::env::var("DATABASE_URL").expect("DATABASE_URL is invalid"),
    };

    let project_url =
        std::env::var("SUPABASE_PROJECT_URL").expect("SUPABASE_PROJECT_URL is invalid");

    let storage = super::config_model::SupabaseStorage {
        s3_endpoint: std::env::var("SUPABASE_S3_ENDPOINT")
            .unwrap_or_else(|_| format!("{}/storage/v1/s3", project_url.trim_end_matches('/'))),
        s3_region: std::env::var("SUPABASE_S3_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
        s3_access_key: std::env::var("SUPABASE_S3_ACCESS_KEY")
            .expect("SUPABASE_S3_ACCESS_KEY is invalid"),
        s3_secret_key: std::env::var("SUPABASE_S3_SECRET_KEY")
            .expect("SUPABASE_S3_SECRET_KEY is invalid"),
        uploads_bucket: std::env::var("SUPABASE_UPLOADS_BUCKET")
            .unwrap_or_else(|_| "uploads".to_string()),
    };

    let supabase = super::config_model::Supabase {
        project_url,
        jwt_secret: std::env::var("SUPABASE_JWT_SECRET").expect("SUPABASE_JWT_SECRET is invalid"),
        storage,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        supabase,
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or("".to_string());
    Stage::try_from(&stage_str).unwrap_or_default()
}
