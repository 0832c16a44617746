use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct PresignUploadRequest {
    pub filename: String,
    pub content_type: String,
}

#[derive(Debug, Serialize)]
pub struct PresignUploadResponse {
    pub key: String,
    pub url: String,
    pub expires_in: u64,
}

#[derive(Debug, Deserialize)]
pub struct RegisterDocumentRequest {
    pub filename: String,
    pub key: String,
}
