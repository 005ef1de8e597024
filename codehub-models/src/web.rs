use serde::{Deserialize, Serialize};

/// One row of `GET /containers`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerInfo {
    pub id: String,
    pub dir_name: String,
    pub status: String,
    #[serde(default)]
    pub last_activity: Option<String>,
}

/// Body of `GET /logs/{dir_name}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogsResponse {
    pub logs: String,
}

/// Acknowledgement body of the POST action endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub message: String,
}

/// Body of `POST /upload_image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub message: String,
    pub filename: String,
}
