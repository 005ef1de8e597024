use std::path::Path;
use std::time::Duration;

use reqwest::multipart;
use reqwest::{Response, Url};

use codehub_models::web::{ActionResponse, ContainerInfo, LogsResponse, UploadResponse};

use crate::control_plane::ControlPlane;
use crate::error::{ApiError, Result};

/// Asynchronous control-plane client wrapping `reqwest::Client` and a fixed
/// base URL.
#[derive(Debug, Clone)]
pub struct Client {
    client: reqwest::Client,
    base_url: Url,
}

impl Client {
    /// Construct a client with the given base URL and per-request timeout.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|source| ApiError::InvalidBaseUrl {
            url: base_url.to_string(),
            source,
        })?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Construct a client using a preconfigured HTTP client instance.
    pub fn with_client(base_url: Url, client: reqwest::Client) -> Self {
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let trimmed = path.trim_start_matches('/');
        self.base_url
            .join(trimmed)
            .map_err(|source| ApiError::InvalidPath {
                base: self.base_url.clone(),
                path: trimmed.to_string(),
                source,
            })
    }

    async fn post_form(&self, path: &str, params: &[(&str, &str)]) -> Result<Response> {
        let url = self.build_url(path)?;
        let response = self.client.post(url.clone()).form(params).send().await?;
        Self::handle_response(url, response).await
    }

    async fn handle_response(url: Url, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read body>".into());
            Err(ApiError::Http {
                status,
                url,
                message,
            })
        }
    }
}

impl ControlPlane for Client {
    async fn execute_codebase(&self, dir_name: &str) -> Result<ActionResponse> {
        let response = self
            .post_form("/execute_codebase", &[("dir_name", dir_name)])
            .await?;
        Ok(response.json::<ActionResponse>().await?)
    }

    async fn start_code_server(&self, dir_name: &str) -> Result<ActionResponse> {
        let response = self
            .post_form("/code_server", &[("dir_name", dir_name)])
            .await?;
        Ok(response.json::<ActionResponse>().await?)
    }

    async fn rollback_server(&self, dir_name: &str, commit_id: &str) -> Result<ActionResponse> {
        let response = self
            .post_form(
                "/rollback_server",
                &[("commit_id", commit_id), ("dir_name", dir_name)],
            )
            .await?;
        Ok(response.json::<ActionResponse>().await?)
    }

    async fn stop_process(&self, dir_name: &str, ides: bool) -> Result<ActionResponse> {
        let ides = if ides { "true" } else { "false" };
        let response = self
            .post_form("/stop_process", &[("dir_name", dir_name), ("ides", ides)])
            .await?;
        Ok(response.json::<ActionResponse>().await?)
    }

    async fn fetch_logs(&self, dir_name: &str) -> Result<LogsResponse> {
        let url = self.build_url(&format!("/logs/{dir_name}"))?;
        let response = self.client.get(url.clone()).send().await?;
        let response = Self::handle_response(url, response).await?;
        Ok(response.json::<LogsResponse>().await?)
    }

    async fn list_containers(&self) -> Result<Vec<ContainerInfo>> {
        let url = self.build_url("/containers")?;
        let response = self.client.get(url.clone()).send().await?;
        let response = Self::handle_response(url, response).await?;
        Ok(response.json::<Vec<ContainerInfo>>().await?)
    }

    async fn upload_artifact(&self, path: &Path) -> Result<UploadResponse> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::Upload {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());
        let part = multipart::Part::bytes(bytes).file_name(file_name);
        let form = multipart::Form::new().part("file", part);

        let url = self.build_url("/upload_image")?;
        let response = self
            .client
            .post(url.clone())
            .multipart(form)
            .send()
            .await?;
        let response = Self::handle_response(url, response).await?;
        Ok(response.json::<UploadResponse>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_url_joins_paths_onto_the_base() {
        let client = Client::new("http://localhost:9000", Duration::from_secs(5)).unwrap();
        let url = client.build_url("/logs/backend-service").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/logs/backend-service");

        let url = client.build_url("containers").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/containers");
    }

    #[test]
    fn malformed_base_url_is_rejected() {
        let err = Client::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBaseUrl { .. }));
    }
}
