use std::future::Future;
use std::path::Path;

use codehub_models::web::{ActionResponse, ContainerInfo, LogsResponse, UploadResponse};

use crate::error::ApiError;

/// The remote control-plane surface the scheduler dispatches through.
///
/// Implementations must be owned values; they are captured by spawned
/// timer tasks, hence the `'static` bound.
pub trait ControlPlane: Send + Sync + 'static {
    /// POST /execute_codebase — run the workspace startup script.
    fn execute_codebase(
        &self,
        dir_name: &str,
    ) -> impl Future<Output = Result<ActionResponse, ApiError>> + Send;

    /// POST /code_server — start a code-server instance for the workspace.
    fn start_code_server(
        &self,
        dir_name: &str,
    ) -> impl Future<Output = Result<ActionResponse, ApiError>> + Send;

    /// POST /rollback_server — roll the workspace back to a commit and restart.
    fn rollback_server(
        &self,
        dir_name: &str,
        commit_id: &str,
    ) -> impl Future<Output = Result<ActionResponse, ApiError>> + Send;

    /// POST /stop_process — stop the workspace process (and IDEs when asked).
    fn stop_process(
        &self,
        dir_name: &str,
        ides: bool,
    ) -> impl Future<Output = Result<ActionResponse, ApiError>> + Send;

    /// GET /logs/{dir_name}.
    fn fetch_logs(
        &self,
        dir_name: &str,
    ) -> impl Future<Output = Result<LogsResponse, ApiError>> + Send;

    /// GET /containers.
    fn list_containers(
        &self,
    ) -> impl Future<Output = Result<Vec<ContainerInfo>, ApiError>> + Send;

    /// POST /upload_image — multipart artifact upload.
    fn upload_artifact(
        &self,
        path: &Path,
    ) -> impl Future<Output = Result<UploadResponse, ApiError>> + Send;
}
