use std::path::PathBuf;

use async_trait::async_trait;

use crate::api::ApiError;
use crate::domain::{JobStatusUpdate, SelectableItem};

/// Everything needed to ask the server for an archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub course_id: String,
    pub course_name: String,
    pub selected_ids: Vec<String>,
}

/// Remote side of an export job.
#[async_trait]
pub trait JobTransport: Send + Sync {
    /// Returns the server-assigned job id.
    async fn create_job(&self, request: &JobRequest) -> Result<String, ApiError>;

    /// Partial status; absent fields are left alone by the caller.
    async fn get_job_status(&self, job_id: &str) -> Result<JobStatusUpdate, ApiError>;

    /// Retrieves the finished archive. Called once per completed job.
    async fn fetch_result(&self, job_id: &str, course_name: &str) -> Result<PathBuf, ApiError>;
}

#[async_trait]
pub trait MaterialsSource: Send + Sync {
    async fn list_materials(&self, course_id: &str) -> Result<Vec<SelectableItem>, ApiError>;
}
