use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_DISPOSITION, COOKIE};
use reqwest::{Client, Response, StatusCode};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use url::Url;

use super::models::{ApiConfig, StartJobBody, StartJobResponse};
use crate::application::transport::{JobRequest, JobTransport, MaterialsSource};
use crate::domain::{Course, JobStatusUpdate, SelectableItem};
use crate::utils::{content_disposition_filename, sanitize_filename};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    config: ApiConfig,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| ApiError::ApiError(format!("Invalid session cookie: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let client = Client::builder().default_headers(headers).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.config.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::ApiError(format!("Unusable base URL: {}", self.config.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn check(response: Response, what: &str) -> Result<Response> {
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        response
            .error_for_status()
            .map_err(|e| ApiError::ApiError(format!("{} request failed: {}", what, e)))
    }

    pub async fn list_courses(&self) -> Result<Vec<Course>> {
        let url = self.endpoint(&["courses"])?;
        let response = Self::check(self.client.get(url).send().await?, "Courses")?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    pub async fn course_materials(&self, course_id: &str) -> Result<Vec<SelectableItem>> {
        let url = self.endpoint(&["courses", course_id, "materials"])?;
        let response = Self::check(self.client.get(url).send().await?, "Materials")?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Asks the server to build the archive. Returns the job id.
    pub async fn start_job(&self, request: &JobRequest) -> Result<String> {
        let url = self.endpoint(&["courses", &request.course_id, "download", "start"])?;
        let body = StartJobBody {
            course_name: request.course_name.clone(),
            selected_file_ids: request.selected_ids.clone(),
        };

        let response = Self::check(
            self.client.post(url).json(&body).send().await?,
            "Start download",
        )?;

        let json: StartJobResponse = response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))?;

        if json.job_id.is_empty() {
            return Err(ApiError::InvalidResponse("empty job id".to_string()));
        }

        Ok(json.job_id)
    }

    pub async fn job_status(&self, job_id: &str) -> Result<JobStatusUpdate> {
        let url = self.endpoint(&["download", "status", job_id])?;
        let response = Self::check(self.client.get(url).send().await?, "Status")?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("JSON decode error: {}", e)))
    }

    /// Streams the finished archive into the download directory.
    /// Returns the path written. Existing files are never overwritten, and a failed
    /// transfer leaves nothing behind.
    pub async fn download_result(&self, job_id: &str, course_name: &str) -> Result<PathBuf> {
        let url = self.endpoint(&["download", "result", job_id])?;
        let response = Self::check(self.client.get(url).send().await?, "Result")?;

        let filename = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .and_then(content_disposition_filename)
            .and_then(|name| clean_filename(&name))
            .unwrap_or_else(|| fallback_filename(course_name));

        let dir = &self.config.download_dir;
        tokio::fs::create_dir_all(dir).await?;
        let target = available_path(dir, &filename).await?;
        let partial = partial_path(&target);

        if let Err(e) = write_stream(&partial, response.bytes_stream()).await {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                tracing::warn!(path = %partial.display(), error = %cleanup, "Failed to remove partial download");
            }
            return Err(e);
        }

        tokio::fs::rename(&partial, &target).await?;
        Ok(target)
    }
}

/// Sanitized name with leading and trailing dots and spaces removed, so `.` and `..`
/// never reach the filesystem.
fn clean_filename(name: &str) -> Option<String> {
    let name = sanitize_filename(name);
    let name = name.trim_matches(|c| c == '.' || c == ' ');
    (!name.is_empty()).then(|| name.to_string())
}

fn fallback_filename(course_name: &str) -> String {
    clean_filename(course_name)
        .map(|stem| format!("{}.zip", stem))
        .unwrap_or_else(|| "download.zip".to_string())
}

/// `Biology.zip` -> `Biology (2).zip`
fn numbered_filename(filename: &str, n: u32) -> String {
    match filename.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", filename, n),
    }
}

/// First name in `dir` not taken yet: `filename`, then `filename (1)`, `(2)`, ...
async fn available_path(dir: &Path, filename: &str) -> Result<PathBuf> {
    let mut candidate = dir.join(filename);
    let mut n = 0;
    while tokio::fs::try_exists(&candidate).await? {
        n += 1;
        candidate = dir.join(numbered_filename(filename, n));
    }
    Ok(candidate)
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    target.with_file_name(name)
}

async fn write_stream(
    path: &Path,
    stream: impl Stream<Item = reqwest::Result<Bytes>>,
) -> Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut stream = std::pin::pin!(stream);

    while let Some(chunk) = stream.next().await {
        file.write_all(&chunk?).await?;
    }

    file.sync_all().await?;
    Ok(())
}

#[async_trait]
impl JobTransport for ApiClient {
    async fn create_job(&self, request: &JobRequest) -> Result<String> {
        self.start_job(request).await
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatusUpdate> {
        self.job_status(job_id).await
    }

    async fn fetch_result(&self, job_id: &str, course_name: &str) -> Result<PathBuf> {
        self.download_result(job_id, course_name).await
    }
}

#[async_trait]
impl MaterialsSource for ApiClient {
    async fn list_materials(&self, course_id: &str) -> Result<Vec<SelectableItem>> {
        self.course_materials(course_id).await
    }
}
