use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::transport::{JobRequest, JobTransport, MaterialsSource};
use crate::api::ApiError;
use crate::domain::{JobStatusUpdate, SelectableItem};

/// In-memory job server that replays scripted responses and records every call.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    job_ids: Mutex<VecDeque<Option<String>>>,
    statuses: Mutex<VecDeque<Option<JobStatusUpdate>>>,
    create_delay: Duration,
    status_delay: Duration,
    created: Mutex<Vec<JobRequest>>,
    polled: Mutex<Vec<String>>,
    fetched: Mutex<Vec<String>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accepting(self, job_id: &str) -> Self {
        self.job_ids.lock().unwrap().push_back(Some(job_id.to_string()));
        self
    }

    pub fn rejecting_start(self) -> Self {
        self.job_ids.lock().unwrap().push_back(None);
        self
    }

    pub fn status(self, status: &str, progress: Option<i64>, message: Option<&str>) -> Self {
        self.statuses.lock().unwrap().push_back(Some(JobStatusUpdate {
            status: Some(status.to_string()),
            progress,
            message: message.map(str::to_string),
        }));
        self
    }

    pub fn status_error(self) -> Self {
        self.statuses.lock().unwrap().push_back(None);
        self
    }

    pub fn with_create_delay(mut self, delay: Duration) -> Self {
        self.create_delay = delay;
        self
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn created(&self) -> Vec<JobRequest> {
        self.created.lock().unwrap().clone()
    }

    pub fn polled(&self) -> Vec<String> {
        self.polled.lock().unwrap().clone()
    }

    pub fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobTransport for ScriptedTransport {
    async fn create_job(&self, request: &JobRequest) -> Result<String, ApiError> {
        self.created.lock().unwrap().push(request.clone());
        // each call claims its scripted id up front, however long it then takes
        let next = self.job_ids.lock().unwrap().pop_front().flatten();
        if !self.create_delay.is_zero() {
            tokio::time::sleep(self.create_delay).await;
        }
        next.ok_or_else(|| ApiError::ApiError("start rejected".to_string()))
    }

    async fn get_job_status(&self, job_id: &str) -> Result<JobStatusUpdate, ApiError> {
        self.polled.lock().unwrap().push(job_id.to_string());
        if !self.status_delay.is_zero() {
            tokio::time::sleep(self.status_delay).await;
        }
        let next = self.statuses.lock().unwrap().pop_front().flatten();
        next.ok_or_else(|| ApiError::ApiError("connection reset".to_string()))
    }

    async fn fetch_result(&self, job_id: &str, course_name: &str) -> Result<PathBuf, ApiError> {
        self.fetched.lock().unwrap().push(job_id.to_string());
        Ok(PathBuf::from(format!("{}.zip", course_name)))
    }
}

pub(crate) enum MaterialsOutcome {
    Items(Vec<SelectableItem>),
    ServerError,
    Unauthorized,
}

pub(crate) struct StaticMaterials {
    outcome: MaterialsOutcome,
}

impl StaticMaterials {
    pub fn new(outcome: MaterialsOutcome) -> Self {
        Self { outcome }
    }
}

#[async_trait]
impl MaterialsSource for StaticMaterials {
    async fn list_materials(&self, _course_id: &str) -> Result<Vec<SelectableItem>, ApiError> {
        match &self.outcome {
            MaterialsOutcome::Items(items) => Ok(items.clone()),
            MaterialsOutcome::ServerError => {
                Err(ApiError::ApiError("Materials request failed: 500".to_string()))
            }
            MaterialsOutcome::Unauthorized => Err(ApiError::Unauthorized),
        }
    }
}

pub(crate) fn item(id: &str, mime: &str) -> SelectableItem {
    SelectableItem {
        id: id.to_string(),
        name: format!("{}.bin", id),
        mime_type: Some(mime.to_string()),
        path: format!("Week 1/{}.bin", id),
    }
}

pub(crate) fn request(course_name: &str) -> JobRequest {
    JobRequest {
        course_id: "c1".to_string(),
        course_name: course_name.to_string(),
        selected_ids: vec!["f1".to_string()],
    }
}

/// Lets spawned tasks run without reaching the next poll tick.
pub(crate) async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}
