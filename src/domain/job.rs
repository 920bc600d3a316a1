use serde::Deserialize;

pub const STARTING_MESSAGE: &str = "Initializing...";
pub const QUEUED_MESSAGE: &str = "Queued...";
pub const START_FAILED_MESSAGE: &str = "Failed to start download.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Starting,
    Queued,
    InProgress,
    Completed,
    Failed,
}

impl JobStatus {
    /// Maps a polled server status. Anything that is not terminal counts as in progress.
    pub fn from_server(status: &str) -> Self {
        match status {
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::InProgress,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// Partial status payload from the status endpoint. Absent fields leave the job untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobStatusUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub progress: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What a merge did to the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Job was already terminal; nothing applied.
    Ignored,
    Updated,
    Completed,
    Failed,
}

/// The export job the client is currently tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadJob {
    pub id: Option<String>,
    pub course_id: String,
    pub course_name: String,
    pub status: JobStatus,
    pub progress: u8,
    pub message: String,
}

impl DownloadJob {
    pub fn starting(course_id: impl Into<String>, course_name: impl Into<String>) -> Self {
        Self {
            id: None,
            course_id: course_id.into(),
            course_name: course_name.into(),
            status: JobStatus::Starting,
            progress: 0,
            message: STARTING_MESSAGE.to_string(),
        }
    }

    /// Server accepted the job. The id is only ever assigned here.
    pub fn accept(&mut self, job_id: String) -> bool {
        if self.status != JobStatus::Starting || self.id.is_some() {
            return false;
        }
        self.id = Some(job_id);
        self.status = JobStatus::Queued;
        self.progress = 0;
        self.message = QUEUED_MESSAGE.to_string();
        true
    }

    pub fn fail_to_start(&mut self) -> bool {
        if self.status != JobStatus::Starting {
            return false;
        }
        self.status = JobStatus::Failed;
        self.message = START_FAILED_MESSAGE.to_string();
        true
    }

    /// Field-by-field merge of a poll response.
    pub fn apply(&mut self, update: JobStatusUpdate) -> Transition {
        if self.status.is_terminal() {
            return Transition::Ignored;
        }

        if let Some(progress) = update.progress {
            self.progress = progress.clamp(0, 100) as u8;
        }
        if let Some(message) = update.message {
            self.message = message;
        }
        if let Some(status) = update.status.as_deref() {
            self.status = JobStatus::from_server(status);
        }

        match self.status {
            JobStatus::Completed => Transition::Completed,
            JobStatus::Failed => Transition::Failed,
            _ => Transition::Updated,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queued(id: &str) -> DownloadJob {
        let mut job = DownloadJob::starting("c1", "X");
        assert!(job.accept(id.to_string()));
        job
    }

    #[test]
    fn test_starting_has_no_id() {
        let job = DownloadJob::starting("c1", "Biology");
        assert_eq!(job.id, None);
        assert_eq!(job.status, JobStatus::Starting);
        assert_eq!(job.progress, 0);
        assert_eq!(job.message, STARTING_MESSAGE);
    }

    #[test]
    fn test_id_assigned_once() {
        let mut job = queued("7");
        assert_eq!(job.id.as_deref(), Some("7"));
        assert_eq!(job.status, JobStatus::Queued);
        assert!(!job.accept("8".to_string()));
        assert_eq!(job.id.as_deref(), Some("7"));
    }

    #[test]
    fn test_merge_is_non_destructive() {
        let mut job = queued("7");
        let transition = job.apply(JobStatusUpdate {
            status: Some("IN_PROGRESS".to_string()),
            progress: Some(40),
            message: None,
        });

        assert_eq!(transition, Transition::Updated);
        assert_eq!(job.id.as_deref(), Some("7"));
        assert_eq!(job.course_name, "X");
        assert_eq!(job.status, JobStatus::InProgress);
        assert_eq!(job.progress, 40);
        assert_eq!(job.message, QUEUED_MESSAGE);
    }

    #[test]
    fn test_server_statuses_map_to_in_progress() {
        assert_eq!(JobStatus::from_server("QUEUED"), JobStatus::InProgress);
        assert_eq!(JobStatus::from_server("PROCESSING"), JobStatus::InProgress);
        assert_eq!(JobStatus::from_server("COMPLETED"), JobStatus::Completed);
        assert_eq!(JobStatus::from_server("FAILED"), JobStatus::Failed);
    }

    #[test]
    fn test_progress_only_update_keeps_status() {
        let mut job = queued("7");
        job.apply(JobStatusUpdate {
            progress: Some(250),
            ..Default::default()
        });
        assert_eq!(job.status, JobStatus::Queued);
        assert_eq!(job.progress, 100);
    }

    #[test]
    fn test_terminal_is_final() {
        let mut job = queued("abc");
        let transition = job.apply(JobStatusUpdate {
            status: Some("FAILED".to_string()),
            progress: None,
            message: Some("quota exceeded".to_string()),
        });
        assert_eq!(transition, Transition::Failed);
        assert_eq!(job.message, "quota exceeded");

        let again = job.apply(JobStatusUpdate {
            status: Some("COMPLETED".to_string()),
            progress: Some(100),
            message: Some("Download ready!".to_string()),
        });
        assert_eq!(again, Transition::Ignored);
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.message, "quota exceeded");
    }

    #[test]
    fn test_fail_to_start() {
        let mut job = DownloadJob::starting("c1", "X");
        assert!(job.fail_to_start());
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.id, None);
        assert_eq!(job.message, START_FAILED_MESSAGE);
        assert!(!job.fail_to_start());
    }

    #[test]
    fn test_deserialize_partial_status() {
        let update: JobStatusUpdate =
            serde_json::from_str(r#"{"status":"PROCESSING","progress":12,"created_at":1.5}"#)
                .unwrap();
        assert_eq!(update.status.as_deref(), Some("PROCESSING"));
        assert_eq!(update.progress, Some(12));
        assert_eq!(update.message, None);
    }
}
