use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use super::job_tracker::{JobTracker, TrackerSlot};
use super::transport::{JobRequest, MaterialsSource};
use crate::domain::{AppError, Category, Course, DownloadJob, SelectableItem, SelectionModel};

/// File picker state for one course.
#[derive(Debug, Clone)]
pub struct SelectionSession {
    pub course: Course,
    pub model: SelectionModel,
}

/// Drives one export from "pick files" to "archive saved".
pub struct DownloadCoordinator {
    materials: Arc<dyn MaterialsSource>,
    tracker: JobTracker,
    selection: Option<SelectionSession>,
}

impl DownloadCoordinator {
    pub fn new(materials: Arc<dyn MaterialsSource>, tracker: JobTracker) -> Self {
        Self {
            materials,
            tracker,
            selection: None,
        }
    }

    /// Fetches the course's files. The returned future owns everything it needs so the
    /// caller can run it on its own executor.
    pub fn load_materials(
        &self,
        course: Course,
    ) -> impl Future<Output = Result<(Course, Vec<SelectableItem>), AppError>> + Send + 'static {
        let materials = Arc::clone(&self.materials);
        async move {
            match materials.list_materials(&course.id).await {
                Ok(items) => Ok((course, items)),
                Err(e) => {
                    tracing::warn!(course_id = %course.id, error = %e, "Failed to load course materials");
                    Err(AppError::materials(e))
                }
            }
        }
    }

    pub fn begin_selection(&mut self, course: Course, items: Vec<SelectableItem>) {
        tracing::debug!(course_id = %course.id, items = items.len(), "Opening file selection");
        self.selection = Some(SelectionSession {
            course,
            model: SelectionModel::new(items),
        });
    }

    pub fn selection(&self) -> Option<&SelectionSession> {
        self.selection.as_ref()
    }

    pub fn toggle_item(&mut self, id: &str) {
        if let Some(session) = self.selection.as_mut() {
            session.model.toggle_item(id);
        }
    }

    pub fn toggle_category(&mut self, category: Category) {
        if let Some(session) = self.selection.as_mut() {
            session.model.toggle_category(category);
        }
    }

    /// Hands the current selection to the tracker and closes the picker.
    /// Returns the tracker generation of the new job.
    pub fn confirm_selection(&mut self) -> Option<u64> {
        let session = self.selection.take()?;
        let request = JobRequest {
            course_id: session.course.id,
            course_name: session.course.name,
            selected_ids: session.model.confirm(),
        };
        Some(self.tracker.start(request))
    }

    /// Closes the picker without creating a job.
    pub fn cancel_selection(&mut self) -> bool {
        self.selection.take().is_some()
    }

    pub fn dismiss_job(&self) -> bool {
        self.tracker.dismiss()
    }

    pub fn current_job(&self) -> Option<DownloadJob> {
        self.tracker.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerSlot> {
        self.tracker.subscribe()
    }
}
