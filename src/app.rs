use std::sync::Arc;

use futures::StreamExt;
use iced::Task;
use tokio::runtime::Handle;
use tokio_stream::wrappers::WatchStream;

use crate::api::ApiClient;
use crate::application::{DownloadCoordinator, JobTracker, TrackerConfig};
use crate::domain::{AppError, Course, SelectableItem};
use crate::ui::{DashboardView, UiMessage};

pub struct ClassroomApp {
    view: DashboardView,
    api_client: ApiClient,
    coordinator: DownloadCoordinator,
}

impl ClassroomApp {
    /// `job_client` is only used by the tracker, which runs on `runtime`.
    pub fn new(
        api_client: ApiClient,
        job_client: ApiClient,
        tracker_config: TrackerConfig,
        runtime: Handle,
    ) -> (Self, Task<Message>) {
        let tracker = JobTracker::new(Arc::new(job_client), tracker_config, runtime);
        let coordinator = DownloadCoordinator::new(Arc::new(api_client.clone()), tracker);

        // re-render whenever the tracked job changes
        let job_updates = WatchStream::new(coordinator.subscribe()).map(|_| Message::JobChanged);

        let app = Self {
            view: DashboardView::default(),
            api_client,
            coordinator,
        };
        let load_courses = app.reload_courses();

        (app, Task::batch([load_courses, Task::stream(job_updates)]))
    }

    fn reload_courses(&self) -> Task<Message> {
        let client = self.api_client.clone();
        Task::perform(
            async move { client.list_courses().await.map_err(AppError::from) },
            Message::CoursesLoaded,
        )
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    UiMessage(UiMessage),
    CoursesLoaded(Result<Vec<Course>, AppError>),
    /// (Course, its files)
    MaterialsLoaded(Result<(Course, Vec<SelectableItem>), AppError>),
    /// The tracker changed; state is read back in `view`
    JobChanged,
}

pub fn update(app: &mut ClassroomApp, message: Message) -> Task<Message> {
    match message {
        Message::UiMessage(ui_msg) => match ui_msg {
            UiMessage::DownloadPressed(course) => {
                app.view.error = None;
                app.view.status_message = format!("Fetching files for: {}", course.name);
                return Task::perform(
                    app.coordinator.load_materials(course),
                    Message::MaterialsLoaded,
                );
            }
            UiMessage::ToggleItem(id) => app.coordinator.toggle_item(&id),
            UiMessage::ToggleCategory(category) => app.coordinator.toggle_category(category),
            UiMessage::ConfirmSelection => {
                if app.coordinator.confirm_selection().is_some() {
                    app.view.status_message = String::new();
                }
            }
            UiMessage::CancelSelection => {
                if app.coordinator.cancel_selection() {
                    app.view.status_message = "Download cancelled".to_string();
                }
            }
            UiMessage::DismissJob => {
                app.coordinator.dismiss_job();
            }
            UiMessage::DismissError => {
                if let Some(AppError::Unauthorized) = app.view.error.take() {
                    app.view.status_message = "Loading courses...".to_string();
                    return app.reload_courses();
                }
            }
        },
        Message::CoursesLoaded(result) => match result {
            Ok(courses) => {
                app.view.status_message = if courses.is_empty() {
                    "No active courses".to_string()
                } else {
                    String::new()
                };
                app.view.courses = courses;
            }
            Err(e) => {
                app.view.status_message = "Failed to fetch courses".to_string();
                app.view.error = Some(e);
            }
        },
        Message::MaterialsLoaded(result) => match result {
            Ok((course, items)) => {
                app.view.status_message = format!("{} files found", items.len());
                app.coordinator.begin_selection(course, items);
            }
            Err(e) => {
                app.coordinator.cancel_selection();
                app.view.status_message = String::new();
                app.view.error = Some(e);
            }
        },
        Message::JobChanged => {}
    }
    Task::none()
}

pub fn view(app: &ClassroomApp) -> iced::Element<'_, Message> {
    let job = app.coordinator.current_job();
    app.view
        .view(app.coordinator.selection(), job.as_ref())
        .map(Message::UiMessage)
}
