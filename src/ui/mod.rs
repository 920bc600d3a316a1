use iced::{
    widget::{button, column, progress_bar, row, scrollable, text, Column, Space},
    Element, Length,
};

use crate::application::download_coordinator::SelectionSession;
use crate::domain::{AppError, Category, CheckboxState, Course, DownloadJob, JobStatus};

/// Main view state
pub struct DashboardView {
    pub courses: Vec<Course>,
    pub status_message: String,
    pub error: Option<AppError>,
}

impl Default for DashboardView {
    fn default() -> Self {
        Self {
            courses: Vec::new(),
            status_message: "Loading courses...".to_string(),
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum UiMessage {
    DownloadPressed(Course),
    ToggleItem(String),
    ToggleCategory(Category),
    ConfirmSelection,
    CancelSelection,
    DismissJob,
    DismissError,
}

impl DashboardView {
    pub fn view<'a>(
        &'a self,
        selection: Option<&'a SelectionSession>,
        job: Option<&DownloadJob>,
    ) -> Element<'a, UiMessage> {
        let mut content = Column::new()
            .push(text("My Courses").size(32))
            .push(text(&self.status_message).size(14))
            .padding(20)
            .spacing(10);

        if let Some(error) = &self.error {
            content = content.push(
                column![
                    text(error.to_string()).size(16),
                    button("OK").on_press(UiMessage::DismissError).padding([8, 16]),
                ]
                .spacing(8),
            );
        }

        if let Some(job) = job {
            content = content.push(job_panel(job));
        } else if let Some(session) = selection {
            content = content.push(selection_panel(session));
        } else {
            for course in &self.courses {
                content = content.push(course_card(course));
            }
        }

        scrollable(content).into()
    }
}

fn course_card(course: &Course) -> Element<'_, UiMessage> {
    row![
        column![text(&course.name).size(20), text(&course.section).size(14)]
            .width(Length::Fill),
        button("Download ZIP")
            .on_press(UiMessage::DownloadPressed(course.clone()))
            .padding([8, 16]),
    ]
    .spacing(10)
    .into()
}

fn checkbox_marker(state: CheckboxState) -> &'static str {
    if state.checked {
        "[x]"
    } else if state.indeterminate {
        "[-]"
    } else {
        "[ ]"
    }
}

fn selection_panel(session: &SelectionSession) -> Element<'_, UiMessage> {
    let model = &session.model;
    let mut panel = Column::new()
        .push(text(format!("Select files from {}", session.course.name)).size(24))
        .spacing(8);

    for (category, items) in model.groups() {
        let marker = checkbox_marker(model.group_checkbox_state(*category));
        panel = panel.push(
            button(text(format!("{} {} ({})", marker, category, items.len())))
                .on_press(UiMessage::ToggleCategory(*category))
                .padding([4, 8]),
        );

        for item in items {
            let marker = if model.is_selected(&item.id) { "[x]" } else { "[ ]" };
            panel = panel.push(
                row![
                    Space::new().width(Length::Fixed(20.0)),
                    button(text(format!("{} {}", marker, item.name)).size(12))
                        .on_press(UiMessage::ToggleItem(item.id.clone()))
                        .padding([2, 6]),
                    text(&item.path).size(10),
                ]
                .spacing(8),
            );
        }
    }

    panel
        .push(Space::new().height(Length::Fixed(20.0)))
        .push(
            row![
                button("Cancel")
                    .on_press(UiMessage::CancelSelection)
                    .padding([8, 16]),
                button(text(format!("Download Selected ({})", model.selected_count())))
                    .on_press(UiMessage::ConfirmSelection)
                    .padding([8, 16]),
            ]
            .spacing(10),
        )
        .into()
}

fn job_panel<'a>(job: &DownloadJob) -> Element<'a, UiMessage> {
    let mut panel = Column::new()
        .push(text(format!("Downloading {}", job.course_name)).size(24))
        .spacing(10);

    if job.status == JobStatus::Failed {
        panel = panel.push(text(format!("Error: {}", job.message)).size(16));
    } else {
        panel = panel
            .push(progress_bar(0.0..=100.0, f32::from(job.progress)))
            .push(text(job.message.clone()).size(14))
            .push(text(format!("{}%", job.progress)).size(14));
    }

    if job.is_terminal() {
        panel = panel.push(
            button("Close")
                .on_press(UiMessage::DismissJob)
                .padding([8, 16]),
        );
    }

    panel.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkbox_marker() {
        let all = CheckboxState { checked: true, indeterminate: false };
        let some = CheckboxState { checked: false, indeterminate: true };
        let none = CheckboxState { checked: false, indeterminate: false };
        assert_eq!(checkbox_marker(all), "[x]");
        assert_eq!(checkbox_marker(some), "[-]");
        assert_eq!(checkbox_marker(none), "[ ]");
    }
}
