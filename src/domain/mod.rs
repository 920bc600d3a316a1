pub mod error;
pub mod job;
pub mod model;
pub mod selection;

pub use error::AppError;
pub use job::{DownloadJob, JobStatus, JobStatusUpdate, Transition};
pub use model::{Category, Course, SelectableItem};
pub use selection::{CheckboxState, SelectionModel};
