pub mod download_coordinator;
pub mod job_tracker;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_support;

pub use download_coordinator::DownloadCoordinator;
pub use job_tracker::{JobTracker, TrackerConfig};
