//! Client side of a server export job: start it, poll it, react to the outcome.
//!
//! One job is tracked at a time. Each job runs as a single task that owns the poll
//! loop; the task only touches the shared slot while the slot still carries its
//! generation, so a cleared or replaced job can never be written to again.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::transport::{JobRequest, JobTransport};
use crate::domain::{DownloadJob, JobStatusUpdate, Transition};

/// Interval between status requests
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// How long a completed job stays visible
pub const DEFAULT_AUTO_CLEAR_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    pub auto_clear_delay: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            auto_clear_delay: DEFAULT_AUTO_CLEAR_DELAY,
        }
    }
}

/// The tracked job plus the bookkeeping that guards it.
#[derive(Debug, Clone, Default)]
pub struct TrackerSlot {
    generation: u64,
    job: Option<DownloadJob>,
    cancel: Option<CancellationToken>,
}

impl TrackerSlot {
    pub fn job(&self) -> Option<&DownloadJob> {
        self.job.as_ref()
    }

    /// Stops whatever task owned the old job and bumps the generation.
    fn replace(&mut self, job: Option<DownloadJob>, cancel: Option<CancellationToken>) -> u64 {
        if let Some(previous) = self.cancel.take() {
            previous.cancel();
        }
        self.generation += 1;
        self.job = job;
        self.cancel = cancel;
        self.generation
    }
}

pub struct JobTracker {
    transport: Arc<dyn JobTransport>,
    config: TrackerConfig,
    runtime: Handle,
    slot: Arc<watch::Sender<TrackerSlot>>,
}

impl JobTracker {
    pub fn new(transport: Arc<dyn JobTransport>, config: TrackerConfig, runtime: Handle) -> Self {
        let (slot, _) = watch::channel(TrackerSlot::default());
        Self {
            transport,
            config,
            runtime,
            slot: Arc::new(slot),
        }
    }

    /// Snapshot of the tracked job, if any.
    pub fn current(&self) -> Option<DownloadJob> {
        self.slot.borrow().job().cloned()
    }

    /// Notified on every change to the tracked job.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSlot> {
        self.slot.subscribe()
    }

    /// Shows the job as starting right away, then creates it on the server and polls it.
    /// A job that is already tracked is dropped without telling the server.
    pub fn start(&self, request: JobRequest) -> u64 {
        let cancel = CancellationToken::new();
        let job = DownloadJob::starting(&request.course_id, &request.course_name);
        let mut generation = 0;

        self.slot.send_modify(|slot| {
            if let Some(previous) = slot.job.as_ref() {
                tracing::warn!(
                    job_id = previous.id.as_deref().unwrap_or("<pending>"),
                    course_id = %previous.course_id,
                    "Replacing tracked export job"
                );
            }
            generation = slot.replace(Some(job), Some(cancel.clone()));
        });

        tracing::info!(
            course_id = %request.course_id,
            selected = request.selected_ids.len(),
            generation = generation,
            "Starting export job"
        );

        let worker = JobWorker {
            transport: Arc::clone(&self.transport),
            config: self.config,
            slot: Arc::clone(&self.slot),
            generation,
            cancel,
        };
        self.runtime.spawn(worker.run(request));

        generation
    }

    /// Clears a finished or failed job. Running jobs stay tracked.
    pub fn dismiss(&self) -> bool {
        self.slot.send_if_modified(|slot| {
            let terminal = slot.job.as_ref().is_some_and(DownloadJob::is_terminal);
            if terminal {
                slot.replace(None, None);
            }
            terminal
        })
    }
}

struct JobWorker {
    transport: Arc<dyn JobTransport>,
    config: TrackerConfig,
    slot: Arc<watch::Sender<TrackerSlot>>,
    generation: u64,
    cancel: CancellationToken,
}

impl JobWorker {
    async fn run(self, request: JobRequest) {
        let created = tokio::select! {
            _ = self.cancel.cancelled() => return,
            created = self.transport.create_job(&request) => created,
        };

        let job_id = match created {
            Ok(job_id) => job_id,
            Err(e) => {
                tracing::warn!(course_id = %request.course_id, error = %e, "Failed to start export job");
                self.update(DownloadJob::fail_to_start);
                return;
            }
        };

        if !self.update(|job| job.accept(job_id.clone())) {
            return;
        }
        tracing::info!(job_id = %job_id, course_id = %request.course_id, "Export job queued");

        if let Some(Transition::Completed) = self.poll_until_terminal(&job_id).await {
            self.finish(&job_id, &request.course_name).await;
        }
    }

    /// Applies `f` only if the slot still holds this worker's job.
    fn update(&self, f: impl FnOnce(&mut DownloadJob) -> bool) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.generation != self.generation {
                return false;
            }
            slot.job.as_mut().is_some_and(f)
        })
    }

    fn merge(&self, update: JobStatusUpdate) -> Option<Transition> {
        let mut outcome = None;
        self.slot.send_if_modified(|slot| {
            if slot.generation != self.generation {
                return false;
            }
            let Some(job) = slot.job.as_mut() else {
                return false;
            };
            let transition = job.apply(update);
            outcome = Some(transition);
            transition != Transition::Ignored
        });
        outcome
    }

    /// One request per tick, never more than one in flight. A slow response pushes
    /// the next tick back instead of stacking requests.
    async fn poll_until_terminal(&self, job_id: &str) -> Option<Transition> {
        let period = self.config.poll_interval;
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = ticker.tick() => {}
            }

            let polled = tokio::select! {
                _ = self.cancel.cancelled() => return None,
                polled = self.transport.get_job_status(job_id) => polled,
            };

            let update = match polled {
                Ok(update) => update,
                Err(e) => {
                    // transient; only a FAILED status from the server ends the job
                    tracing::warn!(job_id = %job_id, error = %e, "Status poll failed");
                    continue;
                }
            };

            tracing::debug!(job_id = %job_id, ?update, "Polled export job");

            match self.merge(update)? {
                Transition::Updated => {}
                Transition::Completed => return Some(Transition::Completed),
                Transition::Failed => {
                    tracing::info!(job_id = %job_id, "Export job failed on the server");
                    return Some(Transition::Failed);
                }
                Transition::Ignored => return None,
            }
        }
    }

    async fn finish(&self, job_id: &str, course_name: &str) {
        tracing::info!(job_id = %job_id, "Export job completed, fetching archive");

        let transport = Arc::clone(&self.transport);
        let (job_id, course_name) = (job_id.to_string(), course_name.to_string());
        tokio::spawn(async move {
            match transport.fetch_result(&job_id, &course_name).await {
                Ok(path) => tracing::info!(job_id = %job_id, path = %path.display(), "Archive saved"),
                Err(e) => tracing::error!(job_id = %job_id, error = %e, "Failed to fetch archive"),
            }
        });

        tokio::select! {
            _ = self.cancel.cancelled() => return,
            _ = time::sleep(self.config.auto_clear_delay) => {}
        }

        self.slot.send_if_modified(|slot| {
            if slot.generation != self.generation {
                return false;
            }
            slot.replace(None, None);
            true
        });
    }
}
