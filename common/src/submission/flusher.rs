//! Replays the offline queue against the remote gateway.
//!
//! A pass reads one snapshot of the queue, submits every item in enqueue
//! order, then writes back once: the current store contents minus the items
//! confirmed during the pass. Submissions enqueued while the pass was running
//! are therefore kept, and items already confirmed are never resent by the
//! next pass. A crash between a confirmation and the final write leaves the
//! item queued; the backend deduplicates the replay on its client id.

use crate::model::submission::QueuedSubmission;
use crate::requests::SubmissionRequest;
use crate::submission::gateway::SubmissionGateway;
use crate::submission::store::{StoreError, SubmissionStore};
use log::{error, info, warn};
use std::cell::Cell;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub successes: usize,
    /// Items left in the queue, including `rejected` ones.
    pub failures: usize,
    /// Items the server refused outright. They stay queued but resending
    /// them will not succeed until the server side changes.
    pub rejected: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushOutcome {
    Completed(FlushReport),
    /// Another pass was already running; nothing was done.
    AlreadyRunning,
}

impl FlushOutcome {
    pub fn report(&self) -> Option<FlushReport> {
        match self {
            FlushOutcome::Completed(report) => Some(*report),
            FlushOutcome::AlreadyRunning => None,
        }
    }
}

/// Single-flight queue flusher. Share one instance (e.g. behind an `Rc`)
/// between every trigger so concurrent requests collapse.
#[derive(Debug, Default)]
pub struct QueueFlusher {
    in_flight: Cell<bool>,
}

struct InFlight<'a>(&'a Cell<bool>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

pub fn request_for(item: &QueuedSubmission) -> SubmissionRequest {
    SubmissionRequest {
        template_id: item.template_id.clone(),
        payload: item.payload.clone(),
        client_submission_id: Some(item.id.clone()),
    }
}

impl QueueFlusher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.get()
    }

    pub async fn flush<S, G>(&self, store: &S, gateway: &G) -> Result<FlushOutcome, StoreError>
    where
        S: SubmissionStore + ?Sized,
        G: SubmissionGateway + ?Sized,
    {
        if self.in_flight.replace(true) {
            return Ok(FlushOutcome::AlreadyRunning);
        }
        let _guard = InFlight(&self.in_flight);

        let snapshot = store.peek();
        if snapshot.is_empty() {
            return Ok(FlushOutcome::Completed(FlushReport::default()));
        }
        info!("flushing {} queued submission(s)", snapshot.len());

        let mut report = FlushReport::default();
        let mut sent: HashSet<String> = HashSet::new();
        for item in &snapshot {
            match gateway.submit(&request_for(item)).await {
                Ok(receipt) => {
                    if receipt.duplicate {
                        info!("queued submission {} was already on the server", item.id);
                    }
                    sent.insert(item.id.clone());
                    report.successes += 1;
                }
                Err(e) if e.is_permanent() => {
                    error!(
                        "queued submission {} for template {} refused by the server: {}",
                        item.id, item.template_id, e
                    );
                    report.failures += 1;
                    report.rejected += 1;
                }
                Err(e) => {
                    warn!("queued submission {} not sent: {}", item.id, e);
                    report.failures += 1;
                }
            }
        }

        if !sent.is_empty() {
            let remaining: Vec<QueuedSubmission> = store
                .peek()
                .into_iter()
                .filter(|item| !sent.contains(&item.id))
                .collect();
            store.replace_all(remaining)?;
        }

        info!(
            "flush finished: {} sent, {} kept ({} refused)",
            report.successes, report.failures, report.rejected
        );
        Ok(FlushOutcome::Completed(report))
    }
}
