//! Device-local queue of submissions that could not reach the server.
//!
//! The queue is a JSON array held in one named key/value slot. The browser
//! build backs the slot with `localStorage`; tests use `MemorySlot`.

use crate::model::submission::{QueuedSubmission, SubmissionPayload};
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::cell::RefCell;
use thiserror::Error;

/// Name of the slot holding the serialized queue.
pub const QUEUE_STORAGE_KEY: &str = "offline_submissions";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("could not encode queue: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A single persistent string slot.
pub trait StorageSlot {
    fn read(&self) -> Option<String>;
    fn write(&self, value: &str) -> Result<(), StoreError>;
    fn remove(&self);
}

/// In-memory slot used by tests and as a fallback when the host has no
/// persistent storage.
#[derive(Debug, Default)]
pub struct MemorySlot {
    value: RefCell<Option<String>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts the slot with raw content, e.g. to simulate corruption.
    pub fn with_content(raw: &str) -> Self {
        Self {
            value: RefCell::new(Some(raw.to_string())),
        }
    }

    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }
}

impl StorageSlot for MemorySlot {
    fn read(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    fn write(&self, value: &str) -> Result<(), StoreError> {
        *self.value.borrow_mut() = Some(value.to_string());
        Ok(())
    }

    fn remove(&self) {
        *self.value.borrow_mut() = None;
    }
}

/// Fresh client-side submission id.
pub fn new_submission_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The queue contract shared by the orchestrator and the flusher.
///
/// Records are keyed by `id`; insertion order is kept for replay.
pub trait SubmissionStore {
    /// Every queued record in enqueue order. Never fails: unreadable storage
    /// reads as an empty queue and unreadable records are skipped.
    fn peek(&self) -> Vec<QueuedSubmission>;

    /// Persists the given set, replacing whatever was stored.
    fn replace_all(&self, items: Vec<QueuedSubmission>) -> Result<(), StoreError>;

    fn clear(&self);

    /// Appends a pre-built record. A record whose id is already queued is
    /// left alone.
    fn persist(&self, record: QueuedSubmission) -> Result<(), StoreError> {
        let mut items = self.peek();
        if items.iter().any(|item| item.id == record.id) {
            debug!("submission {} already queued", record.id);
            return Ok(());
        }
        items.push(record);
        self.replace_all(items)
    }

    /// Builds a record with a fresh id and queues it. `captured_at` defaults
    /// to now.
    fn enqueue(
        &self,
        template_id: &str,
        payload: SubmissionPayload,
        captured_at: Option<DateTime<Utc>>,
    ) -> Result<QueuedSubmission, StoreError> {
        let record = QueuedSubmission {
            id: new_submission_id(),
            template_id: template_id.to_string(),
            payload,
            captured_at: captured_at.unwrap_or_else(Utc::now),
        };
        self.persist(record.clone())?;
        Ok(record)
    }

    fn len(&self) -> usize {
        self.peek().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// `SubmissionStore` over a JSON array in a `StorageSlot`.
#[derive(Debug, Default)]
pub struct SlotStore<S> {
    slot: S,
}

impl<S: StorageSlot> SlotStore<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }
}

impl<S: StorageSlot> SubmissionStore for SlotStore<S> {
    fn peek(&self) -> Vec<QueuedSubmission> {
        let Some(raw) = self.slot.read() else {
            return Vec::new();
        };
        let entries = match serde_json::from_str::<Vec<serde_json::Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("offline queue unreadable, treating as empty: {}", e);
                return Vec::new();
            }
        };
        // Records are decoded one by one so a single bad entry cannot take
        // its neighbours down with it.
        entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                serde_json::from_value::<QueuedSubmission>(entry)
                    .inspect_err(|e| warn!("dropping unreadable queued submission #{}: {}", index, e))
                    .ok()
            })
            .collect()
    }

    fn replace_all(&self, items: Vec<QueuedSubmission>) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(&items)?;
        self.slot.write(&encoded).inspect_err(|e| {
            warn!("failed to persist offline queue ({} items): {}", items.len(), e);
        })
    }

    fn clear(&self) {
        self.slot.remove();
    }
}
