use crate::model::form_data::FormData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The project, sub-project or activity a submission is attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub entity_id: String,
    pub entity_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    pub entity_id: String,
    pub entity_type: String,
    pub data: FormData,
    pub latitude: f64,
    pub longitude: f64,
}

/// A submission that could not reach the server, persisted on the device.
///
/// Records are never edited once stored; they are either kept or removed by
/// a flush.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueuedSubmission {
    pub id: String,
    pub template_id: String,
    pub payload: SubmissionPayload,
    /// When the answers were captured, not when they were finally sent.
    pub captured_at: DateTime<Utc>,
}

/// Server acknowledgement for `POST /api/forms/submissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReceipt {
    pub submission_id: String,
    /// `true` when the server had already stored this client submission id.
    #[serde(default)]
    pub duplicate: bool,
}

/// A submission as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSubmission {
    pub submission_id: String,
    pub template_id: String,
    pub client_submission_id: Option<String>,
    pub payload: SubmissionPayload,
    pub received_at: DateTime<Utc>,
}
