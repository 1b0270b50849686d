use crate::model::submission::SubmissionPayload;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/forms/submissions`.
///
/// `client_submission_id` is the id minted on the device when the answers
/// were captured. The server ignores a second submission carrying an id it
/// has already stored, so replaying the offline queue is safe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRequest {
    pub template_id: String,
    pub payload: SubmissionPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_submission_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
/// Query string of `GET /api/forms/submissions`.
pub struct SubmissionsQuery {
    pub entity_id: String,
    pub entity_type: String,
}
