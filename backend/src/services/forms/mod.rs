//! # Form Service Module
//!
//! Endpoints for form templates and the submissions collected against them,
//! all under `/api/forms`.
//!
//! ## Sub-modules:
//! - `templates`: fetches and stores `FormTemplate` definitions.
//! - `submissions`: validates, stores and lists submissions. Submissions that
//!   carry a `clientSubmissionId` are stored at most once, so the device can
//!   replay its offline queue after an interrupted flush.

mod submissions;
mod templates;

use actix_web::web::{get, post, scope};
use actix_web::Scope;

/// The base path for all form-related API endpoints.
const API_PATH: &str = "/api/forms";

/// Configures and returns the Actix `Scope` for the form routes.
///
/// # Registered Routes:
///
/// *   **`GET /templates/{template_id}`**: the template as JSON, `404` when unknown.
/// *   **`POST /templates`**: creates or replaces a template.
/// *   **`POST /submissions`**: stores a submission. Answers `201` with a
///     `SubmissionReceipt`, `200` with `duplicate: true` for a replayed
///     client id, `422` with the field errors when required answers are
///     missing and `404` when the template does not exist.
/// *   **`GET /submissions?entity_id=..&entity_type=..`**: submissions stored
///     for one entity, in arrival order.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/templates", post().to(templates::save))
        .route("/templates/{template_id}", get().to(templates::get))
        .route("/submissions", post().to(submissions::submit))
        .route("/submissions", get().to(submissions::list))
}
