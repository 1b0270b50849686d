//! # Submission Service
//!
//! Receives answers captured on field devices, either live or replayed from
//! a device's offline queue.
//!
//! 1.  The template named in the request is loaded; an unknown template is a
//!     `404`.
//! 2.  The answers are checked with the same `validate` the device runs, so a
//!     client that skipped its own check still gets the per-field messages
//!     back as a `422`.
//! 3.  The row is written with `INSERT OR IGNORE`. `client_submission_id` is
//!     `UNIQUE`, so a replay of an already stored submission inserts nothing
//!     and the existing server id is returned with `duplicate: true`.

use super::templates::find_template;
use crate::db::Database;
use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use common::model::form_data::FieldErrors;
use common::model::submission::{StoredSubmission, SubmissionPayload, SubmissionReceipt};
use common::requests::{SubmissionRequest, SubmissionsQuery};
use common::submission::validation::validate;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

#[derive(Debug)]
pub enum SubmitError {
    UnknownTemplate(String),
    Invalid(FieldErrors),
    Storage(String),
}

/// `POST /api/forms/submissions`
pub async fn submit(db: web::Data<Database>, request: web::Json<SubmissionRequest>) -> impl Responder {
    match store_submission(&db, &request) {
        Ok(receipt) if receipt.duplicate => HttpResponse::Ok().json(receipt),
        Ok(receipt) => HttpResponse::Created().json(receipt),
        Err(SubmitError::UnknownTemplate(id)) => {
            HttpResponse::NotFound().body(format!("Template {} not found", id))
        }
        Err(SubmitError::Invalid(errors)) => HttpResponse::UnprocessableEntity().json(errors),
        Err(SubmitError::Storage(e)) => {
            error!("storing submission for {} failed: {}", request.template_id, e);
            HttpResponse::ServiceUnavailable().body(format!("Error storing submission: {}", e))
        }
    }
}

/// `GET /api/forms/submissions?entity_id=..&entity_type=..`
pub async fn list(db: web::Data<Database>, query: web::Query<SubmissionsQuery>) -> impl Responder {
    match list_submissions(&db, &query) {
        Ok(submissions) => HttpResponse::Ok().json(submissions),
        Err(e) => {
            error!("listing submissions failed: {}", e);
            HttpResponse::ServiceUnavailable().body(format!("Error listing submissions: {}", e))
        }
    }
}

pub fn store_submission(
    db: &Database,
    request: &SubmissionRequest,
) -> Result<SubmissionReceipt, SubmitError> {
    let template = find_template(db, &request.template_id)
        .map_err(SubmitError::Storage)?
        .ok_or_else(|| SubmitError::UnknownTemplate(request.template_id.clone()))?;

    if let Err(errors) = validate(&template, &request.payload.data) {
        warn!(
            "submission for {} rejected: {} field(s) missing",
            template.id,
            errors.len()
        );
        return Err(SubmitError::Invalid(errors));
    }

    let payload_json = serde_json::to_string(&request.payload)
        .map_err(|e| SubmitError::Storage(e.to_string()))?;
    let conn = db.connect().map_err(SubmitError::Storage)?;
    let submission_id = Uuid::new_v4().to_string();

    let inserted = conn
        .execute(
            "INSERT OR IGNORE INTO submissions
                (submission_id, template_id, client_submission_id, entity_id, entity_type, payload_json, received_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                &submission_id,
                &request.template_id,
                &request.client_submission_id,
                &request.payload.entity_id,
                &request.payload.entity_type,
                &payload_json,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| SubmitError::Storage(e.to_string()))?;

    if inserted == 0 {
        if let Some(client_id) = &request.client_submission_id {
            let existing = existing_submission_id(&conn, client_id)
                .map_err(SubmitError::Storage)?
                .ok_or_else(|| SubmitError::Storage("submission was not stored".to_string()))?;
            info!("submission {} already stored as {}", client_id, existing);
            return Ok(SubmissionReceipt {
                submission_id: existing,
                duplicate: true,
            });
        }
        return Err(SubmitError::Storage("submission was not stored".to_string()));
    }

    info!(
        "submission {} stored for {} {}",
        submission_id, request.payload.entity_type, request.payload.entity_id
    );
    Ok(SubmissionReceipt {
        submission_id,
        duplicate: false,
    })
}

fn existing_submission_id(conn: &Connection, client_id: &str) -> Result<Option<String>, String> {
    conn.query_row(
        "SELECT submission_id FROM submissions WHERE client_submission_id = ?1",
        params![client_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(|e| e.to_string())
}

pub fn list_submissions(
    db: &Database,
    query: &SubmissionsQuery,
) -> Result<Vec<StoredSubmission>, String> {
    let conn = db.connect()?;
    let mut stmt = conn
        .prepare(
            "SELECT submission_id, template_id, client_submission_id, payload_json, received_at
             FROM submissions
             WHERE entity_id = ?1 AND entity_type = ?2
             ORDER BY rowid",
        )
        .map_err(|e| e.to_string())?;

    let rows = stmt
        .query_map(params![&query.entity_id, &query.entity_type], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })
        .map_err(|e| e.to_string())?;

    let mut submissions = Vec::new();
    for row in rows {
        let (submission_id, template_id, client_submission_id, payload_json, received_at) =
            row.map_err(|e| e.to_string())?;
        let payload: SubmissionPayload = serde_json::from_str(&payload_json)
            .map_err(|e| format!("corrupt payload for {}: {}", submission_id, e))?;
        let received_at = DateTime::parse_from_rfc3339(&received_at)
            .map_err(|e| format!("corrupt timestamp for {}: {}", submission_id, e))?
            .with_timezone(&Utc);
        submissions.push(StoredSubmission {
            submission_id,
            template_id,
            client_submission_id,
            payload,
            received_at,
        });
    }
    Ok(submissions)
}
