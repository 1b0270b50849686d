use crate::db::Database;
use actix_web::{web, HttpResponse, Responder};
use common::model::template::{FieldDefinition, FormTemplate};
use log::{error, info};
use rusqlite::{params, OptionalExtension};
use std::collections::HashSet;

/// `GET /api/forms/templates/{template_id}`
pub async fn get(db: web::Data<Database>, template_id: web::Path<String>) -> impl Responder {
    match find_template(&db, &template_id) {
        Ok(Some(template)) => HttpResponse::Ok().json(template),
        Ok(None) => HttpResponse::NotFound().body(format!("Template {} not found", template_id)),
        Err(e) => {
            error!("loading template {} failed: {}", template_id, e);
            HttpResponse::ServiceUnavailable().body(format!("Error retrieving template: {}", e))
        }
    }
}

/// `POST /api/forms/templates`
pub async fn save(db: web::Data<Database>, payload: web::Json<FormTemplate>) -> impl Responder {
    if let Err(e) = check_template(&payload) {
        return HttpResponse::BadRequest().body(e);
    }
    match save_template(&db, &payload) {
        Ok(()) => {
            info!("template {} saved ({} fields)", payload.id, payload.fields.len());
            HttpResponse::Ok().json(payload.into_inner())
        }
        Err(e) => {
            error!("saving template {} failed: {}", payload.id, e);
            HttpResponse::ServiceUnavailable().body(format!("Error saving template: {}", e))
        }
    }
}

pub fn find_template(db: &Database, template_id: &str) -> Result<Option<FormTemplate>, String> {
    let conn = db.connect()?;
    let row = conn
        .query_row(
            "SELECT id, name, fields_json FROM templates WHERE id = ?1",
            params![template_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()
        .map_err(|e| e.to_string())?;

    let Some((id, name, fields_json)) = row else {
        return Ok(None);
    };
    let fields: Vec<FieldDefinition> =
        serde_json::from_str(&fields_json).map_err(|e| format!("corrupt field list: {}", e))?;
    Ok(Some(FormTemplate { id, name, fields }))
}

fn check_template(template: &FormTemplate) -> Result<(), String> {
    if template.id.trim().is_empty() {
        return Err("Template id must not be empty".to_string());
    }
    let mut seen = HashSet::new();
    for field in &template.fields {
        if field.name.trim().is_empty() {
            return Err("Field names must not be empty".to_string());
        }
        if !seen.insert(field.name.as_str()) {
            return Err(format!("Duplicate field name: {}", field.name));
        }
    }
    Ok(())
}

fn save_template(db: &Database, template: &FormTemplate) -> Result<(), String> {
    let fields_json = serde_json::to_string(&template.fields).map_err(|e| e.to_string())?;
    let conn = db.connect()?;
    conn.execute(
        "INSERT OR REPLACE INTO templates (id, name, fields_json) VALUES (?1, ?2, ?3)",
        params![&template.id, &template.name, &fields_json],
    )
    .map_err(|e| e.to_string())?;
    Ok(())
}
