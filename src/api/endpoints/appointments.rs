//! Appointment endpoints.
//!
//! - `POST /appointments` — book a half-hour slot
//! - `GET /appointments?date=YYYY-MM-DD&professionalId=…` — one professional's day

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::clock::SystemClock;
use crate::db::SqliteAppointmentsRepository;
use crate::models::Appointment;
use crate::scheduling::{
    CreateAppointmentCommand, ListAppointmentsCommand, SchedulingService,
};

/// Wire representation of an appointment. Timestamps are RFC 3339 UTC with
/// millisecond precision.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub id: String,
    pub professional_id: String,
    pub patient_id: String,
    pub start_at: String,
    pub created_at: String,
}

impl From<&Appointment> for AppointmentView {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id.to_string(),
            professional_id: appointment.professional_id.clone(),
            patient_id: appointment.patient_id.clone(),
            start_at: appointment
                .start_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
            created_at: appointment
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

fn field_issues_error(issues: Vec<(&'static str, &'static str)>) -> ApiError {
    let details: Vec<serde_json::Value> = issues
        .iter()
        .map(|(field, message)| serde_json::json!({ "field": field, "message": message }))
        .collect();
    ApiError::Validation {
        message: "Validation failed.".into(),
        details: Some(serde_json::Value::Array(details)),
    }
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// Missing fields default to empty strings so they surface as field issues
/// in the uniform error shape rather than a body-rejection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentBody {
    #[serde(default)]
    pub professional_id: String,
    #[serde(default)]
    pub patient_id: String,
    #[serde(default)]
    pub start_at: String,
}

impl CreateAppointmentBody {
    /// Field-level validation; identifiers are trimmed before use.
    fn into_command(self) -> Result<CreateAppointmentCommand, ApiError> {
        let professional_id = self.professional_id.trim().to_string();
        let patient_id = self.patient_id.trim().to_string();

        let mut issues = Vec::new();
        if professional_id.is_empty() {
            issues.push(("professionalId", "must be a non-empty string"));
        }
        if patient_id.is_empty() {
            issues.push(("patientId", "must be a non-empty string"));
        }
        if self.start_at.is_empty() {
            issues.push(("startAt", "is required"));
        }
        if !issues.is_empty() {
            return Err(field_issues_error(issues));
        }

        Ok(CreateAppointmentCommand {
            professional_id,
            patient_id,
            start_at: self.start_at,
        })
    }
}

/// `POST /appointments` — create an appointment.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(body): Json<CreateAppointmentBody>,
) -> Result<(StatusCode, Json<AppointmentView>), ApiError> {
    let command = body.into_command()?;

    let conn = ctx.open_db()?;
    let service = SchedulingService::new(SqliteAppointmentsRepository::new(&conn), SystemClock);
    let appointment = service.create_appointment(command)?;

    Ok((StatusCode::CREATED, Json(AppointmentView::from(&appointment))))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListAppointmentsQuery {
    pub date: Option<String>,
    pub professional_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListAppointmentsResponse {
    pub items: Vec<AppointmentView>,
}

impl ListAppointmentsQuery {
    /// Presence checks only; date semantics are the service's concern.
    fn into_command(self) -> Result<ListAppointmentsCommand, ApiError> {
        let professional_id = self
            .professional_id
            .as_deref()
            .unwrap_or("")
            .trim()
            .to_string();

        let mut issues = Vec::new();
        if self.date.is_none() {
            issues.push(("date", "is required"));
        }
        if professional_id.is_empty() {
            issues.push(("professionalId", "must be a non-empty string"));
        }
        if !issues.is_empty() {
            return Err(field_issues_error(issues));
        }

        Ok(ListAppointmentsCommand {
            date: self.date.unwrap_or_default(),
            professional_id,
        })
    }
}

/// `GET /appointments` — list one professional's appointments for a UTC day.
pub async fn list(
    State(ctx): State<ApiContext>,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<ListAppointmentsResponse>, ApiError> {
    let command = query.into_command()?;

    let conn = ctx.open_db()?;
    let service = SchedulingService::new(SqliteAppointmentsRepository::new(&conn), SystemClock);
    let appointments = service.list_appointments_by_date_and_professional(command)?;

    Ok(Json(ListAppointmentsResponse {
        items: appointments.iter().map(AppointmentView::from).collect(),
    }))
}
