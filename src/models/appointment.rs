use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A booked half-hour slot. Never mutated or deleted once created.
///
/// `id` and `created_at` are assigned by the repository at persistence time;
/// `start_at` is UTC-normalized before it reaches storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub professional_id: String,
    pub patient_id: String,
    pub start_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}
