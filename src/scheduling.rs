//! Appointment scheduling rules.
//!
//! The service is stateless: it validates a booking request against the
//! half-hour grid and the injected clock, then delegates persistence to an
//! `AppointmentsRepository`. Double-booking is NOT checked here — the
//! storage layer's uniqueness constraint is the only race-safe enforcement
//! point, and the repository reports it as a conflict.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use thiserror::Error;

use crate::clock::Clock;
use crate::db::DatabaseError;
use crate::models::Appointment;

const SLOT_MINUTES: [u32; 2] = [0, 30];

// ─── Commands ─────────────────────────────────────────────────────────────────

/// Inbound booking request. `start_at` is still a raw string here; parsing
/// it is part of validation.
#[derive(Debug, Clone)]
pub struct CreateAppointmentCommand {
    pub professional_id: String,
    pub patient_id: String,
    pub start_at: String,
}

/// Inbound day-listing request. `date` is a raw `YYYY-MM-DD` string.
#[derive(Debug, Clone)]
pub struct ListAppointmentsCommand {
    pub date: String,
    pub professional_id: String,
}

/// Validated input handed to `AppointmentsRepository::create`.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub professional_id: String,
    pub patient_id: String,
    pub start_at: DateTime<Utc>,
}

// ─── Repository capability ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The (professional_id, start_at) pair already exists.
    #[error("appointment slot already taken")]
    Conflict,

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// Durable appointment storage, as seen by the service.
///
/// `create` must enforce (professional_id, start_at) uniqueness atomically
/// at the storage layer; `list_by_day_and_professional` returns the half-open
/// window `[start_of_day, end_of_day)` ordered ascending by start_at.
pub trait AppointmentsRepository {
    fn create(&self, input: &NewAppointment) -> Result<Appointment, RepositoryError>;

    fn list_by_day_and_professional(
        &self,
        professional_id: &str,
        start_of_day: DateTime<Utc>,
        end_of_day: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError>;
}

// ─── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum SchedulingError {
    #[error("{0}")]
    Validation(String),

    #[error("Appointment already exists for this professional and startAt.")]
    Conflict,

    #[error(transparent)]
    Storage(DatabaseError),
}

impl From<RepositoryError> for SchedulingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Conflict => SchedulingError::Conflict,
            RepositoryError::Storage(e) => SchedulingError::Storage(e),
        }
    }
}

// ─── Service ──────────────────────────────────────────────────────────────────

/// Stateless scheduling service. Generic over the repository and the clock
/// so tests can swap in an in-memory store and a pinned instant.
pub struct SchedulingService<R, C> {
    repository: R,
    clock: C,
}

impl<R: AppointmentsRepository, C: Clock> SchedulingService<R, C> {
    pub fn new(repository: R, clock: C) -> Self {
        Self { repository, clock }
    }

    /// Book a slot. Exactly one durable write on success, none on failure.
    pub fn create_appointment(
        &self,
        command: CreateAppointmentCommand,
    ) -> Result<Appointment, SchedulingError> {
        let start_at = DateTime::parse_from_rfc3339(&command.start_at)
            .map_err(|_| {
                SchedulingError::Validation(
                    "startAt must be a valid datetime with timezone.".into(),
                )
            })?
            .with_timezone(&Utc);

        if start_at <= self.clock.now() {
            return Err(SchedulingError::Validation(
                "startAt must be in the future.".into(),
            ));
        }

        // The grid is evaluated on the UTC minute only; seconds and
        // subseconds pass through unchecked.
        if !SLOT_MINUTES.contains(&start_at.minute()) {
            return Err(SchedulingError::Validation(
                "startAt minute must be 0 or 30.".into(),
            ));
        }

        Ok(self.repository.create(&NewAppointment {
            professional_id: command.professional_id,
            patient_id: command.patient_id,
            start_at,
        })?)
    }

    /// List a professional's appointments for one UTC calendar day,
    /// ascending by start_at. An empty day is a valid result.
    pub fn list_appointments_by_date_and_professional(
        &self,
        command: ListAppointmentsCommand,
    ) -> Result<Vec<Appointment>, SchedulingError> {
        let start_of_day = parse_date_start_utc(&command.date).ok_or_else(|| {
            SchedulingError::Validation(
                "date must be a valid UTC date in format YYYY-MM-DD.".into(),
            )
        })?;

        // A fixed 24-hour window, not a local-calendar day.
        let end_of_day = start_of_day + Duration::hours(24);

        Ok(self.repository.list_by_day_and_professional(
            &command.professional_id,
            start_of_day,
            end_of_day,
        )?)
    }
}

/// Parse a strict `YYYY-MM-DD` date into its UTC start-of-day instant.
///
/// The canonical round-trip must equal the input, so `2024-02-30`,
/// `2024-13-01` and non-padded forms are all rejected.
fn parse_date_start_utc(date: &str) -> Option<DateTime<Utc>> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    if parsed.format("%Y-%m-%d").to_string() != date {
        return None;
    }
    Some(parsed.and_hms_opt(0, 0, 0)?.and_utc())
}
