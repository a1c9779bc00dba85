use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Appointment;
use crate::scheduling::{AppointmentsRepository, NewAppointment, RepositoryError};

/// Storage encoding for instants: fixed-width RFC 3339 UTC with millisecond
/// precision, so lexicographic comparison in SQL matches instant ordering.
pub fn to_storage(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn from_storage(value: &str) -> Result<DateTime<Utc>, DatabaseError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| DatabaseError::InvalidColumn {
            column: "start_at/created_at".into(),
            value: value.into(),
        })
}

/// Insert a new appointment, assigning its id and created_at.
///
/// The UNIQUE (professional_id, start_at) constraint is the only
/// double-booking check; a violation surfaces as `ConstraintViolation`.
pub fn insert_appointment(
    conn: &Connection,
    input: &NewAppointment,
) -> Result<Appointment, DatabaseError> {
    let appointment = Appointment {
        id: Uuid::new_v4(),
        professional_id: input.professional_id.clone(),
        patient_id: input.patient_id.clone(),
        start_at: input.start_at,
        // Truncated to storage precision so the returned value equals what
        // a later read will see.
        created_at: Utc::now().trunc_subsecs(3),
    };

    conn.execute(
        "INSERT INTO appointments (id, professional_id, patient_id, start_at, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            appointment.id.to_string(),
            appointment.professional_id,
            appointment.patient_id,
            to_storage(&appointment.start_at),
            to_storage(&appointment.created_at),
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            DatabaseError::ConstraintViolation(
                "appointments (professional_id, start_at) must be unique".into(),
            )
        } else {
            DatabaseError::Sqlite(e)
        }
    })?;

    Ok(appointment)
}

/// List one professional's appointments in `[start_of_day, end_of_day)`,
/// ascending by start_at.
pub fn list_appointments_by_day(
    conn: &Connection,
    professional_id: &str,
    start_of_day: &DateTime<Utc>,
    end_of_day: &DateTime<Utc>,
) -> Result<Vec<Appointment>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, professional_id, patient_id, start_at, created_at
         FROM appointments
         WHERE professional_id = ?1
           AND start_at >= ?2
           AND start_at < ?3
         ORDER BY start_at ASC",
    )?;

    let rows = stmt.query_map(
        params![
            professional_id,
            to_storage(start_of_day),
            to_storage(end_of_day)
        ],
        |row| {
            Ok(AppointmentRow {
                id: row.get(0)?,
                professional_id: row.get(1)?,
                patient_id: row.get(2)?,
                start_at: row.get(3)?,
                created_at: row.get(4)?,
            })
        },
    )?;

    rows.map(|row| row.map_err(DatabaseError::from).and_then(Appointment::try_from))
        .collect()
}

struct AppointmentRow {
    id: String,
    professional_id: String,
    patient_id: String,
    start_at: String,
    created_at: String,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = DatabaseError;

    fn try_from(row: AppointmentRow) -> Result<Self, DatabaseError> {
        Ok(Appointment {
            id: Uuid::parse_str(&row.id).map_err(|_| DatabaseError::InvalidColumn {
                column: "id".into(),
                value: row.id.clone(),
            })?,
            professional_id: row.professional_id,
            patient_id: row.patient_id,
            start_at: from_storage(&row.start_at)?,
            created_at: from_storage(&row.created_at)?,
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == rusqlite::ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Production repository: the scheduling service's storage capability
/// backed by a SQLite connection.
pub struct SqliteAppointmentsRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteAppointmentsRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl AppointmentsRepository for SqliteAppointmentsRepository<'_> {
    fn create(&self, input: &NewAppointment) -> Result<Appointment, RepositoryError> {
        insert_appointment(self.conn, input).map_err(|e| match e {
            DatabaseError::ConstraintViolation(_) => RepositoryError::Conflict,
            other => RepositoryError::Storage(other),
        })
    }

    fn list_by_day_and_professional(
        &self,
        professional_id: &str,
        start_of_day: DateTime<Utc>,
        end_of_day: DateTime<Utc>,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(list_appointments_by_day(
            self.conn,
            professional_id,
            &start_of_day,
            &end_of_day,
        )?)
    }
}
