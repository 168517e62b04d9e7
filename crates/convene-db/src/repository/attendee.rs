//! SurrealDB implementation of [`AttendeeRepository`].
//!
//! Attendees mirror memberships: no surrogate id, every query
//! addresses the record by the `(event_id, user_id)` pair, and the
//! unique composite index `idx_attendee_pair` enforces at-most-one.

use chrono::{DateTime, Utc};
use convene_core::error::CoreResult;
use convene_core::models::attendee::{Attendee, AttendeeKey, CreateAttendee, RsvpStatus};
use convene_core::repository::AttendeeRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for attendee records.
#[derive(Debug, SurrealValue)]
struct AttendeeRow {
    event_id: String,
    user_id: String,
    rsvp: String,
    created_at: DateTime<Utc>,
}

fn parse_rsvp(s: &str) -> Result<RsvpStatus, DbError> {
    match s {
        "Pending" => Ok(RsvpStatus::Pending),
        "Yes" => Ok(RsvpStatus::Yes),
        "No" => Ok(RsvpStatus::No),
        other => Err(DbError::Migration(format!("unknown RSVP status: {other}"))),
    }
}

fn rsvp_to_string(s: RsvpStatus) -> &'static str {
    match s {
        RsvpStatus::Pending => "Pending",
        RsvpStatus::Yes => "Yes",
        RsvpStatus::No => "No",
    }
}

impl AttendeeRow {
    fn try_into_attendee(self) -> Result<Attendee, DbError> {
        let event_id = Uuid::parse_str(&self.event_id)
            .map_err(|e| DbError::Migration(format!("invalid event UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Attendee {
            event_id,
            user_id,
            rsvp: parse_rsvp(&self.rsvp)?,
            created_at: self.created_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Attendee repository.
#[derive(Clone)]
pub struct SurrealAttendeeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAttendeeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AttendeeRepository for SurrealAttendeeRepository<C> {
    async fn create(&self, input: CreateAttendee) -> CoreResult<Attendee> {
        let key = AttendeeKey::new(input.event_id, input.user_id);
        let rsvp = input.rsvp.unwrap_or(RsvpStatus::Pending);

        let result = self
            .db
            .query(
                "CREATE attendee SET event_id = $event_id, \
                 user_id = $user_id, rsvp = $rsvp",
            )
            .bind(("event_id", input.event_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("rsvp", rsvp_to_string(rsvp)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "attendee", key))?;

        let rows: Vec<AttendeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "attendee".into(),
            key: key.to_string(),
        })?;

        Ok(row.try_into_attendee()?)
    }

    async fn get(&self, key: AttendeeKey) -> CoreResult<Attendee> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM attendee \
                 WHERE event_id = $event_id AND user_id = $user_id",
            )
            .bind(("event_id", key.event_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AttendeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "attendee".into(),
            key: key.to_string(),
        })?;

        Ok(row.try_into_attendee()?)
    }

    async fn exists(&self, key: AttendeeKey) -> CoreResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM attendee \
                 WHERE event_id = $event_id AND user_id = $user_id \
                 GROUP ALL",
            )
            .bind(("event_id", key.event_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn update_rsvp(&self, key: AttendeeKey, rsvp: RsvpStatus) -> CoreResult<Attendee> {
        let mut result = self
            .db
            .query(
                "UPDATE attendee SET rsvp = $rsvp \
                 WHERE event_id = $event_id AND user_id = $user_id",
            )
            .bind(("rsvp", rsvp_to_string(rsvp)))
            .bind(("event_id", key.event_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AttendeeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "attendee".into(),
            key: key.to_string(),
        })?;

        Ok(row.try_into_attendee()?)
    }

    async fn delete(&self, key: AttendeeKey) -> CoreResult<()> {
        self.db
            .query(
                "DELETE FROM attendee \
                 WHERE event_id = $event_id AND user_id = $user_id",
            )
            .bind(("event_id", key.event_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_event(&self, event_id: Uuid) -> CoreResult<Vec<Attendee>> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM attendee WHERE event_id = $event_id \
                 ORDER BY created_at ASC",
            )
            .bind(("event_id", event_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AttendeeRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_attendee())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn count_by_event(&self, event_id: Uuid) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM attendee \
                 WHERE event_id = $event_id \
                 GROUP ALL",
            )
            .bind(("event_id", event_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_by_event_and_rsvp(
        &self,
        event_id: Uuid,
        rsvp: RsvpStatus,
    ) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM attendee \
                 WHERE event_id = $event_id AND rsvp = $rsvp \
                 GROUP ALL",
            )
            .bind(("event_id", event_id.to_string()))
            .bind(("rsvp", rsvp_to_string(rsvp)))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
