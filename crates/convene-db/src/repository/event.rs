//! SurrealDB implementation of [`EventRepository`].
//!
//! The overlap query mirrors the half-open interval predicate from the
//! core model: `[s1, e1)` intersects `[s2, e2)` iff
//! `s1 < e2 AND s2 < e1`.

use chrono::{DateTime, Utc};
use convene_core::error::CoreResult;
use convene_core::models::event::{CreateEvent, Event, UpdateEvent};
use convene_core::repository::EventRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct EventRow {
    organization_id: String,
    created_by: String,
    title: String,
    description: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    capacity: Option<u32>,
    location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct EventRowWithId {
    record_id: String,
    organization_id: String,
    created_by: String,
    title: String,
    description: Option<String>,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    capacity: Option<u32>,
    location: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EventRow {
    fn into_event(self, id: Uuid) -> Result<Event, DbError> {
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Migration(format!("invalid organization UUID: {e}")))?;
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid creator UUID: {e}")))?;
        Ok(Event {
            id,
            organization_id,
            created_by,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            capacity: self.capacity,
            location: self.location,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EventRowWithId {
    fn try_into_event(self) -> Result<Event, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Migration(format!("invalid organization UUID: {e}")))?;
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid creator UUID: {e}")))?;
        Ok(Event {
            id,
            organization_id,
            created_by,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            ends_at: self.ends_at,
            capacity: self.capacity,
            location: self.location,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Event repository.
#[derive(Clone)]
pub struct SurrealEventRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEventRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> EventRepository for SurrealEventRepository<C> {
    async fn create(&self, input: CreateEvent) -> CoreResult<Event> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('event', $id) SET \
                 organization_id = $organization_id, \
                 created_by = $created_by, \
                 title = $title, description = $description, \
                 starts_at = $starts_at, ends_at = $ends_at, \
                 capacity = $capacity, location = $location",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("created_by", input.created_by.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("starts_at", input.starts_at))
            .bind(("ends_at", input.ends_at))
            .bind(("capacity", input.capacity))
            .bind(("location", input.location))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "event", &id_str))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            key: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Event> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('event', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            key: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateEvent) -> CoreResult<Event> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('event', $id) SET \
                 organization_id = $organization_id, \
                 title = $title, description = $description, \
                 starts_at = $starts_at, ends_at = $ends_at, \
                 capacity = $capacity, location = $location, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("title", input.title))
            .bind(("description", input.description))
            .bind(("starts_at", input.starts_at))
            .bind(("ends_at", input.ends_at))
            .bind(("capacity", input.capacity))
            .bind(("location", input.location))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "event", &id_str))?;

        let rows: Vec<EventRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "event".into(),
            key: id_str,
        })?;

        Ok(row.into_event(id)?)
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        self.db
            .query("DELETE type::record('event', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> CoreResult<Vec<Event>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM event \
                 WHERE organization_id = $organization_id \
                 ORDER BY starts_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?)
    }

    async fn find_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> CoreResult<Vec<Event>> {
        let mut query = String::from(
            "SELECT meta::id(id) AS record_id, * FROM event \
             WHERE starts_at < $end AND ends_at > $start",
        );
        if exclude.is_some() {
            query.push_str(" AND meta::id(id) != $exclude");
        }
        query.push_str(" ORDER BY starts_at ASC");

        let mut builder = self
            .db
            .query(&query)
            .bind(("start", start))
            .bind(("end", end));
        if let Some(exclude) = exclude {
            builder = builder.bind(("exclude", exclude.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<EventRowWithId> = result.take(0).map_err(DbError::from)?;

        Ok(rows
            .into_iter()
            .map(|row| row.try_into_event())
            .collect::<Result<Vec<_>, DbError>>()?)
    }
}
