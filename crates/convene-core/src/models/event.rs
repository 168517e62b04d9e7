//! Event domain model and the interval-overlap predicate used for
//! scheduling-conflict detection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A scheduled event within an organization.
///
/// The time range is half-open: `[starts_at, ends_at)`. `starts_at`
/// must be strictly before `ends_at`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Uuid,
    pub organization_id: Uuid,
    /// The user who created the event. Deletion is gated to this user.
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// Maximum attendee count. Non-negative by construction.
    pub capacity: Option<u32>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether this event's interval intersects `[start, end)`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        ranges_overlap(self.starts_at, self.ends_at, start, end)
    }
}

/// Half-open interval intersection: `[s1, e1)` and `[s2, e2)` overlap
/// iff `s1 < e2 && s2 < e1`. Back-to-back intervals sharing a boundary
/// do not overlap.
pub fn ranges_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && s2 < e1
}

/// Fields required to create a new event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    pub organization_id: Uuid,
    pub created_by: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<u32>,
    pub location: Option<String>,
}

/// Replacement fields for an existing event.
///
/// Updates replace every mutable field; `id` and `created_at` are
/// preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub organization_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: Option<u32>,
    pub location: Option<String>,
}
