//! Attendee domain model.
//!
//! An attendee records a user's invitation to an event. Identity is the
//! `(event_id, user_id)` pair, mirroring memberships.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// RSVP answer for an invitation.
///
/// Any value may follow any other; the only guard on transitions is
/// that the invited user themself performs them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpStatus {
    Pending,
    Yes,
    No,
}

/// Composite identity of an attendee record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttendeeKey {
    pub event_id: Uuid,
    pub user_id: Uuid,
}

impl AttendeeKey {
    pub fn new(event_id: Uuid, user_id: Uuid) -> Self {
        Self { event_id, user_id }
    }
}

impl fmt::Display for AttendeeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event {} and user {}", self.event_id, self.user_id)
    }
}

/// A user invited to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attendee {
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub rsvp: RsvpStatus,
    pub created_at: DateTime<Utc>,
}

impl Attendee {
    pub fn key(&self) -> AttendeeKey {
        AttendeeKey::new(self.event_id, self.user_id)
    }
}

/// Fields required to invite a user to an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAttendee {
    pub event_id: Uuid,
    pub user_id: Uuid,
    /// Defaults to [`RsvpStatus::Pending`] when omitted.
    pub rsvp: Option<RsvpStatus>,
}
