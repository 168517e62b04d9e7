//! Membership domain model.
//!
//! A membership links a user to an organization. Its identity is the
//! `(organization_id, user_id)` pair — there is no surrogate id, and at
//! most one membership may exist per pair.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a membership.
///
/// No transition graph is enforced at the storage level; `Invited` is
/// an initial-only status as far as the external API is concerned (see
/// `MembershipService::request_status_change`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipStatus {
    Active,
    Invited,
    Suspended,
}

/// Composite identity of a membership.
///
/// Equality and hashing cover both components; persistence lookups are
/// always by the full pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MembershipKey {
    pub organization_id: Uuid,
    pub user_id: Uuid,
}

impl MembershipKey {
    pub fn new(organization_id: Uuid, user_id: Uuid) -> Self {
        Self {
            organization_id,
            user_id,
        }
    }
}

impl fmt::Display for MembershipKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "organization {} and user {}",
            self.organization_id, self.user_id
        )
    }
}

/// A user's membership in an organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Membership {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub status: MembershipStatus,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    pub fn key(&self) -> MembershipKey {
        MembershipKey::new(self.organization_id, self.user_id)
    }
}

/// Fields required to create a new membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMembership {
    pub organization_id: Uuid,
    pub user_id: Uuid,
    /// Defaults to [`MembershipStatus::Active`] when omitted. Any
    /// supplied status is persisted verbatim.
    pub status: Option<MembershipStatus>,
}
