//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Composite-key repositories
//! (memberships, attendees) address records by the full key pair, never
//! by a surrogate id. `get_*` methods return the entity or
//! [`CoreError::NotFound`](crate::error::CoreError::NotFound);
//! `exists`/`count` methods return plain values.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::CoreResult;
use crate::models::{
    attendee::{Attendee, AttendeeKey, CreateAttendee, RsvpStatus},
    event::{CreateEvent, Event, UpdateEvent},
    membership::{CreateMembership, Membership, MembershipKey, MembershipStatus},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    user::{CreateUser, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<User>> + Send;
    fn get_by_email(&self, email: &str) -> impl Future<Output = CoreResult<User>> + Send;
    fn exists(&self, id: Uuid) -> impl Future<Output = CoreResult<bool>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = CoreResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<User>>> + Send;
}

// ---------------------------------------------------------------------------
// Organizations
// ---------------------------------------------------------------------------

pub trait OrganizationRepository: Send + Sync {
    /// Create the organization together with an active membership for
    /// its creator, in a single store transaction. If either write
    /// fails, neither is visible to subsequent reads.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = CoreResult<(Organization, Membership)>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Organization>> + Send;
    fn get_by_name(&self, name: &str) -> impl Future<Output = CoreResult<Organization>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = CoreResult<Organization>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = CoreResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Memberships (composite key)
// ---------------------------------------------------------------------------

pub trait MembershipRepository: Send + Sync {
    fn create(
        &self,
        input: CreateMembership,
    ) -> impl Future<Output = CoreResult<Membership>> + Send;
    fn get(&self, key: MembershipKey) -> impl Future<Output = CoreResult<Membership>> + Send;
    fn exists(&self, key: MembershipKey) -> impl Future<Output = CoreResult<bool>> + Send;
    fn update_status(
        &self,
        key: MembershipKey,
        status: MembershipStatus,
    ) -> impl Future<Output = CoreResult<Membership>> + Send;
    fn delete(&self, key: MembershipKey) -> impl Future<Output = CoreResult<()>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<Membership>>> + Send;
    fn list_by_user(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<Membership>>> + Send;
    fn list_by_status(
        &self,
        organization_id: Uuid,
        status: MembershipStatus,
    ) -> impl Future<Output = CoreResult<Vec<Membership>>> + Send;
    fn count_active(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
    fn count_for_user(&self, user_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

pub trait EventRepository: Send + Sync {
    fn create(&self, input: CreateEvent) -> impl Future<Output = CoreResult<Event>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = CoreResult<Event>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateEvent,
    ) -> impl Future<Output = CoreResult<Event>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = CoreResult<()>> + Send;
    fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<Event>>> + Send;

    /// All events whose half-open `[starts_at, ends_at)` interval
    /// intersects `[start, end)`, optionally excluding one event id
    /// (the record being updated).
    fn find_overlapping(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> impl Future<Output = CoreResult<Vec<Event>>> + Send;
}

// ---------------------------------------------------------------------------
// Attendees (composite key)
// ---------------------------------------------------------------------------

pub trait AttendeeRepository: Send + Sync {
    fn create(
        &self,
        input: CreateAttendee,
    ) -> impl Future<Output = CoreResult<Attendee>> + Send;
    fn get(&self, key: AttendeeKey) -> impl Future<Output = CoreResult<Attendee>> + Send;
    fn exists(&self, key: AttendeeKey) -> impl Future<Output = CoreResult<bool>> + Send;
    fn update_rsvp(
        &self,
        key: AttendeeKey,
        rsvp: RsvpStatus,
    ) -> impl Future<Output = CoreResult<Attendee>> + Send;
    fn delete(&self, key: AttendeeKey) -> impl Future<Output = CoreResult<()>> + Send;
    fn list_by_event(
        &self,
        event_id: Uuid,
    ) -> impl Future<Output = CoreResult<Vec<Attendee>>> + Send;
    fn count_by_event(&self, event_id: Uuid) -> impl Future<Output = CoreResult<u64>> + Send;
    fn count_by_event_and_rsvp(
        &self,
        event_id: Uuid,
        rsvp: RsvpStatus,
    ) -> impl Future<Output = CoreResult<u64>> + Send;
}
