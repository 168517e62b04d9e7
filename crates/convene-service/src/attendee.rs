//! Attendee service — invitation lifecycle and RSVP transitions.
//!
//! Two authorization rules live here: only the invited user may change
//! their own RSVP, and only the event's creator may remove an
//! attendee.

use convene_core::error::{CoreError, CoreResult};
use convene_core::models::attendee::{Attendee, AttendeeKey, CreateAttendee, RsvpStatus};
use convene_core::models::membership::MembershipKey;
use convene_core::repository::{
    AttendeeRepository, EventRepository, MembershipRepository, UserRepository,
};
use tracing::{info, warn};
use uuid::Uuid;

/// Attendee / RSVP consistency service.
pub struct AttendeeService<A, E, U, M>
where
    A: AttendeeRepository,
    E: EventRepository,
    U: UserRepository,
    M: MembershipRepository,
{
    attendees: A,
    events: E,
    users: U,
    memberships: M,
}

impl<A, E, U, M> AttendeeService<A, E, U, M>
where
    A: AttendeeRepository,
    E: EventRepository,
    U: UserRepository,
    M: MembershipRepository,
{
    pub fn new(attendees: A, events: E, users: U, memberships: M) -> Self {
        Self {
            attendees,
            events,
            users,
            memberships,
        }
    }

    /// Invite a user to an event.
    ///
    /// The user and event must exist, the user must hold a membership
    /// in the event's organization, and the `(event, user)` pair must
    /// not already be invited. The RSVP defaults to
    /// [`RsvpStatus::Pending`].
    pub async fn invite(
        &self,
        event_id: Uuid,
        user_id: Uuid,
        rsvp: Option<RsvpStatus>,
    ) -> CoreResult<Attendee> {
        let key = AttendeeKey::new(event_id, user_id);

        // 1. The invited user must exist.
        if !self.users.exists(user_id).await? {
            warn!(user_id = %user_id, "Invited user does not exist");
            return Err(CoreError::not_found("user", user_id));
        }

        // 2. The event must exist; its organization scopes the
        //    membership check below.
        let event = self.events.get_by_id(event_id).await?;

        // 3. The user must already be a member of the event's
        //    organization.
        let membership_key = MembershipKey::new(event.organization_id, user_id);
        if !self.memberships.exists(membership_key).await? {
            warn!(%membership_key, "Invitee is not an organization member");
            return Err(CoreError::invalid_argument(format!(
                "user {user_id} is not a member of organization {}",
                event.organization_id
            )));
        }

        // 4. At most one attendee per pair; the unique index is the
        //    backstop.
        if self.attendees.exists(key).await? {
            warn!(%key, "Attendee already exists");
            return Err(CoreError::already_exists("attendee", key));
        }

        // 5. Persist with the defaulted RSVP.
        let attendee = self
            .attendees
            .create(CreateAttendee {
                event_id,
                user_id,
                rsvp,
            })
            .await?;

        info!(%key, rsvp = ?attendee.rsvp, "Attendee invited");
        Ok(attendee)
    }

    /// Change an attendee's RSVP.
    ///
    /// Only the invited user themself may perform the change; any
    /// status value may follow any other.
    pub async fn update_rsvp(
        &self,
        key: AttendeeKey,
        requesting_user: Uuid,
        rsvp: RsvpStatus,
    ) -> CoreResult<Attendee> {
        if requesting_user != key.user_id {
            warn!(
                %key,
                requesting_user = %requesting_user,
                "RSVP change denied"
            );
            return Err(CoreError::forbidden(format!(
                "only user {} may change their RSVP for event {}",
                key.user_id, key.event_id
            )));
        }

        let attendee = self.attendees.update_rsvp(key, rsvp).await?;
        info!(%key, rsvp = ?rsvp, "RSVP updated");
        Ok(attendee)
    }

    /// Remove an attendee from an event.
    ///
    /// Only the event's creator may remove attendees.
    pub async fn delete(&self, key: AttendeeKey, requesting_user: Uuid) -> CoreResult<()> {
        // 1. The event must exist; its creator gates the removal.
        let event = self.events.get_by_id(key.event_id).await?;

        if requesting_user != event.created_by {
            warn!(
                %key,
                requesting_user = %requesting_user,
                created_by = %event.created_by,
                "Attendee removal denied"
            );
            return Err(CoreError::forbidden(format!(
                "only the creator of event {} may remove attendees",
                key.event_id
            )));
        }

        // 2. The pair must actually be invited.
        self.attendees.get(key).await?;
        self.attendees.delete(key).await?;

        info!(%key, "Attendee removed");
        Ok(())
    }

    // -- Read operations; never create records as a side effect. ----------

    pub async fn get(&self, key: AttendeeKey) -> CoreResult<Attendee> {
        self.attendees.get(key).await
    }

    pub async fn exists(&self, key: AttendeeKey) -> CoreResult<bool> {
        self.attendees.exists(key).await
    }

    pub async fn list_by_event(&self, event_id: Uuid) -> CoreResult<Vec<Attendee>> {
        self.attendees.list_by_event(event_id).await
    }

    pub async fn count_by_event(&self, event_id: Uuid) -> CoreResult<u64> {
        self.attendees.count_by_event(event_id).await
    }

    pub async fn count_by_event_and_rsvp(
        &self,
        event_id: Uuid,
        rsvp: RsvpStatus,
    ) -> CoreResult<u64> {
        self.attendees.count_by_event_and_rsvp(event_id, rsvp).await
    }
}
