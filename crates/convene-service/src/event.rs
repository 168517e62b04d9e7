//! Event scheduling service — time-range validation, conflict
//! detection, and creator-gated deletion.

use chrono::{DateTime, Utc};
use convene_core::error::{CoreError, CoreResult};
use convene_core::models::event::{CreateEvent, Event, UpdateEvent};
use convene_core::repository::{EventRepository, OrganizationRepository};
use convene_core::validate::require_non_blank;
use tracing::{info, warn};
use uuid::Uuid;

/// Conflict policy applied at event creation and update.
///
/// Exactly one policy is chosen per deployment at service
/// construction; the two are never mixed in one instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Reject any event whose half-open `[starts_at, ends_at)`
    /// interval intersects an existing event's interval.
    GlobalOverlap,
    /// No overlap rejection; instead require the event's
    /// organization to exist.
    OrganizationScoped,
}

/// Event scheduling service.
pub struct EventService<E, O>
where
    E: EventRepository,
    O: OrganizationRepository,
{
    events: E,
    organizations: O,
    policy: ConflictPolicy,
}

impl<E, O> EventService<E, O>
where
    E: EventRepository,
    O: OrganizationRepository,
{
    pub fn new(events: E, organizations: O, policy: ConflictPolicy) -> Self {
        Self {
            events,
            organizations,
            policy,
        }
    }

    pub fn policy(&self) -> ConflictPolicy {
        self.policy
    }

    /// Schedule a new event.
    pub async fn create(&self, input: CreateEvent) -> CoreResult<Event> {
        // 1. Field validation.
        let title = require_non_blank("title", &input.title)?.to_string();
        check_time_range(input.starts_at, input.ends_at)?;

        // 2. Policy check.
        self.check_policy(input.organization_id, input.starts_at, input.ends_at, None)
            .await?;

        // 3. Persist.
        let event = self.events.create(CreateEvent { title, ..input }).await?;

        info!(
            event_id = %event.id,
            org_id = %event.organization_id,
            starts_at = %event.starts_at,
            ends_at = %event.ends_at,
            "Event created"
        );
        Ok(event)
    }

    /// Replace an event's mutable fields, re-running the same
    /// validation as creation against the new data. The event's id and
    /// creation timestamp are preserved; its own interval is excluded
    /// from the overlap check.
    pub async fn update(&self, id: Uuid, input: UpdateEvent) -> CoreResult<Event> {
        // 1. The event must exist.
        self.events.get_by_id(id).await?;

        // 2. Same validation as create.
        let title = require_non_blank("title", &input.title)?.to_string();
        check_time_range(input.starts_at, input.ends_at)?;
        self.check_policy(
            input.organization_id,
            input.starts_at,
            input.ends_at,
            Some(id),
        )
        .await?;

        // 3. Replace.
        let event = self.events.update(id, UpdateEvent { title, ..input }).await?;
        info!(event_id = %id, "Event updated");
        Ok(event)
    }

    /// Delete an event. Only its creator may do so.
    pub async fn delete(&self, id: Uuid, requesting_user: Uuid) -> CoreResult<()> {
        let event = self.events.get_by_id(id).await?;

        if requesting_user != event.created_by {
            warn!(
                event_id = %id,
                requesting_user = %requesting_user,
                created_by = %event.created_by,
                "Event delete denied"
            );
            return Err(CoreError::forbidden(format!(
                "only the creator of event {id} may delete it"
            )));
        }

        self.events.delete(id).await?;
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// All events whose interval intersects `[start, end)`.
    ///
    /// The same query backs the internal conflict check under
    /// [`ConflictPolicy::GlobalOverlap`].
    pub async fn find_conflicting(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> CoreResult<Vec<Event>> {
        check_time_range(start, end)?;
        self.events.find_overlapping(start, end, None).await
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Event> {
        self.events.get_by_id(id).await
    }

    pub async fn list_by_organization(&self, organization_id: Uuid) -> CoreResult<Vec<Event>> {
        self.events.list_by_organization(organization_id).await
    }

    async fn check_policy(
        &self,
        organization_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude: Option<Uuid>,
    ) -> CoreResult<()> {
        match self.policy {
            ConflictPolicy::GlobalOverlap => {
                let conflicts = self
                    .events
                    .find_overlapping(starts_at, ends_at, exclude)
                    .await?;
                if let Some(conflict) = conflicts.first() {
                    warn!(
                        conflicting_event = %conflict.id,
                        starts_at = %starts_at,
                        ends_at = %ends_at,
                        "Scheduling conflict"
                    );
                    return Err(CoreError::conflict(format!(
                        "requested interval [{starts_at}, {ends_at}) overlaps event {} \
                         ('{}', [{}, {}))",
                        conflict.id, conflict.title, conflict.starts_at, conflict.ends_at
                    )));
                }
                Ok(())
            }
            ConflictPolicy::OrganizationScoped => {
                match self.organizations.get_by_id(organization_id).await {
                    Ok(_) => Ok(()),
                    Err(CoreError::NotFound { .. }) => {
                        warn!(org_id = %organization_id, "Event organization does not exist");
                        Err(CoreError::invalid_argument(format!(
                            "organization {organization_id} does not reference an \
                             existing organization"
                        )))
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

/// A valid event interval starts strictly before it ends.
fn check_time_range(starts_at: DateTime<Utc>, ends_at: DateTime<Utc>) -> CoreResult<()> {
    if starts_at >= ends_at {
        return Err(CoreError::invalid_argument(format!(
            "starts_at {starts_at} must be strictly before ends_at {ends_at}"
        )));
    }
    Ok(())
}
