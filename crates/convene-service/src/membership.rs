//! Membership service — membership lifecycle and status transitions.

use convene_core::error::{CoreError, CoreResult};
use convene_core::models::membership::{
    CreateMembership, Membership, MembershipKey, MembershipStatus,
};
use convene_core::repository::MembershipRepository;
use tracing::{info, warn};
use uuid::Uuid;

/// Membership consistency service.
///
/// Owns the at-most-one-membership-per-pair invariant. The storage
/// layer's unique composite index backstops the existence check here,
/// so two concurrent creates for the same pair yield exactly one
/// success and one `AlreadyExists`.
pub struct MembershipService<M: MembershipRepository> {
    memberships: M,
}

impl<M: MembershipRepository> MembershipService<M> {
    pub fn new(memberships: M) -> Self {
        Self { memberships }
    }

    /// Create a membership for `(organization_id, user_id)`.
    ///
    /// The status defaults to [`MembershipStatus::Active`]; any
    /// supplied status is persisted verbatim, including `Invited` and
    /// `Suspended`.
    pub async fn create(
        &self,
        organization_id: Uuid,
        user_id: Uuid,
        status: Option<MembershipStatus>,
    ) -> CoreResult<Membership> {
        let key = MembershipKey::new(organization_id, user_id);

        // 1. Reject a duplicate pair up front for a friendly error;
        //    the unique index catches whatever races past this check.
        if self.memberships.exists(key).await? {
            warn!(%key, "Membership already exists");
            return Err(CoreError::already_exists("membership", key));
        }

        // 2. Persist with the defaulted status.
        let membership = self
            .memberships
            .create(CreateMembership {
                organization_id,
                user_id,
                status,
            })
            .await?;

        info!(%key, status = ?membership.status, "Membership created");
        Ok(membership)
    }

    /// Overwrite the status of an existing membership.
    ///
    /// No transition graph is enforced: any status may follow any
    /// other. Fails with `NotFound` if the pair has no membership.
    pub async fn update_status(
        &self,
        key: MembershipKey,
        status: MembershipStatus,
    ) -> CoreResult<Membership> {
        let membership = self.memberships.update_status(key, status).await?;
        info!(%key, status = ?status, "Membership status updated");
        Ok(membership)
    }

    /// Externally-requested status change.
    ///
    /// `Invited` is an initial-only status: it may be supplied at
    /// creation but is never a valid target of an update request.
    pub async fn request_status_change(
        &self,
        key: MembershipKey,
        status: MembershipStatus,
    ) -> CoreResult<Membership> {
        if status == MembershipStatus::Invited {
            warn!(%key, "Rejected status change to Invited");
            return Err(CoreError::invalid_argument(
                "membership status cannot be changed back to Invited",
            ));
        }
        self.update_status(key, status).await
    }

    /// Remove a membership. Fails with `NotFound` if absent.
    pub async fn delete(&self, key: MembershipKey) -> CoreResult<()> {
        self.memberships.get(key).await?;
        self.memberships.delete(key).await?;
        info!(%key, "Membership deleted");
        Ok(())
    }

    // -- Read operations; never create records as a side effect. ----------

    pub async fn get(&self, key: MembershipKey) -> CoreResult<Membership> {
        self.memberships.get(key).await
    }

    pub async fn exists(&self, key: MembershipKey) -> CoreResult<bool> {
        self.memberships.exists(key).await
    }

    pub async fn list_by_organization(
        &self,
        organization_id: Uuid,
    ) -> CoreResult<Vec<Membership>> {
        self.memberships.list_by_organization(organization_id).await
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> CoreResult<Vec<Membership>> {
        self.memberships.list_by_user(user_id).await
    }

    pub async fn list_by_status(
        &self,
        organization_id: Uuid,
        status: MembershipStatus,
    ) -> CoreResult<Vec<Membership>> {
        self.memberships
            .list_by_status(organization_id, status)
            .await
    }

    pub async fn count_active(&self, organization_id: Uuid) -> CoreResult<u64> {
        self.memberships.count_active(organization_id).await
    }

    pub async fn count_for_user(&self, user_id: Uuid) -> CoreResult<u64> {
        self.memberships.count_for_user(user_id).await
    }
}
