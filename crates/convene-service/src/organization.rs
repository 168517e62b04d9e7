//! Organization service — organization lifecycle, atomically bound to
//! the creator's membership.

use convene_core::error::{CoreError, CoreResult};
use convene_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use convene_core::repository::{
    OrganizationRepository, PaginatedResult, Pagination, UserRepository,
};
use convene_core::validate::require_non_blank;
use tracing::{info, warn};
use uuid::Uuid;

/// Organization consistency service.
///
/// Creating an organization also creates an `Active` membership for
/// its creator; the repository executes both writes in one store
/// transaction, so a failure in either leaves nothing behind.
pub struct OrganizationService<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    organizations: O,
    users: U,
}

impl<O, U> OrganizationService<O, U>
where
    O: OrganizationRepository,
    U: UserRepository,
{
    pub fn new(organizations: O, users: U) -> Self {
        Self {
            organizations,
            users,
        }
    }

    /// Create an organization named `name`, owned by `created_by`.
    ///
    /// The creator must reference an existing user, and the name must
    /// be free (case-sensitive exact match). On success the creator
    /// holds an `Active` membership in the new organization.
    pub async fn create(&self, name: &str, created_by: Uuid) -> CoreResult<Organization> {
        // 1. Validate inputs.
        let name = require_non_blank("name", name)?;

        // 2. The creator must exist before the organization does.
        if !self.users.exists(created_by).await? {
            warn!(user_id = %created_by, "Organization creator does not exist");
            return Err(CoreError::invalid_argument(format!(
                "createdBy {created_by} does not reference an existing user"
            )));
        }

        // 3. Optimistic name-uniqueness check; the unique index on
        //    organization.name is the backstop for concurrent creates.
        match self.organizations.get_by_name(name).await {
            Ok(_) => {
                warn!(name, "Organization name already taken");
                return Err(CoreError::already_exists("organization", name));
            }
            Err(CoreError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // 4. Persist organization + creator membership atomically.
        let (organization, membership) = self
            .organizations
            .create(CreateOrganization {
                name: name.to_string(),
                created_by,
            })
            .await?;

        info!(
            org_id = %organization.id,
            name = %organization.name,
            owner_status = ?membership.status,
            "Organization created"
        );
        Ok(organization)
    }

    /// Replace an organization's name and creator.
    ///
    /// Fails with `NotFound` if the id is absent and `AlreadyExists`
    /// if a *different* organization already holds the requested name.
    pub async fn update(
        &self,
        id: Uuid,
        name: &str,
        created_by: Uuid,
    ) -> CoreResult<Organization> {
        let name = require_non_blank("name", name)?;

        // 1. The organization must exist.
        self.organizations.get_by_id(id).await?;

        // 2. The requested name must not belong to another org.
        match self.organizations.get_by_name(name).await {
            Ok(other) if other.id != id => {
                warn!(name, other_id = %other.id, "Organization name already taken");
                return Err(CoreError::already_exists("organization", name));
            }
            Ok(_) => {}
            Err(CoreError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // 3. Replace both fields in place.
        let organization = self
            .organizations
            .update(
                id,
                UpdateOrganization {
                    name: name.to_string(),
                    created_by,
                },
            )
            .await?;

        info!(org_id = %id, name = %organization.name, "Organization updated");
        Ok(organization)
    }

    /// Delete an organization by id. Fails with `NotFound` if absent.
    ///
    /// Nothing cascades: memberships and events referencing the
    /// organization are left in place.
    pub async fn delete(&self, id: Uuid) -> CoreResult<()> {
        self.organizations.get_by_id(id).await?;
        self.organizations.delete(id).await?;
        info!(org_id = %id, "Organization deleted");
        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<Organization> {
        self.organizations.get_by_id(id).await
    }

    pub async fn list(
        &self,
        pagination: Pagination,
    ) -> CoreResult<PaginatedResult<Organization>> {
        self.organizations.list(pagination).await
    }
}
