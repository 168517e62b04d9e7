//! SurrealDB implementation of [`OrganizationRepository`].
//!
//! Organization creation and the creator's membership are written in a
//! single SurrealQL transaction: a failure in either statement cancels
//! both writes.

use chrono::{DateTime, Utc};
use convene_core::error::CoreResult;
use convene_core::models::membership::Membership;
use convene_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use convene_core::repository::{OrganizationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::membership::MembershipRow;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    created_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid creator UUID: {e}")))?;
        Ok(Organization {
            id,
            name: self.name,
            created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Migration(format!("invalid UUID: {e}")))?;
        let created_by = Uuid::parse_str(&self.created_by)
            .map_err(|e| DbError::Migration(format!("invalid creator UUID: {e}")))?;
        Ok(Organization {
            id,
            name: self.name,
            created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> CoreResult<(Organization, Membership)> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();
        let name = input.name.clone();

        // Both statements run in one transaction: if the membership
        // write fails, the organization write is cancelled with it.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('organization', $id) SET \
                 name = $name, created_by = $created_by; \
                 CREATE membership SET \
                 organization_id = $id, user_id = $created_by, \
                 status = 'Active'; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "organization", &name))?;

        // In a `BEGIN TRANSACTION; ...; COMMIT TRANSACTION;` query the
        // driver numbers the `BEGIN` as statement 0, so the two CREATE
        // results land at indices 1 and 2.
        let org_rows: Vec<OrganizationRow> = result.take(1).map_err(DbError::from)?;
        let org_row = org_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "organization".into(),
                key: id_str.clone(),
            })?;

        let member_rows: Vec<MembershipRow> = result.take(2).map_err(DbError::from)?;
        let member_row = member_rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::NotFound {
                entity: "membership".into(),
                key: id_str,
            })?;

        Ok((
            org_row.into_organization(id)?,
            member_row.try_into_membership()?,
        ))
    }

    async fn get_by_id(&self, id: Uuid) -> CoreResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            key: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn get_by_name(&self, name: &str) -> CoreResult<Organization> {
        let name_owned = name.to_string();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM organization WHERE name = $name",
            )
            .bind(("name", name_owned))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            key: format!("name={name}"),
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> CoreResult<Organization> {
        let id_str = id.to_string();
        let name = input.name.clone();

        let result = self
            .db
            .query(
                "UPDATE type::record('organization', $id) SET \
                 name = $name, created_by = $created_by, \
                 updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("created_by", input.created_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "organization", &name))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            key: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn delete(&self, id: Uuid) -> CoreResult<()> {
        self.db
            .query("DELETE type::record('organization', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> CoreResult<PaginatedResult<Organization>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM organization GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * \
                 FROM organization \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
