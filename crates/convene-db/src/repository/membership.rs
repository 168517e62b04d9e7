//! SurrealDB implementation of [`MembershipRepository`].
//!
//! Memberships have no surrogate id: every query addresses the record
//! by the `(organization_id, user_id)` pair, and the unique composite
//! index `idx_membership_pair` enforces at-most-one per pair.

use chrono::{DateTime, Utc};
use convene_core::error::CoreResult;
use convene_core::models::membership::{
    CreateMembership, Membership, MembershipKey, MembershipStatus,
};
use convene_core::repository::MembershipRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use crate::error::DbError;

/// DB-side row struct for membership records.
#[derive(Debug, SurrealValue)]
pub(crate) struct MembershipRow {
    pub(crate) organization_id: String,
    pub(crate) user_id: String,
    pub(crate) status: String,
    pub(crate) created_at: DateTime<Utc>,
}

pub(crate) fn parse_status(s: &str) -> Result<MembershipStatus, DbError> {
    match s {
        "Active" => Ok(MembershipStatus::Active),
        "Invited" => Ok(MembershipStatus::Invited),
        "Suspended" => Ok(MembershipStatus::Suspended),
        other => Err(DbError::Migration(format!(
            "unknown membership status: {other}"
        ))),
    }
}

pub(crate) fn status_to_string(s: MembershipStatus) -> &'static str {
    match s {
        MembershipStatus::Active => "Active",
        MembershipStatus::Invited => "Invited",
        MembershipStatus::Suspended => "Suspended",
    }
}

impl MembershipRow {
    pub(crate) fn try_into_membership(self) -> Result<Membership, DbError> {
        let organization_id = Uuid::parse_str(&self.organization_id)
            .map_err(|e| DbError::Migration(format!("invalid organization UUID: {e}")))?;
        let user_id = Uuid::parse_str(&self.user_id)
            .map_err(|e| DbError::Migration(format!("invalid user UUID: {e}")))?;
        Ok(Membership {
            organization_id,
            user_id,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Membership repository.
#[derive(Clone)]
pub struct SurrealMembershipRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealMembershipRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn take_rows(
        &self,
        query: &str,
        binds: Vec<(&'static str, String)>,
    ) -> Result<Vec<Membership>, DbError> {
        let mut builder = self.db.query(query);
        for (name, value) in binds {
            builder = builder.bind((name, value));
        }
        let mut result = builder.await?;
        let rows: Vec<MembershipRow> = result.take(0)?;
        rows.into_iter()
            .map(MembershipRow::try_into_membership)
            .collect()
    }
}

impl<C: Connection> MembershipRepository for SurrealMembershipRepository<C> {
    async fn create(&self, input: CreateMembership) -> CoreResult<Membership> {
        let key = MembershipKey::new(input.organization_id, input.user_id);
        let status = input.status.unwrap_or(MembershipStatus::Active);

        let result = self
            .db
            .query(
                "CREATE membership SET \
                 organization_id = $organization_id, \
                 user_id = $user_id, status = $status",
            )
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("user_id", input.user_id.to_string()))
            .bind(("status", status_to_string(status)))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::on_write(e, "membership", key))?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            key: key.to_string(),
        })?;

        Ok(row.try_into_membership()?)
    }

    async fn get(&self, key: MembershipKey) -> CoreResult<Membership> {
        let mut result = self
            .db
            .query(
                "SELECT * FROM membership \
                 WHERE organization_id = $organization_id \
                 AND user_id = $user_id",
            )
            .bind(("organization_id", key.organization_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            key: key.to_string(),
        })?;

        Ok(row.try_into_membership()?)
    }

    async fn exists(&self, key: MembershipKey) -> CoreResult<bool> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
                 WHERE organization_id = $organization_id \
                 AND user_id = $user_id \
                 GROUP ALL",
            )
            .bind(("organization_id", key.organization_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0) > 0)
    }

    async fn update_status(
        &self,
        key: MembershipKey,
        status: MembershipStatus,
    ) -> CoreResult<Membership> {
        let mut result = self
            .db
            .query(
                "UPDATE membership SET status = $status \
                 WHERE organization_id = $organization_id \
                 AND user_id = $user_id",
            )
            .bind(("status", status_to_string(status)))
            .bind(("organization_id", key.organization_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<MembershipRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "membership".into(),
            key: key.to_string(),
        })?;

        Ok(row.try_into_membership()?)
    }

    async fn delete(&self, key: MembershipKey) -> CoreResult<()> {
        self.db
            .query(
                "DELETE FROM membership \
                 WHERE organization_id = $organization_id \
                 AND user_id = $user_id",
            )
            .bind(("organization_id", key.organization_id.to_string()))
            .bind(("user_id", key.user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        Ok(())
    }

    async fn list_by_organization(&self, organization_id: Uuid) -> CoreResult<Vec<Membership>> {
        Ok(self
            .take_rows(
                "SELECT * FROM membership \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
                vec![("organization_id", organization_id.to_string())],
            )
            .await?)
    }

    async fn list_by_user(&self, user_id: Uuid) -> CoreResult<Vec<Membership>> {
        Ok(self
            .take_rows(
                "SELECT * FROM membership WHERE user_id = $user_id \
                 ORDER BY created_at ASC",
                vec![("user_id", user_id.to_string())],
            )
            .await?)
    }

    async fn list_by_status(
        &self,
        organization_id: Uuid,
        status: MembershipStatus,
    ) -> CoreResult<Vec<Membership>> {
        Ok(self
            .take_rows(
                "SELECT * FROM membership \
                 WHERE organization_id = $organization_id \
                 AND status = $status \
                 ORDER BY created_at ASC",
                vec![
                    ("organization_id", organization_id.to_string()),
                    ("status", status_to_string(status).to_string()),
                ],
            )
            .await?)
    }

    async fn count_active(&self, organization_id: Uuid) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
                 WHERE organization_id = $organization_id \
                 AND status = 'Active' \
                 GROUP ALL",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn count_for_user(&self, user_id: Uuid) -> CoreResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM membership \
                 WHERE user_id = $user_id \
                 GROUP ALL",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
