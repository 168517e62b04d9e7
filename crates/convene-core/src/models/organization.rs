//! Organization domain model.
//!
//! Organizations are the grouping entity for memberships and events.
//! Creating one also creates an active membership for the creator in
//! the same store transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An organization that users join and events belong to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Unique across the platform, case-sensitive exact match.
    pub name: String,
    /// The user who created the organization. Must reference an
    /// existing user at creation time.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub created_by: Uuid,
}

/// Replacement fields for an existing organization.
///
/// Updates replace both fields in place; partial updates are not part
/// of the contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateOrganization {
    pub name: String,
    pub created_by: Uuid,
}
