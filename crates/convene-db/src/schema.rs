//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Unique indexes back the
//! application-level uniqueness invariants (email, organization name,
//! and the membership/attendee composite key pairs).

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Users
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD email ON TABLE user TYPE string;
DEFINE FIELD display_name ON TABLE user TYPE string;
DEFINE FIELD is_active ON TABLE user TYPE bool DEFAULT true;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_email ON TABLE user COLUMNS email UNIQUE;

-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD created_by ON TABLE organization TYPE string;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_name ON TABLE organization \
    COLUMNS name UNIQUE;

-- =======================================================================
-- Memberships (identity = organization_id + user_id)
-- =======================================================================
DEFINE TABLE membership SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE membership TYPE string;
DEFINE FIELD user_id ON TABLE membership TYPE string;
DEFINE FIELD status ON TABLE membership TYPE string \
    ASSERT $value IN ['Active', 'Invited', 'Suspended'];
DEFINE FIELD created_at ON TABLE membership TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_membership_pair ON TABLE membership \
    COLUMNS organization_id, user_id UNIQUE;
DEFINE INDEX idx_membership_user ON TABLE membership \
    COLUMNS user_id;

-- =======================================================================
-- Events
-- =======================================================================
DEFINE TABLE event SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE event TYPE string;
DEFINE FIELD created_by ON TABLE event TYPE string;
DEFINE FIELD title ON TABLE event TYPE string;
DEFINE FIELD description ON TABLE event TYPE option<string>;
DEFINE FIELD starts_at ON TABLE event TYPE datetime;
DEFINE FIELD ends_at ON TABLE event TYPE datetime;
DEFINE FIELD capacity ON TABLE event TYPE option<int>;
DEFINE FIELD location ON TABLE event TYPE option<string>;
DEFINE FIELD created_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE event TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_event_organization ON TABLE event \
    COLUMNS organization_id;
DEFINE INDEX idx_event_starts_at ON TABLE event COLUMNS starts_at;

-- =======================================================================
-- Attendees (identity = event_id + user_id)
-- =======================================================================
DEFINE TABLE attendee SCHEMAFULL;
DEFINE FIELD event_id ON TABLE attendee TYPE string;
DEFINE FIELD user_id ON TABLE attendee TYPE string;
DEFINE FIELD rsvp ON TABLE attendee TYPE string \
    ASSERT $value IN ['Pending', 'Yes', 'No'];
DEFINE FIELD created_at ON TABLE attendee TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_attendee_pair ON TABLE attendee \
    COLUMNS event_id, user_id UNIQUE;
DEFINE INDEX idx_attendee_event ON TABLE attendee COLUMNS event_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn composite_key_indexes_are_unique() {
        assert!(SCHEMA_V1.contains("ON TABLE membership COLUMNS organization_id, user_id UNIQUE"));
        assert!(SCHEMA_V1.contains("ON TABLE attendee COLUMNS event_id, user_id UNIQUE"));
    }
}
