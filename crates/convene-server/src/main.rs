//! Convene Server — application entry point.
//!
//! Wires the persistence layer and the consistency services together.
//! The HTTP surface consuming the services is mounted on top of this
//! binary and is deliberately thin: it only maps service errors onto
//! status codes.

use convene_db::{DbConfig, DbManager, run_migrations};
use convene_service::ConflictPolicy;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("convene=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting Convene server...");

    let config = DbConfig::from_env();
    let manager = match DbManager::connect(&config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    // One conflict policy per deployment; scheduling behavior must
    // never mix both in the same instance.
    let policy = match std::env::var("CONVENE_CONFLICT_POLICY").as_deref() {
        Ok("organization-scoped") => ConflictPolicy::OrganizationScoped,
        _ => ConflictPolicy::GlobalOverlap,
    };

    tracing::info!(policy = ?policy, "Convene core ready");

    // TODO: mount the HTTP layer once the routing crate lands.

    tracing::info!("Convene server stopped.");
}
