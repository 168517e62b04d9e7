//! User service — registration and display-name updates.

use convene_core::error::{CoreError, CoreResult};
use convene_core::models::user::{CreateUser, UpdateUser, User};
use convene_core::repository::{PaginatedResult, Pagination, UserRepository};
use convene_core::validate::{require_non_blank, require_valid_email};
use tracing::{info, warn};
use uuid::Uuid;

/// User registration and profile service.
///
/// Users are never hard-deleted; the only mutation after registration
/// is the display name.
pub struct UserService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> UserService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Register a new user.
    pub async fn register(&self, email: &str, display_name: &str) -> CoreResult<User> {
        // 1. Validate inputs.
        let email = require_valid_email(email)?;
        let display_name = require_non_blank("display_name", display_name)?;

        // 2. Optimistic email-uniqueness check; the unique index on
        //    user.email is the backstop.
        match self.users.get_by_email(email).await {
            Ok(_) => {
                warn!(email, "Email already registered");
                return Err(CoreError::already_exists("user", email));
            }
            Err(CoreError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        // 3. Persist.
        let user = self
            .users
            .create(CreateUser {
                email: email.to_string(),
                display_name: display_name.to_string(),
            })
            .await?;

        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Update a user's display name. Fails with `NotFound` if absent.
    pub async fn update_display_name(&self, id: Uuid, display_name: &str) -> CoreResult<User> {
        let display_name = require_non_blank("display_name", display_name)?;

        let user = self
            .users
            .update(
                id,
                UpdateUser {
                    display_name: Some(display_name.to_string()),
                },
            )
            .await?;

        info!(user_id = %id, "Display name updated");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> CoreResult<User> {
        self.users.get_by_id(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> CoreResult<User> {
        self.users.get_by_email(email).await
    }

    pub async fn list(&self, pagination: Pagination) -> CoreResult<PaginatedResult<User>> {
        self.users.list(pagination).await
    }
}
