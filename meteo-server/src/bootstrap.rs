//! Idempotent startup seeding.
//!
//! Runs once during process initialization, guarded by existence checks, so
//! repeated restarts leave the database unchanged.

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::auth::{self, Role};
use crate::config::AdminConfig;
use crate::store::{self, UserRecord};

/// Ensure the configured administrator account exists and holds the
/// Administrator role. Credentials are validated at config load time.
pub async fn ensure_admin(pool: &SqlitePool, admin: &AdminConfig) -> Result<()> {
    let existing = store::find_user_by_email(pool, &admin.email)
        .await
        .context("Failed to look up the admin account")?;

    match existing {
        Some(user) => {
            // Present but possibly missing the role; the grant is a no-op
            // when it already holds it.
            store::grant_role(pool, &user.id, Role::Administrator)
                .await
                .context("Failed to grant the Administrator role")?;
        }
        None => {
            let user = UserRecord {
                id: Uuid::new_v4().to_string(),
                email: admin.email.clone(),
                password_hash: auth::hash_password(&admin.password)?,
                first_name: "Admin".to_owned(),
                last_name: String::new(),
            };
            store::insert_user(pool, &user)
                .await
                .context("Failed to create the admin account")?;
            store::grant_role(pool, &user.id, Role::Administrator)
                .await
                .context("Failed to grant the Administrator role")?;
            info!(email = %admin.email, "seeded administrator account");
        }
    }

    Ok(())
}
