//! Startup seeding of the first administrator account.

use fitout_core::validation::validate_email;
use fitout_db::models::admin_user::CreateAdminUser;
use fitout_db::repositories::AdminUserRepo;
use fitout_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_ADMIN_PASSWORD_LENGTH};
use crate::config::AdminBootstrap;
use crate::error::{AppError, AppResult};

/// Create the bootstrap admin when the `admin_users` table is empty.
///
/// Returns `true` if an account was created.
pub async fn ensure_admin(pool: &DbPool, bootstrap: &AdminBootstrap) -> AppResult<bool> {
    if AdminUserRepo::count(pool).await? > 0 {
        return Ok(false);
    }

    validate_email(&bootstrap.email)?;
    validate_password_strength(&bootstrap.password, MIN_ADMIN_PASSWORD_LENGTH)
        .map_err(AppError::BadRequest)?;

    let password_hash = hash_password(&bootstrap.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing failed: {e}")))?;

    let admin = AdminUserRepo::create(
        pool,
        &CreateAdminUser {
            email: bootstrap.email.trim().to_lowercase(),
            name: "Administrator".to_string(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(admin_id = admin.id, email = %admin.email, "Bootstrap admin created");
    Ok(true)
}
