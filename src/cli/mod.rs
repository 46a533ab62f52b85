//! Operations behind the `workhub-cli` binary.

pub mod seeder;

use anyhow::anyhow;

use workhub_auth::create_access_token;
use workhub_config::JwtConfig;
use workhub_core::AppError;
use workhub_db::RoleStore;
use workhub_models::{CreateUserDto, User, system_roles};

use crate::metrics::track_jwt_issued;
use crate::modules::migration::service::MigrationService;
use crate::modules::users::service::UserService;

/// Creates a user on the built-in `admin` role, seeding system roles first if
/// needed.
pub async fn create_admin(
    store: &dyn RoleStore,
    email: &str,
    display_name: &str,
) -> Result<User, AppError> {
    MigrationService::seed_system_roles(store).await?;

    UserService::create_user(
        store,
        CreateUserDto {
            email: email.to_string(),
            display_name: display_name.to_string(),
            role_id: Some(system_roles::ADMIN.to_string()),
        },
    )
    .await
}

/// Issues an access token for an existing user, looked up by email.
pub async fn issue_token(
    store: &dyn RoleStore,
    jwt_config: &JwtConfig,
    email: &str,
) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let user = store
        .get_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::not_found(anyhow!("No user with email {}", email)))?;

    let token = create_access_token(user.id, &user.email, jwt_config)?;
    track_jwt_issued();
    Ok(token)
}
