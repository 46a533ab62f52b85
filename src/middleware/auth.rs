use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use uuid::Uuid;

use workhub_auth::{Claims, verify_token};
use workhub_core::{AccessLevel, AppError, ModuleId};
use workhub_models::User;

use crate::metrics::track_authorization_check;
use crate::modules::access::model::EffectiveAccess;
use crate::modules::access::service::AccessService;
use crate::state::AppState;

/// Extractor that validates the bearer JWT and provides its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.0
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn email(&self) -> &str {
        &self.0.email
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))?;

        let claims = verify_token(token, &state.jwt_config)?;

        Ok(AuthUser(claims))
    }
}

/// The authenticated user loaded from the store, with its access resolved.
///
/// Access is resolved on every request, so role and matrix edits apply
/// without reissuing tokens.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub access: EffectiveAccess,
}

impl CurrentUser {
    /// Fails with `403` unless the user has at least `required` on `module`.
    pub fn require(&self, module: ModuleId, required: AccessLevel) -> Result<(), AppError> {
        let allowed = self.access.allows(module, required);
        track_authorization_check(module.as_str(), allowed);

        if !allowed {
            return Err(AppError::forbidden(format!(
                "Access denied. Requires {} access to {}",
                required, module
            )));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_user = AuthUser::from_request_parts(parts, state).await?;

        let user = state
            .store
            .get_user(auth_user.user_id()?)
            .await?
            .ok_or_else(|| AppError::unauthorized("Unknown user"))?;

        let access = AccessService::resolve_user_access(state.store.as_ref(), &user).await?;

        Ok(CurrentUser { user, access })
    }
}

/// Creates an extractor that admits only users with at least the given level
/// on one module.
#[macro_export]
macro_rules! require_access {
    ($name:ident, $module:expr, $level:expr) => {
        #[derive(Debug, Clone)]
        pub struct $name(pub $crate::middleware::auth::CurrentUser);

        impl axum::extract::FromRequestParts<$crate::state::AppState> for $name {
            type Rejection = $crate::workhub_core::AppError;

            async fn from_request_parts(
                parts: &mut axum::http::request::Parts,
                state: &$crate::state::AppState,
            ) -> Result<Self, Self::Rejection> {
                let current = <$crate::middleware::auth::CurrentUser as axum::extract::FromRequestParts<
                    $crate::state::AppState,
                >>::from_request_parts(parts, state)
                .await?;
                current.require($module, $level)?;
                Ok($name(current))
            }
        }
    };
}

// Roles module
require_access!(RequireRolesView, ModuleId::Roles, AccessLevel::View);
require_access!(RequireRolesAdmin, ModuleId::Roles, AccessLevel::Admin);

// Users module
require_access!(RequireUsersView, ModuleId::Users, AccessLevel::View);
require_access!(RequireUsersAdmin, ModuleId::Users, AccessLevel::Admin);
