//! Request extractors for authentication and module-level authorization.
//!
//! # Authentication Flow
//!
//! 1. Client sends request with `Authorization: Bearer <token>` header
//! 2. [`auth::AuthUser`] validates the JWT and extracts claims
//! 3. [`auth::CurrentUser`] loads the user and resolves its effective access
//! 4. Access extractors (`RequireRolesView`, `RequireUsersAdmin`, ...) check
//!    the resolved level on one module before the handler runs
//!
//! # Example
//!
//! ```ignore
//! use crate::middleware::auth::{CurrentUser, RequireRolesAdmin};
//!
//! async fn me(current: CurrentUser) -> impl IntoResponse {
//!     Json(current.access)
//! }
//!
//! async fn delete_role(RequireRolesAdmin(current): RequireRolesAdmin) -> impl IntoResponse {
//!     // Only executes with `admin` access on the roles module
//! }
//! ```

pub mod auth;
