//! # Workhub Auth
//!
//! Bearer token claims and JWT utilities.
//!
//! Tokens are issued by the identity provider (or by `workhub-cli issue-token`)
//! and only identify the caller. Roles and module access are never embedded in
//! the token; they are resolved from the role store on every request so that a
//! matrix edit takes effect immediately.
//!
//! # Example
//!
//! ```ignore
//! use workhub_auth::{create_access_token, verify_token};
//! use workhub_config::JwtConfig;
//!
//! let config = JwtConfig::from_env();
//! let token = create_access_token(user_id, "ada@example.com", &config)?;
//! let claims = verify_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::Claims;
pub use jwt::{create_access_token, verify_token};
