//! # Workhub Core
//!
//! Core types, errors, and utilities for the Workhub access service.
//!
//! - [`access`]: Access levels, the static module table, and the level comparison
//! - [`errors`]: Application error type with HTTP response conversion
//! - [`pagination`]: Pagination utilities for API responses
//! - [`serde`]: Query-string deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use workhub_core::access::{AccessLevel, has_access};
//! use workhub_core::errors::AppError;
//!
//! assert!(has_access(AccessLevel::Admin, AccessLevel::Edit));
//!
//! let error = AppError::not_found(anyhow::anyhow!("Role not found"));
//! ```

pub mod access;
pub mod errors;
pub mod pagination;
pub mod serde;

// Re-export commonly used types at crate root
pub use access::{AccessLevel, ModuleAccess, ModuleId, ModuleInfo, has_access};
pub use errors::AppError;
pub use pagination::{PaginationMeta, PaginationParams};
