//! # Workhub Config
//!
//! Configuration structures loaded from environment variables:
//!
//! - [`jwt`]: Bearer token verification and issuing
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`storage`]: Role store backend selection
//! - [`server`]: Listener address
//!
//! # Example
//!
//! ```ignore
//! use workhub_config::{CorsConfig, JwtConfig, ServerConfig, StorageConfig};
//!
//! let jwt_config = JwtConfig::from_env();
//! let storage_config = StorageConfig::from_env();
//! ```

pub mod cors;
pub mod jwt;
pub mod server;
pub mod storage;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use jwt::JwtConfig;
pub use server::ServerConfig;
pub use storage::{StorageBackend, StorageConfig};
