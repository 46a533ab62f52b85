//! # Workhub DB
//!
//! Persistence for roles, users and the role migration flag.
//!
//! - [`store`]: The [`RoleStore`] trait every backend implements
//! - [`postgres`]: PostgreSQL backend with embedded schema migrations
//! - [`memory`]: In-process backend for tests and demo deployments
//! - [`seed`]: Built-in system role definitions
//!
//! # Example
//!
//! ```ignore
//! use workhub_config::StorageConfig;
//! use workhub_db::init_store;
//!
//! let store = init_store(&StorageConfig::from_env()?).await?;
//! let roles = store.list_roles().await?;
//! ```

pub mod error;
pub mod memory;
pub mod postgres;
pub mod seed;
pub mod store;

use std::sync::Arc;

use tracing::info;
use workhub_config::{StorageBackend, StorageConfig};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use seed::system_role_definitions;
pub use store::{RoleChange, RoleStore, UserKindCounts};

/// Shared handle to the configured backend.
pub type DynRoleStore = Arc<dyn RoleStore>;

/// Builds the backend selected by `config`.
///
/// For PostgreSQL this connects and brings the schema up to date before
/// returning.
pub async fn init_store(config: &StorageConfig) -> StoreResult<DynRoleStore> {
    match &config.backend {
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let store = PgStore::connect(database_url, *max_connections).await?;
            info!(max_connections, "Connected to PostgreSQL role store");
            Ok(Arc::new(store))
        }
        StorageBackend::Memory => {
            info!("Using in-memory role store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}
