//! Role store backend selection.
//!
//! # Environment Variables
//!
//! - `STORAGE_BACKEND`: `postgres` or `memory`. Defaults to `postgres` when
//!   `DATABASE_URL` is set and `memory` otherwise.
//! - `DATABASE_URL`: PostgreSQL connection string (required for `postgres`)
//! - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)

use std::env;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres {
        database_url: String,
        max_connections: u32,
    },
    /// Process-local store; contents are lost on restart.
    Memory,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_values(
            env::var("STORAGE_BACKEND").ok().as_deref(),
            env::var("DATABASE_URL").ok(),
            env::var("DATABASE_MAX_CONNECTIONS").ok().as_deref(),
        )
    }

    pub fn memory() -> Self {
        Self {
            backend: StorageBackend::Memory,
        }
    }

    fn from_values(
        backend: Option<&str>,
        database_url: Option<String>,
        max_connections: Option<&str>,
    ) -> Result<Self, String> {
        let max_connections = max_connections
            .and_then(|v| v.parse().ok())
            .unwrap_or(10);

        let backend = match (backend.map(str::to_lowercase).as_deref(), database_url) {
            (Some("memory"), _) => StorageBackend::Memory,
            (Some("postgres") | None, Some(database_url)) => StorageBackend::Postgres {
                database_url,
                max_connections,
            },
            (Some("postgres"), None) => {
                return Err("STORAGE_BACKEND=postgres requires DATABASE_URL".to_string());
            }
            (None, None) => StorageBackend::Memory,
            (Some(other), _) => return Err(format!("Unknown STORAGE_BACKEND: {}", other)),
        };

        Ok(Self { backend })
    }
}
