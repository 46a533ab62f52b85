use thiserror::Error;
use workhub_core::AppError;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Schema migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

impl StoreError {
    pub fn role_not_found(id: &str) -> Self {
        Self::NotFound(format!("Role not found: {}", id))
    }

    pub fn user_not_found(id: impl std::fmt::Display) -> Self {
        Self::NotFound(format!("User not found: {}", id))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => AppError::not_found(err),
            StoreError::Conflict(_) => AppError::conflict(err),
            StoreError::Database(_) | StoreError::Migrate(_) => AppError::internal(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: AppError = StoreError::role_not_found("mentor").into();
        assert_eq!(err.status.as_u16(), 404);
        assert_eq!(err.message(), "Role not found: mentor");

        let err: AppError = StoreError::Conflict("Email already in use".into()).into();
        assert_eq!(err.status.as_u16(), 409);

        let err: AppError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status.as_u16(), 500);
    }
}
