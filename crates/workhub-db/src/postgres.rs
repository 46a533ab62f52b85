//! PostgreSQL role store.
//!
//! Roles keep their access matrix row in a JSONB column. Users keep the legacy
//! role string and the role reference in two nullable columns; the pair is
//! folded into [`RoleAssignment`] when read.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::{FromRow, Postgres, QueryBuilder};
use tracing::{debug, instrument};
use uuid::Uuid;

use workhub_core::ModuleAccess;
use workhub_models::{LegacyRole, MigrationState, Role, RoleAssignment, User, UserFilterParams};

use crate::error::{StoreError, StoreResult};
use crate::store::{RoleChange, RoleStore, UserKindCounts};

const ROLE_COLUMNS: &str = "id, name, description, is_system, is_default, modules, users_count, created_at, updated_at";
const USER_COLUMNS: &str = "id, email, display_name, legacy_role, role_id, created_at, updated_at";

#[derive(FromRow)]
struct RoleRow {
    id: String,
    name: String,
    description: Option<String>,
    is_system: bool,
    is_default: bool,
    modules: Json<ModuleAccess>,
    users_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Role {
            id: row.id,
            name: row.name,
            description: row.description,
            is_system: row.is_system,
            is_default: row.is_default,
            modules: row.modules.0,
            users_count: row.users_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    legacy_role: Option<String>,
    role_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
            role: RoleAssignment::from_columns(row.role_id, row.legacy_role.as_deref()),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn legacy_values() -> Vec<String> {
    LegacyRole::ALL.iter().map(|r| r.as_str().to_string()).collect()
}

fn push_user_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &UserFilterParams) {
    if let Some(role_id) = &filter.role_id {
        qb.push(" AND role_id = ").push_bind(role_id.clone());
    }
    match filter.legacy {
        Some(true) => {
            qb.push(" AND role_id IS NULL AND lower(trim(legacy_role)) = ANY(")
                .push_bind(legacy_values())
                .push(")");
        }
        Some(false) => {
            qb.push(" AND NOT (role_id IS NULL AND lower(trim(coalesce(legacy_role, ''))) = ANY(")
                .push_bind(legacy_values())
                .push("))");
        }
        None => {}
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects and applies pending schema migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::migrate!().run(&pool).await?;
        debug!("Database schema is up to date");

        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RoleStore for PgStore {
    #[instrument(skip(self))]
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles ORDER BY name, id",
            ROLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    #[instrument(skip(self))]
    async fn get_role(&self, id: &str) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE id = $1",
            ROLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Role::from))
    }

    #[instrument(skip(self))]
    async fn get_default_role(&self) -> StoreResult<Option<Role>> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {} FROM roles WHERE is_default LIMIT 1",
            ROLE_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Role::from))
    }

    #[instrument(skip(self, role), fields(role_id = %role.id))]
    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        if role.is_default {
            sqlx::query("UPDATE roles SET is_default = FALSE, updated_at = NOW() WHERE is_default")
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            r#"INSERT INTO roles (id, name, description, is_system, is_default, modules, users_count, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"#,
        )
        .bind(&role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(role.is_system)
        .bind(role.is_default)
        .bind(Json(&role.modules))
        .bind(role.users_count)
        .bind(role.created_at)
        .bind(role.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return StoreError::Conflict(format!("Role already exists: {}", role.id));
            }
            StoreError::from(e)
        })?;

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self, role), fields(role_id = %role.id))]
    async fn update_role(&self, role: &Role) -> StoreResult<Role> {
        let row = sqlx::query_as::<_, RoleRow>(&format!(
            r#"UPDATE roles
               SET name = $2, description = $3, modules = $4, updated_at = NOW()
               WHERE id = $1
               RETURNING {}"#,
            ROLE_COLUMNS
        ))
        .bind(&role.id)
        .bind(&role.name)
        .bind(&role.description)
        .bind(Json(&role.modules))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Role::from)
            .ok_or_else(|| StoreError::role_not_found(&role.id))
    }

    #[instrument(skip(self))]
    async fn delete_role(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    return StoreError::Conflict(format!(
                        "Role {} is still assigned to users",
                        id
                    ));
                }
                StoreError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(StoreError::role_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_default_role(&self, id: &str) -> StoreResult<()> {
        // A concurrent change of the default trips the partial unique index.
        let default_conflict = |e: sqlx::Error| {
            if is_unique_violation(&e) {
                return StoreError::Conflict(format!(
                    "Default role changed concurrently while setting {}",
                    id
                ));
            }
            StoreError::from(e)
        };

        let mut tx = self.pool.begin().await?;

        // Clear first; the partial unique index allows a single default row.
        sqlx::query(
            "UPDATE roles SET is_default = FALSE, updated_at = NOW() WHERE is_default AND id <> $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(default_conflict)?;

        let result =
            sqlx::query("UPDATE roles SET is_default = TRUE, updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(default_conflict)?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(StoreError::role_not_found(id));
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_users_count(&self, id: &str, count: i64) -> StoreResult<()> {
        let result = sqlx::query("UPDATE roles SET users_count = $2 WHERE id = $1")
            .bind(id)
            .bind(count)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::role_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_users(
        &self,
        filter: &UserFilterParams,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<User>, i64)> {
        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users WHERE TRUE");
        push_user_filter(&mut count_qb, filter);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM users WHERE TRUE",
            USER_COLUMNS
        ));
        push_user_filter(&mut qb, filter);
        qb.push(" ORDER BY email LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb.build_query_as::<UserRow>().fetch_all(&self.pool).await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    #[instrument(skip(self))]
    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self))]
    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE lower(email) = lower($1)",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;

        let role_id = user.role.role_id();
        let legacy_role = user.role.legacy_role().map(|r| r.as_str());

        sqlx::query(
            r#"INSERT INTO users (id, email, display_name, legacy_role, role_id, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(legacy_role)
        .bind(role_id)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return StoreError::Conflict(format!("Email already in use: {}", user.email));
            }
            if is_foreign_key_violation(&e) {
                return StoreError::role_not_found(role_id.unwrap_or_default());
            }
            StoreError::from(e)
        })?;

        if let Some(role_id) = role_id {
            sqlx::query("UPDATE roles SET users_count = users_count + 1 WHERE id = $1")
                .bind(role_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_user_role(&self, user_id: Uuid, role_id: &str) -> StoreResult<RoleChange> {
        let mut tx = self.pool.begin().await?;

        let role_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
                .bind(role_id)
                .fetch_one(&mut *tx)
                .await?;
        if !role_exists {
            return Err(StoreError::role_not_found(role_id));
        }

        let previous: Option<Option<String>> =
            sqlx::query_scalar("SELECT role_id FROM users WHERE id = $1 FOR UPDATE")
                .bind(user_id)
                .fetch_optional(&mut *tx)
                .await?;
        let previous_role_id = previous.ok_or_else(|| StoreError::user_not_found(user_id))?;

        if previous_role_id.as_deref() == Some(role_id) {
            tx.commit().await?;
            return Ok(RoleChange {
                previous_role_id,
                changed: false,
            });
        }

        sqlx::query("UPDATE users SET role_id = $2, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        if let Some(previous) = &previous_role_id {
            sqlx::query(
                "UPDATE roles SET users_count = GREATEST(users_count - 1, 0) WHERE id = $1",
            )
            .bind(previous)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query("UPDATE roles SET users_count = users_count + 1 WHERE id = $1")
            .bind(role_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(RoleChange {
            previous_role_id,
            changed: true,
        })
    }

    #[instrument(skip(self))]
    async fn count_users_with_role(&self, role_id: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role_id = $1")
            .bind(role_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_users_by_kind(&self) -> StoreResult<UserKindCounts> {
        let rows: Vec<(Option<String>, Option<String>)> =
            sqlx::query_as("SELECT role_id, legacy_role FROM users")
                .fetch_all(&self.pool)
                .await?;

        let mut counts = UserKindCounts::default();
        for (role_id, legacy_role) in rows {
            match RoleAssignment::from_columns(role_id, legacy_role.as_deref()) {
                RoleAssignment::Assigned { .. } => counts.assigned += 1,
                RoleAssignment::Legacy { .. } => counts.legacy += 1,
                RoleAssignment::Unassigned => counts.unassigned += 1,
            }
        }
        Ok(counts)
    }

    #[instrument(skip(self))]
    async fn list_unmigrated_users(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role_id IS NULL ORDER BY email",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn migration_state(&self) -> StoreResult<MigrationState> {
        let row: Option<(bool, Option<DateTime<Utc>>)> =
            sqlx::query_as("SELECT completed, completed_at FROM role_migration_state WHERE id")
                .fetch_optional(&self.pool)
                .await?;

        Ok(row
            .map(|(completed, completed_at)| MigrationState {
                completed,
                completed_at,
            })
            .unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn set_migration_state(&self, state: &MigrationState) -> StoreResult<()> {
        sqlx::query(
            r#"INSERT INTO role_migration_state (id, completed, completed_at)
               VALUES (TRUE, $1, $2)
               ON CONFLICT (id) DO UPDATE SET completed = $1, completed_at = $2"#,
        )
        .bind(state.completed)
        .bind(state.completed_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
