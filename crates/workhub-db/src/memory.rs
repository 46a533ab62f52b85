//! In-process role store.
//!
//! Backs tests and single-node demo deployments. Every operation takes the
//! single lock, so multi-record writes are atomic with respect to each other.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use workhub_models::{MigrationState, Role, User, UserFilterParams};

use crate::error::{StoreError, StoreResult};
use crate::store::{RoleChange, RoleStore, UserKindCounts};

#[derive(Default)]
struct Inner {
    roles: HashMap<String, Role>,
    users: HashMap<Uuid, User>,
    migration: MigrationState,
}

impl Inner {
    fn live_count(&self, role_id: &str) -> i64 {
        self.users
            .values()
            .filter(|user| user.role.role_id() == Some(role_id))
            .count() as i64
    }

    fn adjust_count(&mut self, role_id: &str, delta: i64) {
        if let Some(role) = self.roles.get_mut(role_id) {
            role.users_count = (role.users_count + delta).max(0);
        }
    }

    fn users_by_email(&self) -> Vec<&User> {
        let mut users: Vec<&User> = self.users.values().collect();
        users.sort_by(|a, b| a.email.cmp(&b.email));
        users
    }
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoleStore for MemoryStore {
    async fn list_roles(&self) -> StoreResult<Vec<Role>> {
        let inner = self.inner.read().await;
        let mut roles: Vec<Role> = inner.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        Ok(roles)
    }

    async fn get_role(&self, id: &str) -> StoreResult<Option<Role>> {
        Ok(self.inner.read().await.roles.get(id).cloned())
    }

    async fn get_default_role(&self) -> StoreResult<Option<Role>> {
        let inner = self.inner.read().await;
        Ok(inner.roles.values().find(|role| role.is_default).cloned())
    }

    async fn insert_role(&self, role: &Role) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner.roles.contains_key(&role.id) {
            return Err(StoreError::Conflict(format!(
                "Role already exists: {}",
                role.id
            )));
        }
        if role.is_default {
            for existing in inner.roles.values_mut() {
                existing.is_default = false;
            }
        }
        inner.roles.insert(role.id.clone(), role.clone());
        Ok(())
    }

    async fn update_role(&self, role: &Role) -> StoreResult<Role> {
        let mut inner = self.inner.write().await;
        let stored = inner
            .roles
            .get_mut(&role.id)
            .ok_or_else(|| StoreError::role_not_found(&role.id))?;

        stored.name = role.name.clone();
        stored.description = role.description.clone();
        stored.modules = role.modules.clone();
        stored.updated_at = Utc::now();

        Ok(stored.clone())
    }

    async fn delete_role(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.roles.contains_key(id) {
            return Err(StoreError::role_not_found(id));
        }
        if inner.live_count(id) > 0 {
            return Err(StoreError::Conflict(format!(
                "Role {} is still assigned to users",
                id
            )));
        }
        inner.roles.remove(id);
        Ok(())
    }

    async fn set_default_role(&self, id: &str) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if !inner.roles.contains_key(id) {
            return Err(StoreError::role_not_found(id));
        }
        let now = Utc::now();
        for role in inner.roles.values_mut() {
            let is_default = role.id == id;
            if role.is_default != is_default {
                role.is_default = is_default;
                role.updated_at = now;
            }
        }
        Ok(())
    }

    async fn set_users_count(&self, id: &str, count: i64) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        let role = inner
            .roles
            .get_mut(id)
            .ok_or_else(|| StoreError::role_not_found(id))?;
        role.users_count = count;
        Ok(())
    }

    async fn list_users(
        &self,
        filter: &UserFilterParams,
        limit: i64,
        offset: i64,
    ) -> StoreResult<(Vec<User>, i64)> {
        let inner = self.inner.read().await;
        let matching: Vec<&User> = inner
            .users_by_email()
            .into_iter()
            .filter(|user| filter.matches(user))
            .collect();

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get_user(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn insert_user(&self, user: &User) -> StoreResult<()> {
        let mut inner = self.inner.write().await;
        if inner
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(StoreError::Conflict(format!(
                "Email already in use: {}",
                user.email
            )));
        }
        if let Some(role_id) = user.role.role_id() {
            if !inner.roles.contains_key(role_id) {
                return Err(StoreError::role_not_found(role_id));
            }
            inner.adjust_count(role_id, 1);
        }
        inner.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn set_user_role(&self, user_id: Uuid, role_id: &str) -> StoreResult<RoleChange> {
        let mut inner = self.inner.write().await;
        if !inner.roles.contains_key(role_id) {
            return Err(StoreError::role_not_found(role_id));
        }
        let user = inner
            .users
            .get_mut(&user_id)
            .ok_or_else(|| StoreError::user_not_found(user_id))?;

        let previous_role_id = user.role.role_id().map(str::to_string);
        if previous_role_id.as_deref() == Some(role_id) {
            return Ok(RoleChange {
                previous_role_id,
                changed: false,
            });
        }

        user.role = workhub_models::RoleAssignment::assigned(role_id);
        user.updated_at = Utc::now();

        if let Some(previous) = &previous_role_id {
            inner.adjust_count(previous, -1);
        }
        inner.adjust_count(role_id, 1);

        Ok(RoleChange {
            previous_role_id,
            changed: true,
        })
    }

    async fn count_users_with_role(&self, role_id: &str) -> StoreResult<i64> {
        Ok(self.inner.read().await.live_count(role_id))
    }

    async fn count_users_by_kind(&self) -> StoreResult<UserKindCounts> {
        let inner = self.inner.read().await;
        let mut counts = UserKindCounts::default();
        for user in inner.users.values() {
            match user.role {
                workhub_models::RoleAssignment::Assigned { .. } => counts.assigned += 1,
                workhub_models::RoleAssignment::Legacy { .. } => counts.legacy += 1,
                workhub_models::RoleAssignment::Unassigned => counts.unassigned += 1,
            }
        }
        Ok(counts)
    }

    async fn list_unmigrated_users(&self) -> StoreResult<Vec<User>> {
        let inner = self.inner.read().await;
        Ok(inner
            .users_by_email()
            .into_iter()
            .filter(|user| user.role.role_id().is_none())
            .cloned()
            .collect())
    }

    async fn migration_state(&self) -> StoreResult<MigrationState> {
        Ok(self.inner.read().await.migration.clone())
    }

    async fn set_migration_state(&self, state: &MigrationState) -> StoreResult<()> {
        self.inner.write().await.migration = state.clone();
        Ok(())
    }
}
