use std::collections::HashSet;

use anyhow::anyhow;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use workhub_core::{AppError, PaginationMeta};
use workhub_db::RoleStore;
use workhub_models::{
    BulkAssignFailure, BulkAssignResponse, BulkAssignRoleDto, CreateUserDto,
    PaginatedUsersResponse, RoleAssignment, RoleAssignmentResponse, User, UserListParams,
};

use crate::metrics::track_role_assignment;

pub struct UserService;

impl UserService {
    /// Creates a user on the requested role, else the default role, else
    /// unassigned.
    #[instrument(skip(store))]
    pub async fn create_user(store: &dyn RoleStore, dto: CreateUserDto) -> Result<User, AppError> {
        let role = match dto.role_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(role_id) => {
                let role = store
                    .get_role(role_id)
                    .await?
                    .ok_or_else(|| AppError::not_found(anyhow!("Role not found: {}", role_id)))?;
                RoleAssignment::assigned(role.id)
            }
            None => match store.get_default_role().await? {
                Some(role) => RoleAssignment::assigned(role.id),
                None => {
                    warn!("No default role configured, creating user without a role");
                    RoleAssignment::Unassigned
                }
            },
        };

        let user = User::new(
            dto.email.trim().to_lowercase(),
            dto.display_name.trim(),
            role,
        );
        store.insert_user(&user).await?;

        if let Some(role_id) = user.role.role_id() {
            track_role_assignment(role_id, "create");
        }
        info!(user_id = %user.id, "User created");

        Ok(user)
    }

    #[instrument(skip(store))]
    pub async fn list_users(
        store: &dyn RoleStore,
        params: UserListParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let limit = params.pagination.limit();
        let offset = params.pagination.offset();

        let (data, total) = store.list_users(&params.filter, limit, offset).await?;
        let meta = PaginationMeta::new(&params.pagination, total, data.len());

        Ok(PaginatedUsersResponse { data, meta })
    }

    #[instrument(skip(store))]
    pub async fn get_user(store: &dyn RoleStore, id: Uuid) -> Result<User, AppError> {
        store
            .get_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found: {}", id)))
    }

    #[instrument(skip(store))]
    pub async fn assign_role(
        store: &dyn RoleStore,
        user_id: Uuid,
        role_id: &str,
    ) -> Result<RoleAssignmentResponse, AppError> {
        let change = store.set_user_role(user_id, role_id).await?;

        if change.changed {
            track_role_assignment(role_id, "single");
            info!(
                user_id = %user_id,
                previous = ?change.previous_role_id,
                role_id = %role_id,
                "Role assigned"
            );
        }

        Ok(RoleAssignmentResponse {
            user_id,
            previous_role_id: change.previous_role_id,
            role_id: role_id.to_string(),
            changed: change.changed,
        })
    }

    /// Assigns one role to many users. Per-user failures are reported and do
    /// not stop the remaining assignments.
    #[instrument(skip(store, dto), fields(role_id = %dto.role_id, users = dto.user_ids.len()))]
    pub async fn bulk_assign_role(
        store: &dyn RoleStore,
        dto: BulkAssignRoleDto,
    ) -> Result<BulkAssignResponse, AppError> {
        if store.get_role(&dto.role_id).await?.is_none() {
            return Err(AppError::not_found(anyhow!(
                "Role not found: {}",
                dto.role_id
            )));
        }

        let mut response = BulkAssignResponse {
            role_id: dto.role_id.clone(),
            ..Default::default()
        };

        let mut seen = HashSet::new();
        for user_id in dto.user_ids.into_iter().filter(|id| seen.insert(*id)) {
            match store.set_user_role(user_id, &dto.role_id).await {
                Ok(change) if change.changed => {
                    track_role_assignment(&dto.role_id, "bulk");
                    response.assigned.push(user_id);
                }
                Ok(_) => response.unchanged.push(user_id),
                Err(e) => response.failed.push(BulkAssignFailure {
                    user_id,
                    error: e.to_string(),
                }),
            }
        }

        info!(
            assigned = response.assigned.len(),
            unchanged = response.unchanged.len(),
            failed = response.failed.len(),
            "Bulk role assignment finished"
        );

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workhub_db::{MemoryStore, system_role_definitions};
    use workhub_models::{LegacyRole, UserFilterParams};
    use workhub_core::PaginationParams;

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for role in system_role_definitions() {
            store.insert_role(&role).await.unwrap();
        }
        store
    }

    fn create_dto(email: &str, role_id: Option<&str>) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            display_name: "Test User".to_string(),
            role_id: role_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_create_user_uses_default_role() {
        let store = seeded_store().await;
        let user = UserService::create_user(&store, create_dto("new@x.io", None))
            .await
            .unwrap();
        assert_eq!(user.role.role_id(), Some("member"));
        assert_eq!(store.get_role("member").await.unwrap().unwrap().users_count, 1);
    }

    #[tokio::test]
    async fn test_create_user_without_default_is_unassigned() {
        let store = MemoryStore::new();
        let user = UserService::create_user(&store, create_dto("new@x.io", None))
            .await
            .unwrap();
        assert_eq!(user.role, RoleAssignment::Unassigned);
    }

    #[tokio::test]
    async fn test_create_user_unknown_role_and_duplicate_email() {
        let store = seeded_store().await;
        let err = UserService::create_user(&store, create_dto("a@x.io", Some("ghost")))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);

        UserService::create_user(&store, create_dto("a@x.io", None))
            .await
            .unwrap();
        let err = UserService::create_user(&store, create_dto("A@X.io", None))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_assign_role_is_noop_when_unchanged() {
        let store = seeded_store().await;
        let user = UserService::create_user(&store, create_dto("a@x.io", Some("admin")))
            .await
            .unwrap();

        let result = UserService::assign_role(&store, user.id, "admin").await.unwrap();
        assert!(!result.changed);
        assert_eq!(store.get_role("admin").await.unwrap().unwrap().users_count, 1);

        let result = UserService::assign_role(&store, user.id, "pending").await.unwrap();
        assert!(result.changed);
        assert_eq!(result.previous_role_id.as_deref(), Some("admin"));
        assert_eq!(store.get_role("admin").await.unwrap().unwrap().users_count, 0);
        assert_eq!(store.get_role("pending").await.unwrap().unwrap().users_count, 1);
    }

    #[tokio::test]
    async fn test_bulk_assign_reports_per_user() {
        let store = seeded_store().await;
        let a = UserService::create_user(&store, create_dto("a@x.io", Some("member")))
            .await
            .unwrap();
        let b = UserService::create_user(&store, create_dto("b@x.io", Some("admin")))
            .await
            .unwrap();
        let missing = Uuid::new_v4();

        let response = UserService::bulk_assign_role(
            &store,
            BulkAssignRoleDto {
                user_ids: vec![a.id, b.id, missing, a.id],
                role_id: "admin".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(response.assigned, vec![a.id]);
        assert_eq!(response.unchanged, vec![b.id]);
        assert_eq!(response.failed.len(), 1);
        assert_eq!(response.failed[0].user_id, missing);
        assert_eq!(store.get_role("admin").await.unwrap().unwrap().users_count, 2);
    }

    #[tokio::test]
    async fn test_bulk_assign_unknown_role() {
        let store = seeded_store().await;
        let err = UserService::bulk_assign_role(
            &store,
            BulkAssignRoleDto {
                user_ids: vec![Uuid::new_v4()],
                role_id: "ghost".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn test_list_users_legacy_filter() {
        let store = seeded_store().await;
        UserService::create_user(&store, create_dto("a@x.io", None))
            .await
            .unwrap();
        store
            .insert_user(&User::new(
                "legacy@x.io",
                "L",
                RoleAssignment::Legacy {
                    role: LegacyRole::Member,
                },
            ))
            .await
            .unwrap();

        let page = UserService::list_users(
            &store,
            UserListParams {
                filter: UserFilterParams {
                    role_id: None,
                    legacy: Some(true),
                },
                pagination: PaginationParams::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(page.meta.total, 1);
        assert_eq!(page.data[0].email, "legacy@x.io");
    }
}
