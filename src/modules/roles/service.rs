use anyhow::anyhow;
use tracing::{info, instrument};

use workhub_core::access::{self, AccessLevel, ModuleId};
use workhub_core::{AppError, PaginationMeta};
use workhub_db::RoleStore;
use workhub_models::{
    AccessMatrixResponse, CreateRoleDto, ModuleResponse, PaginatedRolesResponse, RecountReport,
    Role, RoleCount, RoleFilterParams, UpdateRoleDto, generate_slug,
};

use crate::metrics::track_role_created;

/// Ids taken by static routes under `/api/admin/roles`.
const RESERVED_ROLE_IDS: [&str; 2] = ["matrix", "recalculate"];

pub struct RoleService;

impl RoleService {
    #[instrument(skip(store))]
    pub async fn list_roles(
        store: &dyn RoleStore,
        params: RoleFilterParams,
    ) -> Result<PaginatedRolesResponse, AppError> {
        let roles: Vec<Role> = store
            .list_roles()
            .await?
            .into_iter()
            .filter(|role| params.matches(role))
            .collect();

        let data = params.pagination.slice(&roles);
        let meta = PaginationMeta::new(&params.pagination, roles.len() as i64, data.len());

        Ok(PaginatedRolesResponse { data, meta })
    }

    #[instrument(skip(store))]
    pub async fn get_role(store: &dyn RoleStore, id: &str) -> Result<Role, AppError> {
        store
            .get_role(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("Role not found: {}", id)))
    }

    #[instrument(skip(store))]
    pub async fn create_role(store: &dyn RoleStore, dto: CreateRoleDto) -> Result<Role, AppError> {
        let name = dto.name.trim();
        let id = generate_slug(name);
        if id.is_empty() {
            return Err(AppError::unprocessable(anyhow!(
                "Name must contain at least one letter or digit"
            )));
        }
        if RESERVED_ROLE_IDS.contains(&id.as_str()) {
            return Err(AppError::conflict(anyhow!("Role id is reserved: {}", id)));
        }

        let role = Role::custom(
            id,
            name,
            dto.description.filter(|d| !d.trim().is_empty()),
            dto.modules.unwrap_or_default(),
        );

        store.insert_role(&role).await?;
        track_role_created();
        info!(role_id = %role.id, "Role created");

        Ok(role)
    }

    #[instrument(skip(store))]
    pub async fn update_role(
        store: &dyn RoleStore,
        id: &str,
        dto: UpdateRoleDto,
    ) -> Result<Role, AppError> {
        let mut role = Self::get_role(store, id).await?;

        if let Some(name) = dto.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::unprocessable(anyhow!(
                    "Name must be between 1 and 100 characters"
                )));
            }
            if role.is_system && name != role.name {
                return Err(AppError::forbidden("System roles cannot be renamed"));
            }
            role.name = name;
        }
        if let Some(description) = dto.description {
            role.description = Some(description).filter(|d| !d.trim().is_empty());
        }
        if let Some(modules) = dto.modules {
            role.modules = access::normalize_modules(modules);
        }

        Ok(store.update_role(&role).await?)
    }

    /// Edits one cell of the matrix; `none` removes the entry.
    #[instrument(skip(store))]
    pub async fn set_module_access(
        store: &dyn RoleStore,
        id: &str,
        module: ModuleId,
        level: AccessLevel,
    ) -> Result<Role, AppError> {
        let mut role = Self::get_role(store, id).await?;

        if level == AccessLevel::None {
            role.modules.remove(&module);
        } else {
            role.modules.insert(module, level);
        }

        let role = store.update_role(&role).await?;
        info!(role_id = %role.id, module = %module, level = %level, "Module access changed");
        Ok(role)
    }

    #[instrument(skip(store))]
    pub async fn delete_role(store: &dyn RoleStore, id: &str) -> Result<(), AppError> {
        let role = Self::get_role(store, id).await?;

        if role.is_system {
            return Err(AppError::forbidden("System roles cannot be deleted"));
        }
        if role.is_default {
            return Err(AppError::conflict(anyhow!(
                "The default role cannot be deleted"
            )));
        }

        // The counter may have drifted low, so the live count is checked too.
        let members = role.users_count.max(store.count_users_with_role(id).await?);
        if members > 0 {
            return Err(AppError::conflict(anyhow!(
                "Role {} is still assigned to {} users",
                id,
                members
            )));
        }

        store.delete_role(id).await?;
        info!(role_id = %id, "Role deleted");
        Ok(())
    }

    #[instrument(skip(store))]
    pub async fn set_default_role(store: &dyn RoleStore, id: &str) -> Result<Role, AppError> {
        store.set_default_role(id).await?;
        info!(role_id = %id, "Default role changed");
        Self::get_role(store, id).await
    }

    /// Overwrites the stored counter with the live membership count.
    #[instrument(skip(store))]
    pub async fn recalculate_user_count(
        store: &dyn RoleStore,
        id: &str,
    ) -> Result<RoleCount, AppError> {
        let role = Self::get_role(store, id).await?;
        let current = store.count_users_with_role(id).await?;
        store.set_users_count(id, current).await?;

        Ok(RoleCount {
            role_id: role.id,
            previous: role.users_count,
            current,
        })
    }

    #[instrument(skip(store))]
    pub async fn recalculate_all_user_counts(
        store: &dyn RoleStore,
    ) -> Result<RecountReport, AppError> {
        let mut report = RecountReport::default();

        for role in store.list_roles().await? {
            let current = store.count_users_with_role(&role.id).await?;
            store.set_users_count(&role.id, current).await?;
            report.roles.push(RoleCount {
                role_id: role.id,
                previous: role.users_count,
                current,
            });
        }

        let corrected = report.corrected().count();
        if corrected > 0 {
            info!(corrected, "Corrected drifted role member counts");
        }
        Ok(report)
    }

    #[instrument(skip(store))]
    pub async fn get_access_matrix(
        store: &dyn RoleStore,
    ) -> Result<AccessMatrixResponse, AppError> {
        let roles = store.list_roles().await?;
        Ok(AccessMatrixResponse::build(&roles))
    }

    pub fn list_modules() -> Vec<ModuleResponse> {
        access::MODULES.iter().map(Into::into).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workhub_core::{ModuleAccess, PaginationParams};
    use workhub_db::{MemoryStore, system_role_definitions};
    use workhub_models::{RoleAssignment, User};

    async fn seeded_store() -> MemoryStore {
        let store = MemoryStore::new();
        for role in system_role_definitions() {
            store.insert_role(&role).await.unwrap();
        }
        store
    }

    fn create_dto(name: &str) -> CreateRoleDto {
        CreateRoleDto {
            name: name.to_string(),
            description: None,
            modules: Some(ModuleAccess::from([(ModuleId::Tasks, AccessLevel::Edit)])),
        }
    }

    #[tokio::test]
    async fn test_create_role_derives_slug_and_rejects_collision() {
        let store = seeded_store().await;
        let role = RoleService::create_role(&store, create_dto("Project Manager"))
            .await
            .unwrap();
        assert_eq!(role.id, "project_manager");
        assert!(!role.is_system && !role.is_default);

        let err = RoleService::create_role(&store, create_dto("project-manager"))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_create_role_with_symbol_only_name() {
        let store = seeded_store().await;
        let err = RoleService::create_role(&store, create_dto("!!!"))
            .await
            .unwrap_err();
        assert_eq!(err.status.as_u16(), 422);
    }

    #[tokio::test]
    async fn test_create_role_rejects_reserved_ids() {
        let store = seeded_store().await;
        for name in ["Matrix", "recalculate"] {
            let err = RoleService::create_role(&store, create_dto(name))
                .await
                .unwrap_err();
            assert_eq!(err.status.as_u16(), 409);
        }
        assert!(store.get_role("matrix").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_system_role_rules() {
        let store = seeded_store().await;

        let err = RoleService::update_role(
            &store,
            "admin",
            UpdateRoleDto {
                name: Some("Superuser".into()),
                description: None,
                modules: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status.as_u16(), 403);

        let err = RoleService::delete_role(&store, "pending").await.unwrap_err();
        assert_eq!(err.status.as_u16(), 403);

        // Matrix of a system role stays editable
        let role =
            RoleService::set_module_access(&store, "pending", ModuleId::News, AccessLevel::View)
                .await
                .unwrap();
        assert_eq!(role.module_access(ModuleId::News), AccessLevel::View);
    }

    #[tokio::test]
    async fn test_set_module_access_none_removes_entry() {
        let store = seeded_store().await;
        RoleService::create_role(&store, create_dto("Mentor")).await.unwrap();

        let role =
            RoleService::set_module_access(&store, "mentor", ModuleId::Tasks, AccessLevel::None)
                .await
                .unwrap();
        assert!(role.modules.is_empty());
    }

    #[tokio::test]
    async fn test_delete_default_role_conflicts() {
        let store = seeded_store().await;
        RoleService::create_role(&store, create_dto("Mentor")).await.unwrap();
        RoleService::set_default_role(&store, "mentor").await.unwrap();

        let err = RoleService::delete_role(&store, "mentor").await.unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_delete_role_with_users_conflicts() {
        let store = seeded_store().await;
        RoleService::create_role(&store, create_dto("Mentor")).await.unwrap();
        store
            .insert_user(&User::new("m@x.io", "M", RoleAssignment::assigned("mentor")))
            .await
            .unwrap();

        let err = RoleService::delete_role(&store, "mentor").await.unwrap_err();
        assert_eq!(err.status.as_u16(), 409);
    }

    #[tokio::test]
    async fn test_recalculate_converges() {
        let store = seeded_store().await;
        store
            .insert_user(&User::new("m@x.io", "M", RoleAssignment::assigned("member")))
            .await
            .unwrap();
        store.set_users_count("member", 42).await.unwrap();

        let count = RoleService::recalculate_user_count(&store, "member")
            .await
            .unwrap();
        assert_eq!(count.previous, 42);
        assert_eq!(count.current, 1);
        assert_eq!(
            RoleService::get_role(&store, "member").await.unwrap().users_count,
            1
        );

        let report = RoleService::recalculate_all_user_counts(&store).await.unwrap();
        assert_eq!(report.roles.len(), 3);
        assert_eq!(report.corrected().count(), 0);
    }

    #[tokio::test]
    async fn test_list_roles_filters_and_paginates() {
        let store = seeded_store().await;
        RoleService::create_role(&store, create_dto("Mentor")).await.unwrap();

        let params = RoleFilterParams {
            is_system: Some(true),
            is_default: None,
            pagination: PaginationParams::default(),
        };
        let page = RoleService::list_roles(&store, params).await.unwrap();
        assert_eq!(page.meta.total, 3);
        assert!(page.data.iter().all(|r| r.is_system));
    }
}
