//! Permission resolver.
//!
//! Every access decision goes through [`AccessService::resolve_user_access`].
//! Legacy users resolve through the same lookup table the migration uses, so
//! before and after migration the answer comes from one code path.

use tracing::{instrument, warn};

use workhub_core::access::{self, AccessLevel, ModuleId};
use workhub_core::AppError;
use workhub_db::RoleStore;
use workhub_models::{Role, RoleAssignment, User};

use super::model::{AccessSource, EffectiveAccess, ModuleCheckResponse};

/// Level `role` grants on `module`; `none` when there is no role.
pub fn get_module_access(role: Option<&Role>, module: ModuleId) -> AccessLevel {
    role.map(|r| r.module_access(module)).unwrap_or_default()
}

/// Role whose matrix row applies to `assignment`.
///
/// Legacy values map through the migration table until the migration is
/// marked complete; afterwards they resolve to nothing.
pub fn target_role(
    assignment: &RoleAssignment,
    migration_completed: bool,
) -> (AccessSource, Option<&str>) {
    match assignment {
        RoleAssignment::Assigned { role_id } => (AccessSource::Assigned, Some(role_id.as_str())),
        RoleAssignment::Legacy { role } if !migration_completed => {
            (AccessSource::LegacyFallback, Some(role.target_role_id()))
        }
        RoleAssignment::Legacy { .. } | RoleAssignment::Unassigned => (AccessSource::None, None),
    }
}

/// Builds the effective access from an already loaded role.
pub fn resolve(source: AccessSource, role_id: Option<&str>, role: Option<&Role>) -> EffectiveAccess {
    if source == AccessSource::None {
        return EffectiveAccess::none();
    }

    EffectiveAccess {
        source,
        role_id: role_id.map(str::to_string),
        role_name: role.map(|r| r.name.clone()),
        modules: role.map(|r| access::normalize_modules(r.modules.clone())).unwrap_or_default(),
    }
}

pub struct AccessService;

impl AccessService {
    #[instrument(skip(store, user), fields(user_id = %user.id))]
    pub async fn resolve_user_access(
        store: &dyn RoleStore,
        user: &User,
    ) -> Result<EffectiveAccess, AppError> {
        let migration_completed = if user.role.is_legacy() {
            store.migration_state().await?.completed
        } else {
            false
        };

        let (source, role_id) = target_role(&user.role, migration_completed);
        let role = match role_id {
            Some(id) => store.get_role(id).await?,
            None => None,
        };

        if let (Some(id), None) = (role_id, &role) {
            warn!(role_id = %id, "User references a missing role, denying all modules");
        }

        Ok(resolve(source, role_id, role.as_ref()))
    }

    pub fn check_module(
        effective: &EffectiveAccess,
        module: ModuleId,
        required: AccessLevel,
    ) -> ModuleCheckResponse {
        let level = effective.level(module);
        ModuleCheckResponse {
            module,
            level,
            required,
            allowed: access::has_access(level, required),
        }
    }
}
