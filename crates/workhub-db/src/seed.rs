//! Built-in role definitions.

use chrono::Utc;

use workhub_core::access::{self, AccessLevel, ModuleAccess, ModuleId};
use workhub_models::{Role, system_roles};

fn system_role(
    id: &str,
    name: &str,
    description: &str,
    is_default: bool,
    modules: ModuleAccess,
) -> Role {
    let now = Utc::now();
    Role {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        is_system: true,
        is_default,
        modules: access::normalize_modules(modules),
        users_count: 0,
        created_at: now,
        updated_at: now,
    }
}

fn member_modules() -> ModuleAccess {
    ModuleAccess::from([
        (ModuleId::Dashboard, AccessLevel::View),
        (ModuleId::Tasks, AccessLevel::Edit),
        (ModuleId::Boards, AccessLevel::Edit),
        (ModuleId::Sprints, AccessLevel::Edit),
        (ModuleId::News, AccessLevel::View),
        (ModuleId::Learning, AccessLevel::View),
        (ModuleId::Feedback, AccessLevel::Edit),
    ])
}

/// The roles every deployment starts with. `member` is the initial default.
pub fn system_role_definitions() -> Vec<Role> {
    vec![
        system_role(
            system_roles::ADMIN,
            "Administrator",
            "Full access to every module",
            false,
            access::uniform_access(AccessLevel::Admin),
        ),
        system_role(
            system_roles::MEMBER,
            "Member",
            "Day-to-day work on tasks, boards and sprints",
            true,
            member_modules(),
        ),
        system_role(
            system_roles::PENDING,
            "Pending",
            "Awaiting approval; dashboard only",
            false,
            ModuleAccess::from([(ModuleId::Dashboard, AccessLevel::View)]),
        ),
    ]
}
