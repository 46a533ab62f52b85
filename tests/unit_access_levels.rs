use workhub::modules::access::model::{AccessSource, EffectiveAccess};
use workhub::modules::access::service::{AccessService, get_module_access, resolve, target_role};
use workhub_core::access::{AccessLevel, ModuleAccess, ModuleId, has_access};
use workhub_db::system_role_definitions;
use workhub_models::{LegacyRole, Role, RoleAssignment};

fn system_role(id: &str) -> Role {
    system_role_definitions()
        .into_iter()
        .find(|role| role.id == id)
        .unwrap()
}

#[test]
fn test_has_access_follows_fixed_order() {
    for (i, level) in AccessLevel::ORDER.iter().enumerate() {
        for (j, required) in AccessLevel::ORDER.iter().enumerate() {
            assert_eq!(has_access(*level, *required), i >= j, "{} vs {}", level, required);
        }
    }
}

#[test]
fn test_everything_satisfies_none() {
    for level in AccessLevel::ORDER {
        assert!(has_access(level, AccessLevel::None));
    }
}

#[test]
fn test_module_access_without_role_is_none() {
    for module in ModuleId::all() {
        assert_eq!(get_module_access(None, module), AccessLevel::None);
    }
}

#[test]
fn test_absent_module_is_none() {
    let pending = system_role("pending");
    assert_eq!(
        get_module_access(Some(&pending), ModuleId::Dashboard),
        AccessLevel::View
    );
    assert_eq!(
        get_module_access(Some(&pending), ModuleId::Tasks),
        AccessLevel::None
    );
}

#[test]
fn test_legacy_mapping_before_completion() {
    let cases = [
        (LegacyRole::Admin, "admin"),
        (LegacyRole::Owner, "admin"),
        (LegacyRole::Member, "member"),
        (LegacyRole::Pending, "pending"),
    ];

    for (legacy, expected) in cases {
        let assignment = RoleAssignment::Legacy { role: legacy };
        assert_eq!(
            target_role(&assignment, false),
            (AccessSource::LegacyFallback, Some(expected))
        );
        assert_eq!(target_role(&assignment, true), (AccessSource::None, None));
    }
}

#[test]
fn test_assigned_ignores_migration_flag() {
    let assignment = RoleAssignment::assigned("qa_lead");
    for completed in [false, true] {
        assert_eq!(
            target_role(&assignment, completed),
            (AccessSource::Assigned, Some("qa_lead"))
        );
    }
    assert_eq!(
        target_role(&RoleAssignment::Unassigned, false),
        (AccessSource::None, None)
    );
}

#[test]
fn test_resolve_missing_role_grants_nothing() {
    let effective = resolve(AccessSource::Assigned, Some("deleted"), None);
    assert_eq!(effective.role_id.as_deref(), Some("deleted"));
    for module in ModuleId::all() {
        assert!(!effective.allows(module, AccessLevel::View));
    }
}

#[test]
fn test_check_module() {
    let effective = EffectiveAccess {
        source: AccessSource::Assigned,
        role_id: Some("custom".to_string()),
        role_name: Some("Custom".to_string()),
        modules: ModuleAccess::from([(ModuleId::Boards, AccessLevel::Edit)]),
    };

    let check = AccessService::check_module(&effective, ModuleId::Boards, AccessLevel::Admin);
    assert_eq!(check.level, AccessLevel::Edit);
    assert!(!check.allowed);

    let check = AccessService::check_module(&effective, ModuleId::Boards, AccessLevel::Edit);
    assert!(check.allowed);
}
