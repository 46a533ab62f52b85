//! One-time move from legacy role strings to role references.
//!
//! Each step is idempotent and can be run on its own, in order:
//! seed, users, recount, complete.

use anyhow::anyhow;
use chrono::Utc;
use tracing::{info, instrument, warn};

use workhub_core::AppError;
use workhub_db::{RoleStore, StoreError, system_role_definitions};
use workhub_models::{
    MigrateUsersReport, MigrationFailure, MigrationState, MigrationStatusResponse, RecountReport,
    RoleAssignment, SeedRolesReport,
};

use crate::metrics::{track_role_assignment, track_users_migrated};
use crate::modules::roles::service::RoleService;

pub struct MigrationService;

impl MigrationService {
    /// Creates the built-in roles that are missing. Existing roles, including
    /// their edited matrices, are left alone.
    #[instrument(skip(store))]
    pub async fn seed_system_roles(store: &dyn RoleStore) -> Result<SeedRolesReport, AppError> {
        let mut report = SeedRolesReport::default();
        let has_default = store.get_default_role().await?.is_some();

        for mut role in system_role_definitions() {
            if store.get_role(&role.id).await?.is_some() {
                report.existing.push(role.id);
                continue;
            }

            // Never steal the default flag from an operator-chosen role
            if has_default {
                role.is_default = false;
            }

            match store.insert_role(&role).await {
                Ok(()) => {
                    info!(role_id = %role.id, "Seeded system role");
                    report.created.push(role.id);
                }
                Err(StoreError::Conflict(_)) => report.existing.push(role.id),
                Err(e) => return Err(e.into()),
            }
        }

        Ok(report)
    }

    /// Points every legacy user at its mapped role and every unassigned user
    /// at the default role. Users that already reference a role are skipped.
    #[instrument(skip(store))]
    pub async fn migrate_users(store: &dyn RoleStore) -> Result<MigrateUsersReport, AppError> {
        let default_role = store.get_default_role().await?;
        let mut report = MigrateUsersReport {
            skipped: store.count_users_by_kind().await?.assigned,
            ..Default::default()
        };

        for user in store.list_unmigrated_users().await? {
            let target = match &user.role {
                RoleAssignment::Legacy { role } => Some(role.target_role_id().to_string()),
                RoleAssignment::Unassigned => default_role.as_ref().map(|r| r.id.clone()),
                RoleAssignment::Assigned { .. } => None,
            };

            let Some(target) = target else {
                report.skipped += 1;
                continue;
            };

            match store.set_user_role(user.id, &target).await {
                Ok(change) if change.changed => {
                    track_role_assignment(&target, "migration");
                    report.migrated += 1;
                }
                Ok(_) => report.skipped += 1,
                Err(e) => {
                    warn!(user_id = %user.id, error = %e, "Failed to migrate user");
                    report.failed.push(MigrationFailure {
                        user_id: user.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        track_users_migrated(report.migrated as u64);
        info!(
            migrated = report.migrated,
            skipped = report.skipped,
            failed = report.failed.len(),
            "User role migration finished"
        );

        Ok(report)
    }

    #[instrument(skip(store))]
    pub async fn recount(store: &dyn RoleStore) -> Result<RecountReport, AppError> {
        RoleService::recalculate_all_user_counts(store).await
    }

    /// Marks the migration complete. After this, legacy values grant nothing.
    #[instrument(skip(store))]
    pub async fn complete(store: &dyn RoleStore) -> Result<MigrationStatusResponse, AppError> {
        let counts = store.count_users_by_kind().await?;
        if counts.legacy > 0 {
            return Err(AppError::conflict(anyhow!(
                "{} users still carry a legacy role; run the user migration first",
                counts.legacy
            )));
        }

        let state = store.migration_state().await?;
        if !state.completed {
            store
                .set_migration_state(&MigrationState {
                    completed: true,
                    completed_at: Some(Utc::now()),
                })
                .await?;
            info!("Role migration marked complete");
        }

        Self::status(store).await
    }

    #[instrument(skip(store))]
    pub async fn status(store: &dyn RoleStore) -> Result<MigrationStatusResponse, AppError> {
        let state = store.migration_state().await?;
        let counts = store.count_users_by_kind().await?;

        let mut missing_system_roles = Vec::new();
        for role in system_role_definitions() {
            if store.get_role(&role.id).await?.is_none() {
                missing_system_roles.push(role.id);
            }
        }

        Ok(MigrationStatusResponse {
            completed: state.completed,
            completed_at: state.completed_at,
            legacy_users: counts.legacy,
            assigned_users: counts.assigned,
            unassigned_users: counts.unassigned,
            missing_system_roles,
        })
    }
}
