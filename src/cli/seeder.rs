//! Fake users carrying legacy role values, for rehearsing the role migration.

use std::time::Instant;

use fake::Fake;
use fake::faker::name::en::{FirstName, LastName};

use workhub_core::AppError;
use workhub_db::{RoleStore, StoreError};
use workhub_models::{LegacyRole, RoleAssignment, User};

/// How many demo users to create per legacy value.
#[derive(Debug, Clone, Copy)]
pub struct DemoUsers {
    pub admins: usize,
    pub owners: usize,
    pub members: usize,
    pub pending: usize,
    pub unassigned: usize,
}

impl Default for DemoUsers {
    fn default() -> Self {
        Self {
            admins: 1,
            owners: 1,
            members: 10,
            pending: 3,
            unassigned: 2,
        }
    }
}

impl DemoUsers {
    fn assignments(&self) -> Vec<RoleAssignment> {
        let legacy = |role: LegacyRole, count: usize| {
            std::iter::repeat_n(RoleAssignment::Legacy { role }, count)
        };

        legacy(LegacyRole::Admin, self.admins)
            .chain(legacy(LegacyRole::Owner, self.owners))
            .chain(legacy(LegacyRole::Member, self.members))
            .chain(legacy(LegacyRole::Pending, self.pending))
            .chain(std::iter::repeat_n(RoleAssignment::Unassigned, self.unassigned))
            .collect()
    }
}

fn demo_user(index: usize, role: RoleAssignment) -> User {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let tag = match &role {
        RoleAssignment::Legacy { role } => role.as_str(),
        _ => "unassigned",
    };

    let email = format!(
        "{}.{}+{}{}@example.com",
        first_name.to_lowercase().replace(' ', "_"),
        last_name.to_lowercase().replace(' ', "_"),
        tag,
        index
    );

    User::new(email, format!("{} {}", first_name, last_name), role)
}

/// Inserts the demo users. Email collisions with earlier runs are skipped.
/// Returns the number of users created.
pub async fn seed_demo_users(store: &dyn RoleStore, counts: DemoUsers) -> Result<usize, AppError> {
    let start = Instant::now();
    let assignments = counts.assignments();

    println!("🌱 Seeding {} demo users with legacy roles...", assignments.len());

    let mut created = 0;
    for (index, role) in assignments.into_iter().enumerate() {
        match store.insert_user(&demo_user(index, role)).await {
            Ok(()) => created += 1,
            Err(StoreError::Conflict(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }

    println!(
        "✅ Created {} demo users in {:.2?}",
        created,
        start.elapsed()
    );
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use workhub_db::MemoryStore;

    #[test]
    fn test_assignments_follow_counts() {
        let assignments = DemoUsers {
            admins: 1,
            owners: 2,
            members: 3,
            pending: 0,
            unassigned: 1,
        }
        .assignments();
        assert_eq!(assignments.len(), 7);
        assert_eq!(
            assignments
                .iter()
                .filter(|r| r.legacy_role() == Some(LegacyRole::Owner))
                .count(),
            2
        );
        assert_eq!(assignments.last(), Some(&RoleAssignment::Unassigned));
    }

    #[tokio::test]
    async fn test_seed_demo_users_inserts_legacy_users() {
        let store = MemoryStore::new();
        let created = seed_demo_users(&store, DemoUsers::default()).await.unwrap();
        assert_eq!(created, 17);

        let counts = store.count_users_by_kind().await.unwrap();
        assert_eq!(counts.legacy, 15);
        assert_eq!(counts.unassigned, 2);
    }
}
