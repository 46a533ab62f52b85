use clap::{Parser, Subcommand};
use dialoguer::Input;
use dotenvy::dotenv;

use workhub::cli::seeder::{DemoUsers, seed_demo_users};
use workhub::cli::{create_admin, issue_token};
use workhub::modules::migration::service::MigrationService;
use workhub::modules::roles::service::RoleService;
use workhub_config::{JwtConfig, StorageBackend, StorageConfig};
use workhub_db::{DynRoleStore, init_store};

#[derive(Parser)]
#[command(name = "workhub-cli")]
#[command(about = "Workhub CLI - Role administration and migration tools", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a user on the built-in admin role
    CreateAdmin {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Display name
        #[arg(short = 'n', long)]
        name: Option<String>,
    },
    /// Print an access token for an existing user
    IssueToken {
        /// Email address of the user
        #[arg(short = 'e', long)]
        email: String,
    },
    /// Create missing built-in roles
    SeedRoles,
    /// Move legacy and unassigned users onto roles
    MigrateUsers,
    /// Recalculate every role's member counter
    Recount,
    /// Mark the role migration complete
    CompleteMigration,
    /// Show role migration progress
    MigrationStatus,
    /// Make a role the default for new users
    SetDefaultRole {
        /// Role id
        role_id: String,
    },
    /// Create fake users with legacy roles
    SeedDemoUsers {
        #[arg(long, default_value = "1")]
        admins: usize,

        #[arg(long, default_value = "1")]
        owners: usize,

        #[arg(long, default_value = "10")]
        members: usize,

        #[arg(long, default_value = "3")]
        pending: usize,

        #[arg(long, default_value = "2")]
        unassigned: usize,
    },
}

fn fail(context: &str, error: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {}: {}", context, error);
    std::process::exit(1);
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => fail("Error formatting output", e),
    }
}

async fn connect() -> DynRoleStore {
    let config = StorageConfig::from_env().unwrap_or_else(|e| fail("Invalid storage config", e));

    if config.backend == StorageBackend::Memory {
        eprintln!("⚠️  No DATABASE_URL set; changes will not outlive this command");
    }

    init_store(&config)
        .await
        .unwrap_or_else(|e| fail("Failed to open role store", e))
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();
    let store = connect().await;
    let store = store.as_ref();

    match cli.command {
        Commands::CreateAdmin { email, name } => {
            let email = email.unwrap_or_else(|| {
                Input::<String>::new()
                    .with_prompt("Email address")
                    .interact_text()
                    .unwrap_or_else(|e| fail("Failed to read email", e))
            });
            let name = name.unwrap_or_else(|| {
                Input::<String>::new()
                    .with_prompt("Display name")
                    .interact_text()
                    .unwrap_or_else(|e| fail("Failed to read display name", e))
            });

            match create_admin(store, &email, &name).await {
                Ok(user) => {
                    println!("\n✅ Admin created successfully!");
                    println!("   Email: {}", user.email);
                    println!("   Id: {}", user.id);
                }
                Err(e) => fail("Error creating admin", e.message()),
            }
        }
        Commands::IssueToken { email } => {
            match issue_token(store, &JwtConfig::from_env(), &email).await {
                Ok(token) => println!("{}", token),
                Err(e) => fail("Error issuing token", e.message()),
            }
        }
        Commands::SeedRoles => match MigrationService::seed_system_roles(store).await {
            Ok(report) => {
                println!("✅ System roles seeded");
                print_json(&report);
            }
            Err(e) => fail("Error seeding roles", e.message()),
        },
        Commands::MigrateUsers => match MigrationService::migrate_users(store).await {
            Ok(report) => {
                println!(
                    "✅ Migrated {} users ({} skipped, {} failed)",
                    report.migrated,
                    report.skipped,
                    report.failed.len()
                );
                for failure in &report.failed {
                    println!("   {}: {}", failure.user_id, failure.error);
                }
            }
            Err(e) => fail("Error migrating users", e.message()),
        },
        Commands::Recount => match MigrationService::recount(store).await {
            Ok(report) => {
                println!("✅ Recounted {} roles", report.roles.len());
                for count in report.corrected() {
                    println!(
                        "   {}: {} -> {}",
                        count.role_id, count.previous, count.current
                    );
                }
            }
            Err(e) => fail("Error recounting", e.message()),
        },
        Commands::CompleteMigration => match MigrationService::complete(store).await {
            Ok(_) => println!("✅ Role migration marked complete"),
            Err(e) => fail("Cannot complete migration", e.message()),
        },
        Commands::MigrationStatus => match MigrationService::status(store).await {
            Ok(status) => print_json(&status),
            Err(e) => fail("Error reading status", e.message()),
        },
        Commands::SetDefaultRole { role_id } => {
            match RoleService::set_default_role(store, &role_id).await {
                Ok(role) => println!("✅ {} ({}) is now the default role", role.name, role.id),
                Err(e) => fail("Error setting default role", e.message()),
            }
        }
        Commands::SeedDemoUsers {
            admins,
            owners,
            members,
            pending,
            unassigned,
        } => {
            let counts = DemoUsers {
                admins,
                owners,
                members,
                pending,
                unassigned,
            };
            if let Err(e) = seed_demo_users(store, counts).await {
                fail("Error seeding demo users", e.message());
            }
        }
    }
}
