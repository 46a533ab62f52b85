use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{complete, get_status, migrate_users, recount, seed_system_roles};

pub fn init_migration_router() -> Router<AppState> {
    Router::new()
        .route("/status", get(get_status))
        .route("/seed", post(seed_system_roles))
        .route("/users", post(migrate_users))
        .route("/recount", post(recount))
        .route("/complete", post(complete))
}
