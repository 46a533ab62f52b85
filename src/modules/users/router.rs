use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{assign_role, bulk_assign_role, create_user, get_user, list_users};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/bulk-role", post(bulk_assign_role))
        .route("/{id}", get(get_user))
        .route("/{id}/role", put(assign_role))
}
