use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

use super::controller::{
    create_role, delete_role, get_access_matrix, get_role, list_roles,
    recalculate_all_user_counts, recalculate_user_count, set_default_role, set_module_access,
    update_role,
};

pub fn init_roles_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/matrix", get(get_access_matrix))
        .route("/recalculate", post(recalculate_all_user_counts))
        .route("/{id}", get(get_role).put(update_role).delete(delete_role))
        .route("/{id}/modules/{module}", put(set_module_access))
        .route("/{id}/default", post(set_default_role))
        .route("/{id}/recalculate", post(recalculate_user_count))
}
