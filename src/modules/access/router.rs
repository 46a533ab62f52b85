use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{check_my_access, get_me, get_my_access, list_modules};

pub fn init_modules_router() -> Router<AppState> {
    Router::new().route("/", get(list_modules))
}

pub fn init_me_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_me))
        .route("/access", get(get_my_access))
        .route("/access/{module}", get(check_my_access))
}
