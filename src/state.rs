use workhub_config::{CorsConfig, JwtConfig, StorageConfig};
use workhub_db::{DynRoleStore, StoreResult, init_store};

#[derive(Clone)]
pub struct AppState {
    pub store: DynRoleStore,
    pub jwt_config: JwtConfig,
    pub cors_config: CorsConfig,
}

impl AppState {
    pub fn new(store: DynRoleStore, jwt_config: JwtConfig, cors_config: CorsConfig) -> Self {
        Self {
            store,
            jwt_config,
            cors_config,
        }
    }
}

pub async fn init_app_state(storage: &StorageConfig) -> StoreResult<AppState> {
    Ok(AppState::new(
        init_store(storage).await?,
        JwtConfig::from_env(),
        CorsConfig::from_env(),
    ))
}
