#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use workhub::modules::migration::service::MigrationService;
use workhub::router::init_router;
use workhub::state::AppState;
use workhub_auth::create_access_token;
use workhub_config::{CorsConfig, JwtConfig};
use workhub_db::{MemoryStore, RoleStore};
use workhub_models::{LegacyRole, RoleAssignment, User};

pub fn test_jwt_config() -> JwtConfig {
    JwtConfig {
        secret: "integration-test-secret".to_string(),
        access_token_expiry: 3600,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub jwt_config: JwtConfig,
}

impl TestApp {
    /// Memory-backed app with the system roles seeded.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        MigrationService::seed_system_roles(store.as_ref())
            .await
            .unwrap();

        let jwt_config = test_jwt_config();
        let state = AppState::new(
            store.clone(),
            jwt_config.clone(),
            CorsConfig::from_list("http://localhost:5173"),
        );

        Self {
            router: init_router(state),
            store,
            jwt_config,
        }
    }

    pub async fn create_user(&self, role: RoleAssignment) -> User {
        let user = User::new(generate_unique_email(), "Test User", role);
        self.store.insert_user(&user).await.unwrap();
        user
    }

    pub async fn create_user_with_role(&self, role_id: &str) -> User {
        self.create_user(RoleAssignment::assigned(role_id)).await
    }

    pub async fn create_legacy_user(&self, role: LegacyRole) -> User {
        self.create_user(RoleAssignment::Legacy { role }).await
    }

    pub fn token_for(&self, user: &User) -> String {
        create_access_token(user.id, &user.email, &self.jwt_config).unwrap()
    }

    /// Token of a fresh user on the built-in admin role.
    pub async fn admin_token(&self) -> String {
        let admin = self.create_user_with_role("admin").await;
        self.token_for(&admin)
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_string(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!(
                    "Response was not JSON. Status: {}, Body: {:?}",
                    status,
                    String::from_utf8_lossy(&bytes)
                )
            })
        };

        (status, body)
    }
}

pub fn generate_unique_email() -> String {
    format!("test-{}@test.com", Uuid::new_v4())
}
