mod common;

use axum::http::StatusCode;
use common::{TestApp, generate_unique_email};
use serde_json::json;
use uuid::Uuid;

use workhub_db::RoleStore;
use workhub_models::LegacyRole;

#[tokio::test]
async fn test_users_require_users_module_access() {
    let app = TestApp::new().await;
    let member = app.create_user_with_role("member").await;
    let token = app.token_for(&member);

    let (status, body) = app
        .request("GET", "/api/admin/users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Access denied. Requires view access to users");
}

#[tokio::test]
async fn test_create_user_uses_default_role() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/users",
            Some(&token),
            Some(json!({ "email": "Grace@Example.com", "display_name": "Grace Hopper" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "grace@example.com");
    assert_eq!(body["role"], json!({ "kind": "assigned", "role_id": "member" }));

    let member = app.store.get_role("member").await.unwrap().unwrap();
    assert_eq!(member.users_count, 1);
}

#[tokio::test]
async fn test_create_user_with_explicit_role() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/users",
            Some(&token),
            Some(json!({
                "email": generate_unique_email(),
                "display_name": "Waiting",
                "role_id": "pending"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"]["role_id"], "pending");

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/users",
            Some(&token),
            Some(json!({
                "email": generate_unique_email(),
                "display_name": "Nobody",
                "role_id": "ghost"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_user_rejects_duplicate_and_invalid_email() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let body = json!({ "email": "dup@example.com", "display_name": "Dup" });

    let (status, _) = app
        .request("POST", "/api/admin/users", Some(&token), Some(body.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .request("POST", "/api/admin/users", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/users",
            Some(&token),
            Some(json!({ "email": "not-an-email", "display_name": "X" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_list_users_filters() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    app.create_user_with_role("member").await;
    app.create_legacy_user(LegacyRole::Member).await;
    app.create_legacy_user(LegacyRole::Pending).await;

    let (status, body) = app
        .request("GET", "/api/admin/users", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 4);

    let (_, body) = app
        .request("GET", "/api/admin/users?legacy=true", Some(&token), None)
        .await;
    assert_eq!(body["meta"]["total"], 2);
    assert!(
        body["data"]
            .as_array()
            .unwrap()
            .iter()
            .all(|u| u["role"]["kind"] == "legacy")
    );

    let (_, body) = app
        .request("GET", "/api/admin/users?role_id=member", Some(&token), None)
        .await;
    assert_eq!(body["meta"]["total"], 1);

    let (_, body) = app
        .request("GET", "/api/admin/users?limit=2", Some(&token), None)
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["meta"]["has_more"], true);
}

#[tokio::test]
async fn test_get_user() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let user = app.create_user_with_role("pending").await;

    let (status, body) = app
        .request("GET", &format!("/api/admin/users/{}", user.id), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], user.email);

    let (status, _) = app
        .request(
            "GET",
            &format!("/api/admin/users/{}", Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_assign_role_moves_counters() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let user = app.create_user_with_role("pending").await;
    let uri = format!("/api/admin/users/{}/role", user.id);

    let (status, body) = app
        .request("PUT", &uri, Some(&token), Some(json!({ "role_id": "member" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["previous_role_id"], "pending");
    assert_eq!(body["role_id"], "member");
    assert_eq!(body["changed"], true);

    let pending = app.store.get_role("pending").await.unwrap().unwrap();
    let member = app.store.get_role("member").await.unwrap().unwrap();
    assert_eq!(pending.users_count, 0);
    assert_eq!(member.users_count, 1);

    // Same role again is a no-op
    let (status, body) = app
        .request("PUT", &uri, Some(&token), Some(json!({ "role_id": "member" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], false);
    let member = app.store.get_role("member").await.unwrap().unwrap();
    assert_eq!(member.users_count, 1);
}

#[tokio::test]
async fn test_assign_role_errors() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let user = app.create_user_with_role("pending").await;

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", user.id),
            Some(&token),
            Some(json!({ "role_id": "ghost" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "role_id": "member" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .request(
            "PUT",
            &format!("/api/admin/users/{}/role", user.id),
            Some(&token),
            Some(json!({ "role_id": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    // Failed assignments leave the user untouched
    let stored = app.store.get_user(user.id).await.unwrap().unwrap();
    assert_eq!(stored.role.role_id(), Some("pending"));
}

#[tokio::test]
async fn test_bulk_assign_reports_each_user() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;
    let pending = app.create_user_with_role("pending").await;
    let already = app.create_user_with_role("member").await;
    let legacy = app.create_legacy_user(LegacyRole::Owner).await;
    let missing = Uuid::new_v4();

    let (status, body) = app
        .request(
            "POST",
            "/api/admin/users/bulk-role",
            Some(&token),
            Some(json!({
                "role_id": "member",
                "user_ids": [pending.id, already.id, legacy.id, missing, pending.id]
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assigned"], json!([pending.id, legacy.id]));
    assert_eq!(body["unchanged"], json!([already.id]));
    assert_eq!(body["failed"].as_array().unwrap().len(), 1);
    assert_eq!(body["failed"][0]["user_id"], missing.to_string());

    let member = app.store.get_role("member").await.unwrap().unwrap();
    assert_eq!(member.users_count, 3);
    assert_eq!(app.store.count_users_with_role("member").await.unwrap(), 3);
}

#[tokio::test]
async fn test_bulk_assign_validation() {
    let app = TestApp::new().await;
    let token = app.admin_token().await;

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/users/bulk-role",
            Some(&token),
            Some(json!({ "role_id": "member", "user_ids": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = app
        .request(
            "POST",
            "/api/admin/users/bulk-role",
            Some(&token),
            Some(json!({ "role_id": "ghost", "user_ids": [Uuid::new_v4()] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
