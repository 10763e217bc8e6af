//! Requests rejected by authentication or field validation, before any row
//! is written.
//!
//! Token-format failures and the health check run over a pool that never
//! connects. Validation cases need a real database because the acting user
//! is looked up first.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_user, TestApp};
use serde_json::json;
use sqlx::PgPool;

#[tokio::test]
async fn missing_token_returns_401() {
    let app = TestApp::without_database();
    let response = app.get("/solicitudes/documento/1", None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn malformed_token_returns_401() {
    let app = TestApp::without_database();
    let response = app
        .post_json("/solicitudes/filtrar", "not-a-jwt", json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_without_required_fields_returns_400(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let response = app
        .post_json(
            "/solicitudes/crear",
            &token,
            json!({ "sca_titulo": "Techo dañado", "est_id": 1 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(
        json["error"],
        "Los campos 'sca_titulo', 'sca_descripcion' y 'est_id' son obligatorios."
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn create_with_non_integer_status_returns_400(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let response = app
        .post_multipart(
            "/solicitudes/crear",
            &token,
            &[
                ("sca_titulo", "Techo dañado"),
                ("sca_descripcion", "Gotea agua"),
                ("est_id", "uno"),
            ],
            &[],
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn modify_without_fields_returns_400(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let response = app
        .post_json("/solicitudes/modificar", &token, json!({ "sca_id": 3 }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Debe indicar al menos un campo a modificar"));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn filter_with_out_of_range_month_returns_400(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let response = app
        .post_json("/solicitudes/filtrar", &token, json!({ "month": 13 }))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn bitacora_filter_requires_request_id(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let response = app
        .post_json("/solicitudes/bitacora/filtrar", &token, json!({}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "El campo 'solicitud_id' es obligatorio.");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn estado_name_must_not_be_blank(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let response = app
        .post_json(
            "/solicitudes/estado/crear",
            &token,
            json!({ "nombre_estado": "   " }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn invalid_json_body_returns_400(pool: PgPool) {
    let app = TestApp::new(pool.clone());
    let token = app.token(create_user(&pool, "ana").await);

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/solicitudes/anular")
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.send(request).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_reports_degraded_without_database() {
    let app = TestApp::without_database();
    let response = app.get("/health", None).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["db_healthy"], false);
    assert!(json["version"].is_string());
}
