#![allow(dead_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tempfile::TempDir;
use tower::ServiceExt;

use solicitudes_api::auth::jwt::{generate_access_token, JwtConfig};
use solicitudes_api::config::ServerConfig;
use solicitudes_api::router::build_app_router;
use solicitudes_api::state::AppState;
use solicitudes_db::models::user::CreateUser;
use solicitudes_db::repositories::UserRepo;

pub const TEST_SECRET: &str = "test-secret-that-is-long-enough-for-hmac";
pub const BOUNDARY: &str = "----solicitudes-test-boundary";

/// Build a test `ServerConfig` rooted at `media_root`.
pub fn test_config(media_root: &std::path::Path) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            access_token_expiry_mins: 15,
        },
        media_root: media_root.to_path_buf(),
        media_url: "/media/".to_string(),
        public_base_url: "http://testserver".to_string(),
        annulled_status_id: 5,
        max_upload_bytes: 1024 * 1024,
        time_zone: "UTC".to_string(),
    }
}

/// The application under test with its private media directory.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub media: TempDir,
}

impl TestApp {
    /// Full router with the production middleware stack over `pool`.
    pub fn new(pool: PgPool) -> Self {
        Self::with_config(pool, |_| {})
    }

    /// Same as [`TestApp::new`], letting the caller tweak the config.
    pub fn with_config(pool: PgPool, tweak: impl FnOnce(&mut ServerConfig)) -> Self {
        let media = tempfile::tempdir().unwrap();
        let mut config = test_config(media.path());
        tweak(&mut config);
        let state = AppState::new(pool, config.clone());
        let router = build_app_router(state.clone(), &config);
        Self {
            router,
            state,
            media,
        }
    }

    /// App whose pool never connects: for paths rejected before any query.
    pub fn without_database() -> Self {
        let pool = PgPoolOptions::new()
            .acquire_timeout(Duration::from_millis(200))
            .connect_lazy("postgres://nobody@127.0.0.1:1/unreachable")
            .unwrap();
        Self::new(pool)
    }

    pub fn token(&self, user_id: i64) -> String {
        generate_access_token(user_id, &self.state.config.jwt).unwrap()
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Response {
        let mut builder = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, token: &str, body: serde_json::Value) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap();
        self.send(request).await
    }

    /// POST a multipart form with text `fields` and `(field, filename, bytes)` files.
    pub async fn post_multipart(
        &self,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        files: &[(&str, &str, &[u8])],
    ) -> Response {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(
                CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields, files)))
            .unwrap();
        self.send(request).await
    }
}

/// Encode a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(fields: &[(&str, &str)], files: &[(&str, &str, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    for (name, file_name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

static NEXT_RUT: AtomicU32 = AtomicU32::new(1);

/// Insert a user and return its id.
pub async fn create_user(pool: &PgPool, suffix: &str) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            email: format!("{suffix}@techo.cl"),
            rut: format!("{}-0", 20_000_000 + NEXT_RUT.fetch_add(1, Ordering::Relaxed)),
            first_name: "Ana".to_string(),
            last_name: "Pérez".to_string(),
            apellido_materno: "Soto".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}
