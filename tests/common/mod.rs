//! In-process test client over the in-memory stores

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use local_route_finder::{build_app, config::EnvironmentConfig, state::AppState};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "s3cret-pass";

pub struct TestResponse {
    status: StatusCode,
    body: Value,
}

impl TestResponse {
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn json(&self) -> &Value {
        &self.body
    }
}

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new(config: EnvironmentConfig) -> Self {
        let state = AppState::in_memory(config).expect("state");
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Admin credentials configured, admin auth on
    pub fn with_admin() -> Self {
        Self::new(admin_config())
    }

    /// Moderation endpoints open to anyone
    pub fn open() -> Self {
        Self::new(EnvironmentConfig {
            admin_auth_required: false,
            ..admin_config()
        })
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        self.send(request).await
    }

    /// Send a prepared request, e.g. one carrying `ConnectInfo`.
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    pub async fn admin_token(&self) -> String {
        let response = self
            .post(
                "/auth/admin/login",
                serde_json::json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
            )
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
        response.json()["token"].as_str().expect("token").to_string()
    }
}

pub fn admin_config() -> EnvironmentConfig {
    EnvironmentConfig {
        admin_username: Some(ADMIN_USERNAME.to_string()),
        admin_password_hash: Some(bcrypt::hash(ADMIN_PASSWORD, 4).expect("hash")),
        ..EnvironmentConfig::default()
    }
}
