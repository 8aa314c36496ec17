// Test harness: the full router over an in-memory store, driven with
// `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::issue_session;
use crate::config::AppConfig;
use crate::database::models::{NewUser, User};
use crate::database::{MemoryStore, UserStore};
use crate::server::app;
use crate::state::AppState;

pub struct TestContext {
    pub app: Router,
    pub store: Arc<MemoryStore>,
    pub state: AppState,
}

impl TestContext {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.security.bcrypt_cost = 4;

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), config);

        Self {
            app: app(state.clone()),
            store,
            state,
        }
    }

    /// Insert a user directly and return it with a valid session token
    pub async fn user(&self, email: &str) -> (User, String) {
        let user = self
            .store
            .create_user(NewUser {
                name: None,
                email: email.to_string(),
                password: None,
            })
            .await
            .expect("create test user");
        let session = issue_session(&user, &self.state.config.security).expect("issue test session");
        (user, session.token)
    }

    pub async fn raw(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Response<Body> {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => request
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .expect("build request");

        self.app.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn raw_body(&self, method: Method, uri: &str, body: &'static str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("build request");

        self.app.clone().oneshot(request).await.expect("router is infallible")
    }

    pub async fn raw_with_cookie(&self, method: Method, uri: &str, token: &str) -> Response<Body> {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::COOKIE, format!("theme=dark; quadra_session={}", token))
            .body(Body::empty())
            .expect("build request");

        self.app.clone().oneshot(request).await.expect("router is infallible")
    }

    /// Send a request and decode the JSON body (`Null` when empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let response = self.raw(method, uri, token, body).await;
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };
        (status, json)
    }
}
