//! Test helpers module
//!
//! Drives the full router in-process over the in-memory store, with a mailer
//! that records what would have been sent.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use event_management::config::Settings;
use event_management::database::DatabaseService;
use event_management::handlers::router;
use event_management::services::{EmailMessage, Mailer};
use event_management::state::AppState;
use event_management::utils::errors::{EventManagementError, Result};

/// Keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<()> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

/// Fails every delivery, like an unreachable SMTP relay
pub struct FailingMailer;

#[async_trait]
impl Mailer for FailingMailer {
    async fn send(&self, _message: EmailMessage) -> Result<()> {
        Err(EventManagementError::Mail("connection refused".to_string()))
    }
}

pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.database.url = "memory://".to_string();
    settings.auth.jwt_secret = "integration-test-secret".to_string();
    settings.rate_limit.enabled = false;
    settings
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

pub struct TestApp {
    pub router: Router,
    pub mailer: Arc<RecordingMailer>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: Settings) -> Self {
        let mailer = Arc::new(RecordingMailer::default());
        let state = AppState::new(settings, DatabaseService::in_memory(), mailer.clone());
        Self {
            router: router(state),
            mailer,
        }
    }

    /// App whose mail deliveries all fail
    pub fn with_failing_mailer() -> Self {
        let state = AppState::new(test_settings(), DatabaseService::in_memory(), Arc::new(FailingMailer));
        Self {
            router: router(state),
            mailer: Arc::new(RecordingMailer::default()),
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        TestResponse { status, body }
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    /// Send `body` verbatim as JSON, malformed or not
    pub async fn raw(&self, method: Method, uri: &str, token: Option<&str>, body: &'static str) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(builder.body(Body::from(body)).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    /// Register an account and return its id
    pub async fn register_user(&self, username: &str, password: &str) -> i64 {
        let response = self
            .post(
                "/api/users/register/",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": password,
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["id"].as_i64().unwrap()
    }

    /// Obtain a token pair; returns `(access, refresh)`
    pub async fn tokens(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .post("/api/token/", None, json!({ "username": username, "password": password }))
            .await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        (
            response.body["access"].as_str().unwrap().to_string(),
            response.body["refresh"].as_str().unwrap().to_string(),
        )
    }

    /// Register, log in, and return `(user id, access token)`
    pub async fn login_as(&self, username: &str) -> (i64, String) {
        let id = self.register_user(username, "pw123").await;
        let (access, _) = self.tokens(username, "pw123").await;
        (id, access)
    }

    pub async fn create_event(&self, token: &str, title: &str, location: &str) -> Value {
        let response = self.post("/api/events/", Some(token), event_body(title, location)).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body
    }
}

pub fn event_body(title: &str, location: &str) -> Value {
    json!({
        "title": title,
        "description": "Talks and workshops",
        "date": "2025-07-20T18:00:00Z",
        "location": location,
    })
}
