#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use tower::ServiceExt;

use warbler_api::middleware::{SESSION_COOKIE, issue_session_token};
use warbler_api::{AppState, AppStateInner, auth, router};
use warbler_db::Database;
use warbler_db::messages::NewMessage;
use warbler_types::api::SignupRequest;
use warbler_types::models::{Message, User};

pub const PASSWORD: &str = "password";

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestApp {
    pub fn new() -> Self {
        let state: AppState = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            session_secret: "test-secret".into(),
            session_ttl: chrono::Duration::days(1),
        });
        let router = router(state.clone());
        Self { state, router }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    /// Sign up a user with a fixed id and the shared test password.
    pub fn seed_user(&self, id: i64, username: &str, email: &str) -> User {
        auth::signup_with_id(
            self.db(),
            Some(id),
            &SignupRequest {
                username: Some(username.into()),
                email: Some(email.into()),
                password: Some(PASSWORD.into()),
                image_url: None,
            },
        )
        .unwrap()
    }

    pub fn seed_message(&self, id: i64, text: &str, user_id: i64) -> Message {
        self.db()
            .create_message(&NewMessage { id: Some(id), text, user_id })
            .unwrap()
    }

    /// Cookie header value that makes `user_id` the current user.
    pub fn login_cookie(&self, user_id: i64) -> String {
        let token = issue_session_token(&self.state, user_id).unwrap();
        format!("{}={}", SESSION_COOKIE, token)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send("GET", path, cookie, Body::empty(), false).await
    }

    pub async fn post(&self, path: &str, cookie: Option<&str>) -> TestResponse {
        self.send("POST", path, cookie, Body::empty(), false).await
    }

    pub async fn post_json(
        &self,
        path: &str,
        cookie: Option<&str>,
        body: serde_json::Value,
    ) -> TestResponse {
        self.send("POST", path, cookie, Body::from(body.to_string()), true)
            .await
    }

    /// GET the redirect target, carrying the request cookies plus whatever
    /// the redirect set, the way a browser would.
    pub async fn follow_redirect(&self, resp: &TestResponse, cookie: Option<&str>) -> TestResponse {
        assert!(resp.status.is_redirection(), "expected redirect, got {}", resp.status);
        let location = resp.location().expect("redirect without location");
        let jar = merge_cookies(cookie, &resp.headers);
        self.get(&location, jar.as_deref()).await
    }

    async fn send(
        &self,
        method: &str,
        path: &str,
        cookie: Option<&str>,
        body: Body,
        json: bool,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if json {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }

        let resp = self
            .router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

impl TestResponse {
    pub fn location(&self) -> Option<String> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    }

    /// `name=value` pairs from every Set-Cookie header.
    pub fn set_cookies(&self) -> Vec<(String, String)> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }

    pub fn assert_unauthorized_redirect(&self) {
        assert_eq!(self.status, StatusCode::SEE_OTHER);
        assert_eq!(self.location().as_deref(), Some("/"));
    }
}

/// Request cookies overlaid with a response's Set-Cookie headers. An empty
/// value means the cookie was removed.
pub fn merge_cookies(cookie: Option<&str>, headers: &HeaderMap) -> Option<String> {
    let mut jar: BTreeMap<String, String> = BTreeMap::new();
    for pair in cookie.unwrap_or("").split(';').filter(|p| !p.trim().is_empty()) {
        if let Some((k, v)) = pair.split_once('=') {
            jar.insert(k.trim().to_string(), v.trim().to_string());
        }
    }

    let resp = TestResponse {
        status: StatusCode::OK,
        headers: headers.clone(),
        body: String::new(),
    };
    for (k, v) in resp.set_cookies() {
        if v.is_empty() {
            jar.remove(&k);
        } else {
            jar.insert(k, v);
        }
    }

    if jar.is_empty() {
        return None;
    }
    Some(
        jar.into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("; "),
    )
}
