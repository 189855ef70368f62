//! Integration tests for Parti Poodles.
//!
//! The tests drive the full site router in process against the in-memory
//! store, so they need no database or running server:
//!
//! ```bash
//! cargo test -p parti-poodles-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `public_pages` - Public HTML pages and the contact form
//! - `admin` - Login, session handling, and admin forms
//! - `api` - Query and mutation functions, caching, image orientation

#![allow(clippy::missing_panics_doc)]

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use parti_poodles_site::config::SiteConfig;
use parti_poodles_site::db::Store;
use parti_poodles_site::middleware::SESSION_COOKIE_NAME;
use parti_poodles_site::services::{AdminAuthService, ObjectStorage, OrientationCache};
use parti_poodles_site::state::AppState;

/// Username of the admin created by [`TestContext::with_admin`].
pub const ADMIN_USERNAME: &str = "owner";
/// Password of the admin created by [`TestContext::with_admin`].
pub const ADMIN_PASSWORD: &str = "poodles-are-great";

/// A site instance backed by a fresh in-memory store.
pub struct TestContext {
    pub state: AppState,
    router: Router,
}

/// A buffered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    /// The `name=value` pair of the session cookie set by this response.
    #[must_use]
    pub fn session_cookie(&self) -> Option<String> {
        self.headers
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter_map(|v| v.split(';').next())
            .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
            .map(ToString::to_string)
    }

    /// The body parsed as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body is not JSON")
    }
}

impl TestContext {
    /// A site with an empty store.
    #[must_use]
    pub fn new() -> Self {
        let state = AppState::with_parts(
            SiteConfig::default(),
            Store::memory(),
            ObjectStorage::Disabled,
            OrientationCache::new(100),
        )
        .expect("Failed to build test state");
        let router = parti_poodles_site::app(state.clone());
        Self { state, router }
    }

    /// A site with one admin account.
    pub async fn with_admin() -> Self {
        let ctx = Self::new();
        AdminAuthService::new(ctx.state.store())
            .create_user(
                ADMIN_USERNAME,
                ADMIN_PASSWORD,
                Some("owner@partipoodles.com.au".to_string()),
                Some("owner".to_string()),
            )
            .await
            .expect("Failed to create admin");
        ctx
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn request(method: &str, uri: &str, cookie: Option<&str>) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    /// GET a path.
    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> TestResponse {
        let request = Self::request("GET", uri, cookie)
            .body(Body::empty())
            .expect("valid request");
        self.send(request).await
    }

    /// POST an urlencoded form.
    pub async fn post_form(
        &self,
        uri: &str,
        fields: &[(&str, &str)],
        cookie: Option<&str>,
    ) -> TestResponse {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = Self::request("POST", uri, cookie)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("valid request");
        self.send(request).await
    }

    /// POST a JSON body.
    pub async fn post_json(&self, uri: &str, body: &Value, cookie: Option<&str>) -> TestResponse {
        let request = Self::request("POST", uri, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("valid request");
        self.send(request).await
    }

    /// Call a query function.
    pub async fn query(&self, path: &str, args: Value, cookie: Option<&str>) -> TestResponse {
        let body = serde_json::json!({ "path": path, "args": args });
        self.post_json("/api/query", &body, cookie).await
    }

    /// Call a mutation function.
    pub async fn mutation(&self, path: &str, args: Value, cookie: Option<&str>) -> TestResponse {
        let body = serde_json::json!({ "path": path, "args": args });
        self.post_json("/api/mutation", &body, cookie).await
    }

    /// Log in as the seeded admin and return the session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .post_form(
                "/admin-login",
                &[("username", ADMIN_USERNAME), ("password", ADMIN_PASSWORD)],
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::SEE_OTHER, "{}", response.body);
        response.session_cookie().expect("login sets a session cookie")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
