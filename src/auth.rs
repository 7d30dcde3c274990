//! Cookie-session authentication against the site backend.
//!
//! The backend sets an httpOnly session cookie on login. The HTTP client's
//! cookie store keeps and sends it; this module never reads it.

use crate::config::Config;
use anyhow::Result;
use chrono::NaiveDateTime;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const LOGIN_PAGE: &str = "/static/login.html";

/// Pages that require a signed-in user.
pub const PROTECTED_PAGES: [&str; 3] = ["dashboard.html", "client_home.html", "admin.html"];

const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{message} (retry after {}s)", .retry_after.as_secs())]
    RateLimited {
        message: String,
        retry_after: Duration,
        code: String,
    },

    #[error("{0}")]
    Rejected(String),

    #[error("session is not authenticated")]
    Unauthorized,

    #[error("Network error")]
    Network(#[from] reqwest::Error),
}

/// Where the page is and how to leave it.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn redirect(&self, location: &str);
}

/// Navigator that records redirects instead of performing them.
#[derive(Debug, Default)]
pub struct MemoryNavigator {
    path: Mutex<String>,
    redirects: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
            redirects: Mutex::new(Vec::new()),
        }
    }

    pub fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for MemoryNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn redirect(&self, location: &str) {
        self.redirects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(location.to_string());
        *self.path.lock().unwrap_or_else(PoisonError::into_inner) = location.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub role: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionStatus {
    pub has_access: bool,
    pub has_active_subscription: bool,
    pub admin_override: bool,
    pub dashboard_url: Option<String>,
    pub subscription_end_date: Option<NaiveDateTime>,
    pub bundle_name: Option<String>,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    full_name: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct RateLimitBody {
    error: Option<String>,
    message: Option<String>,
    retry_after: Option<u64>,
}

/// Defaults applied to a rate-limited login or registration.
struct RateLimitDefaults {
    message: &'static str,
    code: &'static str,
}

const LOGIN_LIMIT: RateLimitDefaults = RateLimitDefaults {
    message: "Too many login attempts",
    code: "too_many_login_attempts",
};

const REGISTER_LIMIT: RateLimitDefaults = RateLimitDefaults {
    message: "Too many registration attempts",
    code: "too_many_registration_attempts",
};

pub struct AuthClient {
    client: reqwest::Client,
    base_url: String,
    navigator: Arc<dyn Navigator>,
}

impl AuthClient {
    /// `client` must keep cookies (`cookie_store(true)`) for the session to
    /// survive between calls.
    pub fn new(client: reqwest::Client, base_url: &str, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            navigator,
        }
    }

    pub fn from_config(config: &Config, navigator: Arc<dyn Navigator>) -> Result<Self> {
        Ok(Self::new(config.http_client()?, &config.base_url, navigator))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Whether `path` is a page only signed-in users may see.
    pub fn requires_auth(path: &str) -> bool {
        PROTECTED_PAGES.iter().any(|page| path.contains(page))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .form(&[("username", email), ("password", password)])
            .send()
            .await?;

        let result: Result<LoginResponse, AuthError> =
            Self::parse_credentials_response(response, &LOGIN_LIMIT, "Login failed").await;
        match &result {
            Ok(_) => info!("Login succeeded"),
            Err(e) => warn!("Login failed: {}", e),
        }
        result
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<User, AuthError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&RegisterRequest {
                email,
                password,
                full_name,
            })
            .send()
            .await?;

        let result: Result<User, AuthError> =
            Self::parse_credentials_response(response, &REGISTER_LIMIT, "Registration failed").await;
        match &result {
            Ok(user) => info!("Registered user {}", user.id),
            Err(e) => warn!("Registration failed: {}", e),
        }
        result
    }

    async fn parse_credentials_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        limits: &RateLimitDefaults,
        fallback: &str,
    ) -> Result<T, AuthError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        if status == StatusCode::TOO_MANY_REQUESTS {
            let body: RateLimitBody = response.json().await.unwrap_or_default();
            return Err(AuthError::RateLimited {
                message: body.message.unwrap_or_else(|| limits.message.to_string()),
                retry_after: Duration::from_secs(
                    body.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
                ),
                code: body.error.unwrap_or_else(|| limits.code.to_string()),
            });
        }

        let body: Value = response.json().await.unwrap_or(Value::Null);
        let message = match body.get("detail") {
            Some(Value::String(detail)) if !detail.is_empty() => detail.clone(),
            Some(Value::String(_)) | Some(Value::Null) | None => fallback.to_string(),
            Some(other) => other.to_string(),
        };
        Err(AuthError::Rejected(message))
    }

    /// Leave the page for the login page, unless already on login or
    /// registration.
    pub fn redirect_to_login(&self) {
        let path = self.navigator.current_path();
        if path.contains("login") || path.contains("register") {
            debug!("Already on {}, not redirecting", path);
            return;
        }
        self.navigator.redirect(LOGIN_PAGE);
    }

    /// GET an authenticated endpoint. A 401 sends the user to login.
    async fn authenticated_get(&self, path: &str) -> Result<reqwest::Response, AuthError> {
        let response = self.client.get(self.url(path)).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            info!("Session not authenticated for {}", path);
            self.redirect_to_login();
            return Err(AuthError::Unauthorized);
        }
        if !response.status().is_success() {
            return Err(AuthError::Rejected(format!(
                "Request failed ({})",
                response.status()
            )));
        }
        Ok(response)
    }

    /// The signed-in user, or `None` on any failure.
    pub async fn current_user(&self) -> Option<User> {
        match self.fetch_current_user().await {
            Ok(user) => Some(user),
            Err(AuthError::Unauthorized) => None,
            Err(e) => {
                error!("Error getting current user: {}", e);
                None
            }
        }
    }

    async fn fetch_current_user(&self) -> Result<User, AuthError> {
        Ok(self.authenticated_get("/auth/me").await?.json().await?)
    }

    pub async fn subscription_status(&self) -> Result<SubscriptionStatus, AuthError> {
        Ok(self
            .authenticated_get("/auth/me/subscription")
            .await?
            .json()
            .await?)
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_user().await.is_some()
    }

    /// Redirect to login unless signed in. Returns whether the page may stay.
    pub async fn protect_page(&self) -> bool {
        if self.is_authenticated().await {
            return true;
        }
        self.redirect_to_login();
        false
    }

    /// Clear the session, then go to the login page whatever happened.
    pub async fn logout(&self) {
        if let Err(e) = self.client.post(self.url("/auth/logout")).send().await {
            error!("Logout error: {}", e);
        }
        self.redirect_to_login();
    }
}
