//! The auth gate.
//!
//! Credentials are delegated wholesale to the remote auth service; the
//! client only ever sees an opaque uid and the account email back.  Local
//! pre-validation lives in the flows (`crate::flows`), not here: by the
//! time a request reaches an [`AuthService`] the input is well-formed.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::warn;

use salon_shared::{AuthError, Uid};

/// What the auth service returns on success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: Uid,
    pub email: String,
}

/// Remote authentication operations.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Configuration for the hosted auth service.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Base URL of the hosted service, without a trailing slash.
    pub base_url: String,
}

impl AuthConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

/// [`AuthService`] over the hosted HTTP API.
pub struct HttpAuth {
    client: reqwest::Client,
    config: AuthConfig,
}

impl HttpAuth {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/{path}", self.config.base_url.trim_end_matches('/'))
    }

    async fn credentials_call(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthUser, AuthError> {
        let resp = self
            .client
            .post(self.url(path))
            .json(&CredentialsRequest { email, password })
            .send()
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(AuthError::InvalidCredentials)
            }
            status if !status.is_success() => {
                warn!(%status, path, "auth service rejected the request");
                Err(AuthError::Unknown(format!("auth service responded {status}")))
            }
            _ => {
                let body: AuthResponse = resp
                    .json()
                    .await
                    .map_err(|e| AuthError::Unknown(e.to_string()))?;
                Ok(AuthUser {
                    uid: Uid::new(body.uid),
                    email: body.email,
                })
            }
        }
    }
}

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    uid: String,
    email: String,
}

#[async_trait]
impl AuthService for HttpAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.credentials_call("sign-in", email, password).await
    }

    async fn create_account(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.credentials_call("accounts", email, password).await
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let resp = self
            .client
            .post(self.url("sign-out"))
            .send()
            .await
            .map_err(|e| AuthError::Unknown(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(AuthError::Unknown(format!(
                "auth service responded {}",
                resp.status()
            )));
        }
        Ok(())
    }
}
