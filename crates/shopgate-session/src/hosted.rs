//! Typed client for the hosted auth service (GoTrue-compatible REST).
//!
//! ## Endpoints
//!
//! | Method | Path | Use |
//! |--------|------|-----|
//! | GET    | `/auth/v1/user` | validate an access token |
//! | POST   | `/auth/v1/token?grant_type=refresh_token` | rotate an expired pair |
//! | GET    | `/auth/v1/health` | readiness |
//!
//! Every request carries the project `apikey` header. User lookups add
//! `Authorization: Bearer <access token>`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::Deserialize;

use crate::config::{ConfigError, HostedAuthConfig};
use crate::context::RequestContext;
use crate::error::SessionError;
use crate::provider::SessionProvider;
use crate::session::{Session, TokenPair};

const USER_PATH: &str = "auth/v1/user";
const TOKEN_PATH: &str = "auth/v1/token";
const HEALTH_PATH: &str = "auth/v1/health";

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
    user: UserResponse,
}

/// Session provider backed by the hosted auth service.
#[derive(Debug, Clone)]
pub struct HostedAuthProvider {
    http: reqwest::Client,
    config: HostedAuthConfig,
}

impl HostedAuthProvider {
    /// Create a provider from configuration.
    pub fn new(config: HostedAuthConfig) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = HeaderMap::new();
                let mut key = HeaderValue::from_str(config.api_key.as_str())
                    .map_err(|_| ConfigError::InvalidApiKey)?;
                key.set_sensitive(true);
                headers.insert("apikey", key);
                headers
            })
            .build()
            .map_err(|e| SessionError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self { http, config })
    }

    /// Validate `access_token`. `Ok(None)` when the service rejects it.
    async fn fetch_user(&self, access_token: &str) -> Result<Option<UserResponse>, SessionError> {
        let endpoint = format!("GET /{USER_PATH}");
        let url = self.config.endpoint(USER_PATH);

        let resp = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| SessionError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| SessionError::Deserialization {
                endpoint,
                source: e,
            })
    }

    /// Exchange `refresh_token` for a new pair. `Ok(None)` when the grant is refused.
    async fn refresh(&self, refresh_token: &str) -> Result<Option<RefreshResponse>, SessionError> {
        let endpoint = format!("POST /{TOKEN_PATH}");
        let url = self.config.endpoint(TOKEN_PATH);

        let resp = self
            .http
            .post(&url)
            .query(&[("grant_type", "refresh_token")])
            .json(&serde_json::json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(|e| SessionError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if matches!(
            resp.status(),
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            return Ok(None);
        }

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SessionError::Api {
                endpoint,
                status,
                body,
            });
        }

        resp.json()
            .await
            .map(Some)
            .map_err(|e| SessionError::Deserialization {
                endpoint,
                source: e,
            })
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Option<Session>, SessionError> {
        let Some(grant) = self.refresh(refresh_token).await? else {
            tracing::debug!("refresh token rejected");
            return Ok(None);
        };

        tracing::debug!(subject = %grant.user.id, "session refreshed");
        let tokens = TokenPair::new(grant.access_token, grant.refresh_token, grant.expires_in);
        Ok(Some(user_session(grant.user).with_refreshed(tokens)))
    }
}

fn user_session(user: UserResponse) -> Session {
    Session {
        subject: user.id,
        email: user.email,
        expires_at: None,
        refreshed: None,
    }
}

#[async_trait]
impl SessionProvider for HostedAuthProvider {
    async fn get_session(&self, ctx: &RequestContext) -> Result<Option<Session>, SessionError> {
        let Some(access_token) = ctx.access_token() else {
            return match ctx.refresh_token() {
                Some(refresh_token) => self.refresh_session(refresh_token).await,
                None => Ok(None),
            };
        };

        if let Some(user) = self.fetch_user(access_token).await? {
            return Ok(Some(user_session(user)));
        }

        match ctx.refresh_token() {
            Some(refresh_token) => self.refresh_session(refresh_token).await,
            None => {
                tracing::debug!("access token rejected, no refresh token");
                Ok(None)
            }
        }
    }

    async fn health_check(&self) -> Result<(), SessionError> {
        let endpoint = format!("GET /{HEALTH_PATH}");
        let resp = self
            .http
            .get(self.config.endpoint(HEALTH_PATH))
            .send()
            .await
            .map_err(|e| SessionError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(SessionError::Api {
                endpoint,
                status: resp.status().as_u16(),
                body: String::new(),
            })
        }
    }

    fn name(&self) -> &'static str {
        "hosted"
    }
}
