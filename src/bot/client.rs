//! HTTP client for the service API, authenticated as the bot account.
//!
//! A `401` triggers one token refresh (or a fresh login when the refresh token is no longer
//! accepted) followed by exactly one retry. Any other failure propagates.

use crate::{
    api::dto::{
        ErrorDto, LoginRequest, LoginResponse, MarkNotifiedRequest, MarkNotifiedResponse,
        PendingOrderDto, RefreshRequest, RefreshResponse,
    },
    errors::{Error, Result},
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
struct Tokens {
    access: String,
    refresh: String,
}

/// Client for the endpoints the bot uses.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    username: String,
    password: String,
    tokens: RwLock<Option<Tokens>>,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str, username: &str, password: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            username: username.to_string(),
            password: password.to_string(),
            tokens: RwLock::new(None),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Logs in with the bot credentials and keeps both tokens.
    pub async fn login(&self) -> Result<()> {
        let response = self
            .http
            .post(self.url("/api/v1/auth/login"))
            .json(&LoginRequest {
                username: self.username.clone(),
                password: self.password.clone(),
            })
            .send()
            .await?;
        let body: LoginResponse = parse(response).await?;

        *self.tokens.write().await = Some(Tokens {
            access: body.access_token,
            refresh: body.refresh_token,
        });
        info!("Logged in to the API as '{}'", self.username);
        Ok(())
    }

    async fn refresh_session(&self) -> Result<()> {
        let refresh = self.tokens.read().await.as_ref().map(|t| t.refresh.clone());
        let Some(refresh_token) = refresh else {
            return self.login().await;
        };

        let response = self
            .http
            .post(self.url("/api/v1/auth/refresh"))
            .json(&RefreshRequest { refresh_token })
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            warn!("Refresh token rejected, logging in again");
            return self.login().await;
        }
        let body: RefreshResponse = parse(response).await?;

        if let Some(tokens) = self.tokens.write().await.as_mut() {
            tokens.access = body.access_token;
        }
        debug!("Access token refreshed");
        Ok(())
    }

    async fn access_token(&self) -> Result<String> {
        if let Some(tokens) = self.tokens.read().await.as_ref() {
            return Ok(tokens.access.clone());
        }
        self.login().await?;
        self.tokens
            .read()
            .await
            .as_ref()
            .map(|t| t.access.clone())
            .ok_or(Error::Unauthorized)
    }

    async fn send<T, F>(&self, build: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: Fn(&reqwest::Client) -> reqwest::RequestBuilder,
    {
        let token = self.access_token().await?;
        let response = build(&self.http).bearer_auth(&token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return parse(response).await;
        }

        debug!("Access token rejected, refreshing and retrying once");
        self.refresh_session().await?;
        let token = self.access_token().await?;
        let response = build(&self.http).bearer_auth(&token).send().await?;
        parse(response).await
    }

    /// Orders due within the next `within_minutes` that were not announced yet.
    pub async fn fetch_pending(&self, within_minutes: i64) -> Result<Vec<PendingOrderDto>> {
        let url = self.url("/api/telegram");
        self.send(|http| {
            http.get(&url)
                .query(&[("within_minutes", within_minutes)])
        })
        .await
    }

    /// Flags orders as announced; returns how many changed.
    pub async fn mark_notified(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let url = self.url("/api/telegram");
        let body = MarkNotifiedRequest { ids: ids.to_vec() };
        let response: MarkNotifiedResponse = self.send(|http| http.patch(&url).json(&body)).await?;
        Ok(response.updated)
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let message = response
        .json::<ErrorDto>()
        .await
        .map(|e| e.error)
        .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::{
        core::{order, types::Role},
        test_utils::*,
    };
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_fetch_and_mark() -> Result<()> {
        let app = setup_test_app().await?;
        create_test_user(&app.state.db, "bot", Role::Manager).await?;
        let soon = order::create_order(
            &app.state.db,
            order_input(Utc::now() + Duration::minutes(20)),
            "manager",
        )
        .await?;

        let client = ApiClient::new(&serve_test_app(&app).await, "bot", TEST_PASSWORD);
        let pending = client.fetch_pending(60).await?;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, soon.id);

        assert_eq!(client.mark_notified(&[soon.id]).await?, 1);
        assert!(client.fetch_pending(60).await?.is_empty());
        assert_eq!(client.mark_notified(&[]).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_refreshes_rejected_access_token() -> Result<()> {
        let app = setup_test_app().await?;
        create_test_user(&app.state.db, "bot", Role::Manager).await?;

        let client = ApiClient::new(&serve_test_app(&app).await, "bot", TEST_PASSWORD);
        client.login().await?;
        let refresh_before = client.tokens.read().await.clone().unwrap().refresh;
        client.tokens.write().await.as_mut().unwrap().access = "garbage".to_string();

        assert!(client.fetch_pending(60).await?.is_empty());

        let tokens = client.tokens.read().await.clone().unwrap();
        assert_ne!(tokens.access, "garbage");
        assert_eq!(tokens.refresh, refresh_before);

        Ok(())
    }

    #[tokio::test]
    async fn test_relogs_when_refresh_token_rejected() -> Result<()> {
        let app = setup_test_app().await?;
        create_test_user(&app.state.db, "bot", Role::Manager).await?;

        let client = ApiClient::new(&serve_test_app(&app).await, "bot", TEST_PASSWORD);
        *client.tokens.write().await = Some(Tokens {
            access: "garbage".to_string(),
            refresh: "also-garbage".to_string(),
        });

        assert!(client.fetch_pending(60).await?.is_empty());
        assert_ne!(
            client.tokens.read().await.clone().unwrap().refresh,
            "also-garbage"
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_errors_propagate() -> Result<()> {
        let app = setup_test_app().await?;
        create_test_user(&app.state.db, "ads", Role::Advertising).await?;

        let client = ApiClient::new(&serve_test_app(&app).await, "ads", TEST_PASSWORD);
        let err = client.fetch_pending(60).await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 403, .. }));

        let client = ApiClient::new(&serve_test_app(&app).await, "ads", "wrong-password");
        let err = client.login().await.unwrap_err();
        assert!(matches!(err, Error::Api { status: 401, .. }));

        Ok(())
    }
}
