// ABOUTME: HTTP implementation of the chat backend on top of reqwest
// ABOUTME: Attaches the bearer credential, maps status codes, and decodes responses
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use super::wire::{decode_bookmark_state, decode_recipe_cards, decode_session_detail, decode_session_list};
use super::{ChatBackend, ChatRequest, SessionDetail};
use crate::chat::{CartItem, RecipeCard};
use crate::constants::service_names::RECIPE_API;
use crate::errors::{AppError, AppResult};
use crate::models::SessionSummary;

/// HTTP backend configuration
#[derive(Debug, Clone)]
pub struct HttpBackendConfig {
    /// API root, without a trailing slash (e.g. `http://localhost:8000/api`)
    pub base_url: String,
    /// Bearer credential attached to every request
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for HttpBackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api".to_owned(),
            token: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Recipe assistant REST client
pub struct HttpBackend {
    config: HttpBackendConfig,
    http_client: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the configured API root
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the HTTP client cannot be built.
    pub fn new(mut config: HttpBackendConfig) -> AppResult<Self> {
        let trimmed = config.base_url.trim_end_matches('/').len();
        config.base_url.truncate(trimmed);

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// API root this client talks to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.config.base_url.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    async fn call<B: Serialize + Sync>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> AppResult<Value> {
        let mut request = self.http_client.request(method.clone(), url);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, %url, %status, "Recipe API response");

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!(%status, "Recipe API rejected the credential");
            return Err(AppError::auth_expired(format!(
                "{RECIPE_API} rejected the credential (HTTP {status})"
            )));
        }

        if !status.is_success() {
            return Err(AppError::external_service(
                RECIPE_API,
                format!(
                    "HTTP {}: {}",
                    status,
                    response.text().await.unwrap_or_default()
                ),
            ));
        }

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| {
            AppError::invalid_format(format!("{RECIPE_API} returned invalid JSON: {e}"))
        })
    }

    async fn get(&self, url: &str) -> AppResult<Value> {
        self.call::<Value>(Method::GET, url, None).await
    }

    async fn post<B: Serialize + Sync>(&self, url: &str, body: &B) -> AppResult<Value> {
        self.call(Method::POST, url, Some(body)).await
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    #[instrument(skip(self, request), fields(session_id = ?request.session_id))]
    async fn send_message(&self, request: &ChatRequest) -> AppResult<Value> {
        self.post(&self.endpoint(&["chat"]), request).await
    }

    async fn list_sessions(&self) -> AppResult<Vec<SessionSummary>> {
        let payload = self.get(&self.endpoint(&["chats"])).await?;
        Ok(decode_session_list(&payload))
    }

    #[instrument(skip(self))]
    async fn get_session(&self, session_id: &str) -> AppResult<SessionDetail> {
        let payload = self.get(&self.endpoint(&["chats", session_id])).await?;
        if payload.is_null() {
            return Err(AppError::not_found(format!("Chat session {session_id}")));
        }
        Ok(decode_session_detail(session_id, &payload))
    }

    async fn save_recipes(&self, session_id: &str, recipes: &[RecipeCard]) -> AppResult<()> {
        self.post(
            &self.endpoint(&["chats", session_id, "recipes"]),
            &json!({ "recipes": recipes }),
        )
        .await
        .map(drop)
    }

    async fn save_cart_items(&self, session_id: &str, items: &[CartItem]) -> AppResult<()> {
        self.post(
            &self.endpoint(&["chats", session_id, "cart"]),
            &json!({ "cart_items": items }),
        )
        .await
        .map(drop)
    }

    async fn toggle_bookmark(&self, recipe_id: &str) -> AppResult<bool> {
        let payload = self
            .post(&self.endpoint(&["bookmarks", recipe_id]), &json!({}))
            .await?;
        Ok(decode_bookmark_state(&payload))
    }

    async fn is_bookmarked(&self, recipe_id: &str) -> AppResult<bool> {
        let payload = self.get(&self.endpoint(&["bookmarks", recipe_id])).await?;
        Ok(decode_bookmark_state(&payload))
    }

    async fn list_bookmarks(&self) -> AppResult<Vec<RecipeCard>> {
        let payload = self.get(&self.endpoint(&["bookmarks"])).await?;
        Ok(decode_recipe_cards(&payload))
    }
}
