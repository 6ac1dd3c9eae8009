// ABOUTME: Backend service interface for chat, session, persistence, and bookmark calls
// ABOUTME: Defines the ChatBackend trait injected into the orchestrator and its request types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Backend Service Interface
//!
//! Everything that crosses the network goes through [`ChatBackend`]. The
//! orchestrator receives it as `Arc<dyn ChatBackend>`, so there is no ambient
//! client singleton; [`HttpBackend`] is the production implementation and tests
//! plug in an in-memory one.
//!
//! Chat replies are returned as raw JSON on purpose: shape handling belongs to
//! the normalizer, which runs once at the boundary.

mod http;
pub mod wire;

pub use http::{HttpBackend, HttpBackendConfig};

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::chat::{CartItem, RecipeCard};
use crate::constants::placeholders::IMAGE_ONLY_PROMPT;
use crate::errors::{AppError, AppResult};
use crate::models::{ChatMessage, SessionSummary};

/// Body of one chat round trip
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatRequest {
    /// Text sent to the assistant (never empty)
    pub message: String,
    /// Attached image reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Existing session; `None` lets the backend allocate one
    #[serde(rename = "chat_id", skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl ChatRequest {
    /// Build a request from user input
    ///
    /// An image without text is sent with a fixed prompt so the request text is
    /// never empty.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when neither text nor image is given.
    pub fn new(text: &str, image: Option<String>, session_id: Option<String>) -> AppResult<Self> {
        let text = text.trim();
        let message = match (text.is_empty(), &image) {
            (false, _) => text.to_owned(),
            (true, Some(_)) => IMAGE_ONLY_PROMPT.to_owned(),
            (true, None) => return Err(AppError::invalid_input("Message text is empty")),
        };
        Ok(Self {
            message,
            image,
            session_id,
        })
    }
}

/// Full contents of a stored session
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionDetail {
    /// Server-issued identifier
    pub id: String,
    /// Transcript in order
    pub messages: Vec<ChatMessage>,
    /// Recipe cards saved with the session
    pub recipes: Vec<RecipeCard>,
    /// Cart items saved with the session
    pub cart_items: Vec<CartItem>,
}

/// Remote services used by the recipe assistant
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send one chat message and return the raw reply
    async fn send_message(&self, request: &ChatRequest) -> AppResult<Value>;

    /// List the user's sessions (without message bodies)
    async fn list_sessions(&self) -> AppResult<Vec<SessionSummary>>;

    /// Fetch one session with its transcript and saved records
    async fn get_session(&self, session_id: &str) -> AppResult<SessionDetail>;

    /// Persist recipe cards for a session
    async fn save_recipes(&self, session_id: &str, recipes: &[RecipeCard]) -> AppResult<()>;

    /// Persist cart items for a session
    async fn save_cart_items(&self, session_id: &str, items: &[CartItem]) -> AppResult<()>;

    /// Flip the bookmark state of a recipe, returning the new state
    async fn toggle_bookmark(&self, recipe_id: &str) -> AppResult<bool>;

    /// Whether a recipe is bookmarked
    async fn is_bookmarked(&self, recipe_id: &str) -> AppResult<bool>;

    /// All bookmarked recipes
    async fn list_bookmarks(&self) -> AppResult<Vec<RecipeCard>>;
}
