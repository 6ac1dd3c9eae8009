// ABOUTME: Chat message types for the recipe assistant transcript
// ABOUTME: Defines message roles, response kinds, and immutable ChatMessage records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::recipe::Recipe;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user
    User,
    /// Reply produced by the backend assistant
    Assistant,
}

impl MessageRole {
    /// Wire name of the role
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// Server-supplied discriminator classifying an assistant reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    /// Plain conversational reply
    Chat,
    /// Recipe search result
    Recipe,
    /// Product search result for the shopping cart
    Cart,
}

impl ResponseKind {
    /// Parse a wire discriminator, returning `None` for unknown values
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "chat" => Some(Self::Chat),
            "recipe" => Some(Self::Recipe),
            "cart" => Some(Self::Cart),
            _ => None,
        }
    }

    /// Wire name of the kind
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Recipe => "recipe",
            Self::Cart => "cart",
        }
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One turn of conversation
///
/// Messages are immutable once appended to a session; corrections are made by
/// appending a new message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author of the message
    pub role: MessageRole,
    /// Text content (may be empty for image-only user messages)
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
    /// Attached image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Recipes returned with an assistant reply
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<Recipe>>,
    /// Response kind of an assistant reply
    #[serde(default, rename = "chatType", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ResponseKind>,
}

impl ChatMessage {
    /// Create a user-authored message
    pub fn user(content: impl Into<String>, image: Option<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
            image,
            recipes: None,
            kind: None,
        }
    }

    /// Create an assistant reply for a successful round trip
    pub fn assistant(content: impl Into<String>, kind: ResponseKind, recipes: Vec<Recipe>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            created_at: Utc::now(),
            image: None,
            recipes: if recipes.is_empty() {
                None
            } else {
                Some(recipes)
            },
            kind: Some(kind),
        }
    }

    /// Create an assistant message carrying an error text
    pub fn assistant_error(message: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: message.into(),
            created_at: Utc::now(),
            image: None,
            recipes: None,
            kind: None,
        }
    }

    /// Whether the message was typed by the user
    #[must_use]
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    /// Recipes attached to this message (empty when none)
    #[must_use]
    pub fn recipes(&self) -> &[Recipe] {
        self.recipes.as_deref().unwrap_or_default()
    }
}
