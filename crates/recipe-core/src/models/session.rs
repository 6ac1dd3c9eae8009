// ABOUTME: Chat session identifiers and session listing records
// ABOUTME: Distinguishes client-generated placeholder IDs from server-issued IDs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::constants::placeholders::PENDING_SESSION_PREFIX;

/// Identifier of a chat session
///
/// A session starts with a client-generated placeholder and switches to the
/// server-issued identifier after its first successful round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "id", rename_all = "lowercase")]
pub enum SessionId {
    /// Placeholder created locally before the backend knows the session
    Pending(String),
    /// Identifier issued by the backend
    Persisted(String),
}

impl SessionId {
    /// Generate a new placeholder identifier
    #[must_use]
    pub fn pending() -> Self {
        Self::Pending(format!("{PENDING_SESSION_PREFIX}{}", Uuid::new_v4()))
    }

    /// Wrap a server-issued identifier
    pub fn persisted(id: impl Into<String>) -> Self {
        Self::Persisted(id.into())
    }

    /// Raw identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending(id) | Self::Persisted(id) => id,
        }
    }

    /// Server-issued identifier, or `None` for a placeholder
    #[must_use]
    pub fn server_id(&self) -> Option<&str> {
        match self {
            Self::Persisted(id) => Some(id),
            Self::Pending(_) => None,
        }
    }

    /// Whether the backend has issued this identifier
    #[must_use]
    pub const fn is_persisted(&self) -> bool {
        matches!(self, Self::Persisted(_))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Entry of the session listing (message bodies are fetched lazily)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Server-issued session identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Time of the last message in the session
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity: Option<DateTime<Utc>>,
}
