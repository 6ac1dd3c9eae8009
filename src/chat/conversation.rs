// ABOUTME: Conversation accumulator holding the transcript of one chat session
// ABOUTME: Appends outgoing and incoming messages and derives the session title
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::normalizer::NormalizedResponse;
use crate::constants::titles::{DEFAULT_SESSION_TITLE, TITLE_ELLIPSIS, TITLE_MAX_CHARS};
use crate::models::{ChatMessage, SessionId};

/// Truncate a title to the display limit, marking truncation with an ellipsis
#[must_use]
pub fn truncate_title(text: &str) -> String {
    if text.chars().count() > TITLE_MAX_CHARS {
        let kept: String = text.chars().take(TITLE_MAX_CHARS).collect();
        format!("{kept}{TITLE_ELLIPSIS}")
    } else {
        text.to_owned()
    }
}

/// Title of a transcript: its first user message, or the placeholder title
#[must_use]
pub fn compute_title(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .find(|message| message.is_user())
        .map(|message| message.content.trim())
        .filter(|text| !text.is_empty())
        .map_or_else(|| DEFAULT_SESSION_TITLE.to_owned(), truncate_title)
}

/// One conversation thread with its ordered transcript
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    id: SessionId,
    title: String,
    messages: Vec<ChatMessage>,
    last_activity: DateTime<Utc>,
}

impl ChatSession {
    /// Fresh session with a client-generated placeholder identifier
    #[must_use]
    pub fn new_pending() -> Self {
        Self {
            id: SessionId::pending(),
            title: DEFAULT_SESSION_TITLE.to_owned(),
            messages: Vec::new(),
            last_activity: Utc::now(),
        }
    }

    /// Session rebuilt from a server-side transcript
    #[must_use]
    pub fn restored(id: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        let last_activity = messages
            .last()
            .map_or_else(Utc::now, |message| message.created_at);
        Self {
            id: SessionId::persisted(id),
            title: compute_title(&messages),
            messages,
            last_activity,
        }
    }

    /// Session identifier
    #[must_use]
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// Display title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Transcript in order
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Time of the last append
    #[must_use]
    pub const fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Append a message and refresh title and activity time
    pub fn append(&mut self, message: ChatMessage) -> &ChatMessage {
        self.last_activity = message.created_at;
        self.messages.push(message);
        self.title = compute_title(&self.messages);
        &self.messages[self.messages.len() - 1]
    }

    /// Record the user's outgoing message before the backend call
    pub fn record_outgoing(&mut self, text: &str, image: Option<String>) -> &ChatMessage {
        self.append(ChatMessage::user(text.trim(), image))
    }

    /// Record the assistant's reply, whether success or error
    pub fn record_incoming(&mut self, response: &NormalizedResponse) -> &ChatMessage {
        let message = match response {
            NormalizedResponse::Standard(standard) => {
                ChatMessage::assistant(standard.text.clone(), standard.kind, standard.recipes.clone())
            }
            NormalizedResponse::Error { message } => ChatMessage::assistant_error(message.clone()),
        };
        self.append(message)
    }

    /// Replace the placeholder identifier with the one the backend issued
    ///
    /// Returns `true` when the identifier changed.
    pub fn adopt_server_id(&mut self, server_id: &str) -> bool {
        match &self.id {
            SessionId::Pending(placeholder) => {
                debug!(%placeholder, %server_id, "Session persisted by backend");
                self.id = SessionId::persisted(server_id);
                true
            }
            SessionId::Persisted(current) if current != server_id => {
                warn!(%current, %server_id, "Backend reported a different session id, ignoring");
                false
            }
            SessionId::Persisted(_) => false,
        }
    }
}
