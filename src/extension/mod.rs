// ABOUTME: Message bridge to the cart-checkout browser extension
// ABOUTME: Presence probing with a bounded wait and checkout requests over a broadcast bus
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Checkout Extension Bridge
//!
//! The extension and the client share one message bus. The client probes for
//! the extension by posting a presence request; the extension is considered
//! installed only if a presence response arrives within the wait bound.
//! Silence is "not installed", never an error.
//!
//! Messages are JSON objects discriminated by their `type` field:
//!
//! ```json
//! { "type": "add-to-cart-request", "urls": ["https://shop/p/1"] }
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info};

use crate::constants::extension::{ADD_TO_CART_REQUEST, PRESENCE_REQUEST, PRESENCE_RESPONSE};
use crate::errors::{AppError, AppResult};

/// Default capacity of the message bus
pub const DEFAULT_BUS_CAPACITY: usize = 32;

/// Message exchanged with the extension
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtensionMessage {
    /// Client asks whether an extension is listening
    #[serde(rename = "extension-presence-request")]
    PresenceRequest,
    /// Extension answers the presence probe
    #[serde(rename = "extension-presence-response")]
    PresenceResponse,
    /// Client hands the selected product addresses to the extension
    #[serde(rename = "add-to-cart-request")]
    AddToCartRequest {
        /// Product addresses in checkout order
        urls: Vec<String>,
    },
    /// Any other page message
    #[serde(other)]
    Unknown,
}

impl ExtensionMessage {
    /// Value of the `type` field
    #[must_use]
    pub const fn message_type(&self) -> &'static str {
        match self {
            Self::PresenceRequest => PRESENCE_REQUEST,
            Self::PresenceResponse => PRESENCE_RESPONSE,
            Self::AddToCartRequest { .. } => ADD_TO_CART_REQUEST,
            Self::Unknown => "unknown",
        }
    }

    /// Parse a message received from the page
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the text is not a typed JSON object.
    pub fn from_json(text: &str) -> AppResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Encode the message for posting to the page
    ///
    /// # Errors
    ///
    /// Returns a serialization error if encoding fails.
    pub fn to_json(&self) -> AppResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Client side of the extension message bus
#[derive(Debug, Clone)]
pub struct ExtensionBridge {
    bus: broadcast::Sender<ExtensionMessage>,
}

impl Default for ExtensionBridge {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl ExtensionBridge {
    /// Bridge with its own bus
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (bus, _) = broadcast::channel(capacity.max(1));
        Self { bus }
    }

    /// Listen to the bus (the extension side subscribes here)
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ExtensionMessage> {
        self.bus.subscribe()
    }

    /// Post a message to every listener, returning how many received it
    pub fn post(&self, message: ExtensionMessage) -> usize {
        debug!(message_type = message.message_type(), "Posting extension message");
        self.bus.send(message).unwrap_or(0)
    }

    /// Probe for the extension, waiting at most `wait` for its answer
    pub async fn is_extension_installed(&self, wait: Duration) -> bool {
        let mut replies = self.bus.subscribe();
        self.post(ExtensionMessage::PresenceRequest);

        let answered = tokio::time::timeout(wait, async {
            loop {
                match replies.recv().await {
                    Ok(ExtensionMessage::PresenceResponse) => return true,
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                    Err(RecvError::Closed) => return false,
                }
            }
        })
        .await
        .unwrap_or(false);

        debug!(installed = answered, wait_ms = wait.as_millis(), "Extension presence probe finished");
        answered
    }

    /// Hand the selected product addresses to the extension
    ///
    /// Returns how many listeners received the request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when no product is selected.
    pub fn request_checkout(&self, urls: Vec<String>) -> AppResult<usize> {
        if urls.is_empty() {
            return Err(AppError::invalid_input("No products selected for checkout"));
        }
        info!(products = urls.len(), "Requesting checkout from extension");
        Ok(self.post(ExtensionMessage::AddToCartRequest { urls }))
    }
}
