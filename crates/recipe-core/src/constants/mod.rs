// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Pure data constants for titles, placeholders, and extension message types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat list.

/// Chat session titles
pub mod titles {
    /// Maximum number of characters kept from the first user message
    pub const TITLE_MAX_CHARS: usize = 50;
    /// Marker appended when the title was truncated
    pub const TITLE_ELLIPSIS: &str = "...";
    /// Title used while a session has no user message yet
    pub const DEFAULT_SESSION_TITLE: &str = "New chat";
}

/// Placeholder texts used when the user or the backend supplies none
pub mod placeholders {
    /// Assistant text when the reply carries neither `content` nor `answer`
    pub const FALLBACK_REPLY_TEXT: &str = "Got it! Let me know if there is anything else you need.";
    /// Request text sent when the user attaches an image without typing anything
    pub const IMAGE_ONLY_PROMPT: &str = "Please tell me about the food in this image.";
    /// Error text when the backend reports a failure without a message
    pub const GENERIC_ERROR_TEXT: &str = "Something went wrong while talking to the recipe assistant.";
    /// Prefix of client-generated session identifiers
    pub const PENDING_SESSION_PREFIX: &str = "temp-";
    /// Name prefix for recipes that carry neither a food name nor a title
    pub const UNNAMED_RECIPE_PREFIX: &str = "Recipe";
}

/// Message types exchanged with the cart-checkout browser extension
pub mod extension {
    /// Presence probe sent by the client
    pub const PRESENCE_REQUEST: &str = "extension-presence-request";
    /// Presence answer sent by the extension
    pub const PRESENCE_RESPONSE: &str = "extension-presence-response";
    /// Checkout message carrying the selected product addresses
    pub const ADD_TO_CART_REQUEST: &str = "add-to-cart-request";
}

/// Service names used in errors and logs
pub mod service_names {
    /// Backend recipe/chat API
    pub const RECIPE_API: &str = "Recipe API";
    /// Service name for structured logging
    pub const RECIPE_ASSISTANT: &str = "recipe-assistant";
}
