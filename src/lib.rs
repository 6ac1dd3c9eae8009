// ABOUTME: Main library entry point for the recipe assistant conversation client
// ABOUTME: Routes AI chat replies into recipe browsing, cart review, and transcript updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Recipe Assistant
//!
//! Client-side core of a conversational recipe assistant. The user chats with
//! an AI backend that answers with plain text, recipe suggestions, or
//! ingredient product searches; this crate decides what the user sees next.
//!
//! ## Architecture
//!
//! - **Backend**: [`backend::ChatBackend`] service interface and its HTTP
//!   implementation
//! - **Chat**: reply normalization, recipe and cart projection, view routing,
//!   and the session transcript
//! - **Services**: the round-trip orchestrator and bookmarks
//! - **Extension**: message bridge to the cart-checkout browser extension
//! - **Config / Credentials / Logging**: environment settings, the token
//!   cache, and `tracing` setup
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use recipe_assistant::backend::HttpBackend;
//! use recipe_assistant::config::ClientConfig;
//! use recipe_assistant::errors::AppResult;
//! use recipe_assistant::services::ChatOrchestrator;
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let config = ClientConfig::from_env()?;
//!     let backend = HttpBackend::new(config.backend_config(config.api_token.clone()))?;
//!     let orchestrator = ChatOrchestrator::new(Arc::new(backend));
//!
//!     let outcome = orchestrator.submit("된장찌개 레시피 알려줘", None).await?;
//!     println!("{} -> {}", outcome.response.display_text(), outcome.view);
//!     Ok(())
//! }
//! ```

/// Backend service interface and HTTP implementation
pub mod backend;

/// Conversation response routing pipeline
pub mod chat;

/// Environment configuration
pub mod config;

/// Domain constants
pub mod constants;

/// Cached access credentials
pub mod credentials;

/// Unified error handling
pub mod errors;

/// Cart-checkout extension bridge
pub mod extension;

/// Structured logging setup
pub mod logging;

/// Domain models shared with recipe-core
pub mod models;

/// Orchestration and bookmark services
pub mod services;
