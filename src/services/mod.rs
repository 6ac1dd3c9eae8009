// ABOUTME: Service layer coordinating the backend, the chat pipeline, and user actions
// ABOUTME: Hosts the chat orchestrator and the bookmark service
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Service layer
//!
//! Services take the backend as `Arc<dyn ChatBackend>` and hold no global
//! state, so the CLI and the tests build them the same way.

/// Bookmark toggle, check, and listing
pub mod bookmarks;

/// Round-trip orchestration, session lifecycle, and background persistence
pub mod chat_orchestration;

pub use bookmarks::BookmarkService;
pub use chat_orchestration::{ChatOrchestrator, ConversationSnapshot, RoundTripOutcome};
