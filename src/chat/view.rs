// ABOUTME: View router deciding which screen the user sees after each round trip
// ABOUTME: Small state machine over welcome, recipe, cart, and bookmark views
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::models::{ChatMessage, MessageRole, ResponseKind};

/// Screen shown next to the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    /// Landing screen with suggestions
    #[default]
    Welcome,
    /// Recipe browsing
    Recipe,
    /// Cart review
    Cart,
    /// Bookmarked recipes (only reachable manually)
    Bookmark,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Welcome => "welcome",
            Self::Recipe => "recipe",
            Self::Cart => "cart",
            Self::Bookmark => "bookmark",
        };
        f.write_str(name)
    }
}

/// View after a round trip, given the view before it
///
/// - `recipe` switches to the recipe view only when the projection produced
///   at least one card; an empty recipe reply leaves the view unchanged.
/// - `cart` always switches to the cart view, even if every search was
///   filtered out.
/// - `chat` never interrupts what the user is looking at.
/// - a missing kind falls back to the welcome view.
#[must_use]
pub fn next_view(current: View, kind: Option<ResponseKind>, projected_recipes: usize) -> View {
    match kind {
        Some(ResponseKind::Recipe) if projected_recipes > 0 => View::Recipe,
        Some(ResponseKind::Recipe | ResponseKind::Chat) => current,
        Some(ResponseKind::Cart) => View::Cart,
        None => View::Welcome,
    }
}

/// View implied by a reloaded session's last assistant message
#[must_use]
pub fn view_for_reloaded_session(messages: &[ChatMessage]) -> View {
    let Some(last) = messages
        .iter()
        .rev()
        .find(|message| message.role == MessageRole::Assistant)
    else {
        return View::Welcome;
    };

    if last.kind == Some(ResponseKind::Cart) {
        View::Cart
    } else if !last.recipes().is_empty() {
        View::Recipe
    } else {
        View::Welcome
    }
}

/// Current view plus the transition rules
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    /// Router starting on the welcome view
    #[must_use]
    pub const fn new() -> Self {
        Self {
            current: View::Welcome,
        }
    }

    /// Router restored for a reloaded session
    #[must_use]
    pub fn restored(messages: &[ChatMessage]) -> Self {
        Self {
            current: view_for_reloaded_session(messages),
        }
    }

    /// View currently shown
    #[must_use]
    pub const fn current(&self) -> View {
        self.current
    }

    /// Manual switch requested by the user; always honored
    pub fn show(&mut self, view: View) {
        self.current = view;
    }

    /// Apply the inference rules after a round trip
    pub fn apply_round_trip(&mut self, kind: Option<ResponseKind>, projected_recipes: usize) -> View {
        let next = next_view(self.current, kind, projected_recipes);
        if next != self.current {
            debug!(from = %self.current, to = %next, "View transition");
        }
        self.current = next;
        next
    }
}
