// ABOUTME: Bookmark service over the backend's remote boolean-state store
// ABOUTME: Toggles, checks, and lists bookmarked recipe cards
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use tracing::info;

use crate::backend::ChatBackend;
use crate::chat::RecipeCard;
use crate::errors::{AppError, AppResult};

/// Bookmark operations keyed by recipe identifier
#[derive(Clone)]
pub struct BookmarkService {
    backend: Arc<dyn ChatBackend>,
}

impl BookmarkService {
    /// Create a service on top of a backend
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    /// Flip the bookmark state of a recipe and return the new state
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for a blank identifier, or the backend error.
    pub async fn toggle(&self, recipe_id: &str) -> AppResult<bool> {
        let recipe_id = validate_id(recipe_id)?;
        let bookmarked = self.backend.toggle_bookmark(recipe_id).await?;
        info!(%recipe_id, bookmarked, "Bookmark toggled");
        Ok(bookmarked)
    }

    /// Whether a recipe is bookmarked
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` for a blank identifier, or the backend error.
    pub async fn is_bookmarked(&self, recipe_id: &str) -> AppResult<bool> {
        self.backend.is_bookmarked(validate_id(recipe_id)?).await
    }

    /// All bookmarked recipes
    ///
    /// # Errors
    ///
    /// Returns the backend error.
    pub async fn list(&self) -> AppResult<Vec<RecipeCard>> {
        self.backend.list_bookmarks().await
    }
}

fn validate_id(recipe_id: &str) -> AppResult<&str> {
    let recipe_id = recipe_id.trim();
    if recipe_id.is_empty() {
        return Err(AppError::invalid_input("Recipe id cannot be empty"));
    }
    Ok(recipe_id)
}
