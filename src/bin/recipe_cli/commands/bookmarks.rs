// ABOUTME: Bookmark commands for recipe-cli
// ABOUTME: Lists bookmarked recipes and toggles a recipe's bookmark
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_assistant::errors::AppResult;

use super::{guard_auth, CliContext};
use crate::helpers::display::print_recipe_cards;

/// Show all bookmarked recipes
pub async fn list(context: &CliContext) -> AppResult<()> {
    let bookmarks = context.bookmarks()?;
    let cards = guard_auth(context, bookmarks.list().await)?;
    if cards.is_empty() {
        println!("No bookmarks yet");
    } else {
        print_recipe_cards(&cards);
    }
    Ok(())
}

/// Flip the bookmark on one recipe
pub async fn toggle(context: &CliContext, recipe_id: &str) -> AppResult<()> {
    let bookmarks = context.bookmarks()?;
    let bookmarked = guard_auth(context, bookmarks.toggle(recipe_id).await)?;
    if bookmarked {
        println!("Bookmarked {recipe_id}");
    } else {
        println!("Removed bookmark {recipe_id}");
    }
    Ok(())
}
