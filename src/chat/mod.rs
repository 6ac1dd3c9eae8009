// ABOUTME: Conversation response routing pipeline for the recipe assistant
// ABOUTME: Normalizer, recipe and cart projectors, view router, and conversation accumulator
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Conversation Response Router
//!
//! One round trip flows through these modules in order:
//!
//! 1. [`conversation`] records the outgoing user message
//! 2. the backend is called (see [`crate::backend`])
//! 3. [`normalizer`] turns the raw reply into a [`normalizer::NormalizedResponse`]
//! 4. [`recipes`] or [`cart`] project the attached records
//! 5. [`view`] decides the next screen
//! 6. [`conversation`] records the assistant reply
//!
//! [`crate::services::chat_orchestration`] drives the sequence.

/// Shopping cart projection and product selection
pub mod cart;
/// Transcript accumulation and session titles
pub mod conversation;
/// Backend reply normalization
pub mod normalizer;
/// Recipe card projection
pub mod recipes;
/// View state machine
pub mod view;

pub use cart::{CartBoard, CartItem, CartItemGroup};
pub use conversation::ChatSession;
pub use normalizer::{NormalizedResponse, StandardResponse};
pub use recipes::{IngredientLine, RecipeCard};
pub use view::{View, ViewRouter};

use std::collections::HashSet;

use crate::models::RecipeSource;

/// Records merged across turns under the (food name, source) key
pub trait Deduplicated {
    /// De-duplication key; `None` marks a record that is never merged away
    fn dedup_key(&self) -> Option<(&str, RecipeSource)>;
}

/// Append the incoming records whose key is not present yet
///
/// Duplicates inside `incoming` are collapsed as well. Records without a key
/// are always appended. Returns clones of the records that were appended, in
/// order.
pub fn merge_deduplicated<T>(accumulated: &mut Vec<T>, incoming: Vec<T>) -> Vec<T>
where
    T: Deduplicated + Clone,
{
    let mut seen: HashSet<(String, RecipeSource)> = accumulated
        .iter()
        .filter_map(Deduplicated::dedup_key)
        .map(|(name, source)| (name.to_owned(), source))
        .collect();

    let mut added = Vec::new();
    for record in incoming {
        let fresh = record
            .dedup_key()
            .is_none_or(|(name, source)| seen.insert((name.to_owned(), source)));
        if fresh {
            added.push(record.clone());
            accumulated.push(record);
        }
    }
    added
}
