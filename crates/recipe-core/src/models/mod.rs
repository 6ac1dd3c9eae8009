// ABOUTME: Core data models shared across the recipe assistant workspace
// ABOUTME: Re-exports chat, recipe, and session types from domain submodules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Domain models
//!
//! These are the normalized shapes every component downstream of the
//! response normalizer works with. Raw backend payloads never leave the
//! normalizer.

/// Chat messages, roles, and response kinds
pub mod chat;
/// Recipes, ingredients, and purchasable products
pub mod recipe;
/// Chat session identifiers and listings
pub mod session;

pub use chat::{ChatMessage, MessageRole, ResponseKind};
pub use recipe::{CartRecipe, Ingredient, Product, Recipe, RecipeSource, TextRecipe};
pub use session::{SessionId, SessionSummary};
