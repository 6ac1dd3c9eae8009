// ABOUTME: Cart projector and shopping board built from ingredient product searches
// ABOUTME: Filters empty searches, merges cart items across turns, and tracks product selection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Cart Projection
//!
//! Two layers live here:
//!
//! - [`CartItem`]: the per-turn projection of a cart-shaped recipe record. These
//!   are accumulated across turns and persisted with the session.
//! - [`CartBoard`]: the shopping view state. It collapses cart items into one
//!   [`CartItemGroup`] per food name and tracks which groups are active and which
//!   products the user selected for checkout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use super::{merge_deduplicated, Deduplicated};
use crate::errors::{AppError, AppResult};
use crate::models::{CartRecipe, Product, Recipe, RecipeSource};

/// Presentation record of one ingredient product search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Food or ingredient the products were found for
    pub food_name: String,
    /// Candidate products
    pub products: Vec<Product>,
}

impl CartItem {
    fn from_cart_recipe(record: &CartRecipe) -> Option<Self> {
        let products = if record.products.is_empty() {
            &record.ingredients
        } else {
            &record.products
        };
        if products.is_empty() {
            debug!(food_name = %record.food_name, "Dropping ingredient search without products");
            return None;
        }
        Some(Self {
            food_name: record.food_name.clone(),
            products: products.clone(),
        })
    }
}

impl Deduplicated for CartItem {
    fn dedup_key(&self) -> Option<(&str, RecipeSource)> {
        Some((&self.food_name, RecipeSource::IngredientSearch))
    }
}

/// Project the cart-shaped records of a reply into cart items
///
/// Records without any product candidate contribute nothing. When the product
/// list is empty the ingredient list is used in its place.
#[must_use]
pub fn project_cart_items(records: &[Recipe]) -> Vec<CartItem> {
    records
        .iter()
        .filter_map(Recipe::as_cart)
        .filter_map(CartItem::from_cart_recipe)
        .collect()
}

/// Merge new cart items into the accumulated list, returning the items actually added
pub fn merge_cart_items(accumulated: &mut Vec<CartItem>, incoming: Vec<CartItem>) -> Vec<CartItem> {
    merge_deduplicated(accumulated, incoming)
}

/// All candidate products for one ingredient, with the user's choices
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItemGroup {
    /// Ingredient (food) name
    pub ingredient: String,
    /// Candidate products, without duplicate addresses
    pub candidates: Vec<Product>,
    active: bool,
    selected: BTreeSet<String>,
}

impl CartItemGroup {
    fn new(ingredient: String) -> Self {
        Self {
            ingredient,
            candidates: Vec::new(),
            active: true,
            selected: BTreeSet::new(),
        }
    }

    fn add_candidates(&mut self, products: &[Product]) {
        for product in products {
            if !self.candidates.iter().any(|known| known.url == product.url) {
                self.candidates.push(product.clone());
            }
        }
    }

    /// Whether the group takes part in checkout
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Whether the product with this address is selected
    #[must_use]
    pub fn is_selected(&self, url: &str) -> bool {
        self.selected.contains(url)
    }

    /// Number of selected products
    #[must_use]
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Flip the active flag; deactivating clears the selection
    ///
    /// Returns the new state.
    pub fn toggle_active(&mut self) -> bool {
        self.active = !self.active;
        if !self.active {
            self.selected.clear();
        }
        self.active
    }

    /// Toggle membership of a product in the selection
    ///
    /// Returns whether the product is selected afterwards.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidInput` when the group is inactive and
    /// `AppError::NotFound` when the address is not one of the candidates.
    pub fn toggle_product(&mut self, url: &str) -> AppResult<bool> {
        if !self.active {
            return Err(AppError::invalid_input(format!(
                "'{}' is disabled; enable it before choosing products",
                self.ingredient
            )));
        }
        if !self.candidates.iter().any(|product| product.url == url) {
            return Err(AppError::not_found(format!("Product {url}")));
        }
        if self.selected.remove(url) {
            Ok(false)
        } else {
            self.selected.insert(url.to_owned());
            Ok(true)
        }
    }

    /// Selected products in candidate order
    pub fn selected_products(&self) -> impl Iterator<Item = &Product> {
        self.candidates
            .iter()
            .filter(|product| self.selected.contains(&product.url))
    }
}

/// Shopping view state: one group per food name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartBoard {
    groups: Vec<CartItemGroup>,
}

impl CartBoard {
    /// Build a board from accumulated cart items
    #[must_use]
    pub fn from_items(items: &[CartItem]) -> Self {
        let mut board = Self::default();
        board.sync(items);
        board
    }

    /// Fold cart items into the board, keeping existing selections
    pub fn sync(&mut self, items: &[CartItem]) {
        for item in items {
            let index = if let Some(index) = self.position(&item.food_name) {
                index
            } else {
                self.groups.push(CartItemGroup::new(item.food_name.clone()));
                self.groups.len() - 1
            };
            self.groups[index].add_candidates(&item.products);
        }
    }

    /// Groups in first-seen order
    #[must_use]
    pub fn groups(&self) -> &[CartItemGroup] {
        &self.groups
    }

    /// Look up a group by ingredient name
    #[must_use]
    pub fn group(&self, ingredient: &str) -> Option<&CartItemGroup> {
        self.groups.iter().find(|group| group.ingredient == ingredient)
    }

    /// Flip a group's active flag
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ingredient.
    pub fn toggle_active(&mut self, ingredient: &str) -> AppResult<bool> {
        Ok(self.group_mut(ingredient)?.toggle_active())
    }

    /// Toggle a product in a group's selection
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ingredient or product and
    /// `AppError::InvalidInput` for an inactive group.
    pub fn toggle_product(&mut self, ingredient: &str, url: &str) -> AppResult<bool> {
        self.group_mut(ingredient)?.toggle_product(url)
    }

    /// Addresses to hand to the checkout extension: active groups in order,
    /// each group's selection in candidate order
    #[must_use]
    pub fn selected_product_urls(&self) -> Vec<String> {
        self.groups
            .iter()
            .filter(|group| group.is_active())
            .flat_map(|group| group.selected_products())
            .map(|product| product.url.clone())
            .collect()
    }

    /// Sum of the prices of all selected products in active groups
    #[must_use]
    pub fn selected_total(&self) -> i64 {
        self.groups
            .iter()
            .filter(|group| group.is_active())
            .flat_map(|group| group.selected_products())
            .map(|product| product.price)
            .sum()
    }

    /// Whether the board has no groups
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn position(&self, ingredient: &str) -> Option<usize> {
        self.groups
            .iter()
            .position(|group| group.ingredient == ingredient)
    }

    fn group_mut(&mut self, ingredient: &str) -> AppResult<&mut CartItemGroup> {
        self.groups
            .iter_mut()
            .find(|group| group.ingredient == ingredient)
            .ok_or_else(|| AppError::not_found(format!("Cart group '{ingredient}'")))
    }
}
