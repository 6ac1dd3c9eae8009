// ABOUTME: Recipe and product domain types returned by the recipe assistant backend
// ABOUTME: Recipe is a tagged union whose source discriminant fixes which shape is populated
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a recipe record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    /// Recipe generated or retrieved as text
    Text,
    /// Recipe extracted from a cooking video
    Video,
    /// Product search for a dish's ingredients
    IngredientSearch,
}

impl RecipeSource {
    /// Parse a wire source tag
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Some(Self::Text),
            "video" => Some(Self::Video),
            "ingredient_search" => Some(Self::IngredientSearch),
            _ => None,
        }
    }

    /// Wire name of the source
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Video => "video",
            Self::IngredientSearch => "ingredient_search",
        }
    }

    /// Label shown next to a recipe card
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Text => "AI recipe",
            Self::Video => "Video recipe",
            Self::IngredientSearch => "Ingredient search",
        }
    }
}

impl fmt::Display for RecipeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One ingredient line of a text recipe
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ingredient {
    /// Ingredient name
    pub name: String,
    /// Amount, kept as text ("1/2", "a pinch")
    #[serde(default)]
    pub amount: String,
    /// Unit of the amount
    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    /// Ingredient given as a bare name, with empty amount and unit
    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            amount: String::new(),
            unit: String::new(),
        }
    }
}

/// A purchasable product found by an ingredient search
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Product {
    /// Product display name
    pub name: String,
    /// Price in the shop's smallest currency unit
    #[serde(default)]
    pub price: i64,
    /// Image reference
    #[serde(default)]
    pub image: String,
    /// Product address; the stable identifier and the checkout payload
    pub url: String,
}

/// Recipe with ingredient amounts and instruction steps
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRecipe {
    /// Dish name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_name: Option<String>,
    /// Alternate title used by some replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Ingredient lines
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
    /// Ordered instruction steps
    #[serde(default, rename = "recipe")]
    pub steps: Vec<String>,
}

/// Product search result for the ingredients of one dish
///
/// A cart recipe never carries instruction steps; the type has no field for
/// them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CartRecipe {
    /// Dish (or ingredient) the products were found for
    pub food_name: String,
    /// Candidate products
    #[serde(default)]
    pub products: Vec<Product>,
    /// Product-shaped ingredient entries, used when `products` is empty
    #[serde(default)]
    pub ingredients: Vec<Product>,
}

/// Recipe record, discriminated by `source`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source")]
pub enum Recipe {
    /// Text recipe
    #[serde(rename = "text")]
    Text(TextRecipe),
    /// Recipe taken from a video
    #[serde(rename = "video")]
    Video(TextRecipe),
    /// Ingredient product search
    #[serde(rename = "ingredient_search")]
    IngredientSearch(CartRecipe),
}

impl Recipe {
    /// Source discriminant of this record
    #[must_use]
    pub const fn source(&self) -> RecipeSource {
        match self {
            Self::Text(_) => RecipeSource::Text,
            Self::Video(_) => RecipeSource::Video,
            Self::IngredientSearch(_) => RecipeSource::IngredientSearch,
        }
    }

    /// Dish name, if the record has one
    #[must_use]
    pub fn food_name(&self) -> Option<&str> {
        match self {
            Self::Text(recipe) | Self::Video(recipe) => recipe.food_name.as_deref(),
            Self::IngredientSearch(cart) => Some(cart.food_name.as_str()),
        }
    }

    /// The text-recipe shape, if this record has one
    #[must_use]
    pub const fn as_text(&self) -> Option<&TextRecipe> {
        match self {
            Self::Text(recipe) | Self::Video(recipe) => Some(recipe),
            Self::IngredientSearch(_) => None,
        }
    }

    /// The cart shape, if this record has one
    #[must_use]
    pub const fn as_cart(&self) -> Option<&CartRecipe> {
        match self {
            Self::IngredientSearch(cart) => Some(cart),
            Self::Text(_) | Self::Video(_) => None,
        }
    }
}
