// ABOUTME: Recipe projector converting normalized text recipes into browsable recipe cards
// ABOUTME: Resolves display names and ingredient lines, then merges cards across turns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{merge_deduplicated, Deduplicated};
use crate::constants::placeholders::UNNAMED_RECIPE_PREFIX;
use crate::models::{Ingredient, Recipe, RecipeSource, TextRecipe};

/// Ingredient line as shown on a recipe card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientLine {
    /// Ingredient name
    pub name: String,
    /// Amount text (empty when the reply gave a bare name)
    pub amount: String,
    /// Unit text (empty when the reply gave a bare name)
    pub unit: String,
    /// Whether the ingredient can be left out
    #[serde(default)]
    pub optional: bool,
}

impl From<&Ingredient> for IngredientLine {
    fn from(ingredient: &Ingredient) -> Self {
        Self {
            name: ingredient.name.clone(),
            amount: ingredient.amount.clone(),
            unit: ingredient.unit.clone(),
            optional: false,
        }
    }
}

/// Presentation record for the recipe-browsing view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCard {
    /// Client-generated identifier, unique per projection
    pub id: String,
    /// Display name
    pub name: String,
    /// Source of the recipe
    pub source: RecipeSource,
    /// Human-readable source label
    pub source_label: String,
    /// Ingredient lines
    pub ingredients: Vec<IngredientLine>,
    /// Ordered instruction steps
    pub steps: Vec<String>,
    /// The reply gave neither a food name nor a title; `name` is positional
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub untitled: bool,
}

impl Deduplicated for RecipeCard {
    fn dedup_key(&self) -> Option<(&str, RecipeSource)> {
        (!self.untitled).then_some((self.name.as_str(), self.source))
    }
}

/// Project the text-recipe records of a reply into recipe cards
///
/// Cart-shaped records are ignored. Every call generates fresh identifiers,
/// even for dishes seen in an earlier turn; only [`merge_recipe_cards`]
/// removes duplicates.
#[must_use]
pub fn project_recipes(records: &[Recipe]) -> Vec<RecipeCard> {
    records
        .iter()
        .filter_map(|record| record.as_text().map(|text| (record.source(), text)))
        .enumerate()
        .map(|(index, (source, text))| project_recipe(index + 1, source, text))
        .collect()
}

fn project_recipe(position: usize, source: RecipeSource, recipe: &TextRecipe) -> RecipeCard {
    let explicit = recipe.food_name.clone().or_else(|| recipe.title.clone());
    let untitled = explicit.is_none();
    let name = explicit.unwrap_or_else(|| format!("{UNNAMED_RECIPE_PREFIX} {position}"));

    RecipeCard {
        id: Uuid::new_v4().to_string(),
        name,
        source,
        source_label: source.label().to_owned(),
        ingredients: recipe.ingredients.iter().map(IngredientLine::from).collect(),
        steps: recipe.steps.clone(),
        untitled,
    }
}

/// Merge new cards into the accumulated list, returning the cards actually added
pub fn merge_recipe_cards(accumulated: &mut Vec<RecipeCard>, incoming: Vec<RecipeCard>) -> Vec<RecipeCard> {
    merge_deduplicated(accumulated, incoming)
}
