// ABOUTME: Response normalizer turning loosely-typed backend chat replies into a sum type
// ABOUTME: Resolves fallback field names once so downstream code never reads raw payloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Response Normalizer
//!
//! The backend reply for one round trip looks roughly like
//!
//! ```json
//! { "status": "success",
//!   "result": { "chatType": "recipe", "answer": "...", "recipes": [ ... ] } }
//! ```
//!
//! but fields move around between backend versions: the text may live under
//! `content` or `answer`, steps under `recipe` or `instructions`, ingredients may
//! be bare strings. [`normalize_response`] resolves all of that into a
//! [`NormalizedResponse`] so that projectors and the view router only ever see
//! typed records.
//!
//! The discriminator field is authoritative: the reply text is never sniffed to
//! guess whether a reply is a recipe or a cart result. Unknown or missing kinds
//! degrade to [`ResponseKind::Chat`].

use serde_json::{Map, Value};
use tracing::debug;

use crate::constants::placeholders::{FALLBACK_REPLY_TEXT, GENERIC_ERROR_TEXT};
use crate::errors::AppError;
use crate::models::{CartRecipe, Ingredient, Product, Recipe, RecipeSource, ResponseKind, TextRecipe};

/// Normalized reply of one round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizedResponse {
    /// Explicit backend error, transport failure, or missing payload
    Error {
        /// Human-readable error text
        message: String,
    },
    /// Regular reply
    Standard(StandardResponse),
}

/// A successful reply in normalized form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardResponse {
    /// Response kind (unknown kinds are already mapped to `Chat`)
    pub kind: ResponseKind,
    /// Text to show as the assistant message
    pub text: String,
    /// Recipe and cart records attached to the reply
    pub recipes: Vec<Recipe>,
    /// Session identifier issued by the backend, if the reply carries one
    pub session_id: Option<String>,
}

impl NormalizedResponse {
    /// Build the error record for a failed round trip
    #[must_use]
    pub fn from_failure(error: &AppError) -> Self {
        let message = if error.message.trim().is_empty() {
            GENERIC_ERROR_TEXT.to_owned()
        } else {
            error.message.clone()
        };
        Self::Error { message }
    }

    /// Text to show as the assistant message, for either variant
    #[must_use]
    pub fn display_text(&self) -> &str {
        match self {
            Self::Error { message } => message,
            Self::Standard(standard) => &standard.text,
        }
    }
}

/// Normalize the outcome of a round trip, converting transport errors too
#[must_use]
pub fn normalize_round_trip(outcome: Result<Value, AppError>) -> NormalizedResponse {
    match outcome {
        Ok(payload) => normalize_response(&payload),
        Err(error) => NormalizedResponse::from_failure(&error),
    }
}

/// Normalize one backend reply
#[must_use]
pub fn normalize_response(payload: &Value) -> NormalizedResponse {
    let Some(body) = payload.as_object() else {
        debug!("Reply body is not a JSON object");
        return NormalizedResponse::Error {
            message: GENERIC_ERROR_TEXT.to_owned(),
        };
    };

    if let Some(message) = explicit_error(body) {
        return NormalizedResponse::Error { message };
    }

    let Some(result) = body.get("result").and_then(Value::as_object) else {
        debug!("Reply has no result object");
        return NormalizedResponse::Error {
            message: GENERIC_ERROR_TEXT.to_owned(),
        };
    };

    let kind = first_str(result, &["chatType", "chat_type"])
        .and_then(|raw| {
            let parsed = ResponseKind::parse(raw);
            if parsed.is_none() {
                debug!(chat_type = raw, "Unknown response kind, treating as chat");
            }
            parsed
        })
        .unwrap_or(ResponseKind::Chat);

    let text = first_non_blank(result, &["content", "answer"])
        .unwrap_or(FALLBACK_REPLY_TEXT)
        .to_owned();

    let session_id = first_id(result, &["chat_id", "chatId"])
        .or_else(|| first_id(body, &["chat_id", "chatId"]));

    NormalizedResponse::Standard(StandardResponse {
        kind,
        text,
        recipes: parse_recipes(result.get("recipes")),
        session_id,
    })
}

/// Parse a list of recipe-shaped records, skipping entries that are not objects
#[must_use]
pub fn parse_recipes(value: Option<&Value>) -> Vec<Recipe> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_recipe).collect())
        .unwrap_or_default()
}

/// Parse one recipe record, choosing the shape from its `source` tag
#[must_use]
pub fn parse_recipe(value: &Value) -> Option<Recipe> {
    let record = value.as_object()?;
    let source = first_str(record, &["source"])
        .and_then(RecipeSource::parse)
        .unwrap_or(RecipeSource::Text);

    let recipe = match source {
        RecipeSource::IngredientSearch => Recipe::IngredientSearch(parse_cart_recipe(record)),
        RecipeSource::Text => Recipe::Text(parse_text_recipe(record)),
        RecipeSource::Video => Recipe::Video(parse_text_recipe(record)),
    };
    Some(recipe)
}

/// Parse a product record; entries without an address are dropped
#[must_use]
pub fn parse_product(value: &Value) -> Option<Product> {
    let record = value.as_object()?;
    let url = first_non_blank(record, &["url", "link", "product_url"])?.to_owned();

    Some(Product {
        name: first_str(record, &["name", "title"])
            .unwrap_or_default()
            .to_owned(),
        price: record.get("price").map_or(0, parse_price),
        image: first_str(record, &["image", "image_url", "thumbnail"])
            .unwrap_or_default()
            .to_owned(),
        url,
    })
}

fn parse_text_recipe(record: &Map<String, Value>) -> TextRecipe {
    let ingredients = record
        .get("ingredients")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(parse_ingredient).collect())
        .unwrap_or_default();

    let steps = ["recipe", "instructions"]
        .iter()
        .find_map(|key| record.get(*key).and_then(parse_steps))
        .unwrap_or_default();

    TextRecipe {
        food_name: first_non_blank(record, &["food_name", "foodName"]).map(str::to_owned),
        title: first_non_blank(record, &["title"]).map(str::to_owned),
        ingredients,
        steps,
    }
}

fn parse_cart_recipe(record: &Map<String, Value>) -> CartRecipe {
    let products_of = |keys: &[&str]| -> Vec<Product> {
        keys.iter()
            .find_map(|key| record.get(*key).and_then(Value::as_array))
            .map(|items| items.iter().filter_map(parse_product).collect())
            .unwrap_or_default()
    };

    CartRecipe {
        food_name: first_str(record, &["food_name", "foodName", "title"])
            .unwrap_or_default()
            .to_owned(),
        products: products_of(&["products", "product"]),
        ingredients: products_of(&["ingredients"]),
    }
}

fn parse_ingredient(value: &Value) -> Option<Ingredient> {
    match value {
        Value::String(name) if !name.trim().is_empty() => Some(Ingredient::bare(name.trim())),
        Value::Object(record) => {
            let name = first_non_blank(record, &["name", "ingredient"])?;
            Some(Ingredient {
                name: name.to_owned(),
                amount: record.get("amount").map(scalar_text).unwrap_or_default(),
                unit: record.get("unit").map(scalar_text).unwrap_or_default(),
            })
        }
        _ => None,
    }
}

/// `None` means the field is absent or unusable, so the next field name is tried
fn parse_steps(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .map(scalar_text)
                .filter(|step| !step.is_empty())
                .collect(),
        ),
        Value::String(step) if !step.trim().is_empty() => Some(vec![step.trim().to_owned()]),
        _ => None,
    }
}

fn explicit_error(body: &Map<String, Value>) -> Option<String> {
    let status_failed = first_str(body, &["status"])
        .is_some_and(|status| matches!(status.to_ascii_lowercase().as_str(), "error" | "fail" | "failure"));

    let error_field = match body.get("error") {
        None | Some(Value::Null | Value::Bool(false)) => None,
        Some(Value::String(message)) => Some(message.clone()),
        Some(Value::Object(detail)) => Some(
            first_non_blank(detail, &["message", "detail"])
                .unwrap_or(GENERIC_ERROR_TEXT)
                .to_owned(),
        ),
        Some(_) => Some(String::new()),
    };

    if !status_failed && error_field.is_none() {
        return None;
    }

    let message = error_field
        .filter(|message| !message.trim().is_empty())
        .or_else(|| first_non_blank(body, &["message", "detail"]).map(str::to_owned))
        .unwrap_or_else(|| GENERIC_ERROR_TEXT.to_owned());
    debug!(%message, "Reply carries an explicit error");
    Some(message)
}

fn first_str<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

fn first_non_blank<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        record
            .get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
    })
}

fn first_id(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_owned()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.trim().to_owned(),
        Value::Number(number) => number.to_string(),
        _ => String::new(),
    }
}

fn parse_price(value: &Value) -> i64 {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|price| price.round() as i64))
            .unwrap_or(0),
        Value::String(text) => {
            let digits: String = text.chars().filter(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        }
        _ => 0,
    }
}
