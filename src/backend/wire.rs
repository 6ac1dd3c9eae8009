// ABOUTME: Tolerant decoding of session listings, session details, and saved records
// ABOUTME: Reuses the reply normalizer's recipe parsing so stored messages share one shape
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use super::SessionDetail;
use crate::chat::normalizer::parse_recipes;
use crate::chat::RecipeCard;
use crate::models::{ChatMessage, MessageRole, ResponseKind, SessionSummary};

/// Decode a session listing in payload order
#[must_use]
pub fn decode_session_list(payload: &Value) -> Vec<SessionSummary> {
    items(payload, &["chats", "sessions"])
        .iter()
        .filter_map(decode_session_summary)
        .collect()
}

/// Decode a session detail payload
#[must_use]
pub fn decode_session_detail(session_id: &str, payload: &Value) -> SessionDetail {
    SessionDetail {
        id: session_id.to_owned(),
        messages: items(payload, &["messages"])
            .iter()
            .filter_map(decode_message)
            .collect(),
        recipes: decode_records(items(payload, &["recipes"])),
        cart_items: decode_records(items(payload, &["cart_items", "cartItems"])),
    }
}

/// Decode a list of recipe cards (bookmarks or saved recipes)
#[must_use]
pub fn decode_recipe_cards(payload: &Value) -> Vec<RecipeCard> {
    decode_records(items(payload, &["bookmarks", "recipes"]))
}

/// Read a `{ "bookmarked": bool }` answer
#[must_use]
pub fn decode_bookmark_state(payload: &Value) -> bool {
    match payload {
        Value::Bool(state) => *state,
        Value::Object(body) => ["bookmarked", "is_bookmarked", "isBookmarked"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_bool))
            .unwrap_or(false),
        _ => false,
    }
}

fn items<'a>(payload: &'a Value, keys: &[&str]) -> &'a [Value] {
    match payload {
        Value::Array(items) => items,
        Value::Object(body) => keys
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_array))
            .map_or(&[], Vec::as_slice),
        _ => &[],
    }
}

fn decode_records<T: DeserializeOwned>(values: &[Value]) -> Vec<T> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(error) => {
                debug!(%error, "Skipping undecodable stored record");
                None
            }
        })
        .collect()
}

fn decode_session_summary(value: &Value) -> Option<SessionSummary> {
    let record = value.as_object()?;
    let id = id_field(record, &["id", "chat_id", "chatId"])?;
    Some(SessionSummary {
        id,
        title: str_field(record, &["title"]).unwrap_or_default().to_owned(),
        last_activity: time_field(record, &["updated_at", "last_activity", "created_at"]),
    })
}

fn decode_message(value: &Value) -> Option<ChatMessage> {
    let record = value.as_object()?;
    let role = match str_field(record, &["role", "sender"])? {
        "user" => MessageRole::User,
        "assistant" | "bot" | "ai" => MessageRole::Assistant,
        other => {
            debug!(role = other, "Skipping message with unknown role");
            return None;
        }
    };

    let recipes = parse_recipes(record.get("recipes"));
    Some(ChatMessage {
        role,
        content: str_field(record, &["content", "message", "text"])
            .unwrap_or_default()
            .to_owned(),
        created_at: time_field(record, &["created_at", "timestamp"]).unwrap_or_else(Utc::now),
        image: str_field(record, &["image", "image_url"]).map(str::to_owned),
        recipes: if recipes.is_empty() { None } else { Some(recipes) },
        kind: str_field(record, &["chatType", "chat_type"]).and_then(ResponseKind::parse),
    })
}

fn str_field<'a>(record: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| record.get(*key).and_then(Value::as_str))
}

fn id_field(record: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match record.get(*key)? {
        Value::String(id) if !id.is_empty() => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    })
}

fn time_field(record: &Map<String, Value>, keys: &[&str]) -> Option<DateTime<Utc>> {
    str_field(record, keys).and_then(|raw| {
        DateTime::parse_from_rfc3339(raw)
            .map(|time| time.with_timezone(&Utc))
            .ok()
    })
}
