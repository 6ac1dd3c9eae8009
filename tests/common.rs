// ABOUTME: Shared test utilities for integration tests
// ABOUTME: Provides quiet test logging, an in-memory chat backend, and reply fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `recipe_assistant`

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use recipe_assistant::backend::{ChatBackend, ChatRequest, SessionDetail};
use recipe_assistant::chat::{CartItem, RecipeCard};
use recipe_assistant::errors::{AppError, AppResult};
use recipe_assistant::models::{RecipeSource, SessionSummary};
use serde_json::{json, Value};
use tokio::sync::Notify;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Reply with the standard success envelope
pub fn success_reply(result: Value) -> Value {
    json!({ "status": "success", "result": result })
}

/// Plain chat reply
pub fn chat_reply(answer: &str) -> Value {
    success_reply(json!({ "chatType": "chat", "answer": answer }))
}

/// Recipe reply carrying the given recipe records
pub fn recipe_reply(recipes: Value) -> Value {
    success_reply(json!({ "chatType": "recipe", "answer": "Here you go", "recipes": recipes }))
}

/// Cart reply carrying the given ingredient searches
pub fn cart_reply(searches: Value) -> Value {
    success_reply(json!({ "chatType": "cart", "content": "I found these products", "recipes": searches }))
}

/// Product record as the backend sends it
pub fn product_json(name: &str, price: i64, url: &str) -> Value {
    json!({ "name": name, "price": price, "image": format!("{url}.png"), "url": url })
}

/// Gate that holds chat replies until released
#[derive(Clone, Default)]
pub struct ReplyGate {
    /// Notified when a chat request reaches the backend
    pub entered: Arc<Notify>,
    /// Notify to let the held reply through
    pub release: Arc<Notify>,
}

/// In-memory backend recording every call
#[derive(Default)]
pub struct MockBackend {
    replies: Mutex<VecDeque<AppResult<Value>>>,
    requests: Mutex<Vec<ChatRequest>>,
    sessions: Mutex<Vec<SessionSummary>>,
    details: Mutex<HashMap<String, SessionDetail>>,
    saved_recipes: Mutex<Vec<(String, Vec<RecipeCard>)>>,
    saved_cart_items: Mutex<Vec<(String, Vec<CartItem>)>>,
    bookmarks: Mutex<BTreeSet<String>>,
    fail_saves: AtomicBool,
    gate: Mutex<Option<ReplyGate>>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a raw reply for the next chat request
    pub fn push_reply(&self, reply: Value) {
        self.replies.lock().unwrap().push_back(Ok(reply));
    }

    /// Queue a failure for the next chat request
    pub fn push_failure(&self, error: AppError) {
        self.replies.lock().unwrap().push_back(Err(error));
    }

    /// Hold chat replies until the returned gate is released
    pub fn hold_replies(&self) -> ReplyGate {
        let gate = ReplyGate::default();
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Make every save call fail (or succeed again)
    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Register a stored session
    pub fn add_session(&self, summary: SessionSummary, detail: SessionDetail) {
        self.sessions.lock().unwrap().push(summary);
        self.details.lock().unwrap().insert(detail.id.clone(), detail);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn saved_recipes(&self) -> Vec<(String, Vec<RecipeCard>)> {
        self.saved_recipes.lock().unwrap().clone()
    }

    pub fn saved_cart_items(&self) -> Vec<(String, Vec<CartItem>)> {
        self.saved_cart_items.lock().unwrap().clone()
    }

    fn save_result(&self) -> AppResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            Err(AppError::external_service("Recipe API", "HTTP 503: unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ChatBackend for MockBackend {
    async fn send_message(&self, request: &ChatRequest) -> AppResult<Value> {
        self.requests.lock().unwrap().push(request.clone());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(chat_reply("ok")))
    }

    async fn list_sessions(&self) -> AppResult<Vec<SessionSummary>> {
        Ok(self.sessions.lock().unwrap().clone())
    }

    async fn get_session(&self, session_id: &str) -> AppResult<SessionDetail> {
        self.details
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Chat session {session_id}")))
    }

    async fn save_recipes(&self, session_id: &str, recipes: &[RecipeCard]) -> AppResult<()> {
        self.save_result()?;
        self.saved_recipes
            .lock()
            .unwrap()
            .push((session_id.to_owned(), recipes.to_vec()));
        Ok(())
    }

    async fn save_cart_items(&self, session_id: &str, items: &[CartItem]) -> AppResult<()> {
        self.save_result()?;
        self.saved_cart_items
            .lock()
            .unwrap()
            .push((session_id.to_owned(), items.to_vec()));
        Ok(())
    }

    async fn toggle_bookmark(&self, recipe_id: &str) -> AppResult<bool> {
        let mut bookmarks = self.bookmarks.lock().unwrap();
        if bookmarks.remove(recipe_id) {
            Ok(false)
        } else {
            bookmarks.insert(recipe_id.to_owned());
            Ok(true)
        }
    }

    async fn is_bookmarked(&self, recipe_id: &str) -> AppResult<bool> {
        Ok(self.bookmarks.lock().unwrap().contains(recipe_id))
    }

    async fn list_bookmarks(&self) -> AppResult<Vec<RecipeCard>> {
        Ok(self
            .bookmarks
            .lock()
            .unwrap()
            .iter()
            .map(|id| RecipeCard {
                id: id.clone(),
                name: format!("Recipe {id}"),
                source: RecipeSource::Text,
                source_label: RecipeSource::Text.label().to_owned(),
                ingredients: Vec::new(),
                steps: Vec::new(),
                untitled: false,
            })
            .collect())
    }
}
