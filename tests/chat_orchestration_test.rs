// ABOUTME: Integration tests for the chat orchestrator round trip and session lifecycle
// ABOUTME: Covers view routing, record merging, admission control, persistence, and reloads
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::{
    cart_reply, chat_reply, init_test_logging, product_json, recipe_reply, success_reply,
    MockBackend,
};
use recipe_assistant::backend::SessionDetail;
use recipe_assistant::chat::{CartItem, NormalizedResponse, View};
use recipe_assistant::constants::placeholders::IMAGE_ONLY_PROMPT;
use recipe_assistant::constants::titles::DEFAULT_SESSION_TITLE;
use recipe_assistant::credentials::CredentialStore;
use recipe_assistant::errors::{AppError, ErrorCode};
use recipe_assistant::models::{
    ChatMessage, MessageRole, Product, ResponseKind, SessionId, SessionSummary,
};
use recipe_assistant::services::{BookmarkService, ChatOrchestrator};
use serde_json::json;

fn orchestrator(backend: &Arc<MockBackend>) -> Arc<ChatOrchestrator> {
    init_test_logging();
    Arc::new(ChatOrchestrator::new(backend.clone()))
}

fn one_recipe(food_name: &str, source: &str) -> serde_json::Value {
    recipe_reply(json!([{
        "food_name": food_name,
        "source": source,
        "ingredients": ["salt"],
        "recipe": ["cook"]
    }]))
}

#[tokio::test]
async fn test_recipe_request_end_to_end() {
    let backend = MockBackend::new();
    backend.push_reply(json!({
        "status": "success",
        "result": {
            "chatType": "recipe",
            "answer": "된장찌개 만드는 법이에요",
            "chat_id": 7,
            "recipes": [{
                "food_name": "된장찌개",
                "source": "text",
                "ingredients": ["된장", {"name": "두부", "amount": "1", "unit": "모"}],
                "recipe": ["1단계", "2단계"]
            }]
        }
    }));
    let gate = backend.hold_replies();
    let orchestrator = orchestrator(&backend);

    let pending = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.submit("된장찌개 레시피 알려줘", None).await })
    };

    // The outgoing message is visible while the backend call is pending
    gate.entered.notified().await;
    let during = orchestrator.snapshot().await;
    assert_eq!(during.messages.len(), 1);
    assert_eq!(during.messages[0].role, MessageRole::User);
    assert_eq!(during.messages[0].content, "된장찌개 레시피 알려줘");
    assert!(orchestrator.is_sending());

    gate.release.notify_one();
    let outcome = pending.await.unwrap().unwrap();

    assert_eq!(outcome.view, View::Recipe);
    assert_eq!(outcome.added_recipes.len(), 1);
    assert_eq!(outcome.added_recipes[0].name, "된장찌개");
    assert_eq!(outcome.added_recipes[0].steps, vec!["1단계", "2단계"]);
    assert_eq!(outcome.added_recipes[0].ingredients[1].unit, "모");
    assert_eq!(outcome.session_id, SessionId::persisted("7"));
    assert!(outcome.error_banner.is_none());

    let snapshot = orchestrator.snapshot().await;
    assert_eq!(snapshot.title, "된장찌개 레시피 알려줘");
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[1].kind, Some(ResponseKind::Recipe));
    assert_eq!(snapshot.messages[1].content, "된장찌개 만드는 법이에요");
    assert!(!orchestrator.is_sending());

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].session_id, None);

    orchestrator.wait_for_persistence().await;
    let saved = backend.saved_recipes();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].0, "7");
    assert_eq!(saved[0].1, outcome.added_recipes);
}

#[tokio::test]
async fn test_second_submit_while_pending_is_rejected() {
    let backend = MockBackend::new();
    let gate = backend.hold_replies();
    let orchestrator = orchestrator(&backend);

    let pending = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.submit("first", None).await })
    };
    gate.entered.notified().await;

    let error = orchestrator.submit("second", None).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceLocked);
    assert_eq!(orchestrator.snapshot().await.messages.len(), 1);

    gate.release.notify_one();
    pending.await.unwrap().unwrap();
    assert_eq!(backend.requests().len(), 1);
    assert_eq!(orchestrator.snapshot().await.messages.len(), 2);
}

#[tokio::test]
async fn test_image_only_message_uses_prompt_and_placeholder_title() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    orchestrator
        .submit("", Some("data:image/png;base64,AAAA".to_owned()))
        .await
        .unwrap();

    let request = &backend.requests()[0];
    assert_eq!(request.message, IMAGE_ONLY_PROMPT);
    assert!(!request.message.is_empty());
    assert_eq!(request.image.as_deref(), Some("data:image/png;base64,AAAA"));

    let snapshot = orchestrator.snapshot().await;
    assert_eq!(snapshot.messages[0].content, "");
    assert_eq!(
        snapshot.messages[0].image.as_deref(),
        Some("data:image/png;base64,AAAA")
    );
    assert_eq!(snapshot.title, DEFAULT_SESSION_TITLE);
}

#[tokio::test]
async fn test_empty_submit_changes_nothing() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    let error = orchestrator.submit("   ", None).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
    assert!(orchestrator.snapshot().await.messages.is_empty());
    assert!(backend.requests().is_empty());
}

#[tokio::test]
async fn test_chat_reply_preserves_any_view() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(one_recipe("Bibimbap", "text"));
    assert_eq!(orchestrator.submit("bibimbap?", None).await.unwrap().view, View::Recipe);

    orchestrator.show_view(View::Bookmark).await;
    backend.push_reply(chat_reply("Enjoy your meal"));
    let outcome = orchestrator.submit("thanks", None).await.unwrap();
    assert_eq!(outcome.view, View::Bookmark);

    // Unknown kinds degrade to chat
    backend.push_reply(success_reply(json!({"chatType": "weather", "answer": "sunny"})));
    let outcome = orchestrator.submit("weather?", None).await.unwrap();
    assert_eq!(outcome.view, View::Bookmark);
    assert_eq!(outcome.response.display_text(), "sunny");
}

#[tokio::test]
async fn test_cart_reply_always_switches_to_cart() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(cart_reply(json!([
        {"source": "ingredient_search", "food_name": "salt", "products": [], "ingredients": []}
    ])));
    let outcome = orchestrator.submit("buy salt", None).await.unwrap();

    assert_eq!(outcome.view, View::Cart);
    assert!(outcome.added_cart_items.is_empty());
    assert!(orchestrator.snapshot().await.cart_board.is_empty());
}

#[tokio::test]
async fn test_empty_recipe_reply_keeps_current_view() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(cart_reply(json!([
        {"source": "ingredient_search", "food_name": "tofu",
         "products": [product_json("Soft tofu", 1500, "https://shop/tofu/1")]}
    ])));
    orchestrator.submit("buy tofu", None).await.unwrap();

    backend.push_reply(recipe_reply(json!([])));
    let outcome = orchestrator.submit("any recipe?", None).await.unwrap();
    assert_eq!(outcome.view, View::Cart);

    // Cart-shaped records in a recipe reply do not produce cards
    backend.push_reply(recipe_reply(json!([
        {"source": "ingredient_search", "food_name": "tofu", "products": []}
    ])));
    let outcome = orchestrator.submit("again", None).await.unwrap();
    assert_eq!(outcome.view, View::Cart);
    assert!(outcome.added_recipes.is_empty());
}

#[tokio::test]
async fn test_records_are_merged_across_turns() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(one_recipe("Japchae", "text"));
    let first = orchestrator.submit("japchae", None).await.unwrap();
    assert_eq!(first.added_recipes.len(), 1);

    backend.push_reply(one_recipe("Japchae", "text"));
    let second = orchestrator.submit("japchae again", None).await.unwrap();
    assert!(second.added_recipes.is_empty());
    assert_eq!(second.view, View::Recipe);

    backend.push_reply(one_recipe("Japchae", "video"));
    let third = orchestrator.submit("video please", None).await.unwrap();
    assert_eq!(third.added_recipes.len(), 1);

    let cart = json!([{"source": "ingredient_search", "food_name": "glass noodles",
                       "products": [product_json("Noodles", 3000, "https://shop/n/1")]}]);
    backend.push_reply(cart_reply(cart.clone()));
    orchestrator.submit("buy noodles", None).await.unwrap();
    backend.push_reply(cart_reply(cart));
    let repeated = orchestrator.submit("buy noodles again", None).await.unwrap();
    assert!(repeated.added_cart_items.is_empty());

    let snapshot = orchestrator.snapshot().await;
    assert_eq!(snapshot.recipes.len(), 2);
    assert_eq!(snapshot.cart_items.len(), 1);
    assert_eq!(snapshot.cart_board.groups().len(), 1);
}

#[tokio::test]
async fn test_backend_failure_becomes_assistant_error_message() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_failure(AppError::external_unavailable("Recipe API", "connection refused"));
    let outcome = orchestrator.submit("hello", None).await.unwrap();

    assert!(matches!(outcome.response, NormalizedResponse::Error { .. }));
    assert_eq!(
        outcome.error_banner.as_deref(),
        Some("Recipe API: connection refused")
    );
    assert_eq!(outcome.view, View::Welcome);
    assert!(!outcome.login_required);
    assert!(!outcome.session_id.is_persisted());

    let snapshot = orchestrator.snapshot().await;
    assert_eq!(snapshot.messages.len(), 2);
    assert_eq!(snapshot.messages[1].role, MessageRole::Assistant);
    assert_eq!(snapshot.messages[1].content, "Recipe API: connection refused");

    // An explicit error discriminator is handled the same way
    backend.push_reply(json!({"status": "error", "message": "quota exceeded"}));
    let outcome = orchestrator.submit("again", None).await.unwrap();
    assert_eq!(outcome.error_banner.as_deref(), Some("quota exceeded"));
}

#[tokio::test]
async fn test_auth_failure_clears_cached_credentials() {
    let backend = MockBackend::new();
    let dir = tempfile::tempdir().unwrap();
    let credentials = CredentialStore::new(dir.path().join("credentials.json"));
    credentials.store_access_token("stale-token").unwrap();

    let orchestrator = ChatOrchestrator::new(backend.clone()).with_credentials(credentials.clone());
    backend.push_failure(AppError::auth_expired("token expired"));

    let outcome = orchestrator.submit("hello", None).await.unwrap();
    assert!(outcome.login_required);
    assert_eq!(credentials.access_token().unwrap(), None);
    assert_eq!(orchestrator.snapshot().await.messages.len(), 2);
}

#[tokio::test]
async fn test_server_session_id_is_reused() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(success_reply(json!({"chatType": "chat", "answer": "hi", "chatId": "abc"})));
    orchestrator.submit("hi", None).await.unwrap();
    orchestrator.submit("and then?", None).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests[0].session_id, None);
    assert_eq!(requests[1].session_id.as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_failed_saves_wait_in_pending_sync() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);
    backend.fail_saves(true);

    backend.push_reply(json!({"status": "success", "result": {
        "chatType": "recipe", "answer": "ok", "chat_id": 11,
        "recipes": [{"food_name": "Kimchi stew", "source": "text", "recipe": ["boil"]}]
    }}));
    let outcome = orchestrator.submit("kimchi stew", None).await.unwrap();
    orchestrator.wait_for_persistence().await;

    // Optimistic: the card stays even though the save failed
    assert_eq!(outcome.view, View::Recipe);
    assert_eq!(orchestrator.snapshot().await.recipes.len(), 1);
    assert_eq!(orchestrator.pending_sync_count().await, 1);
    assert_eq!(orchestrator.retry_pending_sync().await, 0);
    assert_eq!(orchestrator.pending_sync_count().await, 1);

    backend.fail_saves(false);
    assert_eq!(orchestrator.retry_pending_sync().await, 1);
    assert_eq!(orchestrator.pending_sync_count().await, 0);
    assert_eq!(backend.saved_recipes()[0].0, "11");
}

#[tokio::test]
async fn test_saves_wait_for_server_session_id() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(one_recipe("Tteokbokki", "text"));
    orchestrator.submit("tteokbokki", None).await.unwrap();
    orchestrator.wait_for_persistence().await;
    assert_eq!(orchestrator.pending_sync_count().await, 1);
    assert_eq!(orchestrator.retry_pending_sync().await, 0);
    assert!(backend.saved_recipes().is_empty());

    backend.push_reply(success_reply(json!({"chatType": "chat", "answer": "ok", "chat_id": 12})));
    orchestrator.submit("thanks", None).await.unwrap();
    assert_eq!(orchestrator.retry_pending_sync().await, 1);
    assert_eq!(backend.saved_recipes()[0].0, "12");
}

#[tokio::test]
async fn test_unsaved_records_of_replaced_session_are_dropped() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);

    backend.push_reply(one_recipe("Galbi", "text"));
    orchestrator.submit("galbi", None).await.unwrap();
    assert_eq!(orchestrator.pending_sync_count().await, 1);

    orchestrator.start_new_chat().await;
    assert_eq!(orchestrator.pending_sync_count().await, 0);

    // The new session adopting an id does not pick up the old records
    backend.push_reply(success_reply(json!({"chatType": "chat", "answer": "ok", "chat_id": 99})));
    orchestrator.submit("hello", None).await.unwrap();
    assert_eq!(orchestrator.retry_pending_sync().await, 0);
    assert_eq!(orchestrator.pending_sync_count().await, 0);
    assert!(backend.saved_recipes().is_empty());

    // Loading a stored session drops the placeholder queue as well
    orchestrator.start_new_chat().await;
    backend.push_reply(one_recipe("Naengmyeon", "text"));
    orchestrator.submit("naengmyeon", None).await.unwrap();
    assert_eq!(orchestrator.pending_sync_count().await, 1);
    backend.add_session(
        SessionSummary {
            id: "s2".to_owned(),
            title: "stored".to_owned(),
            last_activity: None,
        },
        SessionDetail {
            id: "s2".to_owned(),
            ..SessionDetail::default()
        },
    );
    orchestrator.load_session("s2").await.unwrap();
    assert_eq!(orchestrator.pending_sync_count().await, 0);
}

#[tokio::test]
async fn test_failed_saves_of_persisted_session_survive_session_switch() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);
    backend.fail_saves(true);

    backend.push_reply(json!({"status": "success", "result": {
        "chatType": "recipe", "answer": "ok", "chat_id": 21,
        "recipes": [{"food_name": "Sundubu", "source": "text", "recipe": ["simmer"]}]
    }}));
    orchestrator.submit("sundubu", None).await.unwrap();
    orchestrator.wait_for_persistence().await;
    orchestrator.start_new_chat().await;
    assert_eq!(orchestrator.pending_sync_count().await, 1);

    backend.fail_saves(false);
    assert_eq!(orchestrator.retry_pending_sync().await, 1);
    assert_eq!(backend.saved_recipes()[0].0, "21");
}

#[tokio::test]
async fn test_reply_for_abandoned_session_is_discarded() {
    let backend = MockBackend::new();
    backend.push_reply(one_recipe("Bulgogi", "text"));
    let gate = backend.hold_replies();
    let orchestrator = orchestrator(&backend);

    let pending = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.submit("bulgogi", None).await })
    };
    gate.entered.notified().await;

    let fresh_id = orchestrator.start_new_chat().await;
    gate.release.notify_one();
    let outcome = pending.await.unwrap().unwrap();

    assert!(outcome.discarded);
    assert!(outcome.added_recipes.is_empty());
    let snapshot = orchestrator.snapshot().await;
    assert_eq!(snapshot.session_id, fresh_id);
    assert!(snapshot.messages.is_empty());
    assert!(snapshot.recipes.is_empty());
    assert_eq!(snapshot.view, View::Welcome);
}

fn stored_cart_session() -> SessionDetail {
    let tofu = |url: &str, price| Product {
        name: format!("tofu {url}"),
        price,
        image: String::new(),
        url: url.to_owned(),
    };
    SessionDetail {
        id: "s1".to_owned(),
        messages: vec![
            ChatMessage::user("두부 사고 싶어", None),
            ChatMessage::assistant("Found tofu", ResponseKind::Cart, vec![]),
        ],
        recipes: Vec::new(),
        cart_items: vec![CartItem {
            food_name: "tofu".to_owned(),
            products: vec![tofu("p", 1000), tofu("q", 1500)],
        }],
    }
}

#[tokio::test]
async fn test_session_listing_and_reload() {
    let backend = MockBackend::new();
    backend.add_session(
        SessionSummary {
            id: "s0".to_owned(),
            title: "older".to_owned(),
            last_activity: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
        },
        SessionDetail {
            id: "s0".to_owned(),
            ..SessionDetail::default()
        },
    );
    backend.add_session(
        SessionSummary {
            id: "s1".to_owned(),
            title: "두부 사고 싶어".to_owned(),
            last_activity: Some(Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
        },
        stored_cart_session(),
    );
    let orchestrator = orchestrator(&backend);

    let sessions = orchestrator.list_sessions().await.unwrap();
    let ids: Vec<&str> = sessions.iter().map(|session| session.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s0"]);

    let snapshot = orchestrator.load_session("s1").await.unwrap();
    assert_eq!(snapshot.view, View::Cart);
    assert_eq!(snapshot.title, "두부 사고 싶어");
    assert_eq!(snapshot.session_id, SessionId::persisted("s1"));
    assert_eq!(snapshot.cart_board.groups().len(), 1);

    assert!(orchestrator.toggle_cart_product("tofu", "q").await.unwrap());
    assert!(orchestrator.toggle_cart_product("tofu", "p").await.unwrap());
    assert_eq!(orchestrator.selected_product_urls().await, vec!["p", "q"]);

    assert!(!orchestrator.toggle_cart_group("tofu").await.unwrap());
    assert!(orchestrator.selected_product_urls().await.is_empty());

    let empty = orchestrator.load_session("s0").await.unwrap();
    assert_eq!(empty.view, View::Welcome);
    assert_eq!(empty.title, DEFAULT_SESSION_TITLE);
}

#[tokio::test]
async fn test_failed_reload_keeps_active_session() {
    let backend = MockBackend::new();
    let orchestrator = orchestrator(&backend);
    orchestrator.submit("hello", None).await.unwrap();

    let error = orchestrator.load_session("missing").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
    assert_eq!(orchestrator.snapshot().await.messages.len(), 2);
}

#[tokio::test]
async fn test_bookmark_service_toggles_remote_state() {
    init_test_logging();
    let backend = MockBackend::new();
    let bookmarks = BookmarkService::new(backend.clone());

    assert!(bookmarks.toggle("r1").await.unwrap());
    assert!(bookmarks.is_bookmarked("r1").await.unwrap());
    assert_eq!(bookmarks.list().await.unwrap().len(), 1);

    assert!(!bookmarks.toggle(" r1 ").await.unwrap());
    assert!(bookmarks.list().await.unwrap().is_empty());

    let error = bookmarks.toggle("  ").await.unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}
