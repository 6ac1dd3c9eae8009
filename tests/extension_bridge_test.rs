// ABOUTME: Integration tests for the checkout extension message bridge
// ABOUTME: Simulates an installed extension on the bus and checks probing and checkout hand-off
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use std::time::Duration;

use common::init_test_logging;
use recipe_assistant::extension::{ExtensionBridge, ExtensionMessage};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;

/// Fake extension: answers presence probes and collects checkout requests
fn spawn_extension(bridge: &ExtensionBridge) -> JoinHandle<Vec<Vec<String>>> {
    let mut inbox = bridge.subscribe();
    let bridge = bridge.clone();
    tokio::spawn(async move {
        let mut checkouts = Vec::new();
        loop {
            match inbox.recv().await {
                Ok(ExtensionMessage::PresenceRequest) => {
                    bridge.post(ExtensionMessage::PresenceResponse);
                }
                Ok(ExtensionMessage::AddToCartRequest { urls }) => {
                    checkouts.push(urls);
                    return checkouts;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => return checkouts,
            }
        }
    })
}

#[tokio::test(start_paused = true)]
async fn test_probe_without_extension_times_out_as_absent() {
    init_test_logging();
    let bridge = ExtensionBridge::default();

    let installed = bridge.is_extension_installed(Duration::from_millis(500)).await;
    assert!(!installed);
}

#[tokio::test(start_paused = true)]
async fn test_probe_ignores_unrelated_messages() {
    init_test_logging();
    let bridge = ExtensionBridge::default();
    let mut inbox = bridge.subscribe();
    let noisy = bridge.clone();
    tokio::spawn(async move {
        while let Ok(message) = inbox.recv().await {
            if message == ExtensionMessage::PresenceRequest {
                noisy.post(ExtensionMessage::Unknown);
            }
        }
    });

    assert!(!bridge.is_extension_installed(Duration::from_millis(200)).await);
}

#[tokio::test]
async fn test_installed_extension_answers_probe_and_receives_checkout() {
    init_test_logging();
    let bridge = ExtensionBridge::default();
    let extension = spawn_extension(&bridge);

    assert!(bridge.is_extension_installed(Duration::from_secs(5)).await);

    let urls = vec![
        "https://shop/tofu/1".to_owned(),
        "https://shop/tofu/2".to_owned(),
    ];
    let delivered = bridge.request_checkout(urls.clone()).unwrap();
    assert_eq!(delivered, 1);

    let checkouts = extension.await.unwrap();
    assert_eq!(checkouts, vec![urls]);
}

#[tokio::test]
async fn test_message_parsing_from_page_json() {
    let message =
        ExtensionMessage::from_json(r#"{"type":"add-to-cart-request","urls":["a","b"]}"#).unwrap();
    assert_eq!(
        message,
        ExtensionMessage::AddToCartRequest {
            urls: vec!["a".to_owned(), "b".to_owned()]
        }
    );
    assert_eq!(message.message_type(), "add-to-cart-request");
    assert!(ExtensionMessage::from_json("not json").is_err());
}
