// ABOUTME: Chat commands for recipe-cli
// ABOUTME: Single round trips and an interactive loop with view, cart, and checkout commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_assistant::chat::View;
use recipe_assistant::errors::{AppError, AppResult};
use recipe_assistant::extension::ExtensionBridge;
use recipe_assistant::services::ChatOrchestrator;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::warn;

use super::{guard_auth, CliContext};
use crate::helpers::display::{print_cart_board, print_outcome, print_snapshot};

const REPL_HELP: &str = "\
Commands:
  /new                      start a new chat
  /view <welcome|recipe|cart|bookmark>
  /show                     print the session
  /toggle <ingredient>      enable or disable a cart group
  /select <ingredient> <url>  toggle a product in a cart group
  /checkout                 send selected products to the cart extension
  /retry                    re-send saves that failed
  /quit
Anything else is sent as a chat message.";

/// One round trip, optionally in a stored session
pub async fn send(
    context: &CliContext,
    text: &str,
    image: Option<String>,
    session_id: Option<&str>,
) -> AppResult<()> {
    let orchestrator = context.orchestrator()?;
    if let Some(session_id) = session_id {
        guard_auth(context, orchestrator.load_session(session_id).await)?;
    }

    round_trip(&orchestrator, text, image).await?;
    finish_persistence(&orchestrator).await;
    Ok(())
}

/// Interactive chat loop reading commands from stdin
pub async fn repl(context: &CliContext, session_id: Option<&str>) -> AppResult<()> {
    let orchestrator = context.orchestrator()?;
    let bridge = ExtensionBridge::default();

    if let Some(session_id) = session_id {
        let snapshot = guard_auth(context, orchestrator.load_session(session_id).await)?;
        print_snapshot(&snapshot);
    }
    println!("{REPL_HELP}");

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let mut words = line.split_whitespace();
        let result = match words.next() {
            Some("/quit" | "/exit") => break,
            Some("/help") => {
                println!("{REPL_HELP}");
                Ok(())
            }
            Some("/new") => {
                let session_id = orchestrator.start_new_chat().await;
                println!("Started {session_id}");
                Ok(())
            }
            Some("/view") => switch_view(&orchestrator, words.next()).await,
            Some("/show") => {
                print_snapshot(&orchestrator.snapshot().await);
                Ok(())
            }
            Some("/toggle") => toggle_group(&orchestrator, &words.collect::<Vec<_>>().join(" ")).await,
            Some("/select") => {
                let rest: Vec<&str> = words.collect();
                select_product(&orchestrator, &rest).await
            }
            Some("/checkout") => checkout(context, &orchestrator, &bridge).await,
            Some("/retry") => {
                let saved = orchestrator.retry_pending_sync().await;
                println!("Saved {saved} record(s)");
                Ok(())
            }
            _ => round_trip(&orchestrator, line, None).await,
        };

        if let Err(e) = result {
            println!("! {e}");
        }
    }

    finish_persistence(&orchestrator).await;
    Ok(())
}

async fn round_trip(orchestrator: &ChatOrchestrator, text: &str, image: Option<String>) -> AppResult<()> {
    let outcome = orchestrator.submit(text, image).await?;
    print_outcome(&outcome);
    if outcome.view == View::Cart && outcome.error_banner.is_none() {
        print_cart_board(&orchestrator.snapshot().await.cart_board);
    }
    Ok(())
}

async fn switch_view(orchestrator: &ChatOrchestrator, name: Option<&str>) -> AppResult<()> {
    let view = match name {
        Some("welcome") => View::Welcome,
        Some("recipe") => View::Recipe,
        Some("cart") => View::Cart,
        Some("bookmark") => View::Bookmark,
        other => {
            return Err(AppError::invalid_input(format!(
                "Unknown view '{}'",
                other.unwrap_or_default()
            )))
        }
    };
    orchestrator.show_view(view).await;
    println!("View: {view}");
    Ok(())
}

async fn toggle_group(orchestrator: &ChatOrchestrator, ingredient: &str) -> AppResult<()> {
    let active = orchestrator.toggle_cart_group(ingredient).await?;
    println!("{ingredient}: {}", if active { "enabled" } else { "disabled" });
    Ok(())
}

async fn select_product(orchestrator: &ChatOrchestrator, args: &[&str]) -> AppResult<()> {
    let Some((url, ingredient)) = args.split_last() else {
        return Err(AppError::invalid_input("Usage: /select <ingredient> <url>"));
    };
    if ingredient.is_empty() {
        return Err(AppError::invalid_input("Usage: /select <ingredient> <url>"));
    }
    let ingredient = ingredient.join(" ");
    let selected = orchestrator.toggle_cart_product(&ingredient, url).await?;
    println!("{url}: {}", if selected { "selected" } else { "unselected" });
    Ok(())
}

async fn checkout(
    context: &CliContext,
    orchestrator: &ChatOrchestrator,
    bridge: &ExtensionBridge,
) -> AppResult<()> {
    let urls = orchestrator.selected_product_urls().await;
    if urls.is_empty() {
        return Err(AppError::invalid_input("No products selected"));
    }

    if bridge.is_extension_installed(context.config.extension_probe).await {
        bridge.request_checkout(urls)?;
        println!("Sent to the cart extension");
    } else {
        println!("Cart extension not installed. Selected products:");
        for url in urls {
            println!("  {url}");
        }
    }
    Ok(())
}

async fn finish_persistence(orchestrator: &ChatOrchestrator) {
    orchestrator.wait_for_persistence().await;
    let pending = orchestrator.pending_sync_count().await;
    if pending > 0 {
        warn!(pending, "Some records were not saved");
        println!("{pending} record(s) could not be saved yet; use /retry in the REPL");
    }
}
