// ABOUTME: Output formatting helpers for recipe-cli
// ABOUTME: Prints replies, transcripts, recipe cards, cart groups, and session listings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_assistant::chat::{CartBoard, RecipeCard, View};
use recipe_assistant::models::{ChatMessage, MessageRole, SessionSummary};
use recipe_assistant::services::{ConversationSnapshot, RoundTripOutcome};

/// Print the reply of one round trip and what changed
pub fn print_outcome(outcome: &RoundTripOutcome) {
    if outcome.discarded {
        println!("(reply arrived after the session changed and was dropped)");
        return;
    }

    println!("assistant: {}", outcome.response.display_text());
    if let Some(banner) = &outcome.error_banner {
        eprintln!("! {banner}");
    }
    if outcome.login_required {
        print_login_required();
    }

    if !outcome.added_recipes.is_empty() {
        print_recipe_cards(&outcome.added_recipes);
    }
    if !outcome.added_cart_items.is_empty() {
        println!("{} new ingredient search(es)", outcome.added_cart_items.len());
    }
    println!("[view: {} | session: {}]", outcome.view, outcome.session_id);
}

/// Tell the user to log in again
pub fn print_login_required() {
    eprintln!("Your login has expired. Run `recipe-cli login <token>` to continue.");
}

/// Print a whole conversation state
pub fn print_snapshot(snapshot: &ConversationSnapshot) {
    println!("{} ({})", snapshot.title, snapshot.session_id);
    println!("{}", "=".repeat(60));
    for message in &snapshot.messages {
        print_message(message);
    }
    println!("{}", "=".repeat(60));

    match snapshot.view {
        View::Recipe => print_recipe_cards(&snapshot.recipes),
        View::Cart => print_cart_board(&snapshot.cart_board),
        View::Welcome | View::Bookmark => {}
    }
    println!("[view: {}]", snapshot.view);
}

fn print_message(message: &ChatMessage) {
    let author = match message.role {
        MessageRole::User => "you",
        MessageRole::Assistant => "assistant",
    };
    let time = message.created_at.format("%Y-%m-%d %H:%M");
    match &message.image {
        Some(image) if message.content.is_empty() => println!("[{time}] {author}: <image {image}>"),
        Some(image) => println!("[{time}] {author}: {} <image {image}>", message.content),
        None => println!("[{time}] {author}: {}", message.content),
    }
}

/// Print recipe cards with ingredients and steps
pub fn print_recipe_cards(cards: &[RecipeCard]) {
    for card in cards {
        println!("\n* {} ({}) [{}]", card.name, card.source_label, card.id);
        for line in &card.ingredients {
            let quantity = format!("{} {}", line.amount, line.unit);
            let quantity = quantity.trim();
            if quantity.is_empty() {
                println!("    - {}", line.name);
            } else {
                println!("    - {} {quantity}", line.name);
            }
        }
        for (index, step) in card.steps.iter().enumerate() {
            println!("    {}. {step}", index + 1);
        }
    }
}

/// Print cart groups with selection markers
pub fn print_cart_board(board: &CartBoard) {
    if board.is_empty() {
        println!("Cart is empty");
        return;
    }
    for group in board.groups() {
        let state = if group.is_active() { "" } else { " (disabled)" };
        println!("\n# {}{state}", group.ingredient);
        for product in &group.candidates {
            let mark = if group.is_selected(&product.url) { "x" } else { " " };
            println!("  [{mark}] {} {} {}", product.name, product.price, product.url);
        }
    }
    println!("\nSelected total: {}", board.selected_total());
}

/// Print the session listing
pub fn print_sessions(sessions: &[SessionSummary]) {
    if sessions.is_empty() {
        println!("No stored sessions");
        return;
    }
    for session in sessions {
        let when = session
            .last_activity
            .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!("{:>10}  {:<16}  {}", session.id, when, session.title);
    }
}
