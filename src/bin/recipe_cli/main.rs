// ABOUTME: Recipe CLI - terminal client for the recipe assistant chat backend
// ABOUTME: Sends chat messages, browses sessions and bookmarks, and manages the cached token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
//!
//! Usage:
//! ```bash
//! # Cache an access token
//! recipe-cli login <token>
//!
//! # One round trip in a new session
//! recipe-cli chat "된장찌개 레시피 알려줘"
//!
//! # Continue a stored session, attaching an image
//! recipe-cli chat "what is this?" --image ./photo.png --session 42
//!
//! # Interactive session with cart commands
//! recipe-cli repl
//!
//! # Stored sessions and bookmarks
//! recipe-cli sessions
//! recipe-cli show 42
//! recipe-cli bookmarks
//! recipe-cli bookmark <recipe_id>
//! ```

mod commands;
mod helpers;

use clap::{Parser, Subcommand};
use recipe_assistant::config::environment::parse_base_url;
use recipe_assistant::config::ClientConfig;
use recipe_assistant::credentials::CredentialStore;
use recipe_assistant::logging::LoggingConfig;
use tracing::debug;

use commands::CliContext;

#[derive(Parser)]
#[command(
    name = "recipe-cli",
    about = "Recipe assistant chat client",
    long_about = "Chat with the recipe assistant, browse suggested recipes, and pick products for your cart."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// API root override (defaults to `RECIPE_API_BASE_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Send one message and show the reply
    Chat {
        /// Message text (may be empty when an image is attached)
        #[arg(default_value = "")]
        text: String,

        /// Image reference to attach
        #[arg(long)]
        image: Option<String>,

        /// Continue this stored session instead of starting a new one
        #[arg(long)]
        session: Option<String>,
    },

    /// Interactive chat with view and cart commands
    Repl {
        /// Stored session to resume
        #[arg(long)]
        session: Option<String>,
    },

    /// List stored sessions, newest first
    Sessions,

    /// Show the transcript and records of a stored session
    Show {
        /// Session identifier
        session_id: String,
    },

    /// List bookmarked recipes
    Bookmarks,

    /// Toggle the bookmark on a recipe
    Bookmark {
        /// Recipe identifier
        recipe_id: String,
    },

    /// Cache an access token for later commands
    Login {
        /// Access token issued by the recipe service
        token: String,
    },

    /// Discard the cached access token
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig::from_env();
    let logging = if cli.verbose {
        logging.with_level("debug")
    } else {
        logging
    };
    logging.init()?;

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = &cli.api_url {
        config.api_base_url = parse_base_url(api_url)?;
    }
    debug!(api_base_url = %config.api_base_url, "Using API root");

    let credentials = CredentialStore::new(config.credentials_path.clone());
    let context = CliContext::new(config, credentials);

    match cli.command {
        Command::Chat {
            text,
            image,
            session,
        } => commands::chat::send(&context, &text, image, session.as_deref()).await?,
        Command::Repl { session } => commands::chat::repl(&context, session.as_deref()).await?,
        Command::Sessions => commands::sessions::list(&context).await?,
        Command::Show { session_id } => commands::sessions::show(&context, &session_id).await?,
        Command::Bookmarks => commands::bookmarks::list(&context).await?,
        Command::Bookmark { recipe_id } => commands::bookmarks::toggle(&context, &recipe_id).await?,
        Command::Login { token } => commands::auth::login(&context, &token)?,
        Command::Logout => commands::auth::logout(&context)?,
    }

    Ok(())
}
