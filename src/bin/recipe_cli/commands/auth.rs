// ABOUTME: Credential commands for recipe-cli
// ABOUTME: Caches or discards the access token used by the other commands
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_assistant::errors::AppResult;

use super::CliContext;

/// Cache an access token
pub fn login(context: &CliContext, token: &str) -> AppResult<()> {
    context.credentials.store_access_token(token)?;
    println!(
        "Token saved to {}",
        context.credentials.path().display()
    );
    Ok(())
}

/// Discard the cached access token
pub fn logout(context: &CliContext) -> AppResult<()> {
    context.credentials.clear()?;
    println!("Logged out");
    Ok(())
}
