// ABOUTME: Session browsing commands for recipe-cli
// ABOUTME: Lists stored sessions and shows one session with its restored view
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use recipe_assistant::errors::AppResult;

use super::{guard_auth, CliContext};
use crate::helpers::display::{print_sessions, print_snapshot};

/// Show stored sessions, newest first
pub async fn list(context: &CliContext) -> AppResult<()> {
    let orchestrator = context.orchestrator()?;
    let sessions = guard_auth(context, orchestrator.list_sessions().await)?;
    print_sessions(&sessions);
    Ok(())
}

/// Show one stored session
pub async fn show(context: &CliContext, session_id: &str) -> AppResult<()> {
    let orchestrator = context.orchestrator()?;
    let snapshot = guard_auth(context, orchestrator.load_session(session_id).await)?;
    print_snapshot(&snapshot);
    Ok(())
}
