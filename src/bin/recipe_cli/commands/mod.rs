// ABOUTME: Command modules for recipe-cli and the shared command context
// ABOUTME: Builds the authenticated backend and the services each command needs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub mod auth;
pub mod bookmarks;
pub mod chat;
pub mod sessions;

use std::sync::Arc;

use recipe_assistant::backend::{ChatBackend, HttpBackend};
use recipe_assistant::config::ClientConfig;
use recipe_assistant::credentials::CredentialStore;
use recipe_assistant::errors::{AppError, AppResult};
use recipe_assistant::services::{BookmarkService, ChatOrchestrator};

/// Configuration and credential cache shared by all commands
pub struct CliContext {
    pub config: ClientConfig,
    pub credentials: CredentialStore,
}

impl CliContext {
    pub const fn new(config: ClientConfig, credentials: CredentialStore) -> Self {
        Self {
            config,
            credentials,
        }
    }

    /// Backend authenticated with the environment token or the cached one
    pub fn backend(&self) -> AppResult<Arc<dyn ChatBackend>> {
        let token = match &self.config.api_token {
            Some(token) => token.clone(),
            None => self.credentials.access_token()?.ok_or_else(AppError::auth_required)?,
        };
        let backend = HttpBackend::new(self.config.backend_config(Some(token)))?;
        Ok(Arc::new(backend))
    }

    pub fn orchestrator(&self) -> AppResult<ChatOrchestrator> {
        Ok(ChatOrchestrator::new(self.backend()?).with_credentials(self.credentials.clone()))
    }

    pub fn bookmarks(&self) -> AppResult<BookmarkService> {
        Ok(BookmarkService::new(self.backend()?))
    }
}

/// Run a backend call, clearing the cached token when it was rejected
pub fn guard_auth<T>(context: &CliContext, result: AppResult<T>) -> AppResult<T> {
    if let Err(e) = &result {
        if e.is_auth_failure() {
            if let Err(clear_error) = context.credentials.clear() {
                tracing::warn!(error = %clear_error, "Failed to clear cached credentials");
            }
            crate::helpers::display::print_login_required();
        }
    }
    result
}
