// ABOUTME: Chat orchestration service driving one round trip from user input to the next view
// ABOUTME: Owns the session state, serializes round trips, and persists new records optimistically
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Chat Orchestration
//!
//! [`ChatOrchestrator::submit`] runs the round trip in this order:
//!
//! 1. the outgoing user message is appended (visible before any network I/O)
//! 2. the backend is called with the state lock released
//! 3. normalizer, projectors, view router and accumulator run under one lock
//!    acquisition, so no partial update is observable
//! 4. newly added recipe cards and cart items are saved in the background
//!
//! Only one round trip may be in flight; a second submit is rejected with
//! `ErrorCode::ResourceLocked` and leaves the state untouched. Switching
//! sessions while a reply is pending bumps the session epoch, and the late
//! reply is discarded instead of being applied to the new session.
//!
//! Failed background saves are not rolled back. They are kept per session in a
//! pending-sync queue that [`ChatOrchestrator::retry_pending_sync`] re-sends.
//! Records of a session that is replaced before the backend issued its id are
//! dropped with a warning, since nothing can save them afterwards.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::backend::{ChatBackend, ChatRequest};
use crate::chat::cart::{merge_cart_items, project_cart_items};
use crate::chat::normalizer::normalize_round_trip;
use crate::chat::recipes::{merge_recipe_cards, project_recipes};
use crate::chat::{CartBoard, CartItem, ChatSession, NormalizedResponse, RecipeCard, View, ViewRouter};
use crate::constants::placeholders::PENDING_SESSION_PREFIX;
use crate::credentials::CredentialStore;
use crate::errors::{AppError, AppResult};
use crate::models::{ChatMessage, ResponseKind, SessionId, SessionSummary};

/// What a caller needs to render after one round trip
#[derive(Debug, Clone, PartialEq)]
pub struct RoundTripOutcome {
    /// Normalized reply (also appended to the transcript)
    pub response: NormalizedResponse,
    /// View after the round trip
    pub view: View,
    /// Recipe cards that were new to this session
    pub added_recipes: Vec<RecipeCard>,
    /// Cart items that were new to this session
    pub added_cart_items: Vec<CartItem>,
    /// Session the reply was applied to
    pub session_id: SessionId,
    /// Transient error text to show next to the transcript
    pub error_banner: Option<String>,
    /// The credential was rejected and has been discarded
    pub login_required: bool,
    /// The session changed while the reply was pending; nothing was applied
    pub discarded: bool,
}

/// Read-only copy of the conversation state
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    /// Session identifier
    pub session_id: SessionId,
    /// Session title
    pub title: String,
    /// Transcript
    pub messages: Vec<ChatMessage>,
    /// Current view
    pub view: View,
    /// Accumulated recipe cards
    pub recipes: Vec<RecipeCard>,
    /// Accumulated cart items
    pub cart_items: Vec<CartItem>,
    /// Shopping board with the user's selections
    pub cart_board: CartBoard,
}

#[derive(Debug)]
struct ConversationState {
    epoch: u64,
    session: ChatSession,
    recipes: Vec<RecipeCard>,
    cart_items: Vec<CartItem>,
    board: CartBoard,
    router: ViewRouter,
}

struct AppliedReply {
    view: View,
    added_recipes: Vec<RecipeCard>,
    added_cart_items: Vec<CartItem>,
    previous_id: SessionId,
}

impl ConversationState {
    fn fresh(epoch: u64) -> Self {
        Self {
            epoch,
            session: ChatSession::new_pending(),
            recipes: Vec::new(),
            cart_items: Vec::new(),
            board: CartBoard::default(),
            router: ViewRouter::new(),
        }
    }

    fn apply(&mut self, response: &NormalizedResponse) -> AppliedReply {
        let previous_id = self.session.id().clone();
        let mut added_recipes = Vec::new();
        let mut added_cart_items = Vec::new();

        if let NormalizedResponse::Standard(reply) = response {
            if let Some(server_id) = &reply.session_id {
                self.session.adopt_server_id(server_id);
            }

            match reply.kind {
                ResponseKind::Recipe => {
                    let cards = project_recipes(&reply.recipes);
                    let projected = cards.len();
                    added_recipes = merge_recipe_cards(&mut self.recipes, cards);
                    self.router.apply_round_trip(Some(reply.kind), projected);
                }
                ResponseKind::Cart => {
                    let items = project_cart_items(&reply.recipes);
                    added_cart_items = merge_cart_items(&mut self.cart_items, items);
                    self.board.sync(&added_cart_items);
                    self.router.apply_round_trip(Some(reply.kind), 0);
                }
                ResponseKind::Chat => {
                    self.router.apply_round_trip(Some(reply.kind), 0);
                }
            }
        }

        self.session.record_incoming(response);

        AppliedReply {
            view: self.router.current(),
            added_recipes,
            added_cart_items,
            previous_id,
        }
    }

    fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            session_id: self.session.id().clone(),
            title: self.session.title().to_owned(),
            messages: self.session.messages().to_vec(),
            view: self.router.current(),
            recipes: self.recipes.clone(),
            cart_items: self.cart_items.clone(),
            cart_board: self.board.clone(),
        }
    }
}

/// Records whose background save failed or could not be attempted yet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct PendingRecords {
    recipes: Vec<RecipeCard>,
    cart_items: Vec<CartItem>,
}

impl PendingRecords {
    fn len(&self) -> usize {
        self.recipes.len() + self.cart_items.len()
    }

    fn is_empty(&self) -> bool {
        self.recipes.is_empty() && self.cart_items.is_empty()
    }

    fn absorb(&mut self, other: Self) {
        self.recipes.extend(other.recipes);
        self.cart_items.extend(other.cart_items);
    }
}

type PendingQueue = Arc<Mutex<HashMap<String, PendingRecords>>>;

/// Clears the in-flight flag when the round trip ends, on every path
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> AppResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AppError::busy("A message is already being sent"))?;
        Ok(Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Conversation owner: one active session, its records, and the current view
pub struct ChatOrchestrator {
    backend: Arc<dyn ChatBackend>,
    credentials: Option<CredentialStore>,
    state: Mutex<ConversationState>,
    in_flight: AtomicBool,
    pending_sync: PendingQueue,
    persistence_tasks: Mutex<JoinSet<()>>,
}

impl ChatOrchestrator {
    /// Orchestrator starting on a fresh, unsaved session
    #[must_use]
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self {
            backend,
            credentials: None,
            state: Mutex::new(ConversationState::fresh(0)),
            in_flight: AtomicBool::new(false),
            pending_sync: Arc::new(Mutex::new(HashMap::new())),
            persistence_tasks: Mutex::new(JoinSet::new()),
        }
    }

    /// Discard this credential cache whenever the backend rejects the credential
    #[must_use]
    pub fn with_credentials(mut self, credentials: CredentialStore) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Whether a round trip is in flight
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Send one user message and apply the reply
    ///
    /// Backend failures do not fail this call: they become an assistant error
    /// message plus `error_banner` in the outcome.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ResourceLocked` while another round trip is pending
    /// and `AppError::InvalidInput` when both text and image are empty. In both
    /// cases the transcript is unchanged.
    pub async fn submit(&self, text: &str, image: Option<String>) -> AppResult<RoundTripOutcome> {
        let _in_flight = InFlightGuard::acquire(&self.in_flight)?;

        let (request, epoch) = {
            let mut state = self.state.lock().await;
            let server_id = state.session.id().server_id().map(str::to_owned);
            let request = ChatRequest::new(text, image.clone(), server_id)?;
            state.session.record_outgoing(text, image);
            (request, state.epoch)
        };

        let result = self.backend.send_message(&request).await;
        let login_required = match &result {
            Err(e) if e.is_auth_failure() => {
                self.forget_credentials();
                true
            }
            Err(e) => {
                error!(error = %e, "Chat round trip failed");
                false
            }
            Ok(_) => false,
        };
        let response = normalize_round_trip(result);

        let mut state = self.state.lock().await;
        if state.epoch != epoch {
            warn!(
                session_id = %state.session.id(),
                "Session changed while a reply was pending, discarding it"
            );
            return Ok(RoundTripOutcome {
                response,
                view: state.router.current(),
                added_recipes: Vec::new(),
                added_cart_items: Vec::new(),
                session_id: state.session.id().clone(),
                error_banner: None,
                login_required,
                discarded: true,
            });
        }

        let applied = state.apply(&response);
        let session_id = state.session.id().clone();
        drop(state);

        if applied.previous_id != session_id {
            self.rekey_pending(&applied.previous_id, &session_id).await;
        }
        self.persist(&session_id, &applied.added_recipes, &applied.added_cart_items)
            .await;

        let error_banner = match &response {
            NormalizedResponse::Error { message } => Some(message.clone()),
            NormalizedResponse::Standard(_) => None,
        };
        debug!(%session_id, view = %applied.view, "Round trip applied");

        Ok(RoundTripOutcome {
            response,
            view: applied.view,
            added_recipes: applied.added_recipes,
            added_cart_items: applied.added_cart_items,
            session_id,
            error_banner,
            login_required,
            discarded: false,
        })
    }

    /// Drop the active session and start an empty one on the welcome view
    pub async fn start_new_chat(&self) -> SessionId {
        let mut state = self.state.lock().await;
        let next = ConversationState::fresh(state.epoch + 1);
        let previous = std::mem::replace(&mut *state, next);
        info!(session_id = %state.session.id(), "Started new chat session");
        let session_id = state.session.id().clone();
        drop(state);

        self.abandon_pending(previous.session.id()).await;
        session_id
    }

    /// List stored sessions, newest activity first
    ///
    /// # Errors
    ///
    /// Returns the backend error; authentication failures also clear the
    /// credential cache.
    pub async fn list_sessions(&self) -> AppResult<Vec<SessionSummary>> {
        let mut sessions = self
            .backend
            .list_sessions()
            .await
            .inspect_err(|e| self.observe_failure(e))?;
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(sessions)
    }

    /// Replace the active session with a stored one
    ///
    /// The view is restored from the last assistant message.
    ///
    /// # Errors
    ///
    /// Returns the backend error (the active session is kept in that case).
    pub async fn load_session(&self, session_id: &str) -> AppResult<ConversationSnapshot> {
        let detail = self
            .backend
            .get_session(session_id)
            .await
            .inspect_err(|e| self.observe_failure(e))?;

        let mut state = self.state.lock().await;
        let next = ConversationState {
            epoch: state.epoch + 1,
            router: ViewRouter::restored(&detail.messages),
            board: CartBoard::from_items(&detail.cart_items),
            session: ChatSession::restored(detail.id, detail.messages),
            recipes: detail.recipes,
            cart_items: detail.cart_items,
        };
        let previous = std::mem::replace(&mut *state, next);
        info!(
            session_id = %state.session.id(),
            messages = state.session.messages().len(),
            view = %state.router.current(),
            "Loaded chat session"
        );
        let snapshot = state.snapshot();
        drop(state);

        self.abandon_pending(previous.session.id()).await;
        Ok(snapshot)
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> ConversationSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Current view
    pub async fn current_view(&self) -> View {
        self.state.lock().await.router.current()
    }

    /// Manual view switch; always honored
    pub async fn show_view(&self, view: View) {
        self.state.lock().await.router.show(view);
    }

    /// Enable or disable a cart group
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ingredient.
    pub async fn toggle_cart_group(&self, ingredient: &str) -> AppResult<bool> {
        self.state.lock().await.board.toggle_active(ingredient)
    }

    /// Toggle one product in a cart group's selection
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown ingredient or product and
    /// `AppError::InvalidInput` for a disabled group.
    pub async fn toggle_cart_product(&self, ingredient: &str, url: &str) -> AppResult<bool> {
        self.state.lock().await.board.toggle_product(ingredient, url)
    }

    /// Product addresses to hand to the checkout extension
    pub async fn selected_product_urls(&self) -> Vec<String> {
        self.state.lock().await.board.selected_product_urls()
    }

    /// Wait until every background save started so far has finished
    pub async fn wait_for_persistence(&self) {
        let mut tasks = self.persistence_tasks.lock().await;
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                warn!(error = %e, "Background save task did not complete");
            }
        }
    }

    /// Number of records whose save is still outstanding, across sessions
    pub async fn pending_sync_count(&self) -> usize {
        self.pending_sync
            .lock()
            .await
            .values()
            .map(PendingRecords::len)
            .sum()
    }

    /// Re-send every queued record of persisted sessions
    ///
    /// Records that fail again stay queued. Returns the number of records saved.
    pub async fn retry_pending_sync(&self) -> usize {
        let queued: Vec<(String, PendingRecords)> = {
            let mut pending = self.pending_sync.lock().await;
            let ready: Vec<String> = pending
                .keys()
                .filter(|key| !key.starts_with(PENDING_SESSION_PREFIX))
                .cloned()
                .collect();
            ready
                .into_iter()
                .filter_map(|key| pending.remove(&key).map(|records| (key, records)))
                .collect()
        };

        let mut saved = 0;
        for (session_id, records) in queued {
            let total = records.len();
            let failed = save_records(self.backend.as_ref(), &session_id, records).await;
            saved += total - failed.len();
            if !failed.is_empty() {
                self.pending_sync
                    .lock()
                    .await
                    .entry(session_id)
                    .or_default()
                    .absorb(failed);
            }
        }
        info!(saved, "Retried pending saves");
        saved
    }

    async fn persist(&self, session_id: &SessionId, recipes: &[RecipeCard], cart_items: &[CartItem]) {
        let records = PendingRecords {
            recipes: recipes.to_vec(),
            cart_items: cart_items.to_vec(),
        };
        if records.is_empty() {
            return;
        }

        let Some(server_id) = session_id.server_id() else {
            debug!(%session_id, "Session has no server id yet, deferring save");
            self.pending_sync
                .lock()
                .await
                .entry(session_id.as_str().to_owned())
                .or_default()
                .absorb(records);
            return;
        };

        let backend = Arc::clone(&self.backend);
        let pending = Arc::clone(&self.pending_sync);
        let server_id = server_id.to_owned();
        self.persistence_tasks.lock().await.spawn(async move {
            let failed = save_records(backend.as_ref(), &server_id, records).await;
            if !failed.is_empty() {
                pending
                    .lock()
                    .await
                    .entry(server_id)
                    .or_default()
                    .absorb(failed);
            }
        });
    }

    /// A session replaced before the backend issued its id can never be saved;
    /// its queued records are dropped
    async fn abandon_pending(&self, session_id: &SessionId) {
        if session_id.is_persisted() {
            return;
        }
        if let Some(records) = self.pending_sync.lock().await.remove(session_id.as_str()) {
            warn!(
                %session_id,
                recipes = records.recipes.len(),
                cart_items = records.cart_items.len(),
                "Session replaced before it was persisted, unsaved records lost"
            );
        }
    }

    async fn rekey_pending(&self, from: &SessionId, to: &SessionId) {
        let mut pending = self.pending_sync.lock().await;
        if let Some(records) = pending.remove(from.as_str()) {
            pending.entry(to.as_str().to_owned()).or_default().absorb(records);
        }
    }

    fn observe_failure(&self, error: &AppError) {
        if error.is_auth_failure() {
            self.forget_credentials();
        }
    }

    fn forget_credentials(&self) {
        warn!("Credential rejected, login required");
        if let Some(credentials) = &self.credentials {
            if let Err(e) = credentials.clear() {
                warn!(error = %e, "Failed to clear cached credentials");
            }
        }
    }
}

/// Save both record kinds; returns what could not be saved
async fn save_records(
    backend: &dyn ChatBackend,
    session_id: &str,
    records: PendingRecords,
) -> PendingRecords {
    let mut failed = PendingRecords::default();

    if !records.recipes.is_empty() {
        if let Err(e) = backend.save_recipes(session_id, &records.recipes).await {
            warn!(%session_id, error = %e, count = records.recipes.len(), "Saving recipes failed");
            failed.recipes = records.recipes;
        }
    }
    if !records.cart_items.is_empty() {
        if let Err(e) = backend.save_cart_items(session_id, &records.cart_items).await {
            warn!(%session_id, error = %e, count = records.cart_items.len(), "Saving cart items failed");
            failed.cart_items = records.cart_items;
        }
    }
    failed
}
