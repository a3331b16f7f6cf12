//! Two-state submission gate around the resolver
//!
//! ```text
//!            submit (non-blank, configured)
//!   ┌──────┐ ───────────────────────────────▶ ┌──────────────────┐
//!   │ Idle │                                  │ AwaitingResponse │
//!   └──────┘ ◀─────────────────────────────── └──────────────────┘
//!            resolve call settles (ok or err)
//! ```
//!
//! Submitting while awaiting a response is rejected; nothing is queued and
//! the in-flight call is never cancelled by the session.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{watch, RwLock};
use tracing::{debug, info, warn};

use super::message::ConversationMessage;
use crate::catalog::CatalogEntry;
use crate::discovery::{CompletionClient, Credentials, ResolveResult, ServiceResolver};
use crate::error::{ConciergeError, Result};

/// Session gate state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingResponse,
}

/// Why a submission was not accepted. Nothing is appended in these cases.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejection {
    #[error("input is blank")]
    BlankInput,
    #[error("Please configure your API key and base URL first")]
    NotConfigured,
    #[error("a response is still pending")]
    Busy,
}

/// How the in-flight resolve call settled
#[derive(Debug)]
pub enum ExchangeOutcome {
    Answered(ResolveResult),
    Failed(ConciergeError),
}

/// The two messages produced by an accepted submission
#[derive(Debug)]
pub struct Exchange {
    pub question: ConversationMessage,
    pub reply: ConversationMessage,
    pub outcome: ExchangeOutcome,
}

impl Exchange {
    pub fn is_answered(&self) -> bool {
        matches!(self.outcome, ExchangeOutcome::Answered(_))
    }
}

/// Conversation over a fixed catalog snapshot
pub struct ConversationSession<C> {
    resolver: ServiceResolver<C>,
    catalog: Arc<[CatalogEntry]>,
    credentials: Option<Credentials>,
    response_timeout: Option<Duration>,
    state: Mutex<SessionState>,
    transcript: RwLock<Vec<ConversationMessage>>,
    relevant_services: watch::Sender<Vec<CatalogEntry>>,
}

impl<C: CompletionClient> ConversationSession<C> {
    pub fn new(
        resolver: ServiceResolver<C>,
        catalog: Arc<[CatalogEntry]>,
        credentials: Option<Credentials>,
    ) -> Self {
        let (relevant_services, _) = watch::channel(Vec::new());
        Self {
            resolver,
            catalog,
            credentials,
            response_timeout: None,
            state: Mutex::new(SessionState::Idle),
            transcript: RwLock::new(Vec::new()),
            relevant_services,
        }
    }

    /// Bound how long a submission waits for the resolver. Expiry is reported
    /// like any other failure.
    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    pub fn state(&self) -> SessionState {
        *lock(&self.state)
    }

    pub fn is_configured(&self) -> bool {
        self.credentials
            .as_ref()
            .map(Credentials::is_configured)
            .unwrap_or(false)
    }

    /// Snapshot of the transcript in append order
    pub async fn messages(&self) -> Vec<ConversationMessage> {
        self.transcript.read().await.clone()
    }

    /// Receiver that sees the relevant services of every successful answer
    pub fn subscribe_relevant_services(&self) -> watch::Receiver<Vec<CatalogEntry>> {
        self.relevant_services.subscribe()
    }

    /// Submit user input.
    ///
    /// The user message is appended as soon as the submission is accepted;
    /// the assistant message follows once the resolve call settles.
    pub async fn submit(&self, input: &str) -> std::result::Result<Exchange, SubmitRejection> {
        let question = input.trim();
        if question.is_empty() {
            return Err(SubmitRejection::BlankInput);
        }
        let credentials = match &self.credentials {
            Some(credentials) if credentials.is_configured() => credentials,
            _ => return Err(SubmitRejection::NotConfigured),
        };

        let _in_flight = self.begin()?;

        let question_message = ConversationMessage::user(question);
        self.append(question_message.clone()).await;

        let outcome = match self.run_resolve(question, credentials).await {
            Ok(result) => ExchangeOutcome::Answered(result),
            Err(e) => {
                warn!("Resolve call failed ({}): {}", e.category(), e);
                ExchangeOutcome::Failed(e)
            }
        };

        let reply = match &outcome {
            ExchangeOutcome::Answered(result) => {
                self.relevant_services
                    .send_replace(result.relevant_services.clone());
                ConversationMessage::assistant(&result.answer, result.relevant_services.clone())
            }
            ExchangeOutcome::Failed(e) => ConversationMessage::assistant_error(e),
        };
        self.append(reply.clone()).await;

        Ok(Exchange {
            question: question_message,
            reply,
            outcome,
        })
    }

    async fn run_resolve(&self, question: &str, credentials: &Credentials) -> Result<ResolveResult> {
        let call = self.resolver.resolve(question, &self.catalog, credentials);
        match self.response_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ConciergeError::response_timeout(limit))?,
            None => call.await,
        }
    }

    /// `Idle → AwaitingResponse`; the guard restores `Idle` when dropped
    fn begin(&self) -> std::result::Result<InFlight<'_>, SubmitRejection> {
        let mut state = lock(&self.state);
        if *state == SessionState::AwaitingResponse {
            debug!("Rejecting submission while a response is pending");
            return Err(SubmitRejection::Busy);
        }
        *state = SessionState::AwaitingResponse;
        info!("Session awaiting response");
        Ok(InFlight { state: &self.state })
    }

    async fn append(&self, message: ConversationMessage) {
        self.transcript.write().await.push(message);
    }
}

/// Returns the session to `Idle` however the submission ends, including when
/// the submitting future is dropped mid-call.
struct InFlight<'a> {
    state: &'a Mutex<SessionState>,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *lock(self.state) = SessionState::Idle;
        debug!("Session idle");
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
