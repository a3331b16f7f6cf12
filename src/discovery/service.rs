//! Resolver orchestration
//!
//! [`ServiceResolver::resolve`] is the single public entry point of the
//! pipeline: filter → prompt → completion → parse → resolve. It holds no
//! per-call state, so one resolver can serve any number of concurrent calls.

use tracing::{debug, info};

use super::completion::{CompletionClient, OpenAiCompletionClient};
use super::parser::parse_completion;
use super::prompt::build_prompt;
use super::resolver::resolve_service_ids;
use super::types::{Credentials, ResolveResult};
use crate::catalog::{filter_catalog, CatalogEntry};
use crate::error::{ConciergeError, Result};

/// Stateless resolver over a completion client
#[derive(Debug, Clone)]
pub struct ServiceResolver<C = OpenAiCompletionClient> {
    client: C,
}

impl ServiceResolver<OpenAiCompletionClient> {
    /// Resolver backed by the OpenAI-compatible HTTP client
    pub fn with_openai() -> Result<Self> {
        Ok(Self::new(OpenAiCompletionClient::new()?))
    }
}

impl<C: CompletionClient> ServiceResolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Answer `question` and pick up to three relevant entries of `catalog`.
    ///
    /// Fails with [`ConciergeError::MissingCredentials`] before any network
    /// call if a credential is blank. Completion client errors are returned
    /// unchanged.
    pub async fn resolve(
        &self,
        question: &str,
        catalog: &[CatalogEntry],
        credentials: &Credentials,
    ) -> Result<ResolveResult> {
        credentials.ensure_present()?;
        if question.trim().is_empty() {
            return Err(ConciergeError::validation("question must not be empty"));
        }

        let usable = filter_catalog(catalog);
        info!(
            "Resolving question against {} of {} catalog entries",
            usable.len(),
            catalog.len()
        );

        let prompt = build_prompt(&usable, question)?;
        let raw = self.client.complete(credentials, &prompt).await?;

        let parsed = parse_completion(&raw);
        if parsed.is_fallback() {
            info!("Model ignored the output contract, returning its text as the answer");
        }

        let (answer, service_ids) = parsed.into_parts();
        let relevant_services = resolve_service_ids(&service_ids, &usable);
        debug!(
            "Model returned {} service ids, {} resolved",
            service_ids.len(),
            relevant_services.len()
        );

        Ok(ResolveResult {
            answer,
            relevant_services,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::PromptMessages;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Returns a canned completion and records what it was sent
    struct CannedCompletion {
        reply: std::result::Result<String, u16>,
        calls: AtomicUsize,
        last_prompt: Mutex<Option<PromptMessages>>,
    }

    impl CannedCompletion {
        fn text(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }

        fn status(status: u16) -> Self {
            Self {
                reply: Err(status),
                calls: AtomicUsize::new(0),
                last_prompt: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl CompletionClient for CannedCompletion {
        async fn complete(&self, _credentials: &Credentials, prompt: &PromptMessages) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_prompt.lock().unwrap() = Some(prompt.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(status) => Err(ConciergeError::upstream_http(*status, "denied")),
            }
        }
    }

    fn catalog() -> Vec<CatalogEntry> {
        vec![
            CatalogEntry::titled("Email AI Agent"),
            CatalogEntry::titled("Ticket Bot"),
        ]
    }

    fn credentials() -> Credentials {
        Credentials::new("sk-test", "https://api.example.com/v1")
    }

    #[tokio::test]
    async fn test_structured_answer_resolves_services() {
        let resolver = ServiceResolver::new(CannedCompletion::text(
            r#"{"answer":"We help with email.","serviceIds":[0]}"#,
        ));
        let result = resolver
            .resolve("email?", &catalog(), &credentials())
            .await
            .unwrap();

        assert_eq!(result.answer, "We help with email.");
        assert_eq!(result.relevant_services, vec![CatalogEntry::titled("Email AI Agent")]);
    }

    #[tokio::test]
    async fn test_out_of_range_id_is_dropped() {
        let resolver =
            ServiceResolver::new(CannedCompletion::text(r#"{"answer":"We help.","serviceIds":[5]}"#));
        let result = resolver
            .resolve("anything", &catalog(), &credentials())
            .await
            .unwrap();
        assert_eq!(result.answer, "We help.");
        assert!(result.relevant_services.is_empty());
    }

    #[tokio::test]
    async fn test_plain_text_completion_is_the_answer() {
        let resolver = ServiceResolver::new(CannedCompletion::text("Sorry, I cannot answer."));
        let result = resolver
            .resolve("anything", &catalog(), &credentials())
            .await
            .unwrap();
        assert_eq!(result.answer, "Sorry, I cannot answer.");
        assert!(result.relevant_services.is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_completion() {
        let resolver = ServiceResolver::new(CannedCompletion::text("unused"));
        let err = resolver
            .resolve("anything", &catalog(), &Credentials::new("", "https://api.example.com/v1"))
            .await
            .unwrap_err();

        assert!(matches!(err, ConciergeError::MissingCredentials { .. }));
        assert_eq!(resolver.client().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_blank_question_fails_before_completion() {
        let resolver = ServiceResolver::new(CannedCompletion::text("unused"));
        let err = resolver
            .resolve("   ", &catalog(), &credentials())
            .await
            .unwrap_err();
        assert_eq!(err.category(), "validation");
        assert_eq!(resolver.client().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_upstream_error_propagates_unchanged() {
        let resolver = ServiceResolver::new(CannedCompletion::status(401));
        let err = resolver
            .resolve("anything", &catalog(), &credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, ConciergeError::UpstreamHttp { status: 401, .. }));
        assert_eq!(resolver.client().calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_indices_refer_to_filtered_catalog() {
        let raw_catalog = vec![
            CatalogEntry::default(),
            CatalogEntry::titled("NaN"),
            CatalogEntry::titled("Email AI Agent"),
            CatalogEntry::titled("Ticket Bot"),
        ];
        let resolver =
            ServiceResolver::new(CannedCompletion::text(r#"{"answer":"ok","serviceIds":[1,0,2]}"#));
        let result = resolver
            .resolve("anything", &raw_catalog, &credentials())
            .await
            .unwrap();

        assert_eq!(
            result.relevant_services,
            vec![
                CatalogEntry::titled("Ticket Bot"),
                CatalogEntry::titled("Email AI Agent")
            ]
        );

        let prompt = resolver.client().last_prompt.lock().unwrap().clone().unwrap();
        assert!(!prompt.system.contains("\"NaN\""));
        assert_eq!(prompt.user, "anything");
    }
}
