//! Validation orchestration.
//!
//! [`Validator::validate`] starts every rule, in list order, before waiting on
//! any of them, then joins them all on the calling task and aggregates by
//! rule position. [`Validator::validate_one_by_one`] runs the rules strictly in
//! sequence and stops at the first rule that reports anything; the pipeline
//! either short-circuits with that rule's messages or completes empty.
//!
//! Neither mode imposes a timeout: a rule that never settles stalls the run.

use std::sync::Arc;

use futures::future::join_all;
use serde_json::Value;
use tracing::Instrument;

use crate::event::{EventInfo, ParsedEvent};

use super::invoker::{self, Invocation};
use super::loader::{RuleLoader, RuleRegistry};
use super::result::{aggregate, aggregate_one, ValidationResult};
use super::rule::{RuleContext, RuleSet};

/// Runs rule sets against one request body and its event context.
#[derive(Clone)]
pub struct Validator {
    context: Arc<RuleContext>,
    loader: Arc<dyn RuleLoader>,
}

impl Validator {
    /// Creates a validator that resolves rule names from the built-in registry.
    pub fn new(body: Value, event: EventInfo) -> Self {
        Self {
            context: Arc::new(RuleContext::new(body, event)),
            loader: Arc::new(RuleRegistry::builtin()),
        }
    }

    pub fn for_event(event: &ParsedEvent) -> Self {
        Self::new(event.body.clone(), event.info.clone())
    }

    pub fn with_loader(mut self, loader: impl RuleLoader + 'static) -> Self {
        self.set_loader(loader);
        self
    }

    /// Replaces name resolution for every later `validate*` call.
    pub fn set_loader(&mut self, loader: impl RuleLoader + 'static) {
        self.loader = Arc::new(loader);
    }

    pub fn context(&self) -> &RuleContext {
        &self.context
    }

    pub async fn validate(&self, rules: impl Into<RuleSet>) -> ValidationResult {
        let rules = rules.into();
        let span = tracing::debug_span!(
            "validate",
            request_id = %self.context.event.request_id,
            rules = rules.len()
        );

        let invocations: Vec<Invocation> = span.in_scope(|| {
            rules
                .iter()
                .map(|rule| Invocation::start(self.loader.as_ref(), rule, &self.context))
                .collect()
        });

        let outcomes = join_all(invocations.into_iter().map(Invocation::settle))
            .instrument(span.clone())
            .await;

        let result = aggregate(outcomes);
        span.in_scope(|| {
            tracing::debug!(errors = result.errors().len(), "Validation finished");
        });
        result
    }

    pub async fn validate_one_by_one(&self, rules: impl Into<RuleSet>) -> ValidationResult {
        let rules = rules.into();
        let span = tracing::debug_span!(
            "validate_one_by_one",
            request_id = %self.context.event.request_id,
            rules = rules.len()
        );

        async {
            for rule in &rules {
                let outcome = invoker::invoke(self.loader.as_ref(), rule, &self.context).await;
                let result = aggregate_one(outcome);
                if result.has_errors() {
                    tracing::debug!(rule = %rule.id(), errors = result.errors().len(), "Stopping at failing rule");
                    return result;
                }
            }
            tracing::debug!("All rules passed");
            ValidationResult::default()
        }
        .instrument(span)
        .await
    }
}
