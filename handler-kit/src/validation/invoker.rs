//! Execution of a single rule.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use futures::FutureExt;
use thiserror::Error;

use super::loader::{self, RuleLoader};
use super::rule::{BoxFuture, Rule, RuleCall, RuleContext, RuleOutcome, RuleResult};

/// A rule that could not be resolved or crashed while running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to execute rule {rule_id}: {cause}")]
pub struct RuleFailure {
    pub rule_id: String,
    pub cause: String,
}

impl RuleFailure {
    pub fn new(rule_id: impl Into<String>, cause: impl Into<String>) -> Self {
        Self {
            rule_id: rule_id.into(),
            cause: cause.into(),
        }
    }
}

/// A started rule invocation.
///
/// Synchronous rules are settled as soon as they are started; asynchronous
/// ones keep their future until [`Invocation::settle`] drives it.
pub enum Invocation {
    Settled(Result<RuleOutcome, RuleFailure>),
    Running {
        rule_id: String,
        future: BoxFuture<'static, RuleResult>,
    },
}

impl Invocation {
    /// Resolves `rule` and calls it. Loader errors and panics raised by the
    /// call itself settle the invocation immediately as failures.
    pub fn start(loader: &dyn RuleLoader, rule: &Rule, context: &Arc<RuleContext>) -> Self {
        let rule_id = rule.id().to_string();
        tracing::debug!(rule = %rule_id, "Starting rule");

        let function = match loader::resolve(loader, rule) {
            Ok(function) => function,
            Err(err) => return Self::Settled(Err(failure(rule_id, err.to_string()))),
        };

        let call = panic::catch_unwind(AssertUnwindSafe(|| function.call(Arc::clone(context))));
        match call {
            Ok(RuleCall::Ready(result)) => Self::Settled(tag(rule_id, result)),
            Ok(RuleCall::Pending(future)) => Self::Running { rule_id, future },
            Err(payload) => Self::Settled(Err(failure(rule_id, panic_message(payload)))),
        }
    }

    pub async fn settle(self) -> Result<RuleOutcome, RuleFailure> {
        match self {
            Self::Settled(result) => result,
            Self::Running { rule_id, future } => match AssertUnwindSafe(future).catch_unwind().await
            {
                Ok(result) => tag(rule_id, result),
                Err(payload) => Err(failure(rule_id, panic_message(payload))),
            },
        }
    }
}

/// Starts `rule` and waits for it to settle.
pub async fn invoke(
    loader: &dyn RuleLoader,
    rule: &Rule,
    context: &Arc<RuleContext>,
) -> Result<RuleOutcome, RuleFailure> {
    Invocation::start(loader, rule, context).settle().await
}

fn tag(rule_id: String, result: RuleResult) -> Result<RuleOutcome, RuleFailure> {
    result.map_err(|cause| failure(rule_id, cause))
}

fn failure(rule_id: String, cause: String) -> RuleFailure {
    let failure = RuleFailure::new(rule_id, cause);
    tracing::warn!(rule = %failure.rule_id, cause = %failure.cause, "Rule execution failed");
    failure
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "rule panicked".to_string()
    }
}
