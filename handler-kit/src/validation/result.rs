use serde::{Deserialize, Serialize};

use super::invoker::RuleFailure;
use super::rule::RuleOutcome;

/// Serializable view of the collected messages: `{"errors": [...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorList {
    pub errors: Vec<String>,
}

/// Ordered error messages produced by one validation run.
///
/// Messages keep rule order, and the order inside multi-message outcomes.
/// Rule failures are folded into the same list; [`ValidationResult::failures`]
/// keeps their tags for callers that need to tell them apart.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<String>,
    failures: Vec<RuleFailure>,
}

impl ValidationResult {
    pub fn new(errors: Vec<String>) -> Self {
        Self {
            errors,
            failures: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn failures(&self) -> &[RuleFailure] {
        &self.failures
    }

    pub fn get_errors(&self) -> ErrorList {
        ErrorList {
            errors: self.errors.clone(),
        }
    }

    pub fn get_errors_as_string(&self) -> String {
        self.errors.join("\n")
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }
}

/// Flattens per-rule outcomes, in slot order, into one result.
pub fn aggregate<I>(outcomes: I) -> ValidationResult
where
    I: IntoIterator<Item = Result<RuleOutcome, RuleFailure>>,
{
    let mut result = ValidationResult::default();
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => result.errors.extend(outcome.into_messages()),
            Err(failure) => {
                result.errors.push(failure.to_string());
                result.failures.push(failure);
            }
        }
    }
    result
}

pub fn aggregate_one(outcome: Result<RuleOutcome, RuleFailure>) -> ValidationResult {
    aggregate(std::iter::once(outcome))
}
