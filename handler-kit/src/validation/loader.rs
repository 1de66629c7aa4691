//! Resolution of rule identifiers into callables.

use std::collections::HashMap;

use thiserror::Error;

use super::rule::{Rule, RuleFunction};
use super::rules;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("rule '{0}' was not found")]
    NotFound(String),
    /// For custom loaders: the identifier names something that is not a rule.
    #[error("rule '{0}' is not callable")]
    NotCallable(String),
}

/// Strategy for turning a rule identifier into a callable.
///
/// Any `Fn(&str) -> Result<RuleFunction, LoadError>` closure is a loader, so
/// alternate naming schemes can be installed without a dedicated type.
#[cfg_attr(test, mockall::automock)]
pub trait RuleLoader: Send + Sync {
    fn load(&self, id: &str) -> Result<RuleFunction, LoadError>;
}

impl<F> RuleLoader for F
where
    F: Fn(&str) -> Result<RuleFunction, LoadError> + Send + Sync,
{
    fn load(&self, id: &str) -> Result<RuleFunction, LoadError> {
        self(id)
    }
}

/// Resolves `rule` through `loader`. Callables pass through untouched.
///
/// Nothing is cached: a named rule hits the loader on every call.
pub fn resolve(loader: &dyn RuleLoader, rule: &Rule) -> Result<RuleFunction, LoadError> {
    match rule {
        Rule::Function(function) => Ok(function.clone()),
        Rule::Named(id) => loader.load(id),
    }
}

/// Name-addressed rule namespace; the default loader.
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    rules: HashMap<String, RuleFunction>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in rules.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        rules::register_builtin(&mut registry);
        registry
    }

    pub fn register(&mut self, id: impl Into<String>, rule: RuleFunction) -> &mut Self {
        self.rules.insert(id.into(), rule);
        self
    }

    pub fn with(mut self, id: impl Into<String>, rule: RuleFunction) -> Self {
        self.register(id, rule);
        self
    }

    /// Adds every rule of `other`, replacing rules with the same identifier.
    pub fn merge(&mut self, other: RuleRegistry) {
        self.rules.extend(other.rules);
    }

    pub fn contains(&self, id: &str) -> bool {
        self.rules.contains_key(id)
    }

    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl RuleLoader for RuleRegistry {
    fn load(&self, id: &str) -> Result<RuleFunction, LoadError> {
        let rule = self
            .rules
            .get(id)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(id.to_string()))?;
        Ok(match rule.name() {
            Some(_) => rule,
            None => rule.named(id),
        })
    }
}
