//! Rule-based validation of request payloads.
//!
//! Rules are opaque callables, or names resolved through a [`RuleLoader`].
//! A [`Validator`] runs a [`RuleSet`] either all at once
//! ([`Validator::validate`]) or one by one, stopping at the first rule that
//! reports errors ([`Validator::validate_one_by_one`]). Either way the caller
//! gets a single [`ValidationResult`].

pub mod invoker;
pub mod loader;
pub mod result;
pub mod rule;
pub mod rules;
pub mod validator;

pub use invoker::{invoke, Invocation, RuleFailure};
pub use loader::{resolve, LoadError, RuleLoader, RuleRegistry};
pub use result::{aggregate, aggregate_one, ErrorList, ValidationResult};
pub use rule::{
    BoxFuture, IntoRuleOutcome, Rule, RuleCall, RuleContext, RuleFn, RuleFunction, RuleOutcome,
    RuleResult, RuleSet,
};
pub use validator::Validator;
