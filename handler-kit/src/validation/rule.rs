//! Rule values and the shapes they may return.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

pub use futures::future::BoxFuture;
use serde_json::Value;

use crate::event::EventInfo;

/// What a rule produced, or why it could not produce anything.
pub type RuleResult = Result<RuleOutcome, String>;

/// Normalized return value of a single rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RuleOutcome {
    #[default]
    Empty,
    Single(String),
    Many(Vec<String>),
}

impl RuleOutcome {
    pub fn is_empty(&self) -> bool {
        match self {
            RuleOutcome::Empty => true,
            RuleOutcome::Single(message) => message.is_empty(),
            RuleOutcome::Many(messages) => messages.is_empty(),
        }
    }

    pub fn into_messages(self) -> Vec<String> {
        match self {
            RuleOutcome::Empty => Vec::new(),
            RuleOutcome::Single(message) if message.is_empty() => Vec::new(),
            RuleOutcome::Single(message) => vec![message],
            RuleOutcome::Many(messages) => messages,
        }
    }
}

/// Conversion from whatever a rule returns into a [`RuleOutcome`].
///
/// `Err` values become the failure cause; everything else is an outcome.
pub trait IntoRuleOutcome {
    fn into_outcome(self) -> RuleResult;
}

impl IntoRuleOutcome for RuleOutcome {
    fn into_outcome(self) -> RuleResult {
        Ok(self)
    }
}

impl IntoRuleOutcome for () {
    fn into_outcome(self) -> RuleResult {
        Ok(RuleOutcome::Empty)
    }
}

impl IntoRuleOutcome for String {
    fn into_outcome(self) -> RuleResult {
        if self.is_empty() {
            Ok(RuleOutcome::Empty)
        } else {
            Ok(RuleOutcome::Single(self))
        }
    }
}

impl IntoRuleOutcome for &str {
    fn into_outcome(self) -> RuleResult {
        self.to_string().into_outcome()
    }
}

impl IntoRuleOutcome for Vec<String> {
    fn into_outcome(self) -> RuleResult {
        if self.is_empty() {
            Ok(RuleOutcome::Empty)
        } else {
            Ok(RuleOutcome::Many(self))
        }
    }
}

impl IntoRuleOutcome for Vec<&str> {
    fn into_outcome(self) -> RuleResult {
        self.into_iter()
            .map(str::to_string)
            .collect::<Vec<_>>()
            .into_outcome()
    }
}

impl<T: IntoRuleOutcome> IntoRuleOutcome for Option<T> {
    fn into_outcome(self) -> RuleResult {
        match self {
            Some(inner) => inner.into_outcome(),
            None => Ok(RuleOutcome::Empty),
        }
    }
}

impl<T, E> IntoRuleOutcome for Result<T, E>
where
    T: IntoRuleOutcome,
    E: fmt::Display,
{
    fn into_outcome(self) -> RuleResult {
        match self {
            Ok(inner) => inner.into_outcome(),
            Err(err) => Err(err.to_string()),
        }
    }
}

/// Loosely-typed outcomes: falsy JSON means no message, arrays are lists of
/// messages, anything else is coerced into a single message.
impl IntoRuleOutcome for Value {
    fn into_outcome(self) -> RuleResult {
        match self {
            Value::Null | Value::Bool(false) => Ok(RuleOutcome::Empty),
            Value::Number(n) if n.as_f64() == Some(0.0) => Ok(RuleOutcome::Empty),
            Value::String(s) => s.into_outcome(),
            Value::Array(items) => Ok(RuleOutcome::Many(
                items.into_iter().map(coerce_message).collect(),
            )),
            other => Ok(RuleOutcome::Single(other.to_string())),
        }
    }
}

fn coerce_message(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Read-only input shared by every rule of a validation run.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleContext {
    pub body: Value,
    pub event: EventInfo,
}

impl RuleContext {
    pub fn new(body: Value, event: EventInfo) -> Self {
        Self { body, event }
    }
}

/// The result of calling a rule: either already available or still running.
pub enum RuleCall {
    Ready(RuleResult),
    Pending(BoxFuture<'static, RuleResult>),
}

/// The single capability every rule implements.
pub trait RuleFn: Send + Sync {
    fn call(&self, context: Arc<RuleContext>) -> RuleCall;
}

impl<F> RuleFn for F
where
    F: Fn(Arc<RuleContext>) -> RuleCall + Send + Sync,
{
    fn call(&self, context: Arc<RuleContext>) -> RuleCall {
        self(context)
    }
}

/// A resolved, invocable rule.
///
/// Cheap to clone. Constructors cover every supported arity: no arguments,
/// the request body, or the body plus [`EventInfo`]; asynchronous rules
/// receive the shared [`RuleContext`].
#[derive(Clone)]
pub struct RuleFunction {
    name: Option<String>,
    func: Arc<dyn RuleFn>,
}

impl RuleFunction {
    pub fn from_rule<R: RuleFn + 'static>(rule: R) -> Self {
        Self {
            name: None,
            func: Arc::new(rule),
        }
    }

    /// Synchronous rule over the body and event info.
    pub fn new<F, R>(rule: F) -> Self
    where
        F: Fn(&Value, &EventInfo) -> R + Send + Sync + 'static,
        R: IntoRuleOutcome,
    {
        Self::from_rule(move |ctx: Arc<RuleContext>| {
            RuleCall::Ready(rule(&ctx.body, &ctx.event).into_outcome())
        })
    }

    /// Synchronous rule that only looks at the body.
    pub fn from_body<F, R>(rule: F) -> Self
    where
        F: Fn(&Value) -> R + Send + Sync + 'static,
        R: IntoRuleOutcome,
    {
        Self::from_rule(move |ctx: Arc<RuleContext>| RuleCall::Ready(rule(&ctx.body).into_outcome()))
    }

    /// Synchronous rule that takes no input.
    pub fn from_fn<F, R>(rule: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: IntoRuleOutcome,
    {
        Self::from_rule(move |_: Arc<RuleContext>| RuleCall::Ready(rule().into_outcome()))
    }

    /// Asynchronous rule. The future owns its handle on the context.
    pub fn from_async<F, Fut>(rule: F) -> Self
    where
        F: Fn(Arc<RuleContext>) -> Fut + Send + Sync + 'static,
        Fut: Future + Send + 'static,
        Fut::Output: IntoRuleOutcome,
    {
        Self::from_rule(move |ctx: Arc<RuleContext>| {
            let pending = rule(ctx);
            RuleCall::Pending(Box::pin(async move { pending.await.into_outcome() }))
        })
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn call(&self, context: Arc<RuleContext>) -> RuleCall {
        self.func.call(context)
    }
}

impl fmt::Debug for RuleFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

const ANONYMOUS_RULE: &str = "<anonymous>";

/// A rule as supplied by the caller: a name to resolve, or a callable.
#[derive(Debug, Clone)]
pub enum Rule {
    Named(String),
    Function(RuleFunction),
}

impl Rule {
    /// Identifier used to tag failures and log lines.
    pub fn id(&self) -> &str {
        match self {
            Rule::Named(name) => name.as_str(),
            Rule::Function(function) => function.name().unwrap_or(ANONYMOUS_RULE),
        }
    }
}

impl From<&str> for Rule {
    fn from(name: &str) -> Self {
        Rule::Named(name.to_string())
    }
}

impl From<String> for Rule {
    fn from(name: String) -> Self {
        Rule::Named(name)
    }
}

impl From<RuleFunction> for Rule {
    fn from(function: RuleFunction) -> Self {
        Rule::Function(function)
    }
}

/// Ordered list of rules; a single rule converts into a one-element list.
#[derive(Debug, Clone, Default)]
pub struct RuleSet(Vec<Rule>);

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rule: impl Into<Rule>) {
        self.0.push(rule.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.0.iter()
    }
}

impl From<Rule> for RuleSet {
    fn from(rule: Rule) -> Self {
        Self(vec![rule])
    }
}

impl From<RuleFunction> for RuleSet {
    fn from(function: RuleFunction) -> Self {
        Self(vec![Rule::Function(function)])
    }
}

impl From<&str> for RuleSet {
    fn from(name: &str) -> Self {
        Self(vec![Rule::from(name)])
    }
}

impl<R: Into<Rule>> From<Vec<R>> for RuleSet {
    fn from(rules: Vec<R>) -> Self {
        rules.into_iter().collect()
    }
}

impl<R: Into<Rule>> FromIterator<R> for RuleSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
