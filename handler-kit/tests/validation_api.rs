use std::sync::Arc;
use std::time::Duration;

use handler_kit::validation::{Rule, RuleContext, RuleFunction, RuleRegistry, Validator};
use serde_json::{json, Value};

mod support;

use support::{event_info, Journal};

fn validator() -> Validator {
    Validator::new(json!({ "name": "widget" }), event_info())
}

fn delayed(message: &'static str, millis: u64) -> RuleFunction {
    RuleFunction::from_async(move |_ctx: Arc<RuleContext>| async move {
        tokio::time::sleep(Duration::from_millis(millis)).await;
        message
    })
}

#[tokio::test]
async fn validate_collects_every_message_in_rule_order() {
    let rules = vec![
        RuleFunction::from_fn(|| "A"),
        RuleFunction::from_fn(|| vec!["B", "C"]),
        RuleFunction::from_fn(|| ()),
    ];

    let result = validator().validate(rules).await;
    assert_eq!(result.errors(), ["A", "B", "C"]);
    assert!(result.has_errors());
}

#[tokio::test]
async fn validate_orders_by_rule_position_not_completion() {
    let rules = vec![delayed("slow", 40), delayed("medium", 20), delayed("fast", 0)];

    let result = validator().validate(rules).await;
    assert_eq!(result.errors(), ["slow", "medium", "fast"]);
}

#[tokio::test]
async fn validate_starts_every_rule_before_awaiting_any() {
    let journal = Journal::default();
    let first = journal.clone();
    let second = journal.clone();
    let rules = vec![
        RuleFunction::from_async(move |_ctx: Arc<RuleContext>| {
            first.record("start-1");
            let first = first.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                first.record("end-1");
            }
        }),
        RuleFunction::from_fn(move || second.record("start-2")),
    ];

    let result = validator().validate(rules.clone()).await;
    assert!(!result.has_errors());
    assert_eq!(journal.entries(), ["start-1", "start-2", "end-1"]);
}

#[tokio::test]
async fn validate_one_by_one_waits_for_each_rule() {
    let journal = Journal::default();
    let first = journal.clone();
    let second = journal.clone();
    let rules = vec![
        RuleFunction::from_async(move |_ctx: Arc<RuleContext>| {
            first.record("start-1");
            let first = first.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(10)).await;
                first.record("end-1");
            }
        }),
        RuleFunction::from_fn(move || second.record("start-2")),
    ];

    let result = validator().validate_one_by_one(rules).await;
    assert!(!result.has_errors());
    assert_eq!(journal.entries(), ["start-1", "end-1", "start-2"]);
}

#[tokio::test]
async fn validate_one_by_one_stops_at_first_failing_rule() {
    let journal = Journal::default();
    let third = journal.clone();
    let rules = vec![
        RuleFunction::from_fn(|| ()),
        RuleFunction::from_fn(|| "X"),
        RuleFunction::from_fn(move || {
            third.record("third ran");
            "Y"
        }),
    ];

    let result = validator().validate_one_by_one(rules).await;
    assert_eq!(result.errors(), ["X"]);
    assert!(journal.entries().is_empty());
}

#[tokio::test]
async fn validate_one_by_one_returns_only_the_failing_rules_messages() {
    let rules = vec![
        RuleFunction::from_fn(|| None::<String>),
        RuleFunction::from_fn(|| vec!["first", "second"]),
        RuleFunction::from_fn(|| "later"),
    ];

    let result = validator().validate_one_by_one(rules).await;
    assert_eq!(result.get_errors().errors, ["first", "second"]);
}

#[tokio::test]
async fn empty_rule_lists_have_no_errors() {
    let none: Vec<Rule> = Vec::new();

    let result = validator().validate(none.clone()).await;
    assert!(!result.has_errors());
    assert!(result.errors().is_empty());

    let result = validator().validate_one_by_one(none).await;
    assert!(!result.has_errors());
    assert_eq!(result.get_errors_as_string(), "");
}

#[tokio::test]
async fn async_and_sync_rules_are_equivalent() {
    let sync_rule = RuleFunction::from_fn(|| "err");
    let async_rule = RuleFunction::from_async(|_ctx: Arc<RuleContext>| async { "err" });

    let validator = validator();
    assert_eq!(
        validator.validate(sync_rule.clone()).await,
        validator.validate(async_rule.clone()).await
    );
    assert_eq!(
        validator.validate_one_by_one(sync_rule).await,
        validator.validate_one_by_one(async_rule).await
    );
}

#[tokio::test]
async fn failing_rule_is_reported_without_aborting_siblings() {
    let journal = Journal::default();
    let sibling = journal.clone();
    let rules = vec![
        RuleFunction::from_fn(|| Err::<(), _>("connection reset")).named("rf01"),
        RuleFunction::from_fn(move || {
            sibling.record("sibling ran");
            "sibling error"
        }),
    ];

    let result = validator().validate(rules).await;
    assert_eq!(journal.entries(), ["sibling ran"]);
    assert_eq!(
        result.errors(),
        ["Failed to execute rule rf01: connection reset", "sibling error"]
    );
    assert_eq!(result.failures()[0].rule_id, "rf01");
}

#[tokio::test]
async fn async_rule_resolving_to_error_does_not_abort_siblings() {
    let journal = Journal::default();
    let sibling = journal.clone();
    let rules = vec![
        RuleFunction::from_async(|_ctx: Arc<RuleContext>| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Err::<(), _>("db down")
        })
        .named("rf03"),
        RuleFunction::from_fn(move || {
            sibling.record("sibling ran");
            "sibling error"
        }),
    ];

    let result = validator().validate(rules).await;
    assert_eq!(journal.entries(), ["sibling ran"]);
    assert_eq!(
        result.errors(),
        ["Failed to execute rule rf03: db down", "sibling error"]
    );
    assert_eq!(result.failures()[0].rule_id, "rf03");
}

#[tokio::test]
async fn panicking_rule_is_reported_with_its_identifier() {
    let rules = vec![
        RuleFunction::from_body(|body: &Value| -> Option<String> {
            panic!("cannot inspect {}", body["name"])
        })
        .named("rf02"),
        RuleFunction::from_fn(|| "still reported"),
    ];

    let result = validator().validate(rules).await;
    assert_eq!(
        result.errors(),
        [
            "Failed to execute rule rf02: cannot inspect \"widget\"",
            "still reported"
        ]
    );
}

#[tokio::test]
async fn repeated_runs_are_idempotent() {
    let rules: Vec<Rule> = vec![
        Rule::from("body-object"),
        Rule::from(RuleFunction::from_body(|body: &Value| {
            body.get("price").is_none().then_some("price is required")
        })),
    ];

    let validator = validator();
    let first = validator.validate(rules.clone()).await;
    let second = validator.validate(rules.clone()).await;
    assert_eq!(first, second);
    assert_eq!(first.errors(), ["price is required"]);

    let first = validator.validate_one_by_one(rules.clone()).await;
    let second = validator.validate_one_by_one(rules).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn string_view_joins_with_newlines() {
    let result = validator()
        .validate(vec![
            RuleFunction::from_fn(|| "one"),
            RuleFunction::from_fn(|| vec!["two", "three"]),
        ])
        .await;

    assert_eq!(result.get_errors_as_string(), "one\ntwo\nthree");
    assert_eq!(result.get_errors().errors, result.errors());
}

#[tokio::test]
async fn builtin_rules_resolve_by_name() {
    let validator = Validator::new(Value::Null, event_info());

    let result = validator
        .validate(vec!["body-present", "body-object", "platform-token"])
        .await;
    assert_eq!(
        result.errors(),
        [
            "Request body is required",
            "Request body must be a JSON object"
        ]
    );
}

#[tokio::test]
async fn custom_loader_replaces_name_resolution() {
    let registry = RuleRegistry::new().with(
        "rf01",
        RuleFunction::new(|body: &Value, event: &handler_kit::event::EventInfo| {
            format!("{} rejected in {}", body["name"], event.environment)
        }),
    );

    let mut validator = validator();
    validator.set_loader(registry);

    let result = validator.validate(vec!["rf01", "body-present"]).await;
    assert_eq!(
        result.errors(),
        [
            "\"widget\" rejected in test",
            "Failed to execute rule body-present: rule 'body-present' was not found"
        ]
    );
}

#[tokio::test]
async fn loose_json_outcomes_are_coerced() {
    let rules = vec![
        RuleFunction::from_fn(|| json!(null)),
        RuleFunction::from_fn(|| json!({ "code": "E1" })),
        RuleFunction::from_fn(|| json!(["a", 2])),
    ];

    let result = validator().validate(rules).await;
    assert_eq!(result.errors(), [r#"{"code":"E1"}"#, "a", "2"]);
}
