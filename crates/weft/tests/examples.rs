//! Behaviour of whole templates: rendering, dedent, nesting and validation.

mod common;

use serde_json::{json, Value};
use weft::prelude::*;
use weft::{CompileError, Field};

#[tokio::test]
async fn test_param_between_tags() {
    common::init_tracing();
    let link = Template::builder("link")
        .text("<a>")
        .slot(param("x", scalar::text()))
        .text("</a>")
        .build()
        .unwrap();
    let result = link.render(json!({"x": "hi"})).await.unwrap();
    assert_eq!(result.output, "<a>hi</a>");
}

#[tokio::test]
async fn test_dedent_strips_common_indent() {
    let para = Template::builder("para")
        .dedent(true)
        .text("\n  <p>\n    ")
        .slot(param("t", scalar::text()))
        .text("\n  </p>")
        .build()
        .unwrap();
    assert_eq!(para.compile().unwrap().min_indent(), Some(2));
    let result = para.render(json!({"t": "hello"})).await.unwrap();
    assert_eq!(result.output, "\n<p>\n  hello\n</p>");
}

#[tokio::test]
async fn test_zero_slot_template_is_unchanged() {
    let text = "  plain\n    text\n";
    let template = Template::builder("plain").text(text).build().unwrap();
    let result = template.render(Value::Null).await.unwrap();
    assert_eq!(result.output, text);
    assert!(template.compile().unwrap().fields().is_empty());

    let dedented = Template::builder("plain")
        .dedent(true)
        .text(text)
        .build()
        .unwrap();
    let rendered = dedented.render(Value::Null).await.unwrap();
    assert_eq!(rendered.output, text);
    let streamed = dedented
        .stream(Value::Null)
        .unwrap()
        .collect_string()
        .await
        .unwrap();
    assert_eq!(streamed, text);
}

#[tokio::test]
async fn test_duration_param() {
    let timeout = Template::builder("timeout")
        .text("timeout=")
        .slot(param("after", scalar::duration()))
        .build()
        .unwrap();

    let ok = timeout.render(json!({"after": "30s"})).await.unwrap();
    assert_eq!(ok.output, "timeout=30s");
    let normalized = timeout.render(json!({"after": "90s"})).await.unwrap();
    assert_eq!(normalized.output, "timeout=1m30s");

    let err = timeout.render(json!({"after": "30x"})).await.unwrap_err();
    let issues = err.issues().unwrap();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind, IssueKind::Transform);
    assert_eq!(issues[0].path, vec!["after".to_string()]);
}

#[tokio::test]
async fn test_nested_params_use_template_name() {
    let card = Template::builder("card")
        .text("[")
        .slot(param("title", scalar::text()))
        .text("]")
        .build()
        .unwrap();
    let page = Template::builder("page")
        .slot(param("heading", scalar::text()))
        .text(": ")
        .slot(&card)
        .build()
        .unwrap();

    let result = page
        .render(json!({"heading": "Home", "card": {"title": "Welcome"}}))
        .await
        .unwrap();
    assert_eq!(result.output, "Home: [Welcome]");
    assert!(matches!(
        page.compile().unwrap().fields().get("card"),
        Some(Field::Group { .. })
    ));

    let err = page.render(json!({"card": {}})).await.unwrap_err();
    match &err {
        RenderError::Validation(validation) => {
            assert!(validation.has_path(&["heading"]));
            assert!(validation.has_path(&["card", "title"]));
            assert_eq!(validation.issues.len(), 2);
        }
        other => panic!("expected validation failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_absent_record_only_for_empty_field_map() {
    let footer = Template::builder("footer")
        .text("(c) ")
        .slot(2024)
        .build()
        .unwrap();
    assert_eq!(footer.render(Value::Null).await.unwrap().output, "(c) 2024");

    let needs = Template::builder("needs")
        .slot(param("x", scalar::int()))
        .build()
        .unwrap();
    let err = needs.render(Value::Null).await.unwrap_err();
    assert_eq!(err.issues().unwrap()[0].kind, IssueKind::Missing);
}

#[tokio::test]
async fn test_repeated_renders_are_identical() {
    let template = Template::builder("t")
        .dedent(true)
        .text("\n    a: ")
        .slot(param("a", scalar::int()))
        .text("\n    b: ")
        .slot(param("b", scalar::boolean()))
        .build_lazy()
        .unwrap();
    let params = json!({"a": "12", "b": "yes"});
    let first = template.render(params.clone()).await.unwrap();
    let second = template.render(params.clone()).await.unwrap();
    assert_eq!(first, second);

    let rebuilt = Template::from_parts(
        "t",
        template.segments().to_vec(),
        template.slots().to_vec(),
        template.options(),
    )
    .unwrap();
    assert_eq!(rebuilt.render(params).await.unwrap().output, first.output);
    assert_eq!(first.output, "\na: 12\nb: true");
}

#[tokio::test]
async fn test_unknown_keys_can_be_denied() {
    let strict = Template::builder("strict")
        .deny_unknown_params(true)
        .slot(param("a", scalar::text()))
        .build()
        .unwrap();
    let err = strict.render(json!({"a": "x", "b": 1})).await.unwrap_err();
    let issue = &err.issues().unwrap()[0];
    assert_eq!(issue.kind, IssueKind::Unexpected);
    assert_eq!(issue.dotted_path(), "b");
}

#[test]
fn test_conflicting_declarations_fail_at_build() {
    let err = Template::builder("t")
        .slot(param("n", scalar::int().min(0.0)))
        .slot(param("n", scalar::int()))
        .build()
        .unwrap_err();
    assert!(matches!(err, CompileError::ConflictingField { .. }));
}

#[tokio::test]
async fn test_effect_failure_is_not_a_validation_issue() {
    let template = Template::builder("t")
        .slot(effect(|| async { Err(anyhow::anyhow!("backend unavailable")) }))
        .build()
        .unwrap();
    let err = template.render(Value::Null).await.unwrap_err();
    assert!(err.issues().is_none());
    assert!(matches!(err, RenderError::Evaluation(_)));
    assert_eq!(
        err.to_string(),
        "slot evaluation failed: backend unavailable"
    );
}
