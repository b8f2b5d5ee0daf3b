//! Named templates and file-style configuration.

mod common;

use serde_json::{json, Value};
use weft::prelude::*;
use weft::{RegistryError, TemplateOptions};

const OPTIONS: &str = "
dedent: true
deny_unknown_params: true
";

fn registry() -> Registry {
    let options = TemplateOptions::from_yaml(OPTIONS).unwrap();
    let mut registry = Registry::new();
    registry
        .add(
            Template::builder("motd")
                .options(options)
                .text("\n    Welcome, ")
                .slot(param("user", scalar::text()))
                .text("\n    Uptime: ")
                .slot(param("uptime", scalar::duration()))
                .build_lazy()
                .unwrap(),
        )
        .unwrap();
    registry
        .add(Template::builder("banner").text("*** weft ***").build_lazy().unwrap())
        .unwrap();
    registry
}

#[tokio::test]
async fn test_render_by_name_with_yaml_options() {
    common::init_tracing();
    let registry = registry();
    assert_eq!(registry.names(), vec!["banner", "motd"]);

    let result = registry
        .render("motd", json!({"user": "ada", "uptime": "3700s"}))
        .await
        .unwrap();
    assert_eq!(result.output, "\nWelcome, ada\nUptime: 1h1m40s");

    let err = registry
        .render("motd", json!({"user": "ada", "uptime": "1h", "extra": 1}))
        .await
        .unwrap_err();
    assert_eq!(err.issues().unwrap()[0].kind, IssueKind::Unexpected);
}

#[tokio::test]
async fn test_stream_by_name() {
    let registry = registry();
    let text = registry
        .stream("banner", Value::Null)
        .unwrap()
        .collect_string()
        .await
        .unwrap();
    assert_eq!(text, "*** weft ***");
    assert!(matches!(
        registry.stream("missing", Value::Null),
        Err(RenderError::NotFound(_))
    ));
}

#[test]
fn test_duplicate_name() {
    let mut registry = registry();
    let err = registry
        .add(Template::builder("motd").build_lazy().unwrap())
        .unwrap_err();
    assert!(matches!(err, RegistryError::Duplicate { .. }));
}

#[test]
fn test_options_reject_unknown_keys() {
    assert!(TemplateOptions::from_yaml("dedent: true\nindent: 2\n").is_err());
    assert_eq!(
        TemplateOptions::from_json(r#"{"dedent": true}"#).unwrap(),
        TemplateOptions::dedent()
    );
}
