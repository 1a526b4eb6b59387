//! Dictionary reading through a configured resolver.

use super::common::*;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use veneer_core::{
    AttributeMeta, CancelFlag, DefaultValueHandler, MemoryResultSet, OverlayConfig, SimpleSession,
    VoidProgressMonitor,
};
use veneer_overlay::{EntityRef, LabelValuePair};

fn customer_rows() -> MemoryResultSet {
    MemoryResultSet::new(
        vec![
            AttributeMeta::new("id", "int8"),
            AttributeMeta::new("full_name", "text"),
            AttributeMeta::new("email", "varchar(255)"),
        ],
        vec![
            vec![json!(1), json!("Ada Lovelace"), json!("ada@example.com")],
            vec![Value::Null, Value::Null, Value::Null],
            vec![json!(2), json!("Alan Turing"), Value::Null],
            vec![Value::Null, json!("ignored"), json!("ignored")],
        ],
    )
}

#[test]
fn test_configured_separator_and_null_label() {
    let config = OverlayConfig::from_yaml(
        r#"
dictionary:
  label_separator: " | "
  null_label: "(none)"
"#,
    )
    .unwrap();
    let ctx = TestContext::with_config(config);
    let key = ctx.column(CUSTOMERS, "id");
    let handler = ctx.resolver.dictionary_value_handler();
    let session = SimpleSession::new(
        data_source(),
        Arc::new(VoidProgressMonitor),
        Arc::new(handler.clone()),
    );

    let rows = ctx
        .resolver
        .dictionary_reader()
        .read_rows(&session, &key, &handler, &mut customer_rows())
        .unwrap();

    let labels: Vec<&str> = rows.iter().map(|r| r.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Ada Lovelace | ada@example.com",
            "(none) | (none)",
            "Alan Turing | (none)",
        ]
    );
}

#[test]
fn test_single_column_uses_key_display_string() {
    let ctx = TestContext::new();
    let key = ctx.column(ORDERS, "status");
    let mut results = MemoryResultSet::new(
        vec![key.clone()],
        vec![vec![json!("new")], vec![Value::Null], vec![json!("shipped")]],
    );
    let handler = DefaultValueHandler::new("(none)");

    let rows = ctx
        .resolver
        .dictionary_reader()
        .read_rows(&session(Arc::new(VoidProgressMonitor)), &key, &handler, &mut results)
        .unwrap();

    assert_eq!(
        rows,
        vec![
            LabelValuePair {
                label: "new".to_string(),
                value: json!("new"),
            },
            LabelValuePair {
                label: "(none)".to_string(),
                value: Value::Null,
            },
            LabelValuePair {
                label: "shipped".to_string(),
                value: json!("shipped"),
            },
        ]
    );
}

#[test]
fn test_scan_canceled_before_start_returns_nothing() {
    let ctx = TestContext::new();
    let cancel = CancelFlag::new();
    cancel.cancel();

    let mut results = customer_rows();
    let rows = ctx
        .resolver
        .dictionary_reader()
        .read_rows(
            &session(Arc::new(cancel)),
            &ctx.column(CUSTOMERS, "id"),
            &DefaultValueHandler::default(),
            &mut results,
        )
        .unwrap();

    assert!(rows.is_empty());
    assert_eq!(results.position(), 1);
}

#[test]
fn test_description_columns_for_foreign_key_target() {
    let ctx = TestContext::new();
    let customers = ctx.entity(CUSTOMERS);
    let key = ctx.column(CUSTOMERS, "id");

    // "full_name" matches no hint; the first text column other than the key wins.
    let default = ctx
        .resolver
        .dictionary_description_columns(&customers, &key, &VoidProgressMonitor)
        .unwrap();
    assert_eq!(default.as_deref(), Some("email"));

    let overlay = ctx.resolver.resolve_virtual_entity(&customers, true).unwrap();
    overlay.set_description_columns(Some("full_name, email".to_string()));
    assert_eq!(overlay.description_column_names(), vec!["full_name", "email"]);

    let declared = ctx
        .resolver
        .dictionary_description_columns(&EntityRef::Virtual(overlay), &key, &VoidProgressMonitor)
        .unwrap();
    assert_eq!(declared.as_deref(), Some("full_name, email"));
}

#[test]
fn test_description_hints_follow_configuration() {
    let config =
        OverlayConfig::from_yaml("description:\n  preferred_columns: [full_name]\n").unwrap();
    let ctx = TestContext::with_config(config);

    let columns = ctx
        .resolver
        .dictionary_description_columns(
            &ctx.entity(CUSTOMERS),
            &ctx.column(CUSTOMERS, "id"),
            &VoidProgressMonitor,
        )
        .unwrap();
    assert_eq!(columns.as_deref(), Some("full_name"));
}
