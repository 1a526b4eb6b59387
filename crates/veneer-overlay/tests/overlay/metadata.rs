//! Merged metadata and real entity unwrapping.

use super::common::*;
use pretty_assertions::assert_eq;
use std::sync::Arc;
use veneer_core::{
    Association, ColumnPair, Constraint, ConstraintKind, DataContainer, QueryContainer,
    VoidProgressMonitor,
};
use veneer_overlay::{
    ContainerRef, EntityRef, OverlayError, Overlaid, require_real_entity, try_real_entity,
};

fn constraint_names(merged: &[Overlaid<Constraint>]) -> Vec<(String, bool)> {
    merged
        .iter()
        .map(|c| (c.get().name.clone(), c.is_virtual()))
        .collect()
}

fn association_names(merged: &[Overlaid<Association>]) -> Vec<&str> {
    merged.iter().map(|a| a.get().name.as_str()).collect()
}

/// Virtual foreign key from `audit.events.order_id` to `public.orders.id`.
fn event_order_fk() -> Association {
    Association {
        name: "events_order_vfk".to_string(),
        owner: object_id(EVENTS),
        referenced: object_id(ORDERS),
        columns: vec![ColumnPair {
            column: "order_id".to_string(),
            referenced_column: "id".to_string(),
        }],
    }
}

#[test]
fn test_virtual_keys_follow_real_keys() {
    let ctx = TestContext::new();
    let customers = ctx.entity(CUSTOMERS);
    let overlay = ctx.resolver.resolve_virtual_entity(&customers, true).unwrap();
    overlay.add_constraint(Constraint::new(
        "customers_name_email_vkey",
        ConstraintKind::UniqueKey,
        ["full_name", "email"],
    ));

    let expected = vec![
        ("customers_pkey".to_string(), false),
        ("customers_email_key".to_string(), false),
        ("customers_name_email_vkey".to_string(), true),
    ];
    let from_real = ctx
        .resolver
        .merge_constraints(&customers, &VoidProgressMonitor)
        .unwrap();
    assert_eq!(constraint_names(&from_real), expected);

    let from_virtual = ctx
        .resolver
        .merge_constraints(&EntityRef::Virtual(overlay), &VoidProgressMonitor)
        .unwrap();
    assert_eq!(constraint_names(&from_virtual), expected);
}

#[test]
fn test_virtual_foreign_key_is_outgoing_only() {
    let ctx = TestContext::new();
    let events = ctx.entity(EVENTS);
    ctx.resolver
        .resolve_virtual_entity(&events, true)
        .unwrap()
        .add_foreign_key(event_order_fk());

    let outgoing = ctx
        .resolver
        .merge_associations(&events, &VoidProgressMonitor)
        .unwrap();
    assert_eq!(association_names(&outgoing), vec!["events_order_vfk"]);
    assert!(outgoing[0].is_virtual());

    let incoming = ctx
        .resolver
        .merge_references(&ctx.entity(ORDERS), &VoidProgressMonitor)
        .unwrap();
    assert!(incoming.is_empty());

    let customer_refs = ctx
        .resolver
        .merge_references(&ctx.entity(CUSTOMERS), &VoidProgressMonitor)
        .unwrap();
    assert_eq!(association_names(&customer_refs), vec!["orders_customer_fk"]);
}

#[test]
fn test_orphan_query_keys() {
    let ctx = TestContext::new();
    let query: Arc<dyn DataContainer> = Arc::new(QueryContainer::new(
        data_source(),
        "Customer emails",
        "select id, email from shop.public.customers",
    ));
    let orphan = ctx
        .resolver
        .resolve_container_entity(&ContainerRef::Detached(query), true)
        .unwrap();
    orphan.add_constraint(Constraint::new("row_key", ConstraintKind::UniqueKey, ["id"]));

    let merged = ctx
        .resolver
        .merge_constraints(&EntityRef::Virtual(orphan.clone()), &VoidProgressMonitor)
        .unwrap();
    assert_eq!(constraint_names(&merged), vec![("row_key".to_string(), true)]);

    let entity = EntityRef::Virtual(orphan.clone());
    match require_real_entity(&entity, &VoidProgressMonitor) {
        Err(OverlayError::Resolution { object_id }) => {
            assert_eq!(object_id, "shop-db::Customer emails");
        }
        other => panic!("expected resolution error, got {:?}", other),
    }
    assert!(try_real_entity(&entity).is_virtual());
}

#[test]
fn test_unwrap_overlay_to_real_entity() {
    let ctx = TestContext::new();
    let overlay = ctx
        .resolver
        .resolve_virtual_entity(&ctx.entity(ORDERS), true)
        .unwrap();

    let real = require_real_entity(&EntityRef::Virtual(overlay.clone()), &VoidProgressMonitor)
        .unwrap();
    assert!(Arc::ptr_eq(&real, &ctx.real(ORDERS)));

    let unwrapped = try_real_entity(&EntityRef::Virtual(overlay));
    assert!(!unwrapped.is_virtual());
    assert_eq!(unwrapped.name(), "orders");
}
