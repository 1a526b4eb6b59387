//! Concurrent resolution tests.
//!
//! Several workers racing on the same lazily created overlay object must all
//! observe the single instance that won.

use super::common::*;
use serde_json::json;
use std::sync::{Arc, Barrier};
use std::thread;
use veneer_core::{AttributeMeta, DataContainer, QueryContainer};
use veneer_overlay::{AttributeBinding, ContainerRef, VirtualEntity};

const WORKERS: usize = 16;

/// Run `work` on `WORKERS` threads released at the same moment.
fn race<T, F>(work: F) -> Vec<T>
where
    T: Send,
    F: Fn() -> T + Sync,
{
    let barrier = &Barrier::new(WORKERS);
    let work = &work;
    thread::scope(|scope| {
        let handles: Vec<_> = (0..WORKERS)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    work()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|h| match h.join() {
                Ok(value) => value,
                Err(_) => panic!("worker panicked"),
            })
            .collect()
    })
}

fn all_same<T>(items: &[Arc<T>]) -> bool {
    items.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1]))
}

// =============================================================================
// ORPHAN CACHE
// =============================================================================

#[test]
fn test_concurrent_orphan_resolution_creates_one_entity() {
    let ctx = TestContext::new();
    let sql = "select status, count(*) from shop.public.orders group by status";

    let orphans: Vec<Arc<VirtualEntity>> = race(|| {
        // Every worker brings its own container object with the same identity.
        let query: Arc<dyn DataContainer> =
            Arc::new(QueryContainer::new(data_source(), "Orders by status", sql));
        ctx.resolver
            .resolve_container_entity(&ContainerRef::Detached(query), true)
            .unwrap()
    });

    assert_eq!(orphans.len(), WORKERS);
    assert!(all_same(&orphans));
    assert!(orphans[0].is_orphan());
    assert_eq!(ctx.resolver.orphans().len(), 1);
}

#[test]
fn test_distinct_queries_get_distinct_orphans() {
    let ctx = TestContext::new();
    let first: Arc<dyn DataContainer> =
        Arc::new(QueryContainer::new(data_source(), "q", "select 1"));
    let second: Arc<dyn DataContainer> =
        Arc::new(QueryContainer::new(data_source(), "q", "select 2"));

    let a = ctx
        .resolver
        .resolve_container_entity(&ContainerRef::Detached(first), true)
        .unwrap();
    let b = ctx
        .resolver
        .resolve_container_entity(&ContainerRef::Detached(second), true)
        .unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(ctx.resolver.orphans().len(), 2);
}

// =============================================================================
// ENTITY OVERLAYS
// =============================================================================

#[test]
fn test_concurrent_entity_creation_yields_one_overlay() {
    let ctx = TestContext::new();
    let orders = ctx.entity(ORDERS);

    let overlays = race(|| ctx.resolver.resolve_virtual_entity(&orders, true).unwrap());

    assert!(all_same(&overlays));
    assert_eq!(ctx.model.entities().len(), 1);
}

#[test]
fn test_concurrent_attribute_overlays_are_shared() {
    let ctx = TestContext::new();
    let orders = ctx.resolver.resolve_virtual_entity(&ctx.entity(ORDERS), true).unwrap();

    let attributes = race(|| orders.virtual_attribute("status", true).unwrap());

    assert!(all_same(&attributes));
    assert_eq!(orders.attributes().len(), 1);
}

// =============================================================================
// SETTINGS
// =============================================================================

#[test]
fn test_concurrent_settings_creation_single_writer_wins() {
    let ctx = TestContext::new();
    let binding = AttributeBinding::for_entity(ctx.entity(ORDERS), ctx.column(ORDERS, "status"));

    let settings = race(|| ctx.resolver.binding_transform_settings(&binding, true).unwrap());

    assert!(all_same(&settings));
    settings[0].set_option("mask", json!("n/a"));
    let options = ctx.resolver.collect_transform_options(&binding);
    assert_eq!(options.get("mask"), Some(&json!("n/a")));
}

#[test]
fn test_concurrent_model_settings_creation() {
    let ctx = TestContext::new();
    let settings = race(|| ctx.model.create_transform_settings());
    assert!(all_same(&settings));

    let orphan_binding = AttributeBinding::for_container(
        Arc::new(QueryContainer::new(data_source(), "q", "select 1 as one")),
        AttributeMeta::new("one", "int4"),
    );
    ctx.resolver
        .resolve_binding_entity(&orphan_binding, true)
        .unwrap()
        .virtual_attribute("one", true)
        .unwrap();
    let inherited = ctx
        .resolver
        .binding_transform_settings(&orphan_binding, false)
        .unwrap();
    assert!(Arc::ptr_eq(&inherited, &settings[0]));
    assert_eq!(ctx.resolver.orphans().len(), 1);
}
