#![allow(dead_code)]

use {
    prism::prelude::*,
    serde_json::{json, Value},
    std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn pets() -> Vec<Value> {
    vec![
        json!({"name": "Ralph", "specie": "dog", "age": 3}),
        json!({"name": "Lucy", "specie": "cat", "age": 5}),
        json!({"name": "Gex", "specie": "lizard", "age": 9}),
        json!({"name": "Ed", "specie": "horse", "age": 7}),
        json!({"name": "Tom", "specie": "echidna", "age": 3}),
        json!({"name": "Go", "specie": "gopher", "age": 2}),
        json!({"name": "Frank", "specie": "parrot", "age": 5}),
    ]
}

pub fn pet_store() -> Arc<Store> {
    Store::with_data(pets()).unwrap()
}

pub fn two_pets() -> Arc<Store> {
    Store::with_data(vec![
        json!({"name": "Ralph", "specie": "dog"}),
        json!({"name": "Lucy", "specie": "cat"}),
    ])
    .unwrap()
}

pub fn name_of(model: &Model) -> String {
    model.get("name").and_then(|v| v.as_str().map(String::from)).unwrap_or_default()
}

pub fn age_of(model: &Model) -> i64 {
    model.get("age").and_then(|v| v.as_i64()).unwrap_or(0)
}

/// Counts the events of `kind` emitted on `events`.
pub fn spy(events: &Events, kind: EventKind) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let counter = count.clone();
    events.on(kind, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });
    count
}

pub fn calls(count: &AtomicUsize) -> usize {
    count.load(Ordering::SeqCst)
}
