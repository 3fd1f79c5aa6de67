//! # Memory Store
//!
//! Collections kept in a map of insertion-ordered vectors. Mirrors the
//! Firestore query semantics the server relies on:
//!
//! - documents missing the `order_by` field are left out of ordered queries
//! - equal sort keys fall back to insertion order, reversed for descending
//! - `GreaterOrEqual` only matches values of the same JSON type
//!
//! Flip [`MemoryStore::set_failing`] to make every call return
//! [`StoreError::Injected`], which is how tests take the remote side down.
use std::{
    cmp::Ordering,
    collections::HashMap,
    sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering},
};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::{Direction, Document, DocumentStore, Filter, Op, Query, StoreError, StoredDocument};

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
    next_id: AtomicU64,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, AtomicOrdering::SeqCst);
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map_or(0, |documents| documents.len())
    }

    pub fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        self.collections
            .read()
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(AtomicOrdering::SeqCst) {
            return Err(StoreError::Injected);
        }

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError> {
        self.check()?;

        let id = format!("doc-{}", self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1);

        self.collections
            .write()
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields: document,
            });

        Ok(id)
    }

    async fn query(
        &self,
        collection: &str,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        self.check()?;

        let collections = self.collections.read();
        let Some(documents) = collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<(usize, &StoredDocument)> = documents
            .iter()
            .enumerate()
            .filter(|(_, document)| query.filters.iter().all(|filter| matches(document, filter)))
            .collect();

        // ties fall back to insertion position, in the same direction as the key
        if let Some((field, direction)) = &query.order_by {
            matched.retain(|(_, document)| document.fields.contains_key(field));
            matched.sort_by(|(a_pos, a), (b_pos, b)| {
                let ordering = compare(&a.fields[field], &b.fields[field])
                    .unwrap_or(Ordering::Equal)
                    .then(a_pos.cmp(b_pos));

                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        let limit = query.limit.unwrap_or(usize::MAX);

        Ok(matched
            .into_iter()
            .take(limit)
            .map(|(_, document)| document.clone())
            .collect())
    }
}

fn matches(document: &StoredDocument, filter: &Filter) -> bool {
    let Some(value) = document.fields.get(&filter.field) else {
        return false;
    };

    match filter.op {
        Op::Equal => value == &filter.value,
        Op::GreaterOrEqual => matches!(
            compare(value, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}
