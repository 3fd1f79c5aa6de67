//! # Remote Store
//!
//! Document collections reachable by name, supporting add, equality/range
//! filters, ordering and limits. The server only ever talks to a
//! [`DocumentStore`], so the backing service can be swapped without touching
//! the attendance logic.
//!
//! ## Backends
//! - [`FirestoreStore`]: Cloud Firestore over its REST API
//! - [`MemoryStore`]: in-process collections, can be told to fail every call
//! - [`DisconnectedStore`]: no credentials, every call fails
//!
//! ## Timestamps
//! Write-time fields are fixed-width RFC 3339 UTC strings. Ordering and `>=`
//! filters on them are plain string comparisons in every backend.
use async_trait::async_trait;
use serde_json::{Map, Value};

pub mod error;
pub mod firestore;
pub mod memory;

pub use error::StoreError;
pub use firestore::{FirestoreCredentials, FirestoreStore};
pub use memory::MemoryStore;

pub type Document = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Document,
}

impl StoredDocument {
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Equal,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, field: &str, direction: Direction) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn name(&self) -> &'static str;

    /// Writes a new document and returns the id the store assigned to it.
    async fn add(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    async fn query(&self, collection: &str, query: &Query)
    -> Result<Vec<StoredDocument>, StoreError>;
}

/// Stand-in used when no credentials were found at startup.
pub struct DisconnectedStore;

#[async_trait]
impl DocumentStore for DisconnectedStore {
    fn name(&self) -> &'static str {
        "disconnected"
    }

    async fn add(&self, _collection: &str, _document: Document) -> Result<String, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn query(
        &self,
        _collection: &str,
        _query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        Err(StoreError::Unavailable)
    }
}
