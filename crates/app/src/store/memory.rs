//! In-process document store.

use std::{
    cmp::Ordering,
    sync::{Mutex, MutexGuard, PoisonError},
};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;

use super::{Collection, Document, DocumentStore, QueryFilter, QueryOp, StoreError, StoreKind};

type Key = (Collection, String);

/// Document store held in memory. Conditional updates are checked and applied
/// under one lock, so it honours the same compare-and-set contract as the
/// PostgreSQL store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    documents: Mutex<FxHashMap<Key, Document>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn documents(&self) -> MutexGuard<'_, FxHashMap<Key, Document>> {
        self.documents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Memory
    }

    async fn get(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        self.documents()
            .get(&(collection, id.to_owned()))
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Document, StoreError> {
        let mut documents = self.documents();
        let key = (collection, id.to_owned());

        if documents.contains_key(&key) {
            return Err(StoreError::AlreadyExists);
        }

        let document = Document {
            id: id.to_owned(),
            version: 1,
            body,
        };

        documents.insert(key, document.clone());

        Ok(document)
    }

    async fn conditional_update(
        &self,
        collection: Collection,
        id: &str,
        expected_version: u64,
        body: Value,
    ) -> Result<Document, StoreError> {
        let mut documents = self.documents();

        let document = documents
            .get_mut(&(collection, id.to_owned()))
            .ok_or(StoreError::NotFound)?;

        if document.version != expected_version {
            return Err(StoreError::Conflict);
        }

        document.version = document
            .version
            .checked_add(1)
            .ok_or(StoreError::InvalidVersion)?;
        document.body = body;

        Ok(document.clone())
    }

    async fn query(
        &self,
        collection: Collection,
        filter: QueryFilter,
    ) -> Result<Vec<Document>, StoreError> {
        let mut matches: Vec<Document> = self
            .documents()
            .iter()
            .filter(|((document_collection, _), _)| *document_collection == collection)
            .filter(|(_, document)| {
                document
                    .body
                    .get(filter.field)
                    .is_some_and(|value| matches_filter(value, filter.op, &filter.value))
            })
            .map(|(_, document)| document.clone())
            .collect();

        matches.sort_by(|a, b| a.id.cmp(&b.id));

        Ok(matches)
    }
}

fn matches_filter(value: &Value, op: QueryOp, expected: &Value) -> bool {
    match op {
        QueryOp::Eq => value == expected,
        QueryOp::Ne => value != expected,
        QueryOp::Lt => compare(value, expected) == Some(Ordering::Less),
        QueryOp::Lte => matches!(
            compare(value, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        QueryOp::Gt => compare(value, expected) == Some(Ordering::Greater),
        QueryOp::Gte => matches!(
            compare(value, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_u64(), b.as_u64()) {
                return Some(a.cmp(&b));
            }

            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                return Some(a.cmp(&b));
            }

            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}
