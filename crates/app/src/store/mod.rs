//! Document store contract
//!
//! The ledger only needs three things from persistence: read a document with
//! its version, create a document if absent, and replace a document on the
//! condition that its version has not moved since it was read. Everything
//! that must not be consumed twice is built on top of that conditional write.

use std::{fmt::Debug, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

mod errors;
mod memory;
mod postgres;

pub use errors::StoreError;
pub use memory::MemoryStore;
pub use postgres::PgDocumentStore;

/// Document collections used by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Vouchers,
    /// Uniqueness claims for voucher codes, keyed by the code itself.
    VoucherCodes,
    LoyaltyAccounts,
    Payments,
    /// Uniqueness claims for payment reference codes.
    PaymentReferences,
    Orders,
}

impl Collection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vouchers => "vouchers",
            Self::VoucherCodes => "voucher_codes",
            Self::LoyaltyAccounts => "loyalty_accounts",
            Self::Payments => "payments",
            Self::PaymentReferences => "payment_references",
            Self::Orders => "orders",
        }
    }
}

/// Where a [`DocumentStore`] keeps its documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Memory,
    Postgres,
}

impl StoreKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Postgres => "postgres",
        }
    }
}

/// A stored document and the version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub body: Value,
}

/// Comparison operator for [`QueryFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

impl QueryOp {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
        }
    }
}

/// `field op value` over a top-level document field.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryFilter {
    pub field: &'static str,
    pub op: QueryOp,
    pub value: Value,
}

impl QueryFilter {
    #[must_use]
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Self {
            field,
            op: QueryOp::Eq,
            value: value.into(),
        }
    }
}

#[async_trait]
pub trait DocumentStore: Debug + Send + Sync {
    fn kind(&self) -> StoreKind;

    /// Read a document.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when no document has this id.
    async fn get(&self, collection: Collection, id: &str) -> Result<Document, StoreError>;

    /// Create a document at version 1.
    ///
    /// # Errors
    ///
    /// [`StoreError::AlreadyExists`] when the id is taken.
    async fn insert(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Document, StoreError>;

    /// Replace a document if it is still at `expected_version`.
    ///
    /// # Errors
    ///
    /// [`StoreError::Conflict`] when another writer got there first,
    /// [`StoreError::NotFound`] when the document does not exist.
    async fn conditional_update(
        &self,
        collection: Collection,
        id: &str,
        expected_version: u64,
        body: Value,
    ) -> Result<Document, StoreError>;

    /// List documents matching a filter, ordered by id.
    async fn query(
        &self,
        collection: Collection,
        filter: QueryFilter,
    ) -> Result<Vec<Document>, StoreError>;
}

/// A typed record and the document version it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub version: u64,
    pub record: T,
}

/// Typed access to one collection.
pub(crate) struct Documents<T> {
    store: Arc<dyn DocumentStore>,
    collection: Collection,
    marker: PhantomData<fn() -> T>,
}

impl<T> Debug for Documents<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Documents")
            .field("collection", &self.collection)
            .finish_non_exhaustive()
    }
}

impl<T> Clone for Documents<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            collection: self.collection,
            marker: PhantomData,
        }
    }
}

impl<T> Documents<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn new(store: Arc<dyn DocumentStore>, collection: Collection) -> Self {
        Self {
            store,
            collection,
            marker: PhantomData,
        }
    }

    pub(crate) async fn get(&self, id: &str) -> Result<Versioned<T>, StoreError> {
        let document = self.store.get(self.collection, id).await?;

        decode(document)
    }

    pub(crate) async fn find(&self, id: &str) -> Result<Option<Versioned<T>>, StoreError> {
        match self.get(id).await {
            Ok(versioned) => Ok(Some(versioned)),
            Err(StoreError::NotFound) => Ok(None),
            Err(error) => Err(error),
        }
    }

    pub(crate) async fn insert(&self, id: &str, record: T) -> Result<Versioned<T>, StoreError> {
        let body = serde_json::to_value(&record).map_err(StoreError::Serialization)?;
        let document = self.store.insert(self.collection, id, body).await?;

        Ok(Versioned {
            version: document.version,
            record,
        })
    }

    pub(crate) async fn replace(
        &self,
        id: &str,
        expected_version: u64,
        record: T,
    ) -> Result<Versioned<T>, StoreError> {
        let body = serde_json::to_value(&record).map_err(StoreError::Serialization)?;

        let document = self
            .store
            .conditional_update(self.collection, id, expected_version, body)
            .await?;

        Ok(Versioned {
            version: document.version,
            record,
        })
    }

    pub(crate) async fn query(&self, filter: QueryFilter) -> Result<Vec<Versioned<T>>, StoreError> {
        self.store
            .query(self.collection, filter)
            .await?
            .into_iter()
            .map(decode)
            .collect()
    }
}

fn decode<T: DeserializeOwned>(document: Document) -> Result<Versioned<T>, StoreError> {
    let record = serde_json::from_value(document.body).map_err(StoreError::Serialization)?;

    Ok(Versioned {
        version: document.version,
        record,
    })
}
