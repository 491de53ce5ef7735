//! Document record store: the keyed persistence the overlay engine saves
//! annotation lists into, plus change notification for the file list.

use doc_model::{DocumentId, DocumentRecord, DocumentSummary, RecordPatch};

mod dir;
mod live;
mod memory;

pub use dir::DirStore;
pub use live::{LiveDocumentList, ListSnapshot, Listener, SubscriptionId};
pub use memory::MemoryStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("document not found: {0}")]
    NotFound(DocumentId),
    #[error("invalid document id: {0:?}")]
    InvalidId(String),
    #[error("unable to resolve local data directory")]
    NoDataDirectory,
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub trait DocumentStore {
    fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError>;

    /// Insert or replace a whole record.
    fn put(&mut self, record: DocumentRecord) -> Result<(), StoreError>;

    /// Patch an existing record. Binary content is never rewritten.
    fn update(&mut self, id: &DocumentId, patch: RecordPatch) -> Result<(), StoreError>;

    /// Returns whether a record was removed.
    fn delete(&mut self, id: &DocumentId) -> Result<bool, StoreError>;

    fn list(&self) -> Result<Vec<DocumentSummary>, StoreError>;

    /// Register for list snapshots. The current list is delivered immediately.
    fn subscribe(&mut self, listener: Listener) -> Result<SubscriptionId, StoreError>;

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool;
}
