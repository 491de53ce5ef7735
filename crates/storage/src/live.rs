use doc_model::DocumentSummary;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Full document list as of a store revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSnapshot {
    pub revision: u64,
    pub documents: Vec<DocumentSummary>,
}

pub type Listener = Box<dyn FnMut(&ListSnapshot) + Send>;

/// Listener bookkeeping shared by the store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    next_id: u64,
    revision: u64,
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl Subscribers {
    pub(crate) fn add(&mut self, mut listener: Listener, current: Vec<DocumentSummary>) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        listener(&ListSnapshot { revision: self.revision, documents: current });
        self.listeners.push((id, listener));
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub(crate) fn notify(&mut self, documents: Vec<DocumentSummary>) {
        self.revision += 1;
        if self.listeners.is_empty() {
            return;
        }

        let snapshot = ListSnapshot { revision: self.revision, documents };
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }

    pub(crate) fn has_listeners(&self) -> bool {
        !self.listeners.is_empty()
    }

    pub(crate) fn bump(&mut self) {
        self.revision += 1;
    }
}

/// File-list view model fed by store snapshots.
///
/// Applying the same or an older revision again is a no-op, so re-delivery
/// is harmless.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LiveDocumentList {
    revision: Option<u64>,
    documents: Vec<DocumentSummary>,
}

impl LiveDocumentList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, snapshot: &ListSnapshot) -> bool {
        if self.revision.is_some_and(|current| snapshot.revision <= current) {
            tracing::trace!(revision = snapshot.revision, "ignoring stale list snapshot");
            return false;
        }

        self.revision = Some(snapshot.revision);
        self.documents = snapshot.documents.clone();
        true
    }

    pub fn documents(&self) -> &[DocumentSummary] {
        &self.documents
    }

    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Listener that keeps a shared list up to date.
    pub fn listener(shared: Arc<Mutex<LiveDocumentList>>) -> Listener {
        Box::new(move |snapshot| match shared.lock() {
            Ok(mut list) => {
                list.apply(snapshot);
            }
            Err(_) => {
                tracing::warn!(
                    revision = snapshot.revision,
                    "document list lock poisoned, snapshot dropped"
                );
            }
        })
    }
}
