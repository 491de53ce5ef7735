use crate::live::Subscribers;
use crate::{DocumentStore, Listener, StoreError, SubscriptionId};
use doc_model::{DocumentId, DocumentRecord, DocumentSummary, RecordPatch};
use std::collections::BTreeMap;

/// In-process store. Useful for tests and for hosts that persist elsewhere.
#[derive(Default)]
pub struct MemoryStore {
    records: BTreeMap<DocumentId, DocumentRecord>,
    subscribers: Subscribers,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn summaries(&self) -> Vec<DocumentSummary> {
        self.records.values().map(DocumentRecord::summary).collect()
    }

    fn changed(&mut self) {
        let documents = self.summaries();
        self.subscribers.notify(documents);
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        Ok(self.records.get(id).cloned())
    }

    fn put(&mut self, record: DocumentRecord) -> Result<(), StoreError> {
        self.records.insert(record.id.clone(), record);
        self.changed();
        Ok(())
    }

    fn update(&mut self, id: &DocumentId, patch: RecordPatch) -> Result<(), StoreError> {
        let record = self.records.get_mut(id).ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.apply(patch);
        self.changed();
        Ok(())
    }

    fn delete(&mut self, id: &DocumentId) -> Result<bool, StoreError> {
        let removed = self.records.remove(id).is_some();
        if removed {
            self.changed();
        }
        Ok(removed)
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        Ok(self.summaries())
    }

    fn subscribe(&mut self, listener: Listener) -> Result<SubscriptionId, StoreError> {
        let current = self.summaries();
        Ok(self.subscribers.add(listener, current))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LiveDocumentList;
    use doc_model::{AnnotationElement, ElementId, ElementKind, PagePoint};
    use std::sync::{Arc, Mutex};

    fn record(id: &str) -> DocumentRecord {
        DocumentRecord::new(DocumentId::new(id), format!("{id}.pdf"), "application/pdf", vec![7; 16])
    }

    #[test]
    fn update_only_replaces_annotations() {
        let mut store = MemoryStore::new();
        store.put(record("doc")).expect("put");

        let element =
            AnnotationElement::new(ElementId(1), ElementKind::Square, PagePoint::new(1.0, 2.0), 1);
        store
            .update(&DocumentId::new("doc"), RecordPatch::annotations(vec![element.clone()]))
            .expect("update");

        let loaded = store.get(&DocumentId::new("doc")).expect("get").expect("present");
        assert_eq!(loaded.content, vec![7; 16]);
        assert_eq!(loaded.name, "doc.pdf");
        assert_eq!(loaded.annotations, Some(vec![element]));
    }

    #[test]
    fn update_of_missing_record_is_not_found() {
        let mut store = MemoryStore::new();
        let err = store
            .update(&DocumentId::new("nope"), RecordPatch::default())
            .expect_err("missing record");
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn subscribers_see_initial_and_subsequent_lists() {
        let mut store = MemoryStore::new();
        store.put(record("a")).expect("put");

        let list = Arc::new(Mutex::new(LiveDocumentList::new()));
        let subscription =
            store.subscribe(LiveDocumentList::listener(list.clone())).expect("subscribe");
        assert_eq!(list.lock().expect("lock").documents().len(), 1);

        store.put(record("b")).expect("put");
        assert_eq!(list.lock().expect("lock").documents().len(), 2);

        assert!(store.delete(&DocumentId::new("a")).expect("delete"));
        assert_eq!(list.lock().expect("lock").documents().len(), 1);

        assert!(store.unsubscribe(subscription));
        store.put(record("c")).expect("put");
        assert_eq!(list.lock().expect("lock").documents().len(), 1);
    }

    #[test]
    fn deleting_missing_record_reports_false() {
        let mut store = MemoryStore::new();
        assert!(!store.delete(&DocumentId::new("ghost")).expect("delete"));
    }
}
