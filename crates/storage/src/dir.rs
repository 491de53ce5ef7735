use crate::live::Subscribers;
use crate::{DocumentStore, Listener, StoreError, SubscriptionId};
use directories::ProjectDirs;
use doc_model::{DocumentId, DocumentRecord, DocumentSummary, RecordPatch};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct RecordEnvelope {
    version: u32,
    record: DocumentRecord,
}

/// Directory-backed store.
///
/// Each record is `<id>.json` (metadata and annotation list) next to
/// `<id>.bin` (binary content), so annotation saves never rewrite the binary.
pub struct DirStore {
    root: PathBuf,
    subscribers: Subscribers,
}

impl DirStore {
    pub fn from_default_project() -> Result<Self, StoreError> {
        let dirs =
            ProjectDirs::from("dev", "Docnote", "Docnote").ok_or(StoreError::NoDataDirectory)?;

        Ok(Self::with_root(dirs.data_local_dir().join("documents")))
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), subscribers: Subscribers::default() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn record_path(&self, id: &DocumentId) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(format!("{}.json", checked_id(id)?)))
    }

    fn content_path(&self, id: &DocumentId) -> Result<PathBuf, StoreError> {
        Ok(self.root.join(format!("{}.bin", checked_id(id)?)))
    }

    fn read_record(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        let path = self.record_path(id)?;
        if !path.exists() {
            return Ok(None);
        }

        let bytes = fs::read(path)?;
        let envelope: RecordEnvelope = serde_json::from_slice(&bytes)?;
        Ok(Some(envelope.record))
    }

    fn write_record(&self, record: &DocumentRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;

        let envelope = RecordEnvelope { version: RECORD_SCHEMA_VERSION, record: record.clone() };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        write_atomically(&self.record_path(&record.id)?, &bytes)
    }

    fn changed(&mut self) -> Result<(), StoreError> {
        if !self.subscribers.has_listeners() {
            self.subscribers.bump();
            return Ok(());
        }

        let documents = self.list()?;
        self.subscribers.notify(documents);
        Ok(())
    }
}

impl DocumentStore for DirStore {
    fn get(&self, id: &DocumentId) -> Result<Option<DocumentRecord>, StoreError> {
        let Some(mut record) = self.read_record(id)? else {
            return Ok(None);
        };

        let content_path = self.content_path(id)?;
        if content_path.exists() {
            record.content = fs::read(content_path)?;
        }

        Ok(Some(record))
    }

    fn put(&mut self, record: DocumentRecord) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        write_atomically(&self.content_path(&record.id)?, &record.content)?;
        self.write_record(&record)?;
        tracing::debug!(id = %record.id, bytes = record.content.len(), "stored document");
        self.changed()
    }

    fn update(&mut self, id: &DocumentId, patch: RecordPatch) -> Result<(), StoreError> {
        let mut record = self.read_record(id)?.ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.apply(patch);
        self.write_record(&record)?;
        self.changed()
    }

    fn delete(&mut self, id: &DocumentId) -> Result<bool, StoreError> {
        let record_path = self.record_path(id)?;
        if !record_path.exists() {
            return Ok(false);
        }

        fs::remove_file(record_path)?;
        let content_path = self.content_path(id)?;
        if content_path.exists() {
            fs::remove_file(content_path)?;
        }

        self.changed()?;
        Ok(true)
    }

    fn list(&self) -> Result<Vec<DocumentSummary>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let bytes = fs::read(&path)?;
            let envelope: RecordEnvelope = serde_json::from_slice(&bytes)?;
            summaries.push(envelope.record.summary());
        }

        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(summaries)
    }

    fn subscribe(&mut self, listener: Listener) -> Result<SubscriptionId, StoreError> {
        let current = self.list()?;
        Ok(self.subscribers.add(listener, current))
    }

    fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }
}

/// Ids become file names, so anything that could escape the root is refused.
fn checked_id(id: &DocumentId) -> Result<&str, StoreError> {
    let raw = id.as_str();
    let valid = !raw.is_empty()
        && raw
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        && !raw.starts_with('.');

    if valid {
        Ok(raw)
    } else {
        Err(StoreError::InvalidId(raw.to_owned()))
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, bytes)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LiveDocumentList;
    use doc_model::{AnnotationElement, ElementId, ElementKind, PagePoint};
    use std::sync::{Arc, Mutex};

    fn record(id: &str) -> DocumentRecord {
        DocumentRecord::new(DocumentId::new(id), "scan.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    #[test]
    fn record_round_trip() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = DirStore::with_root(temp.path());

        store.put(record("scan")).expect("put should succeed");
        let loaded = store.get(&DocumentId::new("scan")).expect("get").expect("present");

        assert_eq!(loaded, record("scan"));
        assert_eq!(loaded.annotations, None);
    }

    #[test]
    fn annotation_update_keeps_binary_and_name() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = DirStore::with_root(temp.path());
        store.put(record("scan")).expect("put");

        let bin_path = temp.path().join("scan.bin");
        let before = fs::metadata(&bin_path).expect("bin exists").modified().expect("mtime");

        let element =
            AnnotationElement::new(ElementId(5), ElementKind::Text, PagePoint::new(3.0, 4.0), 1);
        store
            .update(&DocumentId::new("scan"), RecordPatch::annotations(vec![element.clone()]))
            .expect("update");

        let after = fs::metadata(&bin_path).expect("bin exists").modified().expect("mtime");
        assert_eq!(before, after);

        let loaded = store.get(&DocumentId::new("scan")).expect("get").expect("present");
        assert_eq!(loaded.name, "scan.png");
        assert_eq!(loaded.content, vec![0x89, b'P', b'N', b'G']);
        assert_eq!(loaded.annotations, Some(vec![element]));
    }

    #[test]
    fn missing_record_is_none() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let store = DirStore::with_root(temp.path().join("never-created"));

        assert!(store.get(&DocumentId::new("x")).expect("get").is_none());
        assert!(store.list().expect("list").is_empty());
    }

    #[test]
    fn ids_cannot_escape_root() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = DirStore::with_root(temp.path());

        let err = store.put(record("../evil")).expect_err("path traversal");
        assert!(matches!(err, StoreError::InvalidId(_)));
        assert!(matches!(
            store.get(&DocumentId::new("a/b")),
            Err(StoreError::InvalidId(_))
        ));
    }

    #[test]
    fn list_and_delete_notify_subscribers() {
        let temp = tempfile::tempdir().expect("temp dir should be created");
        let mut store = DirStore::with_root(temp.path());
        store.put(record("b")).expect("put");
        store.put(record("a")).expect("put");

        let ids: Vec<_> =
            store.list().expect("list").into_iter().map(|summary| summary.id.0).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let list = Arc::new(Mutex::new(LiveDocumentList::new()));
        store.subscribe(LiveDocumentList::listener(list.clone())).expect("subscribe");

        assert!(store.delete(&DocumentId::new("a")).expect("delete"));
        assert!(!store.delete(&DocumentId::new("a")).expect("delete"));
        assert!(!temp.path().join("a.bin").exists());

        let list = list.lock().expect("lock");
        assert_eq!(list.documents().len(), 1);
        assert_eq!(list.documents()[0].id, DocumentId::new("b"));
    }
}
