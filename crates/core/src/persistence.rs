//! Save and load of the element list against a document record store.
//!
//! Loading is split into [`OverlayEngine::begin_load`] and
//! [`OverlayEngine::finish_load`] so callers that fetch records off the
//! interaction thread can hand the result back later. Resolutions apply in
//! the order they arrive: if two loads overlap, the one resolved last wins.

use crate::engine::OverlayEngine;
use crate::error::{OverlayError, OverlayResult};
use doc_model::{DocumentId, DocumentRecord, RecordPatch};
use storage::{DocumentStore, StoreError};

/// Handle for an issued load, returned to [`OverlayEngine::finish_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    document_id: DocumentId,
    seq: u64,
}

impl LoadTicket {
    pub fn document_id(&self) -> &DocumentId {
        &self.document_id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved { count: usize },
    /// Nothing is open, so there was nothing to write.
    NoDocument,
}

impl OverlayEngine {
    pub fn begin_load(&mut self, document_id: &DocumentId) -> LoadTicket {
        self.loads_issued += 1;
        tracing::debug!(document = %document_id, seq = self.loads_issued, "load issued");
        LoadTicket { document_id: document_id.clone(), seq: self.loads_issued }
    }

    /// Apply a fetched record. A record without a stored list opens with an
    /// empty one. Unsaved edits are discarded.
    ///
    /// On failure the in-memory list, selection and open document are left
    /// exactly as they were.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        fetched: Result<Option<DocumentRecord>, StoreError>,
    ) -> OverlayResult<DocumentRecord> {
        let record = match fetched {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::warn!(document = %ticket.document_id, "document not found");
                return Err(OverlayError::DocumentNotFound(ticket.document_id));
            }
            Err(err) => {
                tracing::warn!(document = %ticket.document_id, error = %err, "load failed");
                return Err(err.into());
            }
        };

        if ticket.seq < self.loads_issued {
            tracing::warn!(
                document = %ticket.document_id,
                seq = ticket.seq,
                latest = self.loads_issued,
                "applying load that resolved after a newer one was issued"
            );
        }
        if self.dirty {
            tracing::warn!(
                previous = ?self.document,
                count = self.elements.len(),
                "discarding unsaved annotation edits"
            );
        }

        let elements = record.annotations.clone().unwrap_or_default();
        for element in &elements {
            self.ids.observe(element.id());
        }

        tracing::info!(document = %record.id, count = elements.len(), "annotations loaded");
        self.elements = elements;
        self.selected = None;
        self.document = Some(record.id.clone());
        self.dirty = false;
        Ok(record)
    }

    /// Fetch and apply in one step.
    pub fn load(
        &mut self,
        store: &dyn DocumentStore,
        document_id: &DocumentId,
    ) -> OverlayResult<DocumentRecord> {
        let ticket = self.begin_load(document_id);
        let fetched = store.get(document_id);
        self.finish_load(ticket, fetched)
    }

    /// Write the whole element list under `document_id`, replacing whatever
    /// list was stored. The binary content of the record is not touched.
    pub fn save(
        &mut self,
        store: &mut dyn DocumentStore,
        document_id: &DocumentId,
    ) -> OverlayResult<SaveOutcome> {
        if self.document.is_none() {
            tracing::debug!(document = %document_id, "save skipped, no document open");
            return Ok(SaveOutcome::NoDocument);
        }

        let count = self.elements.len();
        store
            .update(document_id, RecordPatch::annotations(self.elements.clone()))
            .map_err(|err| {
                tracing::warn!(document = %document_id, error = %err, "save failed");
                OverlayError::from(err)
            })?;

        self.dirty = false;
        tracing::info!(document = %document_id, count, "annotations saved");
        Ok(SaveOutcome::Saved { count })
    }
}
