use crate::properties::PropertyField;
use doc_model::DocumentId;
use storage::StoreError;

/// Failures of store-facing operations and property-panel input.
///
/// Element CRUD on unknown ids is not an error: it is a silent no-op.
#[derive(Debug, thiserror::Error)]
pub enum OverlayError {
    #[error("document not found: {0}")]
    DocumentNotFound(DocumentId),
    #[error("invalid {field} value {input:?}: {reason}")]
    ValidationRejected { field: PropertyField, input: String, reason: &'static str },
    #[error("store failure: {0}")]
    Store(#[source] StoreError),
}

impl From<StoreError> for OverlayError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => OverlayError::DocumentNotFound(id),
            other => OverlayError::Store(other),
        }
    }
}

pub type OverlayResult<T> = Result<T, OverlayError>;
