//! Docnote Core Library
//!
//! Annotation overlay engine: owns the element list of the open document,
//! selection, interaction inversion and the save/load lifecycle.

pub mod config;
pub mod engine;
pub mod error;
pub mod ids;
pub mod manipulation;
pub mod overlay;
pub mod persistence;
pub mod properties;
pub mod session;

pub use config::{ConfigError, EditorConfig};
pub use engine::OverlayEngine;
pub use error::OverlayError;
pub use ids::ElementIdGenerator;
pub use overlay::{DisplayedElement, ElementVisual};
pub use persistence::{LoadTicket, SaveOutcome};
pub use properties::PropertyField;
pub use session::{EditorSession, Frame};
