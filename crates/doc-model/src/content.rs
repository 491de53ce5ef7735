use serde::{Deserialize, Serialize};

/// Mime types accepted into the record store.
pub const ALLOWED_MIME_TYPES: [&str; 8] = [
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "image/jpeg",
    "image/png",
    "application/vnd.ms-outlook",
];

/// Which family of renderer a document needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContentKind {
    Pdf,
    Image,
    WordDocument,
    Spreadsheet,
    Unsupported(String),
}

impl ContentKind {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/pdf" => ContentKind::Pdf,
            "image/jpeg" | "image/png" => ContentKind::Image,
            "application/msword"
            | "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                ContentKind::WordDocument
            }
            "application/vnd.ms-excel"
            | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet" => {
                ContentKind::Spreadsheet
            }
            other => ContentKind::Unsupported(other.to_owned()),
        }
    }

    /// Guess a mime type from a file extension.
    pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
        let mime = match extension.to_ascii_lowercase().as_str() {
            "pdf" => "application/pdf",
            "doc" => "application/msword",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "xls" => "application/vnd.ms-excel",
            "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "msg" => "application/vnd.ms-outlook",
            _ => return None,
        };
        Some(mime)
    }

    /// Only PDFs are paginated; everything else is a single frame.
    pub fn is_paginated(&self) -> bool {
        matches!(self, ContentKind::Pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_allowed_type_routes_somewhere() {
        let unsupported: Vec<_> = ALLOWED_MIME_TYPES
            .iter()
            .filter(|mime| matches!(ContentKind::from_mime(mime), ContentKind::Unsupported(_)))
            .collect();

        assert_eq!(unsupported, vec![&"application/vnd.ms-outlook"]);
    }

    #[test]
    fn extension_lookup_is_case_insensitive() {
        assert_eq!(ContentKind::mime_for_extension("PNG"), Some("image/png"));
        assert_eq!(ContentKind::mime_for_extension("txt"), None);
    }
}
