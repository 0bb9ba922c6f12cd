//! Error types for the renterkit library.
//!
//! One enum covers the whole core, sectioned by failure class:
//!
//! * **Validation** — the caller (ultimately the end user) supplied something
//!   fixable: an undersized image, a missing answer, an out-of-range amount.
//!   Surfaced verbatim for user correction, never retried.
//!
//! * **Storage** — a content-store operation failed. During ingestion this
//!   aborts the whole operation so no half-created record exists; during
//!   cleanup it is logged and swallowed so record deletion always proceeds.
//!
//! * **Template / Form** — a single render or fill request failed. Fatal to
//!   that request only.
//!
//! Nothing in this crate retries automatically; retries, if any, belong to
//! the upload/network layer above it.

use thiserror::Error;

use crate::model::{FieldKind, ImageKind};

/// All errors returned by the renterkit library.
#[derive(Debug, Error)]
pub enum RenterKitError {
    // ── Image validation ──────────────────────────────────────────────────
    /// The decoded upload is narrower or shorter than the configured floor.
    #[error("Images must be at least {min_dimension} pixels tall and wide. Please upload a larger image.")]
    ImageTooSmall { min_dimension: u32 },

    /// The unit already holds the maximum number of images of this kind.
    #[error("This unit already has {limit} {kind} images; remove one before uploading another.")]
    TooManyImages { kind: ImageKind, limit: usize },

    /// The upload bytes did not decode as a raster image.
    #[error("Could not read the uploaded file as an image: {detail}")]
    ImageDecode { detail: String },

    // ── Answer validation ─────────────────────────────────────────────────
    /// A field the template marks required was absent from the answer set.
    #[error("'{name}' is required")]
    MissingRequiredField { name: String },

    /// An answer was present but failed to parse as the field's type.
    #[error("'{name}' must be a valid {expected}, got '{value}'")]
    InvalidFieldValue {
        name: String,
        expected: FieldKind,
        value: String,
    },

    /// A numeric answer fell outside its permitted range. Never clamped.
    #[error("'{name}' must be between {min} and {max}")]
    AmountOutOfRange {
        name: String,
        min: String,
        max: String,
    },

    /// The requested filing county is not one this form supports.
    #[error("Small claims filings are not supported in '{county}' county")]
    UnsupportedJurisdiction { county: String },

    /// Two fields of the same template share a label.
    #[error("Template '{template}' defines field '{name}' more than once")]
    DuplicateField { template: String, name: String },

    // ── Storage ───────────────────────────────────────────────────────────
    /// A content-store read, write, or delete failed.
    #[error("Storage operation failed for '{path}': {detail}")]
    Storage { path: String, detail: String },

    // ── Template rendering ────────────────────────────────────────────────
    /// Letter rendering failed (rasterizer or wrapper error).
    #[error("Document rendering failed: {detail}")]
    TemplateRender { detail: String },

    // ── Form filling ──────────────────────────────────────────────────────
    /// The base government form could not be parsed as a PDF.
    #[error("Could not read the form PDF: {detail}")]
    UnreadableForm { detail: String },

    /// Mutating or serializing the form failed.
    #[error("Form fill failed: {detail}")]
    FormFill { detail: String },

    // ── Config ────────────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (e.g. a blocking task panicked).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RenterKitError {
    /// Whether this error is user-correctable input validation, as opposed
    /// to an infrastructure or rendering failure.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RenterKitError::ImageTooSmall { .. }
                | RenterKitError::TooManyImages { .. }
                | RenterKitError::ImageDecode { .. }
                | RenterKitError::MissingRequiredField { .. }
                | RenterKitError::InvalidFieldValue { .. }
                | RenterKitError::AmountOutOfRange { .. }
                | RenterKitError::UnsupportedJurisdiction { .. }
                | RenterKitError::DuplicateField { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_too_small_display() {
        let e = RenterKitError::ImageTooSmall { min_dimension: 200 };
        assert!(e.to_string().contains("200 pixels"), "got: {e}");
        assert!(e.is_validation());
    }

    #[test]
    fn too_many_images_display() {
        let e = RenterKitError::TooManyImages {
            kind: ImageKind::Document,
            limit: 5,
        };
        let msg = e.to_string();
        assert!(msg.contains('5'), "got: {msg}");
        assert!(msg.contains("document"), "got: {msg}");
    }

    #[test]
    fn invalid_field_value_display() {
        let e = RenterKitError::InvalidFieldValue {
            name: "move out date".into(),
            expected: FieldKind::Date,
            value: "soonish".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("move out date"));
        assert!(msg.contains("soonish"));
        assert!(msg.contains("date"));
    }

    #[test]
    fn storage_is_not_validation() {
        let e = RenterKitError::Storage {
            path: "uploads/x.jpg".into(),
            detail: "disk full".into(),
        };
        assert!(!e.is_validation());
        assert!(e.to_string().contains("uploads/x.jpg"));
    }
}
