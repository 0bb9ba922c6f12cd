//! # renterkit
//!
//! Core of a renter-advocacy application: tenants register rental units,
//! upload move-in/move-out documentation photos, and generate pre-filled
//! legal document PDFs. This crate is the part worth getting right — the
//! web layer above it (routing, auth, admin, email) is a consumer, not a
//! concern.
//!
//! ## Two components
//!
//! ```text
//! upload bytes                         template id + answers
//!  │                                    │
//!  ├─ 1. Decode    validate raster,     ├─ 1. Schema    fields → {key, type,
//!  │               enforce min size     │               required}
//!  ├─ 2. Ladder    descending resize,   ├─ 2. Merge     sender/unit context
//!  │               square thumbnail     │               + validated answers
//!  ├─ 3. Persist   ContentStore         ├─ 3. Render    {{ key }} → letter
//!  │               (local / object)     │               shell → rasterizer
//!  └─ 4. Record    UnitImage with       └─ or Fill      widget-by-widget
//!                  derivative metadata               into a fixed form PDF
//! ```
//!
//! The two components never call each other; they share only the owning
//! [`Unit`] and the requesting [`Owner`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use renterkit::{ingest, ImageConfig, ImageKind, MemoryStore, Owner, Unit};
//!
//! # async fn example(owner: Owner, unit: Unit, upload: Vec<u8>) -> Result<(), renterkit::RenterKitError> {
//! let store = MemoryStore::new();
//! let config = ImageConfig::default();
//! let record = ingest(&store, &upload, ImageKind::MoveInPicture, &owner, &unit, &config).await?;
//! println!("full size: {}x{}", record.full_size_width, record.full_size_height);
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! * `thumbnail_sizes` on a returned record names exactly the derivative
//!   files that exist in the store — no orphans, no missing files.
//! * A failed ingest never creates a record; a failed batch rolls back every
//!   record the batch created before surfacing its first failure.
//! * Deleting a record's files is best-effort and never blocks the deletion.
//! * Form filling touches widget values and `NeedAppearances` only.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod documents;
pub mod error;
pub mod images;
pub mod model;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ImageConfig, ImageConfigBuilder};
pub use documents::{
    fill_form, render_letter, render_photo_report, render_small_claims, schema_for,
    validate_answers, AnswerValue, FieldSpec, FormValue, LetterRequest, PdfForm, PdfRasterizer,
    RenderedDocument, SmallClaimsRequest,
};
pub use error::RenterKitError;
pub use images::{
    check_admission, count_for, ingest, ingest_batch, purge_derivatives, thumbnail_internal_url,
    thumbnail_url, NewImage,
};
pub use model::{
    DocumentField, DocumentTemplate, FieldKind, ImageKind, Owner, Unit, UnitImage,
};
pub use store::{ContentStore, LocalStore, MemoryStore};
