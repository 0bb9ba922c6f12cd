//! Image derivative pipeline: validated upload → resize ladder → content
//! store → record.
//!
//! ## Data Flow
//!
//! ```text
//! raw bytes ──▶ decode ──▶ ladder ──▶ persist ──▶ UnitImage
//!              (validate)  (resize,   (ContentStore)
//!                          square
//!                          thumb,
//!                          JPEG)
//! ```
//!
//! 1. [`resize`]    — pure ladder math: fit-inside resize, centered square
//!    crop, JPEG encode; runs in `spawn_blocking` because decoding and
//!    Lanczos resampling are CPU-bound
//! 2. [`ingest`]    — single-image entry point plus the bounded-concurrency
//!    batch wrapper with rollback
//! 3. [`cleanup`]   — best-effort derivative deletion on record removal, and
//!    thumbnail URL accessors with a process-wide cache
//! 4. [`admission`] — per-unit, per-kind counting checks the upload layer
//!    runs before ingesting

pub mod admission;
pub mod cleanup;
pub mod ingest;
pub mod resize;

pub use admission::{check_admission, count_for};
pub use cleanup::{purge_derivatives, thumbnail_internal_url, thumbnail_url};
pub use ingest::{ingest, ingest_batch, NewImage};
