//! Document template engine: dynamic letters and fixed government forms.
//!
//! Two rendering strategies share one concept — a caller-supplied answer set
//! keyed by lowercase field names:
//!
//! ```text
//! template + answers ──▶ schema ──▶ merge ──▶ substitute ──▶ HTML ──▶ PDF
//!                       (validate)  (sender/   ({{ key }})   (shell)  (rasterizer)
//!                                   unit ctx)
//!
//! form PDF + field map ──▶ widgets ──▶ set values ──▶ NeedAppearances ──▶ bytes
//! ```
//!
//! 1. [`schema`] — build an explicit `{key, type, required}` schema from a
//!    template's fields and validate a generic answer map against it
//! 2. [`letter`] — free-text templates: sender-context merge, placeholder
//!    substitution, the fixed letter shell, and the injected
//!    [`letter::PdfRasterizer`]; also the photo evidence report
//! 3. [`form`]   — typed widget abstraction over the PDF annotation tree
//! 4. [`claims`] — small-claims court form: jurisdiction check, bounded
//!    money fields, and the widget field map

pub mod claims;
pub mod form;
pub mod letter;
pub mod schema;

pub use claims::{render_small_claims, SmallClaimsRequest};
pub use form::{fill_form, FormValue, PdfForm};
pub use letter::{render_letter, render_photo_report, LetterRequest, PdfRasterizer, RenderedDocument};
pub use schema::{schema_for, validate_answers, AnswerValue, FieldSpec};
