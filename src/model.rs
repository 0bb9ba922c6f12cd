//! Domain records shared by both pipeline components.
//!
//! These are plain data carriers: persistence belongs to the caller's
//! relational layer, and the structs here only hold what the image pipeline
//! and the document engine need — ownership, addressing, derivative metadata,
//! and template schemas.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// What an uploaded image documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    Document,
    MoveInPicture,
    MoveOutPicture,
}

impl ImageKind {
    /// Short storage/DB code, stable across revisions.
    pub fn code(&self) -> &'static str {
        match self {
            ImageKind::Document => "D",
            ImageKind::MoveInPicture => "MIP",
            ImageKind::MoveOutPicture => "MOP",
        }
    }
}

impl fmt::Display for ImageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ImageKind::Document => "document",
            ImageKind::MoveInPicture => "move-in picture",
            ImageKind::MoveOutPicture => "move-out picture",
        };
        f.write_str(s)
    }
}

/// The authenticated user on whose behalf the core is invoked.
///
/// `slug` namespaces every storage key the pipeline writes, so one user can
/// never address another user's uploads by path guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub slug: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl Owner {
    /// Whether the profile carries a usable signer name.
    ///
    /// When it does not, letter requests must supply
    /// `sender_first_name`/`sender_last_name` instead.
    pub fn has_full_name(&self) -> bool {
        !self.first_name.is_empty() || !self.last_name.is_empty()
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// A rental unit: the aggregate root both components hang off.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    pub slug: String,
    pub owner_id: Uuid,

    // Location
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,

    // Landlord
    pub landlord_name: String,
    pub landlord_address_1: String,
    pub landlord_address_2: String,
    pub landlord_city: String,
    pub landlord_state: String,
    pub landlord_zip_code: String,
    pub landlord_phone: String,
    pub landlord_email: String,

    // Lease
    pub lease_start_date: Option<NaiveDate>,
    pub lease_end_date: Option<NaiveDate>,
    pub rent_due_day: Option<u32>,
}

impl Unit {
    /// Create a unit with a freshly generated slug; remaining fields default
    /// to empty and are filled in by the caller.
    pub fn new(owner_id: Uuid, address_1: impl Into<String>) -> Self {
        let address_1 = address_1.into();
        Unit {
            id: Uuid::new_v4(),
            slug: Unit::generate_slug(&address_1),
            owner_id,
            address_1,
            address_2: String::new(),
            city: String::new(),
            state: String::new(),
            zip_code: String::new(),
            landlord_name: String::new(),
            landlord_address_1: String::new(),
            landlord_address_2: String::new(),
            landlord_city: String::new(),
            landlord_state: String::new(),
            landlord_zip_code: String::new(),
            landlord_phone: String::new(),
            landlord_email: String::new(),
            lease_start_date: None,
            lease_end_date: None,
            rent_due_day: None,
        }
    }

    /// Slug: slugified first address line truncated to 45 chars plus a
    /// 10-char random suffix, keeping the whole slug within 60 chars.
    pub fn generate_slug(address_1: &str) -> String {
        let base: String = slugify(address_1).chars().take(45).collect();
        let suffix: String = Uuid::new_v4().simple().to_string().chars().take(10).collect();
        format!("{base}-{suffix}")
    }

    pub fn has_landlord_info(&self) -> bool {
        !self.landlord_name.is_empty()
            || !self.landlord_address_1.is_empty()
            || !self.landlord_address_2.is_empty()
            || !self.landlord_city.is_empty()
            || !self.landlord_state.is_empty()
            || !self.landlord_zip_code.is_empty()
            || !self.landlord_phone.is_empty()
            || !self.landlord_email.is_empty()
    }

    pub fn has_lease_info(&self) -> bool {
        self.lease_start_date.is_some()
            || self.lease_end_date.is_some()
            || self.rent_due_day.is_some()
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address_1)
    }
}

/// One uploaded image plus its generated derivatives.
///
/// Invariant: `thumbnail_sizes` lists, ascending, exactly the non-full
/// derivative sizes whose files exist in the content store for this record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitImage {
    pub id: Uuid,
    /// Content-store key of the full-size derivative.
    pub path: String,
    pub full_size_width: u32,
    pub full_size_height: u32,
    pub thumbnail_sizes: Vec<u32>,
    pub kind: ImageKind,
    pub unit_id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl UnitImage {
    /// Storage key of the derivative persisted for `size`.
    ///
    /// Derivatives live next to the full-size file with a `-{size}` suffix:
    /// `uploads/ann/5f0c….jpg` → `uploads/ann/5f0c…-500.jpg`.
    pub fn derivative_path(&self, size: u32) -> String {
        let stem = self
            .path
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(&self.path);
        format!("{stem}-{size}.jpg")
    }

    /// The smallest derivative's storage key — the canonical thumbnail —
    /// falling back to the full-size path for a single-rung ladder.
    pub fn thumbnail_path(&self) -> String {
        match self.thumbnail_sizes.first() {
            Some(size) => self.derivative_path(*size),
            None => self.path.clone(),
        }
    }

    /// Every storage key belonging to this record: the full-size file plus
    /// one file per entry in `thumbnail_sizes`.
    pub fn all_paths(&self) -> Vec<String> {
        let mut paths = vec![self.path.clone()];
        paths.extend(self.thumbnail_sizes.iter().map(|s| self.derivative_path(*s)));
        paths
    }

    /// Upload timestamp the way the photo evidence report prints it.
    pub fn upload_time(&self) -> String {
        format!(
            "{} GMT",
            self.created_at.format("%A %B %e, %Y at %I:%M %p")
        )
    }
}

impl fmt::Display for UnitImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

/// The type a dynamic template field parses as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    Text,
    Integer,
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FieldKind::Text => "text",
            FieldKind::Integer => "integer",
            FieldKind::Date => "date",
        };
        f.write_str(s)
    }
}

/// One dynamically-typed input required by a template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentField {
    /// Label; its lowercase form is the answer key.
    pub name: String,
    pub required: bool,
    pub kind: FieldKind,
}

impl DocumentField {
    pub fn new(name: impl Into<String>, required: bool, kind: FieldKind) -> Self {
        DocumentField {
            name: name.into(),
            required,
            kind,
        }
    }
}

/// A named, described document definition owning its dynamic fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTemplate {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    /// Template body with `{{ key }}` placeholder tokens.
    pub body: String,
    pub fields: Vec<DocumentField>,
}

impl DocumentTemplate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        body: impl Into<String>,
        fields: Vec<DocumentField>,
    ) -> Self {
        let name = name.into();
        DocumentTemplate {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
            description: description.into(),
            body: body.into(),
            fields,
        }
    }
}

impl fmt::Display for DocumentTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Lowercase, ASCII-alphanumeric-and-dash form of `input`.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_dash = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("123 Main St."), "123-main-st");
        assert_eq!(slugify("  Apt #4B  "), "apt-4b");
        assert_eq!(slugify("Eviction Defense Letter"), "eviction-defense-letter");
    }

    #[test]
    fn unit_slug_truncates_long_addresses() {
        let long = "a".repeat(65);
        let slug = Unit::generate_slug(&long);
        assert!(slug.starts_with(&"a".repeat(45)));
        assert!(slug.len() <= 60);
        // 45-char base, dash, 10-char suffix
        assert_eq!(slug.len(), 45 + 1 + 10);
    }

    #[test]
    fn unit_slugs_are_unique_per_call() {
        assert_ne!(Unit::generate_slug("123 Main"), Unit::generate_slug("123 Main"));
    }

    #[test]
    fn derivative_paths_share_the_stem() {
        let image = UnitImage {
            id: Uuid::new_v4(),
            path: "uploads/ann/abc123.jpg".into(),
            full_size_width: 1000,
            full_size_height: 800,
            thumbnail_sizes: vec![200, 500],
            kind: ImageKind::MoveInPicture,
            unit_id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert_eq!(image.derivative_path(200), "uploads/ann/abc123-200.jpg");
        assert_eq!(image.thumbnail_path(), "uploads/ann/abc123-200.jpg");
        assert_eq!(
            image.all_paths(),
            vec![
                "uploads/ann/abc123.jpg".to_string(),
                "uploads/ann/abc123-200.jpg".to_string(),
                "uploads/ann/abc123-500.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn owner_name_fallback() {
        let mut owner = Owner {
            id: Uuid::new_v4(),
            slug: "ann".into(),
            first_name: String::new(),
            last_name: String::new(),
            email: "ann@example.com".into(),
        };
        assert!(!owner.has_full_name());
        owner.first_name = "Ann".into();
        assert!(owner.has_full_name());
        assert_eq!(owner.display_name(), "Ann");
    }

    #[test]
    fn template_slug_derived_from_name() {
        let t = DocumentTemplate::new("Eviction Defense Letter", "", "body", vec![]);
        assert_eq!(t.slug, "eviction-defense-letter");
    }
}
