//! Free-text letter rendering: sender-context merge, `{{ key }}`
//! substitution, the fixed letter shell, and HTML → PDF via the injected
//! rasterizer. Also builds the photo evidence report.
//!
//! Substitution is plain key → string replacement over the stored template
//! body. No expression language, no arbitrary code execution: an unknown
//! key renders as the empty string, and every substituted value is
//! HTML-escaped before it reaches the shell.

use async_trait::async_trait;
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::documents::schema::{schema_for, validate_answers};
use crate::error::RenterKitError;
use crate::model::{DocumentTemplate, ImageKind, Owner, Unit, UnitImage};
use crate::store::ContentStore;

/// Rasterizes an HTML document string into PDF bytes.
///
/// Injected by the caller; production backends wrap an HTML-to-PDF engine,
/// tests use a recording mock.
#[async_trait]
pub trait PdfRasterizer: Send + Sync {
    async fn rasterize(&self, html: &str) -> Result<Vec<u8>, RenterKitError>;
}

/// A finished render: PDF bytes plus the deterministic download filename.
#[derive(Debug)]
pub struct RenderedDocument {
    pub filename: String,
    pub pdf: Vec<u8>,
}

/// Sender details accompanying a document request.
///
/// With `use_unit_address` set, the unit's own address fields are copied
/// over whatever the caller supplied; otherwise address line 1, city, state
/// and ZIP are required. The name fields only matter when the owner's
/// profile carries no name.
#[derive(Debug, Clone, Default)]
pub struct LetterRequest {
    pub use_unit_address: bool,
    pub sender_address_1: String,
    pub sender_address_2: String,
    pub sender_city: String,
    pub sender_state: String,
    pub sender_zip_code: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub sender_first_name: Option<String>,
    pub sender_last_name: Option<String>,
}

static TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_][A-Za-z0-9_ ]*?)\s*\}\}").unwrap());

/// Fixed wrapper every letter renders into. The `{{ body }}` value is
/// already escaped HTML by the time it is substituted here.
const LETTER_SHELL: &str = r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
  body { font-family: "Times New Roman", serif; font-size: 12pt; margin: 1in; }
  .sender { margin-bottom: 2em; }
  .date { margin-bottom: 2em; }
  .letter-body { line-height: 1.5; }
  .signature { margin-top: 3em; }
  figure { page-break-inside: avoid; margin: 1em 0; }
  figure img { max-width: 100%; }
  figcaption { font-size: 10pt; color: #444; }
</style>
</head>
<body>
<div class="sender">{{ sender_block }}</div>
<div class="date">{{ date }}</div>
<div class="letter-body">{{ body }}</div>
<div class="signature">Sincerely,<br/><br/>{{ sender_name }}</div>
</body>
</html>
"#;

/// Substitute `{{ key }}` tokens from `context`; unknown keys render empty.
pub fn substitute(template: &str, context: &BTreeMap<String, String>) -> String {
    TOKEN_RE
        .replace_all(template, |caps: &Captures| {
            context
                .get(&caps[1].to_lowercase())
                .cloned()
                .unwrap_or_default()
        })
        .into_owned()
}

/// Download filename: the template name with every non-alphabetic
/// character stripped, plus the `.pdf` extension.
pub fn document_filename(template_name: &str) -> String {
    let stem: String = template_name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    format!("{stem}.pdf")
}

fn html_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The signer's name: profile first, answer-supplied fields as the
/// conditionally-required fallback.
pub(crate) fn resolve_signer_name(
    owner: &Owner,
    first_override: Option<&str>,
    last_override: Option<&str>,
) -> Result<(String, String), RenterKitError> {
    if owner.has_full_name() {
        return Ok((owner.first_name.clone(), owner.last_name.clone()));
    }
    let first = first_override.map(str::trim).filter(|s| !s.is_empty());
    let last = last_override.map(str::trim).filter(|s| !s.is_empty());
    match (first, last) {
        (Some(f), Some(l)) => Ok((f.to_string(), l.to_string())),
        (None, _) => Err(RenterKitError::MissingRequiredField {
            name: "sender_first_name".into(),
        }),
        (_, None) => Err(RenterKitError::MissingRequiredField {
            name: "sender_last_name".into(),
        }),
    }
}

/// Base sender/unit context every letter body can reference.
fn sender_context(
    request: &LetterRequest,
    owner: &Owner,
    unit: &Unit,
) -> Result<BTreeMap<String, String>, RenterKitError> {
    let (address_1, address_2, city, state, zip_code) = if request.use_unit_address {
        (
            unit.address_1.clone(),
            unit.address_2.clone(),
            unit.city.clone(),
            unit.state.clone(),
            unit.zip_code.clone(),
        )
    } else {
        for (name, value) in [
            ("sender_address_1", &request.sender_address_1),
            ("sender_city", &request.sender_city),
            ("sender_state", &request.sender_state),
            ("sender_zip_code", &request.sender_zip_code),
        ] {
            if value.trim().is_empty() {
                return Err(RenterKitError::MissingRequiredField { name: name.into() });
            }
        }
        (
            request.sender_address_1.clone(),
            request.sender_address_2.clone(),
            request.sender_city.clone(),
            request.sender_state.clone(),
            request.sender_zip_code.clone(),
        )
    };

    let (first_name, last_name) = resolve_signer_name(
        owner,
        request.sender_first_name.as_deref(),
        request.sender_last_name.as_deref(),
    )?;

    let mut ctx = BTreeMap::new();
    ctx.insert("sender_first_name".into(), first_name.clone());
    ctx.insert("sender_last_name".into(), last_name.clone());
    ctx.insert(
        "sender_name".into(),
        format!("{first_name} {last_name}").trim().to_string(),
    );
    ctx.insert("sender_address_1".into(), address_1);
    ctx.insert("sender_address_2".into(), address_2);
    ctx.insert("sender_city".into(), city);
    ctx.insert("sender_state".into(), state);
    ctx.insert("sender_zip_code".into(), zip_code);
    ctx.insert("sender_email".into(), request.sender_email.clone());
    ctx.insert("sender_phone".into(), request.sender_phone.clone());

    ctx.insert("unit_address_1".into(), unit.address_1.clone());
    ctx.insert("unit_address_2".into(), unit.address_2.clone());
    ctx.insert("unit_city".into(), unit.city.clone());
    ctx.insert("unit_state".into(), unit.state.clone());
    ctx.insert("unit_zip_code".into(), unit.zip_code.clone());

    ctx.insert("landlord_name".into(), unit.landlord_name.clone());
    ctx.insert("landlord_address_1".into(), unit.landlord_address_1.clone());
    ctx.insert("landlord_address_2".into(), unit.landlord_address_2.clone());
    ctx.insert("landlord_city".into(), unit.landlord_city.clone());
    ctx.insert("landlord_state".into(), unit.landlord_state.clone());
    ctx.insert("landlord_zip_code".into(), unit.landlord_zip_code.clone());
    ctx.insert("landlord_phone".into(), unit.landlord_phone.clone());
    ctx.insert("landlord_email".into(), unit.landlord_email.clone());

    ctx.insert("date".into(), Utc::now().format("%B %-d, %Y").to_string());

    Ok(ctx)
}

fn sender_block(ctx: &BTreeMap<String, String>) -> String {
    let mut lines = vec![ctx["sender_name"].clone(), ctx["sender_address_1"].clone()];
    if !ctx["sender_address_2"].is_empty() {
        lines.push(ctx["sender_address_2"].clone());
    }
    lines.push(format!(
        "{}, {} {}",
        ctx["sender_city"], ctx["sender_state"], ctx["sender_zip_code"]
    ));
    for key in ["sender_email", "sender_phone"] {
        if !ctx[key].is_empty() {
            lines.push(ctx[key].clone());
        }
    }
    lines
        .iter()
        .map(|l| html_escape(l))
        .collect::<Vec<_>>()
        .join("<br/>")
}

fn wrap_in_shell(ctx: &BTreeMap<String, String>, body_html: String) -> String {
    let mut shell_ctx = BTreeMap::new();
    shell_ctx.insert("sender_block".to_string(), sender_block(ctx));
    shell_ctx.insert("date".to_string(), html_escape(&ctx["date"]));
    shell_ctx.insert("sender_name".to_string(), html_escape(&ctx["sender_name"]));
    shell_ctx.insert("body".to_string(), body_html);
    substitute(LETTER_SHELL, &shell_ctx)
}

/// Render a free-text document template to PDF.
///
/// Pipeline: validate answers against the template's schema → merge with
/// the sender/unit context → substitute the body's placeholder tokens →
/// wrap in the letter shell → rasterize.
pub async fn render_letter(
    template: &DocumentTemplate,
    request: &LetterRequest,
    answers: &HashMap<String, String>,
    owner: &Owner,
    unit: &Unit,
    rasterizer: &dyn PdfRasterizer,
) -> Result<RenderedDocument, RenterKitError> {
    let schema = schema_for(template)?;
    let validated = validate_answers(&schema, answers)?;

    let mut ctx = sender_context(request, owner, unit)?;
    for (key, value) in &validated {
        ctx.insert(key.clone(), value.render());
    }

    let body_text = substitute(&template.body, &ctx);
    let body_html = html_escape(&body_text).replace('\n', "<br/>\n");
    let html = wrap_in_shell(&ctx, body_html);

    debug!(template = %template.slug, "rendering letter");
    let pdf = rasterizer.rasterize(&html).await?;

    Ok(RenderedDocument {
        filename: document_filename(&template.name),
        pdf,
    })
}

/// Render the photo evidence report for a unit: every image grouped by
/// kind, captioned with its upload time, laid out in the letter shell.
///
/// Image sources use the store's internal URLs — the rasterizer fetches
/// them from inside the deployment, not through the public edge.
pub async fn render_photo_report(
    request: &LetterRequest,
    owner: &Owner,
    unit: &Unit,
    images: &[UnitImage],
    store: &dyn ContentStore,
    rasterizer: &dyn PdfRasterizer,
) -> Result<RenderedDocument, RenterKitError> {
    let ctx = sender_context(request, owner, unit)?;

    let mut body = format!(
        "<p>Photo evidence for the unit at {}.</p>\n",
        html_escape(&unit.address_1)
    );
    for (kind, heading) in [
        (ImageKind::MoveInPicture, "Move-in pictures"),
        (ImageKind::MoveOutPicture, "Move-out pictures"),
        (ImageKind::Document, "Documents"),
    ] {
        let mut group: Vec<&UnitImage> = images
            .iter()
            .filter(|i| i.unit_id == unit.id && i.kind == kind)
            .collect();
        if group.is_empty() {
            continue;
        }
        group.sort_by_key(|i| i.created_at);

        body.push_str(&format!("<h2>{heading}</h2>\n"));
        for image in group {
            body.push_str(&format!(
                "<figure><img src=\"{}\"/><figcaption>Uploaded {}</figcaption></figure>\n",
                html_escape(&store.internal_url_for(&image.path)),
                html_escape(&image.upload_time()),
            ));
        }
    }

    let html = wrap_in_shell(&ctx, body);
    debug!(unit = %unit.slug, images = images.len(), "rendering photo report");
    let pdf = rasterizer.rasterize(&html).await?;

    Ok(RenderedDocument {
        filename: document_filename("Photo Evidence Report"),
        pdf,
    })
}
