//! Typed form-field access over a fixed PDF's annotation tree.
//!
//! Government forms must keep their official layout byte-for-byte except for
//! the filled values, so this module only ever touches widget annotation
//! values and the AcroForm `NeedAppearances` flag — nothing else in the
//! document is altered. Widgets whose names are not in the caller's field
//! map are left completely untouched, never blanked.

use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::debug;

use crate::error::RenterKitError;

/// What a widget annotation holds, from its `FT` entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormFieldKind {
    Text,
    Button,
    Choice,
    Signature,
    Unknown,
}

/// One named widget found on the form.
#[derive(Debug, Clone)]
pub struct FormField {
    pub name: String,
    pub kind: FormFieldKind,
}

/// A value destined for a form widget.
#[derive(Debug, Clone)]
pub enum FormValue {
    Text(String),
    /// Rendered as `"$" + fixed 2-decimal`, e.g. `$1500.00`.
    Money(Decimal),
    /// Checkbox semantics: `true` writes an `"X"` marker, `false` leaves
    /// the widget untouched.
    Check(bool),
}

impl FormValue {
    /// The string written into the widget, or `None` for an unchecked box.
    pub fn render(&self) -> Option<String> {
        match self {
            FormValue::Text(s) => Some(s.clone()),
            FormValue::Money(amount) => Some(format!("${amount:.2}")),
            FormValue::Check(true) => Some("X".to_string()),
            FormValue::Check(false) => None,
        }
    }
}

fn form_err(detail: impl ToString) -> RenterKitError {
    RenterKitError::FormFill {
        detail: detail.to_string(),
    }
}

/// Field names arrive wrapped in PDF string/name delimiters depending on
/// the producer; comparisons use the stripped form.
fn strip_delimiters(name: &str) -> String {
    name.trim_matches(|c: char| "()<>[]/".contains(c)).to_string()
}

fn field_name(annot: &Dictionary) -> Option<String> {
    let raw = match annot.get(b"T").ok()? {
        Object::String(bytes, _) => String::from_utf8_lossy(bytes).into_owned(),
        Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
        _ => return None,
    };
    Some(strip_delimiters(&raw))
}

fn field_kind(annot: &Dictionary) -> FormFieldKind {
    match annot.get(b"FT") {
        Ok(Object::Name(n)) => match n.as_slice() {
            b"Tx" => FormFieldKind::Text,
            b"Btn" => FormFieldKind::Button,
            b"Ch" => FormFieldKind::Choice,
            b"Sig" => FormFieldKind::Signature,
            _ => FormFieldKind::Unknown,
        },
        _ => FormFieldKind::Unknown,
    }
}

/// A loaded fillable PDF form.
#[derive(Debug)]
pub struct PdfForm {
    doc: Document,
}

impl PdfForm {
    /// Parse the form PDF from memory.
    pub fn load(bytes: &[u8]) -> Result<Self, RenterKitError> {
        let doc = Document::load_mem(bytes).map_err(|e| RenterKitError::UnreadableForm {
            detail: e.to_string(),
        })?;
        Ok(PdfForm { doc })
    }

    /// Every named widget annotation across the document's pages.
    fn widgets(&self) -> Vec<(ObjectId, String, FormFieldKind)> {
        let mut out = Vec::new();
        for page_id in self.doc.get_pages().into_values() {
            let annots = self
                .doc
                .get_object(page_id)
                .ok()
                .and_then(|o| o.as_dict().ok())
                .and_then(|page| page.get(b"Annots").ok())
                .and_then(|entry| match entry {
                    Object::Array(a) => Some(a.clone()),
                    Object::Reference(id) => match self.doc.get_object(*id) {
                        Ok(Object::Array(a)) => Some(a.clone()),
                        _ => None,
                    },
                    _ => None,
                });
            let Some(annots) = annots else { continue };

            for entry in annots {
                let Object::Reference(annot_id) = entry else {
                    // Inline annotation dictionaries cannot be addressed for
                    // mutation; real fillable forms reference their widgets.
                    debug!("skipping non-reference page annotation");
                    continue;
                };
                let Some(annot) = self
                    .doc
                    .get_object(annot_id)
                    .ok()
                    .and_then(|o| o.as_dict().ok())
                else {
                    continue;
                };
                let is_widget = matches!(
                    annot.get(b"Subtype"),
                    Ok(Object::Name(n)) if n.as_slice() == b"Widget"
                );
                if !is_widget {
                    continue;
                }
                if let Some(name) = field_name(annot) {
                    out.push((annot_id, name, field_kind(annot)));
                }
            }
        }
        out
    }

    /// Names and kinds of every fillable widget.
    pub fn list_fields(&self) -> Vec<FormField> {
        self.widgets()
            .into_iter()
            .map(|(_, name, kind)| FormField { name, kind })
            .collect()
    }

    /// Set the value of every widget named `name`. Returns whether at least
    /// one widget matched.
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<bool, RenterKitError> {
        let target = strip_delimiters(name);
        let ids: Vec<ObjectId> = self
            .widgets()
            .into_iter()
            .filter(|(_, n, _)| *n == target)
            .map(|(id, _, _)| id)
            .collect();

        for id in &ids {
            let annot = self
                .doc
                .get_object_mut(*id)
                .map_err(form_err)?
                .as_dict_mut()
                .map_err(form_err)?;
            annot.set("V", Object::string_literal(value));
        }
        Ok(!ids.is_empty())
    }

    /// Flag the form so viewers regenerate widget appearances, guaranteeing
    /// filled values are visible regardless of viewer.
    pub fn set_need_appearances(&mut self) -> Result<(), RenterKitError> {
        let root_id = self
            .doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .map_err(form_err)?;

        let acro_form = self
            .doc
            .get_object(root_id)
            .ok()
            .and_then(|o| o.as_dict().ok())
            .and_then(|catalog| catalog.get(b"AcroForm").ok().cloned());

        match acro_form {
            Some(Object::Reference(id)) => {
                self.doc
                    .get_object_mut(id)
                    .map_err(form_err)?
                    .as_dict_mut()
                    .map_err(form_err)?
                    .set("NeedAppearances", true);
            }
            Some(Object::Dictionary(mut dict)) => {
                dict.set("NeedAppearances", true);
                self.doc
                    .get_object_mut(root_id)
                    .map_err(form_err)?
                    .as_dict_mut()
                    .map_err(form_err)?
                    .set("AcroForm", Object::Dictionary(dict));
            }
            _ => {
                self.doc
                    .get_object_mut(root_id)
                    .map_err(form_err)?
                    .as_dict_mut()
                    .map_err(form_err)?
                    .set("AcroForm", dictionary! { "NeedAppearances" => true });
            }
        }
        Ok(())
    }

    /// Serialize the (possibly mutated) document back to bytes.
    pub fn save(mut self) -> Result<Vec<u8>, RenterKitError> {
        let mut buf = Vec::new();
        self.doc.save_to(&mut buf).map_err(form_err)?;
        Ok(buf)
    }
}

/// Fill a fixed form: look up each widget's name in `field_map`, write the
/// mapped value, set `NeedAppearances`, and return the new bytes. Widgets
/// absent from the map are untouched.
pub fn fill_form(
    pdf_bytes: &[u8],
    field_map: &HashMap<String, FormValue>,
) -> Result<Vec<u8>, RenterKitError> {
    let mut form = PdfForm::load(pdf_bytes)?;

    for field in form.list_fields() {
        if let Some(value) = field_map.get(&field.name) {
            if let Some(rendered) = value.render() {
                form.set_value(&field.name, &rendered)?;
            }
        }
    }

    form.set_need_appearances()?;
    form.save()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_renders_fixed_two_decimals() {
        let v = FormValue::Money(Decimal::new(1500, 0));
        assert_eq!(v.render().unwrap(), "$1500.00");
        let v = FormValue::Money(Decimal::new(9999, 2));
        assert_eq!(v.render().unwrap(), "$99.99");
    }

    #[test]
    fn check_renders_presence_or_absence() {
        assert_eq!(FormValue::Check(true).render().unwrap(), "X");
        assert!(FormValue::Check(false).render().is_none());
    }

    #[test]
    fn delimiters_are_stripped() {
        assert_eq!(strip_delimiters("(claims_sum)"), "claims_sum");
        assert_eq!(strip_delimiters("court_costs"), "court_costs");
        assert_eq!(strip_delimiters("/county"), "county");
    }
}
