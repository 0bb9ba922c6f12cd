//! Field schema construction and answer validation.
//!
//! A template's `DocumentField` rows become an explicit, ordered schema at
//! resolution time; a generic string answer map is then validated against
//! that schema. No form object ever grows fields at runtime.

use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::RenterKitError;
use crate::model::{DocumentTemplate, FieldKind};

/// One entry of a resolved template schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    /// Lowercased label — the answer-map key.
    pub key: String,
    /// Original label, for error messages and rendering.
    pub label: String,
    pub kind: FieldKind,
    pub required: bool,
}

/// A parsed, validated answer.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerValue {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl AnswerValue {
    /// String form used for placeholder substitution.
    pub fn render(&self) -> String {
        match self {
            AnswerValue::Text(s) => s.clone(),
            AnswerValue::Integer(n) => n.to_string(),
            AnswerValue::Date(d) => d.format("%B %-d, %Y").to_string(),
        }
    }
}

/// Build the ordered schema for a template.
///
/// Fails with [`RenterKitError::DuplicateField`] when two fields of the
/// template share a label (case-insensitively) — the (name, template) pair
/// is unique by contract.
pub fn schema_for(template: &DocumentTemplate) -> Result<Vec<FieldSpec>, RenterKitError> {
    let mut seen = HashSet::new();
    let mut schema = Vec::with_capacity(template.fields.len());
    for field in &template.fields {
        let key = field.name.to_lowercase();
        if !seen.insert(key.clone()) {
            return Err(RenterKitError::DuplicateField {
                template: template.name.clone(),
                name: field.name.clone(),
            });
        }
        schema.push(FieldSpec {
            key,
            label: field.name.clone(),
            kind: field.kind,
            required: field.required,
        });
    }
    Ok(schema)
}

/// Validate a raw answer map against a schema.
///
/// Required fields must be present and non-blank; present values must parse
/// as the field's type (integers as base-10, dates as ISO `YYYY-MM-DD`).
/// Optional absent fields are simply omitted from the result.
pub fn validate_answers(
    schema: &[FieldSpec],
    answers: &HashMap<String, String>,
) -> Result<BTreeMap<String, AnswerValue>, RenterKitError> {
    let mut validated = BTreeMap::new();

    for spec in schema {
        let raw = answers.get(&spec.key).map(|s| s.trim()).filter(|s| !s.is_empty());
        let raw = match raw {
            Some(raw) => raw,
            None => {
                if spec.required {
                    return Err(RenterKitError::MissingRequiredField {
                        name: spec.label.clone(),
                    });
                }
                continue;
            }
        };

        let value = match spec.kind {
            FieldKind::Text => AnswerValue::Text(raw.to_string()),
            FieldKind::Integer => {
                let n = raw
                    .parse::<i64>()
                    .map_err(|_| RenterKitError::InvalidFieldValue {
                        name: spec.label.clone(),
                        expected: FieldKind::Integer,
                        value: raw.to_string(),
                    })?;
                AnswerValue::Integer(n)
            }
            FieldKind::Date => {
                let d = NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    RenterKitError::InvalidFieldValue {
                        name: spec.label.clone(),
                        expected: FieldKind::Date,
                        value: raw.to_string(),
                    }
                })?;
                AnswerValue::Date(d)
            }
        };
        validated.insert(spec.key.clone(), value);
    }

    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DocumentField;

    fn template(fields: Vec<DocumentField>) -> DocumentTemplate {
        DocumentTemplate::new("Eviction Defense Letter", "", "Dear {{ landlord_name }},", fields)
    }

    fn answers(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn keys_are_lowercased_labels() {
        let t = template(vec![DocumentField::new("Move Out Date", true, FieldKind::Date)]);
        let schema = schema_for(&t).unwrap();
        assert_eq!(schema[0].key, "move out date");
        assert_eq!(schema[0].label, "Move Out Date");
    }

    #[test]
    fn duplicate_labels_rejected() {
        let t = template(vec![
            DocumentField::new("Amount", true, FieldKind::Integer),
            DocumentField::new("amount", false, FieldKind::Text),
        ]);
        let err = schema_for(&t).unwrap_err();
        assert!(matches!(err, RenterKitError::DuplicateField { .. }));
    }

    #[test]
    fn missing_required_field_is_named() {
        let t = template(vec![DocumentField::new("Reason", true, FieldKind::Text)]);
        let schema = schema_for(&t).unwrap();
        let err = validate_answers(&schema, &answers(&[])).unwrap_err();
        match err {
            RenterKitError::MissingRequiredField { name } => assert_eq!(name, "Reason"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_required_field_counts_as_missing() {
        let t = template(vec![DocumentField::new("Reason", true, FieldKind::Text)]);
        let schema = schema_for(&t).unwrap();
        let err = validate_answers(&schema, &answers(&[("reason", "   ")])).unwrap_err();
        assert!(matches!(err, RenterKitError::MissingRequiredField { .. }));
    }

    #[test]
    fn optional_integer_parses_or_fails_typed() {
        let t = template(vec![
            DocumentField::new("Reason", true, FieldKind::Text),
            DocumentField::new("Months Behind", false, FieldKind::Integer),
        ]);
        let schema = schema_for(&t).unwrap();

        let ok = validate_answers(
            &schema,
            &answers(&[("reason", "bad faucet"), ("months behind", "3")]),
        )
        .unwrap();
        assert_eq!(ok["months behind"], AnswerValue::Integer(3));

        let err = validate_answers(
            &schema,
            &answers(&[("reason", "bad faucet"), ("months behind", "three")]),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RenterKitError::InvalidFieldValue {
                expected: FieldKind::Integer,
                ..
            }
        ));

        // absent optional field is simply omitted
        let ok = validate_answers(&schema, &answers(&[("reason", "bad faucet")])).unwrap();
        assert!(!ok.contains_key("months behind"));
    }

    #[test]
    fn dates_parse_iso_and_render_long_form() {
        let t = template(vec![DocumentField::new("Move Out Date", true, FieldKind::Date)]);
        let schema = schema_for(&t).unwrap();
        let ok = validate_answers(&schema, &answers(&[("move out date", "2021-06-15")])).unwrap();
        assert_eq!(ok["move out date"].render(), "June 15, 2021");

        let err =
            validate_answers(&schema, &answers(&[("move out date", "06/15/2021")])).unwrap_err();
        assert!(matches!(
            err,
            RenterKitError::InvalidFieldValue {
                expected: FieldKind::Date,
                ..
            }
        ));
    }
}
