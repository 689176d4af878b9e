//! Reconcile one entity's raw tables into a single flat record.
//!
//! Raw labels are canonicalized through the lookup table in [`labels`], each
//! field is parsed according to its kind, and the entity's field names are
//! unioned into the running field set that later drives the backfill pass.
//! Parsing is pure: the same raw records always normalize to the same result.

pub mod labels;

use crate::dataset::{FieldSet, FieldValue, NormalizedRecord};
use crate::extract::{EntityReference, RawTableRecord};
use labels::{canonicalize, FieldKind};
use std::collections::HashMap;
use tracing::debug;

/// Placeholder the source site uses for unknown values.
const PLACEHOLDERS: [&str; 3] = ["—", "–", "-"];

/// Normalize one entity's extracted tables into a flat record and extend the
/// running field set with every canonical field this entity carries.
///
/// Zero raw records is the soft-failure path: the record keeps only the
/// identifier fields and everything else is nulled in by the backfill pass.
pub fn normalize(
    entity: &EntityReference,
    records: &[RawTableRecord],
    field_set: &mut FieldSet,
) -> NormalizedRecord {
    // Merge all tables into one ordered mapping. The first table to define a
    // scalar field wins; list fields accumulate across tables.
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, (FieldKind, Vec<String>)> = HashMap::new();

    for record in records {
        for (label, raw_values) in &record.fields {
            let (key, kind) = canonicalize(label);
            match merged.get_mut(&key) {
                Some((_, values)) if kind == FieldKind::List => {
                    values.extend(raw_values.iter().cloned());
                }
                Some(_) => {
                    debug!(field = %key, section = record.section.name(), "duplicate scalar field, keeping first");
                }
                None => {
                    order.push(key.clone());
                    merged.insert(key, (kind, raw_values.clone()));
                }
            }
        }
    }

    let mut values = HashMap::with_capacity(order.len());
    for key in order {
        let (kind, raw_values) = &merged[&key];
        let value = parse_field(*kind, raw_values);
        if value.is_null() {
            debug!(entity = %entity.name, field = %key, "field unparsable, recording null");
        }
        field_set.insert(&key);
        values.insert(key, value);
    }

    NormalizedRecord {
        ordinal: entity.ordinal,
        name: entity.name.clone(),
        url: entity.url.clone(),
        values,
    }
}

/// Parse raw text values according to the field kind. Unparsable input
/// yields [`FieldValue::Null`] rather than an error.
fn parse_field(kind: FieldKind, raw_values: &[String]) -> FieldValue {
    match kind {
        FieldKind::Number => raw_values
            .first()
            .and_then(|raw| parse_number(raw))
            .map_or(FieldValue::Null, FieldValue::Number),
        FieldKind::List => {
            let items = parse_list(raw_values);
            if items.is_empty() {
                FieldValue::Null
            } else {
                FieldValue::List(items)
            }
        }
        FieldKind::Text => match raw_values.first() {
            Some(raw) if !is_placeholder(raw) => FieldValue::Text(raw.trim().to_string()),
            _ => FieldValue::Null,
        },
    }
}

/// Parse the leading numeric token of a value, stripping units and digit
/// grouping: "6.9 kg (15.2 lbs)" -> 6.9, "1,059,860" -> 1059860.
fn parse_number(raw: &str) -> Option<f64> {
    let token = raw.split_whitespace().next()?;
    let cleaned: String = token
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse multi-valued raw text into an ordered list with duplicates removed.
///
/// Comma-separated values split on commas; otherwise whitespace. Enumerator
/// tokens ("1.", "2.") and parenthesized annotations ("(hidden)") from the
/// abilities column are dropped.
fn parse_list(raw_values: &[String]) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for raw in raw_values {
        let parts: Vec<&str> = if raw.contains(',') {
            raw.split(',').collect()
        } else {
            raw.split_whitespace().collect()
        };
        for part in parts {
            let item = part.trim();
            if item.is_empty() || is_placeholder(item) || is_enumerator(item) {
                continue;
            }
            if item.starts_with('(') && item.ends_with(')') {
                continue;
            }
            if !items.iter().any(|existing| existing == item) {
                items.push(item.to_string());
            }
        }
    }
    items
}

fn is_placeholder(value: &str) -> bool {
    PLACEHOLDERS.contains(&value.trim())
}

fn is_enumerator(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit() || c == '.')
}
