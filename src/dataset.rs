//! The master dataset: one uniform row per entity.
//!
//! Rows are appended in entity discovery order and never mutated afterwards,
//! with one exception: the backfill pass, which runs exactly once after the
//! last entity and nulls out any field a row was missing when it was created.
//! After backfill every row carries the identical column set.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Columns every row carries regardless of what the source page contained.
pub const RESERVED_COLUMNS: [&str; 3] = ["ordinal", "name", "url"];

/// A typed cell value in the master dataset.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Field absent or unparsable for this entity.
    Null,
    Text(String),
    Number(f64),
    /// Multi-valued field (types, abilities, egg groups). Order preserved,
    /// duplicates removed.
    List(Vec<String>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }
}

/// The running union of canonical field names observed so far, in first-seen
/// order. First-seen order becomes the column order of the exported table.
#[derive(Debug, Default, Clone)]
pub struct FieldSet {
    order: Vec<String>,
    seen: HashSet<String>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field name. Returns `true` if it was new.
    pub fn insert(&mut self, name: &str) -> bool {
        if self.seen.contains(name) {
            return false;
        }
        self.seen.insert(name.to_string());
        self.order.push(name.to_string());
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.seen.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// One fully-normalized entity row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    /// 1-based position on the index page (the canonical national ordering).
    pub ordinal: u32,
    /// Display name, taken from the detail page heading when available.
    pub name: String,
    /// Detail-page URL this row was scraped from.
    pub url: String,
    /// Canonical field name -> typed value.
    pub values: HashMap<String, FieldValue>,
}

/// Ordered collection of normalized rows with a uniform column set.
#[derive(Debug, Default)]
pub struct MasterDataset {
    rows: Vec<NormalizedRecord>,
    columns: Vec<String>,
    backfilled: bool,
}

impl MasterDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row. Rows arrive in entity discovery order.
    pub fn push(&mut self, record: NormalizedRecord) {
        self.rows.push(record);
    }

    pub fn rows(&self) -> &[NormalizedRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Whether the backfill pass has run.
    pub fn is_backfilled(&self) -> bool {
        self.backfilled
    }

    /// Column set of the exported table: reserved columns followed by the
    /// canonical fields in first-seen order. Empty until backfill has run.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Reconcile all rows against the final field set: any field a row is
    /// missing becomes an explicit null. Runs at most once; later calls are
    /// no-ops, so callers may invoke it defensively before export.
    pub fn backfill(&mut self, fields: &FieldSet) {
        if self.backfilled {
            return;
        }
        for row in &mut self.rows {
            for field in fields.iter() {
                row.values
                    .entry(field.to_string())
                    .or_insert(FieldValue::Null);
            }
        }
        self.columns = RESERVED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(fields.iter().map(String::from))
            .collect();
        self.backfilled = true;
    }
}
