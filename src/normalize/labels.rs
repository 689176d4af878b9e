//! Static label -> canonical field lookup.
//!
//! Raw label wording and casing vary across pages, so canonical names come
//! from this table rather than from whatever text the page happens to show.
//! The table is configuration data: extending the vocabulary means adding a
//! row here, not touching pipeline logic. Labels not in the table are kept
//! under a normalized key instead of being dropped.

use crate::dataset::RESERVED_COLUMNS;

/// How a canonical field's raw text is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Kept as trimmed text.
    Text,
    /// Parsed to a number with unit stripping ("6.9 kg" -> 6.9).
    Number,
    /// Parsed to an ordered, deduplicated list of strings.
    List,
}

/// (raw label, canonical field name, parse kind). Matching is
/// case-insensitive on the raw label.
const LABEL_MAP: &[(&str, &str, FieldKind)] = &[
    // Pokédex data
    ("National №", "national_no", FieldKind::Text),
    ("Type", "types", FieldKind::List),
    ("Species", "species", FieldKind::Text),
    ("Height", "height_m", FieldKind::Number),
    ("Weight", "weight_kg", FieldKind::Number),
    ("Abilities", "abilities", FieldKind::List),
    ("Local №", "local_no", FieldKind::Text),
    // Training
    ("EV yield", "ev_yield", FieldKind::Text),
    ("Catch rate", "catch_rate", FieldKind::Number),
    ("Base Friendship", "base_friendship", FieldKind::Number),
    ("Base Exp.", "base_exp", FieldKind::Number),
    ("Growth Rate", "growth_rate", FieldKind::Text),
    // Breeding
    ("Egg Groups", "egg_groups", FieldKind::List),
    ("Gender", "gender", FieldKind::Text),
    ("Egg cycles", "egg_cycles", FieldKind::Number),
    // Base stats
    ("HP", "hp", FieldKind::Number),
    ("Attack", "attack", FieldKind::Number),
    ("Defense", "defense", FieldKind::Number),
    ("Sp. Atk", "sp_atk", FieldKind::Number),
    ("Sp. Def", "sp_def", FieldKind::Number),
    ("Speed", "speed", FieldKind::Number),
    ("Total", "total", FieldKind::Number),
];

/// Map a raw table label to its canonical field name and parse kind.
///
/// Unknown labels fall back to a normalized snake_case key and [`FieldKind::Text`]
/// so no data is silently lost.
pub fn canonicalize(label: &str) -> (String, FieldKind) {
    let trimmed = label.trim();
    for (raw, canonical, kind) in LABEL_MAP {
        if raw.eq_ignore_ascii_case(trimmed) {
            return (canonical.to_string(), *kind);
        }
    }
    (fallback_key(trimmed), FieldKind::Text)
}

/// Normalize an unrecognized label into a stable column key: lowercase,
/// non-alphanumerics to underscores, runs collapsed. Keys that would collide
/// with a reserved dataset column get an `attr_` prefix.
fn fallback_key(label: &str) -> String {
    let mut key = String::with_capacity(label.len());
    let mut last_was_sep = true;
    for c in label.chars() {
        if c.is_alphanumeric() {
            key.extend(c.to_lowercase());
            last_was_sep = false;
        } else if !last_was_sep {
            key.push('_');
            last_was_sep = true;
        }
    }
    let key = key.trim_end_matches('_').to_string();
    let key = if key.is_empty() { "unlabeled".to_string() } else { key };
    if RESERVED_COLUMNS.contains(&key.as_str()) {
        format!("attr_{key}")
    } else {
        key
    }
}
