//! Extract per-entity attribute tables from a detail page.
//!
//! A detail page carries several two-column "vitals" tables (basic info,
//! training, breeding, base stats). Sections are recognized by heading text
//! or table class, never by position, since section order is not guaranteed
//! identical across pages. A section absent from a page simply contributes
//! no record; that is expected, not an error.

use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// The recognized table sections on a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableSection {
    BasicInfo,
    Training,
    Breeding,
    Stats,
}

impl TableSection {
    pub fn name(&self) -> &'static str {
        match self {
            TableSection::BasicInfo => "basic_info",
            TableSection::Training => "training",
            TableSection::Breeding => "breeding",
            TableSection::Stats => "stats",
        }
    }
}

/// One extracted table: label -> one or more raw text values, in row order.
///
/// A label repeated across rows (a Pokémon with two types, say) accumulates
/// its values as a list instead of overwriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTableRecord {
    pub section: TableSection,
    pub fields: Vec<(String, Vec<String>)>,
}

/// Extract the entity display name from the page heading.
pub fn entity_name(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("#main h1, h1").ok()?;
    let heading = document.select(&selector).next()?;
    let name = clean_text(heading);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Extract all recognized attribute tables from an entity detail page.
///
/// Extraction is scoped to the first `tab-basic-*` panel when one exists, so
/// alternate-form panels do not bleed into the default form's record. One
/// record per section; a duplicate table for an already-seen section is
/// skipped.
pub fn extract_tables(html: &str) -> Vec<RawTableRecord> {
    let document = Html::parse_document(html);
    let scope = first_basic_panel(&document).unwrap_or_else(|| document.root_element());

    let mut records: Vec<RawTableRecord> = Vec::new();
    let mut current_heading: Option<String> = None;

    // Walk the scope in document order, pairing each vitals table with the
    // heading that most recently preceded it.
    for node in scope.descendants() {
        let Some(element) = ElementRef::wrap(node) else {
            continue;
        };
        match element.value().name() {
            "h2" | "h3" => {
                let text = clean_text(element);
                if !text.is_empty() {
                    current_heading = Some(text);
                }
            }
            "table" if element.value().classes().any(|c| c == "vitals-table") => {
                let fields = table_fields(element);
                if fields.is_empty() {
                    continue;
                }
                let Some(section) = classify(current_heading.as_deref(), &fields) else {
                    debug!(heading = ?current_heading, "skipping unrecognized table section");
                    continue;
                };
                if records.iter().any(|r| r.section == section) {
                    debug!(section = section.name(), "duplicate section table, keeping first");
                    continue;
                }
                records.push(RawTableRecord { section, fields });
            }
            _ => {}
        }
    }

    records
}

/// Find the first alternate-forms tab panel (`id="tab-basic-…"`).
fn first_basic_panel(document: &Html) -> Option<ElementRef<'_>> {
    document
        .root_element()
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().id().is_some_and(|id| id.starts_with("tab-basic-")))
}

/// Read a two-column table into ordered (label, values) pairs, merging
/// repeated labels into one multi-valued entry.
fn table_fields(table: ElementRef<'_>) -> Vec<(String, Vec<String>)> {
    let mut fields: Vec<(String, Vec<String>)> = Vec::new();

    let (Ok(row_sel), Ok(th_sel), Ok(td_sel)) = (
        Selector::parse("tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) else {
        return fields;
    };

    for row in table.select(&row_sel) {
        let (Some(th), Some(td)) = (
            row.select(&th_sel).next(),
            row.select(&td_sel).next(),
        ) else {
            continue;
        };
        let label = clean_text(th);
        let value = clean_text(td);
        if label.is_empty() || value.is_empty() {
            continue;
        }
        match fields.iter_mut().find(|(existing, _)| *existing == label) {
            Some((_, values)) => values.push(value),
            None => fields.push((label, vec![value])),
        }
    }

    fields
}

/// Decide which section a table belongs to: heading text first, then a label
/// sniff for pages where the heading sits outside the extraction scope.
fn classify(heading: Option<&str>, fields: &[(String, Vec<String>)]) -> Option<TableSection> {
    if let Some(heading) = heading {
        let h = heading.to_lowercase();
        if h.contains("dex data") {
            return Some(TableSection::BasicInfo);
        }
        if h.contains("training") {
            return Some(TableSection::Training);
        }
        if h.contains("breeding") {
            return Some(TableSection::Breeding);
        }
        if h.contains("stats") {
            return Some(TableSection::Stats);
        }
    }

    let labels: Vec<String> = fields.iter().map(|(l, _)| l.to_lowercase()).collect();
    let has = |needle: &str| labels.iter().any(|l| l.contains(needle));

    if has("species") || has("type") {
        return Some(TableSection::BasicInfo);
    }
    if has("catch rate") || has("ev yield") {
        return Some(TableSection::Training);
    }
    if labels.iter().any(|l| l.starts_with("egg")) || has("gender") {
        return Some(TableSection::Breeding);
    }
    if has("hp") && has("speed") {
        return Some(TableSection::Stats);
    }
    None
}

/// Flatten an element's text, trimming and collapsing internal markup and
/// whitespace to single spaces.
fn clean_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENTITY_HTML: &str = r#"
    <html><body><main id="main">
      <h1>Bulbasaur</h1>
      <div id="tab-basic-1">
        <h2>Pokédex data</h2>
        <table class="vitals-table"><tbody>
          <tr><th>National №</th><td>0001</td></tr>
          <tr><th>Type</th><td><a>Grass</a> <a>Poison</a></td></tr>
          <tr><th>Height</th><td>0.7 m (2′04″)</td></tr>
          <tr><th>Weight</th><td>6.9 kg (15.2 lbs)</td></tr>
        </tbody></table>
        <h2>Training</h2>
        <table class="vitals-table"><tbody>
          <tr><th>Catch rate</th><td>45 (5.9% with PokéBall)</td></tr>
          <tr><th>Base Exp.</th><td>64</td></tr>
        </tbody></table>
        <h2>Breeding</h2>
        <table class="vitals-table"><tbody>
          <tr><th>Egg Groups</th><td>Grass, Monster</td></tr>
          <tr><th>Egg cycles</th><td>20</td></tr>
        </tbody></table>
        <h2>Base stats</h2>
        <table class="vitals-table"><tbody>
          <tr><th>HP</th><td>45</td><td><div class="bar"></div></td></tr>
          <tr><th>Speed</th><td>45</td><td><div class="bar"></div></td></tr>
        </tbody></table>
      </div>
      <div id="tab-basic-2">
        <h2>Pokédex data</h2>
        <table class="vitals-table"><tbody>
          <tr><th>Type</th><td>Other Form</td></tr>
        </tbody></table>
      </div>
    </main></body></html>
    "#;

    #[test]
    fn test_extracts_one_record_per_section() {
        let records = extract_tables(ENTITY_HTML);
        let sections: Vec<_> = records.iter().map(|r| r.section).collect();
        assert_eq!(
            sections,
            vec![
                TableSection::BasicInfo,
                TableSection::Training,
                TableSection::Breeding,
                TableSection::Stats,
            ]
        );
    }

    #[test]
    fn test_alternate_form_panel_is_ignored() {
        let records = extract_tables(ENTITY_HTML);
        let basic = records
            .iter()
            .find(|r| r.section == TableSection::BasicInfo)
            .unwrap();
        let (_, type_values) = basic
            .fields
            .iter()
            .find(|(label, _)| label == "Type")
            .unwrap();
        assert_eq!(type_values, &vec!["Grass Poison".to_string()]);
    }

    #[test]
    fn test_repeated_label_merges_into_list() {
        let html = r#"
        <table class="vitals-table"><tbody>
          <tr><th>Type</th><td>Grass</td></tr>
          <tr><th>Type</th><td>Poison</td></tr>
        </tbody></table>
        "#;
        let records = extract_tables(html);
        assert_eq!(records.len(), 1);
        let (label, values) = &records[0].fields[0];
        assert_eq!(label, "Type");
        assert_eq!(values, &vec!["Grass".to_string(), "Poison".to_string()]);
    }

    #[test]
    fn test_missing_section_contributes_nothing() {
        let html = r#"
        <h2>Pokédex data</h2>
        <table class="vitals-table"><tbody>
          <tr><th>Species</th><td>Seed Pokémon</td></tr>
        </tbody></table>
        "#;
        let records = extract_tables(html);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].section, TableSection::BasicInfo);
    }

    #[test]
    fn test_page_without_tables_yields_empty() {
        assert!(extract_tables("<html><body><p>404</p></body></html>").is_empty());
    }

    #[test]
    fn test_entity_name_from_heading() {
        assert_eq!(entity_name(ENTITY_HTML).as_deref(), Some("Bulbasaur"));
        assert_eq!(entity_name("<html><body></body></html>"), None);
    }

    #[test]
    fn test_cell_markup_collapsed_to_plain_text() {
        let records = extract_tables(ENTITY_HTML);
        let basic = &records[0];
        let (_, height) = basic
            .fields
            .iter()
            .find(|(label, _)| label == "Height")
            .unwrap();
        assert_eq!(height[0], "0.7 m (2′04″)");
    }
}
