//! HTML extraction: index-page entity discovery and per-page attribute tables.

pub mod index;
pub mod tables;

pub use index::{resolve_index, EntityReference};
pub use tables::{entity_name, extract_tables, RawTableRecord, TableSection};
