//! dexscrape — extract per-Pokémon attribute tables from the national
//! Pokédex into one uniform relational dataset.
//!
//! The pipeline resolves the index page into an ordered entity list, then
//! fetches each detail page, extracts its variably-shaped attribute tables,
//! and normalizes them into rows with canonical field names. Pages differ in
//! which attributes they present, so the dataset tracks the running union of
//! observed fields and a single backfill pass nulls out what earlier rows
//! were missing — every exported row carries the identical column set.

pub mod config;
pub mod dataset;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod normalize;
pub mod pipeline;
pub mod sink;

pub use config::ScrapeConfig;
pub use dataset::{FieldSet, FieldValue, MasterDataset, NormalizedRecord};
pub use error::{FetchError, ScrapeError, SinkError};
pub use extract::EntityReference;
pub use fetch::{HttpFetcher, PageFetcher};
pub use pipeline::{Pipeline, RunState};
pub use sink::{ConnectionDescriptor, DatasetSink, SqliteSink};
