//! Error taxonomy for the scrape pipeline.
//!
//! Only two classes of failure escape to the caller: an unusable index page
//! (nothing to scrape) and a sink failure at export time. Per-entity and
//! per-field problems are contained inside the pipeline and recorded as null
//! values on the affected row.

use thiserror::Error;

/// Failure while fetching a single page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Top-level run failure.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The index page could not be fetched at all. Fatal: without the entity
    /// list there is nothing to do.
    #[error("failed to fetch index page: {0}")]
    IndexFetch(#[source] FetchError),

    /// The index page fetched but contained no entity links. This means the
    /// upstream page structure changed; retrying will not help.
    #[error("no entity links found on index page {url}")]
    IndexParse { url: String },

    /// Export to the relational store failed. The in-memory dataset is kept
    /// so the caller may retry the export alone.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Failure inside the dataset sink.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("failed to open database at {path}: {source}")]
    Connect {
        path: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to create table {table}: {source}")]
    Schema {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("bulk insert into {table} failed: {source}")]
    Insert {
        table: String,
        #[source]
        source: rusqlite::Error,
    },

    /// The dataset has no rows or has not been reconciled into a uniform
    /// column set yet.
    #[error("dataset is empty or not reconciled, nothing to export")]
    EmptyDataset,
}
