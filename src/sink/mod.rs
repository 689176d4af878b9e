//! Export of the master dataset into a relational store.

pub mod sqlite;

pub use sqlite::SqliteSink;

use crate::dataset::MasterDataset;
use crate::error::SinkError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque connection configuration for a dataset sink.
///
/// Which fields a given backend uses is its own business; the SQLite backend
/// for instance takes `service` as the database file path and ignores the
/// endpoint and auth fields.
#[derive(Clone, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Logical database / tenant. File path for file-backed stores.
    pub service: String,
    /// Destination table name.
    pub table_name: String,
}

impl Default for ConnectionDescriptor {
    fn default() -> Self {
        Self {
            user: String::new(),
            password: String::new(),
            host: String::new(),
            port: 0,
            service: "pokedex.db".to_string(),
            table_name: "master_pokemon".to_string(),
        }
    }
}

// Credentials stay out of logs.
impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("service", &self.service)
            .field("table_name", &self.table_name)
            .finish()
    }
}

/// A destination for the reconciled dataset.
///
/// The contract: rows arrive with a stable, uniform column set (guaranteed
/// by the backfill pass) and the sink either fully succeeds, returning the
/// row count written, or reports failure. Partial-export recovery is not the
/// pipeline's concern.
pub trait DatasetSink {
    fn export(&self, dataset: &MasterDataset, conn: &ConnectionDescriptor)
        -> Result<u64, SinkError>;
}
