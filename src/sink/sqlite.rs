//! SQLite dataset sink.
//!
//! Replaces the destination table on every export (the dataset is a full
//! snapshot, not a delta) and writes all rows inside one transaction, so the
//! table is never left half-written.

use super::{ConnectionDescriptor, DatasetSink};
use crate::dataset::{FieldValue, MasterDataset, RESERVED_COLUMNS};
use crate::error::SinkError;
use rusqlite::types::Value;
use rusqlite::Connection;
use tracing::info;

pub struct SqliteSink;

impl DatasetSink for SqliteSink {
    fn export(
        &self,
        dataset: &MasterDataset,
        conn: &ConnectionDescriptor,
    ) -> Result<u64, SinkError> {
        if dataset.is_empty() || !dataset.is_backfilled() {
            return Err(SinkError::EmptyDataset);
        }

        let mut db = Connection::open(&conn.service).map_err(|source| SinkError::Connect {
            path: conn.service.clone(),
            source,
        })?;

        let columns = dataset.columns();
        let table = &conn.table_name;

        create_table(&db, table, columns, dataset).map_err(|source| SinkError::Schema {
            table: table.clone(),
            source,
        })?;

        let rows = insert_rows(&mut db, table, columns, dataset).map_err(|source| {
            SinkError::Insert {
                table: table.clone(),
                source,
            }
        })?;

        info!(rows, table = %table, path = %conn.service, "dataset written");
        Ok(rows)
    }
}

fn create_table(
    db: &Connection,
    table: &str,
    columns: &[String],
    dataset: &MasterDataset,
) -> Result<(), rusqlite::Error> {
    let decls: Vec<String> = columns
        .iter()
        .map(|col| format!("{} {}", quote_ident(col), column_affinity(col, dataset)))
        .collect();

    db.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table}; CREATE TABLE {table} ({decls});",
        table = quote_ident(table),
        decls = decls.join(", ")
    ))
}

fn insert_rows(
    db: &mut Connection,
    table: &str,
    columns: &[String],
    dataset: &MasterDataset,
) -> Result<u64, rusqlite::Error> {
    let placeholders = vec!["?"; columns.len()].join(", ");
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "INSERT INTO {} ({column_list}) VALUES ({placeholders})",
        quote_ident(table)
    );

    let tx = db.transaction()?;
    {
        let mut stmt = tx.prepare(&sql)?;
        for row in dataset.rows() {
            let mut params: Vec<Value> = Vec::with_capacity(columns.len());
            params.push(Value::Integer(i64::from(row.ordinal)));
            params.push(Value::Text(row.name.clone()));
            params.push(Value::Text(row.url.clone()));
            for col in &columns[RESERVED_COLUMNS.len()..] {
                params.push(sql_value(row.values.get(col.as_str())));
            }
            stmt.execute(rusqlite::params_from_iter(params))?;
        }
    }
    tx.commit()?;
    Ok(dataset.len() as u64)
}

/// Map a cell to a SQLite value. Lists are stored as JSON text so the
/// column stays queryable without a join table.
fn sql_value(value: Option<&FieldValue>) -> Value {
    match value {
        None | Some(FieldValue::Null) => Value::Null,
        Some(FieldValue::Text(s)) => Value::Text(s.clone()),
        Some(FieldValue::Number(n)) => Value::Real(*n),
        Some(FieldValue::List(items)) => {
            Value::Text(serde_json::to_string(items).unwrap_or_default())
        }
    }
}

/// Pick a column type: REAL when any row holds a number, INTEGER for the
/// ordinal, TEXT otherwise.
fn column_affinity(column: &str, dataset: &MasterDataset) -> &'static str {
    if column == "ordinal" {
        return "INTEGER";
    }
    if RESERVED_COLUMNS.contains(&column) {
        return "TEXT";
    }
    let numeric = dataset
        .rows()
        .iter()
        .any(|row| matches!(row.values.get(column), Some(FieldValue::Number(_))));
    if numeric {
        "REAL"
    } else {
        "TEXT"
    }
}

/// Quote an identifier for SQLite, escaping embedded quotes. Column names
/// come from page labels, so they are untrusted input.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
