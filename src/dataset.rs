//! Dataset loading and allow-list projection.

use std::path::PathBuf;

use anyhow::Result;
use log::{info, warn};

use crate::{
    barcode::Barcode,
    error::ReconcileError,
    io_utils::{DelimitedTable, RawRow},
};

const MAX_LOGGED_SKIPS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRecord {
    pub line: usize,
    pub barcode: Barcode,
    /// Cells for [`Dataset::columns`], in the same order.
    pub values: Vec<String>,
}

#[derive(Debug)]
pub struct Dataset {
    pub path: PathBuf,
    /// Allow-listed columns present in the input, in allow-list order.
    pub columns: Vec<String>,
    pub records: Vec<DataRecord>,
    pub skipped: usize,
}

pub fn load_dataset(
    table: &DelimitedTable,
    barcode_column: &str,
    allowed_columns: &[String],
) -> Result<Dataset> {
    let barcode_idx = table.require_column(barcode_column)?;
    let projection: Vec<(String, usize)> = allowed_columns
        .iter()
        .filter_map(|name| table.column_index(name).map(|idx| (name.clone(), idx)))
        .collect();
    let missing: Vec<&str> = allowed_columns
        .iter()
        .filter(|name| table.column_index(name).is_none())
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        info!(
            "Dataset {:?} has no column(s) {}; they are left out of the report",
            table.path,
            missing.join(", ")
        );
    }

    let mut skipped = table.skipped.len();
    for err in table.skipped.iter().take(MAX_LOGGED_SKIPS) {
        warn!("{err}");
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        match project_row(table, row, barcode_idx, &projection) {
            Ok(record) => records.push(record),
            Err(err) => {
                if skipped < MAX_LOGGED_SKIPS {
                    warn!("{err}");
                }
                skipped += 1;
            }
        }
    }

    Ok(Dataset {
        path: table.path.clone(),
        columns: projection.into_iter().map(|(name, _)| name).collect(),
        records,
        skipped,
    })
}

fn project_row(
    table: &DelimitedTable,
    row: &RawRow,
    barcode_idx: usize,
    projection: &[(String, usize)],
) -> Result<DataRecord, ReconcileError> {
    let barcode = Barcode::new(row.get(barcode_idx));
    if barcode.is_missing() {
        return Err(ReconcileError::Parse {
            path: table.path.clone(),
            line: row.line,
            reason: "empty barcode".to_string(),
        });
    }
    Ok(DataRecord {
        line: row.line,
        barcode,
        values: projection
            .iter()
            .map(|(_, idx)| row.get(*idx).to_string())
            .collect(),
    })
}
