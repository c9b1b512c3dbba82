//! Flattening families into report rows and writing them out.
//!
//! Reports are written to a hidden sibling file and renamed into place once
//! complete, so a failed run never leaves a truncated report behind.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::{
    barcode::Barcode,
    classify::Role,
    config::{Labels, ReportHeaders},
    dataset::DataRecord,
    error::ReconcileError,
    family::{FamilyMap, FamilyStatus},
    io_utils,
};

const SHEET_NAME: &str = "families";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportRow<'r> {
    pub group_id: usize,
    pub status: FamilyStatus,
    pub role: Role,
    pub reference: &'r Barcode,
    pub record: &'r DataRecord,
}

/// Children before parents within a family; families numbered from 1 in
/// first-seen order.
pub fn build_rows<'r>(families: &'r FamilyMap<'r>) -> Vec<ReportRow<'r>> {
    let mut rows = Vec::new();
    for (idx, family) in families.iter().enumerate() {
        let group_id = idx + 1;
        let status = family.status();
        debug!(
            "Group {group_id}: family {} with {} child(ren), {} parent(s)",
            family.id,
            family.children.len(),
            family.parents.len()
        );
        let members = family
            .children
            .iter()
            .map(|record| (Role::Child, *record))
            .chain(family.parents.iter().map(|record| (Role::Parent, *record)));
        for (role, record) in members {
            rows.push(ReportRow {
                group_id,
                status,
                role,
                reference: &family.id,
                record,
            });
        }
    }
    rows
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub group_id: usize,
    /// Every cell after the group id, in header order.
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    pub headers: Vec<String>,
    pub rows: Vec<RenderedRow>,
}

pub fn render(
    rows: &[ReportRow<'_>],
    data_columns: &[String],
    headers: &ReportHeaders,
    labels: &Labels,
) -> RenderedReport {
    let mut header_row = vec![
        headers.group_id.clone(),
        headers.status.clone(),
        headers.role.clone(),
    ];
    header_row.extend(data_columns.iter().cloned());
    header_row.push(headers.reference.clone());

    let rendered = rows
        .iter()
        .map(|row| {
            let mut cells = Vec::with_capacity(data_columns.len() + 3);
            cells.push(labels.status(row.status).to_string());
            cells.push(labels.role(row.role).to_string());
            cells.extend(row.record.values.iter().cloned());
            cells.push(row.reference.to_string());
            RenderedRow {
                group_id: row.group_id,
                cells,
            }
        })
        .collect();

    RenderedReport {
        headers: header_row,
        rows: rendered,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Xlsx,
    Delimited(u8),
}

impl ReportFormat {
    pub fn from_path(path: &Path, delimiter: Option<u8>) -> Result<Self, ReconcileError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => Ok(ReportFormat::Xlsx),
            Some(ext) if ext.eq_ignore_ascii_case("csv") || ext.eq_ignore_ascii_case("tsv") => Ok(
                ReportFormat::Delimited(io_utils::resolve_output_delimiter(path, delimiter)),
            ),
            _ => Err(ReconcileError::UnsupportedOutput {
                path: path.to_path_buf(),
            }),
        }
    }
}

pub fn write_report(
    path: &Path,
    format: ReportFormat,
    report: &RenderedReport,
) -> Result<(), ReconcileError> {
    let staging = staging_path(path);
    let written = match format {
        ReportFormat::Xlsx => write_xlsx(&staging, report),
        ReportFormat::Delimited(delimiter) => write_delimited(&staging, delimiter, report),
    };
    if let Err(source) = written {
        let _ = fs::remove_file(&staging);
        return Err(ReconcileError::write(path, source));
    }
    fs::rename(&staging, path).map_err(|source| {
        let _ = fs::remove_file(&staging);
        ReconcileError::write(path, source)
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    path.with_file_name(format!(".{name}.partial"))
}

fn write_xlsx(path: &Path, report: &RenderedReport) -> io::Result<()> {
    build_workbook(report)
        .and_then(|mut workbook| workbook.save(path))
        .map_err(xlsx_to_io)
}

fn build_workbook(report: &RenderedReport) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(SHEET_NAME)?;

    for (col, header) in report.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, &header_format)?;
    }
    for (idx, row) in report.rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        worksheet.write_number(row_num, 0, row.group_id as f64)?;
        for (offset, value) in row.cells.iter().enumerate() {
            // Blank cells stay empty rather than holding an empty string.
            if value.is_empty() {
                continue;
            }
            worksheet.write_string(row_num, (offset + 1) as u16, value)?;
        }
    }
    worksheet.set_freeze_panes(1, 0)?;
    worksheet.autofit();
    Ok(workbook)
}

fn xlsx_to_io(err: XlsxError) -> io::Error {
    io::Error::other(err.to_string())
}

fn write_delimited(path: &Path, delimiter: u8, report: &RenderedReport) -> io::Result<()> {
    let mut writer = io_utils::open_csv_writer(path, delimiter)
        .map_err(|err| io::Error::other(format!("{err:#}")))?;
    writer.write_record(&report.headers)?;
    for row in &report.rows {
        let group_id = row.group_id.to_string();
        let cells = std::iter::once(group_id.as_str()).chain(row.cells.iter().map(String::as_str));
        writer.write_record(cells)?;
    }
    writer.flush()
}
