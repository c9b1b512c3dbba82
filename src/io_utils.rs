//! Delimited-text I/O shared by the catalog and dataset loaders.
//!
//! Inputs are read fully into memory. When no encoding is given the bytes are
//! checked for valid UTF-8 and otherwise decoded as Windows-1252, which is how
//! spreadsheet exports from the store systems usually arrive. When no
//! delimiter is given it is sniffed from the header line.

use std::{
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use log::debug;

use crate::error::ReconcileError;

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const SNIFF_CANDIDATES: &[u8] = &[b';', b',', b'\t', b'|'];
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// `None` means auto-detect.
pub fn resolve_encoding(label: Option<&str>) -> Result<Option<&'static Encoding>> {
    label
        .map(|value| {
            Encoding::for_label(value.trim().as_bytes())
                .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
        })
        .transpose()
}

pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        UTF_8
    } else {
        WINDOWS_1252
    }
}

/// Picks the most frequent candidate separator in the first line.
pub fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let occurrences = |candidate: u8| first_line.iter().filter(|b| **b == candidate).count();

    // Comma starts as the winner so it keeps ties.
    let mut best = DEFAULT_CSV_DELIMITER;
    let mut best_count = occurrences(best);
    for &candidate in SNIFF_CANDIDATES {
        let count = occurrences(candidate);
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

pub fn resolve_output_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    if let Some(delim) = provided {
        return delim;
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    }
}

/// Canonical form used to match headers: `" CodigoBarras "`, `CODIGOBARRAS`
/// and `codigobarras` all become `codigobarras`.
pub fn header_key(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8, has_headers: bool) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(has_headers)
        .delimiter(delimiter)
        .double_quote(true)
        // Short rows from hand-edited exports read as trailing empty cells.
        .flexible(true);
    builder.from_reader(reader)
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!(
            "Failed to decode text with encoding {}",
            encoding.name()
        ))
    } else {
        Ok(text.into_owned())
    }
}

pub fn decode_record(record: &csv::ByteRecord, encoding: &'static Encoding) -> Result<Vec<String>> {
    record
        .iter()
        .map(|field| decode_bytes(field, encoding))
        .collect()
}

#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1-based line in the source file, header included.
    pub line: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    pub fn get(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug)]
pub struct DelimitedTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
    /// Rows that could not be decoded; reported and left out of `rows`.
    pub skipped: Vec<ReconcileError>,
}

impl DelimitedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        let wanted = header_key(name);
        self.headers.iter().position(|h| header_key(h) == wanted)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, ReconcileError> {
        self.column_index(name)
            .ok_or_else(|| ReconcileError::MissingColumn {
                column: name.to_string(),
                path: self.path.clone(),
                available: self.headers.iter().map(|h| h.trim().to_string()).collect(),
            })
    }
}

pub fn read_table(
    path: &Path,
    delimiter: Option<u8>,
    encoding: Option<&'static Encoding>,
) -> Result<DelimitedTable> {
    let bytes = fs::read(path).with_context(|| format!("Opening input file {path:?}"))?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
    let encoding = encoding.unwrap_or_else(|| detect_encoding(body));
    let delimiter = delimiter.unwrap_or_else(|| sniff_delimiter(body));
    debug!(
        "Reading {:?} as {} with delimiter '{}'",
        path,
        encoding.name(),
        crate::printable_delimiter(delimiter)
    );

    let mut reader = open_csv_reader(body, delimiter, true);
    let header_record = reader
        .byte_headers()
        .with_context(|| format!("Reading header of {path:?}"))?
        .clone();
    let headers = decode_record(&header_record, encoding)
        .with_context(|| format!("Decoding header of {path:?}"))?;

    let mut rows = Vec::new();
    let mut skipped = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let line = row_idx + 2;
        let record = record.with_context(|| format!("Reading row {line} of {path:?}"))?;
        match decode_record(&record, encoding) {
            Ok(fields) => rows.push(RawRow { line, fields }),
            Err(err) => skipped.push(ReconcileError::Parse {
                path: path.to_path_buf(),
                line,
                reason: err.to_string(),
            }),
        }
    }

    Ok(DelimitedTable {
        path: path.to_path_buf(),
        headers,
        rows,
        skipped,
    })
}

pub fn open_csv_writer(path: &Path, delimiter: u8) -> Result<csv::Writer<Box<dyn Write>>> {
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let writer: Box<dyn Write> = Box::new(BufWriter::new(file));
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true);
    Ok(builder.from_writer(writer))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffs_semicolon_headers() {
        assert_eq!(sniff_delimiter(b"codigobarras;embalagem_filha\n1;2\n"), b';');
        assert_eq!(sniff_delimiter(b"a\tb\tc\n"), b'\t');
    }

    #[test]
    fn sniff_prefers_comma_on_ties_and_defaults_to_comma() {
        assert_eq!(sniff_delimiter(b"a,b;c\n"), b',');
        assert_eq!(sniff_delimiter(b"barcode\n111\n"), b',');
        assert_eq!(sniff_delimiter(b""), b',');
    }

    #[test]
    fn detects_latin1_bytes() {
        assert_eq!(detect_encoding("descrição".as_bytes()), UTF_8);
        assert_eq!(detect_encoding(b"descri\xe7\xe3o"), WINDOWS_1252);
    }

    #[test]
    fn header_key_ignores_case_and_spacing() {
        assert_eq!(header_key(" CODIGOBARRAS "), "codigobarras");
        assert_eq!(header_key("CodigoBarras"), header_key("codigobarras"));
        assert_eq!(header_key("EmbalagemFilha"), "embalagemfilha");
        assert_eq!(header_key("Embalagem_Filha"), header_key("embalagem_filha"));
        assert_eq!(header_key("child_barcode"), "child_barcode");
    }

    #[test]
    fn header_key_keeps_distinct_headers_apart() {
        assert_ne!(header_key("CUSTO_UNIT_R$"), header_key("CUSTO_UNIT_R"));
        assert_ne!(header_key("CodigoBarras"), header_key("codigo_barras"));
    }

    #[test]
    fn mixed_case_header_resolves_to_column() {
        let table = DelimitedTable {
            path: PathBuf::from("catalog.csv"),
            headers: vec!["CodigoBarras".to_string(), " Embalagem_Filha ".to_string()],
            rows: Vec::new(),
            skipped: Vec::new(),
        };
        assert_eq!(table.column_index("codigobarras"), Some(0));
        assert_eq!(table.column_index("EMBALAGEM_FILHA"), Some(1));
        assert!(table.require_column("embalagemfilha").is_err());
    }

    #[test]
    fn resolve_encoding_rejects_unknown_labels() {
        assert!(resolve_encoding(Some("klingon")).is_err());
        assert_eq!(resolve_encoding(Some("latin1")).unwrap(), Some(WINDOWS_1252));
        assert_eq!(resolve_encoding(None).unwrap(), None);
    }
}
