//! Barcode normalization.
//!
//! Catalog and dataset exports disagree on how barcodes are typed: spreadsheets
//! turn `7891234` into `7891234.0`, and hand-edited files carry stray spaces.
//! Every barcode is compared through [`normalize`] so both sides agree.

use std::fmt;

/// A normalized barcode. Two barcodes are equal iff their normalized text is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Barcode(String);

impl Barcode {
    pub fn new(raw: &str) -> Self {
        Barcode(normalize(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when nothing is left after normalization.
    pub fn is_missing(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Barcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Barcode {
    fn from(raw: &str) -> Self {
        Barcode::new(raw)
    }
}

/// Trims whitespace and strips trailing `.0` float artifacts.
///
/// Stripping repeats until neither applies, so `normalize` is idempotent even
/// for inputs such as `"12.0 .0"`.
pub fn normalize(raw: &str) -> String {
    let mut current = raw.trim();
    while let Some(stripped) = current.strip_suffix(".0") {
        current = stripped.trim_end();
    }
    current.to_string()
}
