use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Match parent/child packaging barcode families against a cost dataset",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build the family report from the product catalog and a dataset file
    Reconcile(ReconcileArgs),
    /// Show how individual barcodes resolve against the product catalog
    Lookup(LookupArgs),
}

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Product catalog holding parent and child barcode columns
    #[arg(short = 'c', long = "catalog")]
    pub catalog: Option<PathBuf>,
    /// Dataset file to reconcile (prompted from the working directory if omitted)
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,
    /// Report destination (.xlsx, .csv or .tsv)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Working directory for dataset discovery and relative paths
    #[arg(short = 'd', long = "dir")]
    pub dir: Option<PathBuf>,
    /// YAML file overriding column names, labels and defaults
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Input delimiter for both files (sniffed from the header if omitted)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Input encoding for both files (utf-8 with latin-1 fallback if omitted)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Delimiter for .csv reports (defaults by extension)
    #[arg(long = "output-delimiter", value_parser = parse_delimiter)]
    pub output_delimiter: Option<u8>,
    /// Print a per-status summary table after writing the report
    #[arg(long)]
    pub summary: bool,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Barcodes to classify
    #[arg(required = true)]
    pub barcodes: Vec<String>,
    /// Product catalog holding parent and child barcode columns
    #[arg(short = 'c', long = "catalog")]
    pub catalog: Option<PathBuf>,
    /// YAML file overriding column names and defaults
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Catalog delimiter (sniffed from the header if omitted)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Catalog encoding (utf-8 with latin-1 fallback if omitted)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
