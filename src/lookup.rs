use anyhow::{Context, Result};
use log::info;

use crate::{
    barcode::Barcode,
    classify::{Classification, classify},
    cli::LookupArgs,
    config::Config,
    index::{self, RelationIndex},
    io_utils, table,
};

pub fn execute(args: &LookupArgs) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(catalog) = &args.catalog {
        config.catalog = catalog.clone();
    }
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;
    let catalog = io_utils::read_table(&config.catalog, args.delimiter, encoding)
        .with_context(|| format!("Loading catalog {:?}", config.catalog))?;
    let relations = index::load_catalog(&catalog, &config.catalog_columns)?;

    let headers = ["barcode", "normalized", "classification", "family", "child"]
        .map(String::from)
        .to_vec();
    let rows = lookup_rows(&args.barcodes, &relations);
    table::print_table(&headers, &rows);
    info!("Looked up {} barcode(s)", rows.len());
    Ok(())
}

/// One row per barcode: input, normalized form, classification, the family
/// it joins as a unit (or its own family as a case), and its unit barcode.
pub fn lookup_rows(barcodes: &[String], relations: &RelationIndex) -> Vec<Vec<String>> {
    barcodes
        .iter()
        .map(|raw| {
            let barcode = Barcode::new(raw);
            let classification = classify(&barcode, relations);
            let family = match &classification {
                Classification::Unrelated => String::new(),
                Classification::Parent => barcode.to_string(),
                Classification::Child { family } => family.to_string(),
                Classification::Both { family } => format!("{barcode} / {family}"),
            };
            let child = relations
                .child_of(&barcode)
                .map(Barcode::to_string)
                .unwrap_or_default();
            vec![
                raw.clone(),
                barcode.to_string(),
                classification.label().to_string(),
                family,
                child,
            ]
        })
        .collect()
}
