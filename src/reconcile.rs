use std::{io, path::PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::ReconcileArgs,
    config::{Config, Labels},
    dataset,
    family::{self, FamilyMap},
    index, io_utils,
    report::{self, ReportFormat},
    select, table,
};

pub fn execute(args: &ReconcileArgs) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    if let Some(catalog) = &args.catalog {
        config.catalog = catalog.clone();
    }
    if let Some(output) = &args.output {
        config.output = output.clone();
    }

    let dir = args.dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let catalog_path = dir.join(&config.catalog);
    let output_path = dir.join(&config.output);
    let format = ReportFormat::from_path(&output_path, args.output_delimiter)?;
    let encoding = io_utils::resolve_encoding(args.input_encoding.as_deref())?;

    info!("[1/4] Mapping catalog {:?}", catalog_path);
    let catalog = io_utils::read_table(&catalog_path, args.delimiter, encoding)
        .with_context(|| format!("Loading catalog {catalog_path:?}"))?;
    let relations = index::load_catalog(&catalog, &config.catalog_columns)?;
    drop(catalog);

    let dataset_path = match &args.input {
        Some(input) => dir.join(input),
        None => {
            info!("[2/4] Looking for dataset files in {:?}", dir);
            let exclude = config.exclude_regex()?;
            let candidates = select::discover_candidates(
                &dir,
                &[catalog_path.as_path(), output_path.as_path()],
                &exclude,
            )?;
            select::choose_candidate(&candidates, &dir, io::stdin().lock(), io::stdout())?
        }
    };
    info!("Reading dataset {:?}", dataset_path);
    let table = io_utils::read_table(&dataset_path, args.delimiter, encoding)
        .with_context(|| format!("Loading dataset {dataset_path:?}"))?;
    let dataset = dataset::load_dataset(
        &table,
        &config.dataset_barcode_column,
        &config.allowed_columns,
    )?;
    drop(table);

    info!("[3/4] Grouping records into families");
    let aggregation = family::aggregate(&dataset.records, &relations);
    info!(
        "{} of {} record(s) belong to {} family group(s); {} unrelated, {} skipped",
        aggregation.analyzed,
        dataset.records.len(),
        aggregation.families.len(),
        aggregation.unrelated,
        dataset.skipped
    );

    if aggregation.families.is_empty() {
        warn!(
            "No related products found in {:?}; no report written",
            dataset.path
        );
        return Ok(());
    }

    info!("[4/4] Writing report {:?}", output_path);
    let rows = report::build_rows(&aggregation.families);
    let rendered = report::render(&rows, &dataset.columns, &config.headers, &config.labels);
    report::write_report(&output_path, format, &rendered)?;
    info!(
        "Report with {} row(s) written to {:?}",
        rendered.rows.len(),
        output_path
    );

    if args.summary {
        print_summary(&aggregation.families, &config.labels);
    }
    Ok(())
}

fn print_summary(families: &FamilyMap<'_>, labels: &Labels) {
    let headers = ["status", "families", "rows"].map(String::from).to_vec();
    let mut rows: Vec<Vec<String>> = families
        .status_counts()
        .into_iter()
        .map(|(status, count, row_count)| {
            vec![
                labels.status(status).to_string(),
                count.to_string(),
                row_count.to_string(),
            ]
        })
        .collect();
    let (total_families, total_rows) = families
        .iter()
        .fold((0usize, 0usize), |(f, r), family| (f + 1, r + family.row_count()));
    rows.push(vec![
        "total".to_string(),
        total_families.to_string(),
        total_rows.to_string(),
    ]);
    table::print_table(&headers, &rows);
}
