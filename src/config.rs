//! Run configuration.
//!
//! Defaults cover the usual export layout. A YAML file passed with `--config`
//! overrides any subset of fields, and command-line flags override the file.
//! Every field is optional in YAML:
//!
//! ```yaml
//! catalog: Base cadastral atualizada.csv
//! catalog_columns: { parent: codigobarras, child: embalagem_filha }
//! dataset_barcode_column: CODIGOBARRAS
//! labels:
//!   child_role: "1. UNIDADE (FILHO)"
//! ```

use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use anyhow::{Context, Result, anyhow, ensure};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{classify::Role, family::FamilyStatus};

pub const DEFAULT_CATALOG: &str = "product_catalog.csv";
pub const DEFAULT_OUTPUT: &str = "family_report.xlsx";
pub const DEFAULT_EXCLUDE_PATTERN: &str = "(?i)report|relatorio";

pub const DEFAULT_ALLOWED_COLUMNS: &[&str] = &[
    "store_number",
    "barcode",
    "packaging_description",
    "manufacturer",
    "pack_quantity",
    "unit_cost",
    "final_cost",
    "max_cost",
    "cost_spread_pct",
    "supplier",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub catalog: PathBuf,
    pub output: PathBuf,
    pub catalog_columns: CatalogColumns,
    pub dataset_barcode_column: String,
    pub allowed_columns: Vec<String>,
    pub exclude_pattern: String,
    pub labels: Labels,
    pub headers: ReportHeaders,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            catalog: PathBuf::from(DEFAULT_CATALOG),
            output: PathBuf::from(DEFAULT_OUTPUT),
            catalog_columns: CatalogColumns::default(),
            dataset_barcode_column: "barcode".to_string(),
            allowed_columns: DEFAULT_ALLOWED_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            exclude_pattern: DEFAULT_EXCLUDE_PATTERN.to_string(),
            labels: Labels::default(),
            headers: ReportHeaders::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogColumns {
    pub parent: String,
    pub child: String,
}

impl Default for CatalogColumns {
    fn default() -> Self {
        CatalogColumns {
            parent: "barcode".to_string(),
            child: "child_barcode".to_string(),
        }
    }
}

/// Text written into the status and role columns of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Labels {
    pub complete: String,
    pub missing_parent: String,
    pub missing_child: String,
    pub child_role: String,
    pub parent_role: String,
}

impl Default for Labels {
    fn default() -> Self {
        Labels {
            complete: "complete".to_string(),
            missing_parent: "incomplete-parent-only".to_string(),
            missing_child: "incomplete-child-only".to_string(),
            child_role: "1. unit (child)".to_string(),
            parent_role: "2. case (parent)".to_string(),
        }
    }
}

impl Labels {
    pub fn status(&self, status: FamilyStatus) -> &str {
        match status {
            FamilyStatus::Complete => &self.complete,
            FamilyStatus::MissingParent => &self.missing_parent,
            FamilyStatus::MissingChild => &self.missing_child,
        }
    }

    pub fn role(&self, role: Role) -> &str {
        match role {
            Role::Child => &self.child_role,
            Role::Parent => &self.parent_role,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportHeaders {
    pub group_id: String,
    pub status: String,
    pub role: String,
    pub reference: String,
}

impl Default for ReportHeaders {
    fn default() -> Self {
        ReportHeaders {
            group_id: "group_id".to_string(),
            status: "family_status".to_string(),
            role: "role".to_string(),
            reference: "reference_barcode".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let config: Config = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Config::load(path),
            None => Ok(Config::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.catalog_columns.parent.trim().is_empty(),
            "catalog_columns.parent cannot be empty"
        );
        ensure!(
            !self.catalog_columns.child.trim().is_empty(),
            "catalog_columns.child cannot be empty"
        );
        ensure!(
            !self.dataset_barcode_column.trim().is_empty(),
            "dataset_barcode_column cannot be empty"
        );
        self.exclude_regex()?;
        Ok(())
    }

    pub fn exclude_regex(&self) -> Result<Regex> {
        Regex::new(&self.exclude_pattern)
            .map_err(|err| anyhow!("Invalid exclude_pattern '{}': {err}", self.exclude_pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_yaml_keeps_remaining_defaults() {
        let yaml = "catalog_columns:\n  parent: codigobarras\n  child: embalagem_filha\nlabels:\n  child_role: UNIDADE\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.catalog_columns.parent, "codigobarras");
        assert_eq!(config.labels.child_role, "UNIDADE");
        assert_eq!(config.labels.parent_role, "2. case (parent)");
        assert_eq!(config.output, PathBuf::from(DEFAULT_OUTPUT));
        assert_eq!(config.allowed_columns.len(), DEFAULT_ALLOWED_COLUMNS.len());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let yaml = "catalgo: typo.csv\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn invalid_exclude_pattern_fails_validation() {
        let config = Config {
            exclude_pattern: "(unclosed".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn status_labels_follow_family_status() {
        let labels = Labels::default();
        assert_eq!(labels.status(FamilyStatus::Complete), "complete");
        assert_eq!(
            labels.status(FamilyStatus::MissingParent),
            "incomplete-parent-only"
        );
        assert_eq!(
            labels.status(FamilyStatus::MissingChild),
            "incomplete-child-only"
        );
    }
}
