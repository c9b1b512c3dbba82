//! Parent/child relation index built from the product catalog.
//!
//! Each catalog row with a child barcode is a directed edge from the case
//! (parent) to the unit it contains (child). The index keeps both directions
//! as flat single-hop maps; duplicate keys are last-write-wins.

use std::collections::HashMap;

use anyhow::Result;
use log::{info, warn};

use crate::{
    barcode::Barcode,
    config::CatalogColumns,
    error::ReconcileError,
    io_utils::DelimitedTable,
};

const MAX_LOGGED_OVERWRITES: usize = 5;
const MAX_LOGGED_SKIPS: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct RelationIndex {
    parent_to_child: HashMap<Barcode, Barcode>,
    child_to_parent: HashMap<Barcode, Barcode>,
}

impl RelationIndex {
    /// Builds an index from raw `(parent, child)` cells.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut builder = RelationIndexBuilder::new();
        for (parent, child) in pairs {
            builder.insert(parent, child);
        }
        builder.finish().0
    }

    pub fn child_of(&self, parent: &Barcode) -> Option<&Barcode> {
        self.parent_to_child.get(parent)
    }

    pub fn parent_of(&self, child: &Barcode) -> Option<&Barcode> {
        self.child_to_parent.get(child)
    }

    pub fn is_parent(&self, barcode: &Barcode) -> bool {
        self.parent_to_child.contains_key(barcode)
    }

    pub fn is_child(&self, barcode: &Barcode) -> bool {
        self.child_to_parent.contains_key(barcode)
    }

    /// Number of distinct parents.
    pub fn len(&self) -> usize {
        self.parent_to_child.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent_to_child.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryOutcome {
    Indexed,
    NoChild,
    MissingParent,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexStats {
    pub rows: usize,
    pub indexed: usize,
    pub without_child: usize,
    pub skipped: usize,
    pub parent_overwrites: Vec<Barcode>,
    pub child_overwrites: Vec<Barcode>,
}

#[derive(Debug, Default)]
pub struct RelationIndexBuilder {
    index: RelationIndex,
    stats: IndexStats,
}

impl RelationIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, parent: &str, child: &str) -> EntryOutcome {
        self.stats.rows += 1;
        let child = Barcode::new(child);
        if child.is_missing() {
            self.stats.without_child += 1;
            return EntryOutcome::NoChild;
        }
        let parent = Barcode::new(parent);
        if parent.is_missing() {
            self.stats.skipped += 1;
            return EntryOutcome::MissingParent;
        }

        if let Some(previous) = self
            .index
            .parent_to_child
            .insert(parent.clone(), child.clone())
            && previous != child
        {
            self.stats.parent_overwrites.push(parent.clone());
        }
        if let Some(previous) = self.index.child_to_parent.insert(child.clone(), parent.clone())
            && previous != parent
        {
            self.stats.child_overwrites.push(child);
        }
        self.stats.indexed += 1;
        EntryOutcome::Indexed
    }

    pub fn finish(self) -> (RelationIndex, IndexStats) {
        (self.index, self.stats)
    }
}

/// Builds the relation index from a loaded catalog table.
///
/// Fails when either configured column is missing from the header; rows with
/// a child but no parent are skipped with a warning.
pub fn load_catalog(
    table: &DelimitedTable,
    columns: &CatalogColumns,
) -> Result<RelationIndex> {
    let parent_idx = table.require_column(&columns.parent)?;
    let child_idx = table.require_column(&columns.child)?;

    for err in &table.skipped {
        warn!("{err}");
    }

    let mut builder = RelationIndexBuilder::new();
    let mut logged = 0usize;
    for row in &table.rows {
        let outcome = builder.insert(row.get(parent_idx), row.get(child_idx));
        if outcome == EntryOutcome::MissingParent {
            if logged < MAX_LOGGED_SKIPS {
                let err = ReconcileError::Parse {
                    path: table.path.clone(),
                    line: row.line,
                    reason: format!(
                        "child barcode '{}' has no parent barcode",
                        row.get(child_idx).trim()
                    ),
                };
                warn!("{err}");
            }
            logged += 1;
        }
    }
    let (index, mut stats) = builder.finish();
    stats.skipped += table.skipped.len();

    log_overwrites("parent", &stats.parent_overwrites);
    log_overwrites("child", &stats.child_overwrites);
    info!(
        "Catalog {:?}: {} relation(s) from {} row(s) ({} without child, {} skipped)",
        table.path,
        index.len(),
        stats.rows,
        stats.without_child,
        stats.skipped
    );
    Ok(index)
}

fn log_overwrites(side: &str, overwritten: &[Barcode]) {
    if overwritten.is_empty() {
        return;
    }
    let sample = overwritten
        .iter()
        .take(MAX_LOGGED_OVERWRITES)
        .map(Barcode::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    warn!(
        "{} duplicate {side} barcode(s) in catalog, keeping the last mapping (e.g. {sample})",
        overwritten.len()
    );
}
