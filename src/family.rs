//! Grouping of classified records into families keyed by parent barcode.

use indexmap::IndexMap;

use crate::{
    barcode::Barcode,
    classify::{Role, classify},
    dataset::DataRecord,
    index::RelationIndex,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FamilyStatus {
    Complete,
    /// Only unit records were seen; the case never showed up in the dataset.
    MissingParent,
    /// Only case records were seen.
    MissingChild,
}

impl FamilyStatus {
    pub const ALL: [FamilyStatus; 3] = [
        FamilyStatus::Complete,
        FamilyStatus::MissingParent,
        FamilyStatus::MissingChild,
    ];
}

#[derive(Debug, Clone)]
pub struct Family<'r> {
    pub id: Barcode,
    pub parents: Vec<&'r DataRecord>,
    pub children: Vec<&'r DataRecord>,
}

impl<'r> Family<'r> {
    fn new(id: Barcode) -> Self {
        Family {
            id,
            parents: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn status(&self) -> FamilyStatus {
        match (self.parents.is_empty(), self.children.is_empty()) {
            (false, false) => FamilyStatus::Complete,
            (true, _) => FamilyStatus::MissingParent,
            (false, true) => FamilyStatus::MissingChild,
        }
    }

    pub fn row_count(&self) -> usize {
        self.parents.len() + self.children.len()
    }
}

/// Families in first-seen order.
#[derive(Debug, Default)]
pub struct FamilyMap<'r> {
    families: IndexMap<Barcode, Family<'r>>,
}

impl<'r> FamilyMap<'r> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, family: &Barcode, role: Role, record: &'r DataRecord) {
        let entry = self
            .families
            .entry(family.clone())
            .or_insert_with(|| Family::new(family.clone()));
        match role {
            Role::Parent => entry.parents.push(record),
            Role::Child => entry.children.push(record),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Family<'r>> {
        self.families.values()
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// `(status, families, report rows)` for every status, in a fixed order.
    pub fn status_counts(&self) -> Vec<(FamilyStatus, usize, usize)> {
        FamilyStatus::ALL
            .iter()
            .map(|status| {
                let (families, rows) = self
                    .iter()
                    .filter(|family| family.status() == *status)
                    .fold((0, 0), |(families, rows), family| {
                        (families + 1, rows + family.row_count())
                    });
                (*status, families, rows)
            })
            .collect()
    }
}

#[derive(Debug)]
pub struct Aggregation<'r> {
    pub families: FamilyMap<'r>,
    /// Records that belonged to at least one family.
    pub analyzed: usize,
    pub unrelated: usize,
}

pub fn aggregate<'r>(records: &'r [DataRecord], index: &RelationIndex) -> Aggregation<'r> {
    let mut families = FamilyMap::new();
    let mut analyzed = 0usize;
    let mut unrelated = 0usize;

    for record in records {
        let classification = classify(&record.barcode, index);
        if !classification.is_related() {
            unrelated += 1;
            continue;
        }
        analyzed += 1;
        for (role, family) in classification.assignments(&record.barcode) {
            families.push(family, role, record);
        }
    }

    Aggregation {
        families,
        analyzed,
        unrelated,
    }
}
