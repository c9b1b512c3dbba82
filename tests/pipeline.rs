//! Library-level checks of the catalog -> classification -> report pipeline.

use barcode_families::{
    barcode::Barcode,
    classify::{Classification, Role, classify},
    config::{Labels, ReportHeaders},
    dataset::DataRecord,
    family::{FamilyStatus, aggregate},
    index::RelationIndex,
    report::{build_rows, render},
};

fn records(rows: &[(&str, &str)]) -> Vec<DataRecord> {
    rows.iter()
        .enumerate()
        .map(|(idx, (barcode, supplier))| DataRecord {
            line: idx + 2,
            barcode: Barcode::new(barcode),
            values: vec![barcode.to_string(), supplier.to_string()],
        })
        .collect()
}

fn data_columns() -> Vec<String> {
    vec!["barcode".to_string(), "supplier".to_string()]
}

#[test]
fn single_relation_maps_both_directions() {
    let index = RelationIndex::from_pairs([("111", "222")]);
    assert_eq!(index.child_of(&Barcode::new("111")), Some(&Barcode::new("222")));
    assert_eq!(index.parent_of(&Barcode::new("222")), Some(&Barcode::new("111")));
    assert_eq!(index.child_of(&Barcode::new("222")), None);
    assert_eq!(index.parent_of(&Barcode::new("111")), None);
}

#[test]
fn classification_of_parent_child_and_unrelated() {
    let index = RelationIndex::from_pairs([("111", "222")]);
    assert_eq!(
        classify(&Barcode::new("222"), &index),
        Classification::Child {
            family: Barcode::new("111")
        }
    );
    assert_eq!(
        classify(&Barcode::new("111"), &index),
        Classification::Parent
    );
    assert_eq!(
        classify(&Barcode::new("999"), &index),
        Classification::Unrelated
    );
}

#[test]
fn complete_family_emits_child_then_parent_and_drops_unrelated() {
    let index = RelationIndex::from_pairs([("111", "222")]);
    let records = records(&[("222", "X"), ("111", "X"), ("333", "Y")]);
    let aggregation = aggregate(&records, &index);
    let rows = build_rows(&aggregation.families);

    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row.group_id == 1));
    assert!(rows.iter().all(|row| row.status == FamilyStatus::Complete));
    assert_eq!(rows[0].role, Role::Child);
    assert_eq!(rows[0].record.barcode, Barcode::new("222"));
    assert_eq!(rows[1].role, Role::Parent);
    assert!(rows.iter().all(|row| row.record.barcode != Barcode::new("333")));

    let report = render(&rows, &data_columns(), &ReportHeaders::default(), &Labels::default());
    assert_eq!(report.rows[0].cells[0], "complete");
    assert_eq!(report.rows[1].cells[0], "complete");
}

#[test]
fn child_without_parent_row_is_incomplete() {
    let index = RelationIndex::from_pairs([("111", "222")]);
    let records = records(&[("222", "X")]);
    let aggregation = aggregate(&records, &index);
    let rows = build_rows(&aggregation.families);
    let report = render(&rows, &data_columns(), &ReportHeaders::default(), &Labels::default());

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].group_id, 1);
    assert_eq!(report.rows[0].cells[0], "incomplete-parent-only");
    // Reference barcode is the parent even though it never appeared.
    assert_eq!(report.rows[0].cells.last().map(String::as_str), Some("111"));
}

#[test]
fn parent_without_child_row_is_incomplete() {
    let index = RelationIndex::from_pairs([("111", "222")]);
    let records = records(&[("111.0", "X")]);
    let aggregation = aggregate(&records, &index);
    let rows = build_rows(&aggregation.families);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, FamilyStatus::MissingChild);
    assert_eq!(rows[0].role, Role::Parent);
}

#[test]
fn record_in_both_roles_appears_once_per_family() {
    // 111 is a pallet of 222 boxes, 222 a box of 333 units.
    let index = RelationIndex::from_pairs([("111", "222"), ("222", "333")]);
    let records = records(&[("222", "X"), ("333", "X")]);
    let aggregation = aggregate(&records, &index);
    let rows = build_rows(&aggregation.families);

    let summary: Vec<_> = rows
        .iter()
        .map(|row| {
            (
                row.group_id,
                row.role,
                row.record.barcode.as_str().to_string(),
                row.reference.as_str().to_string(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            (1, Role::Child, "333".to_string(), "222".to_string()),
            (1, Role::Parent, "222".to_string(), "222".to_string()),
            (2, Role::Child, "222".to_string(), "111".to_string()),
        ]
    );
    assert_eq!(aggregation.analyzed, 2);
}

#[test]
fn groups_follow_first_appearance() {
    let index = RelationIndex::from_pairs([("111", "222"), ("444", "555")]);
    let records = records(&[("555", "A"), ("222", "B"), ("444", "C"), ("111", "D")]);
    let aggregation = aggregate(&records, &index);
    let rows = build_rows(&aggregation.families);
    let order: Vec<_> = rows
        .iter()
        .map(|row| (row.group_id, row.record.values[1].clone()))
        .collect();
    assert_eq!(
        order,
        vec![
            (1, "A".to_string()),
            (1, "C".to_string()),
            (2, "B".to_string()),
            (2, "D".to_string()),
        ]
    );
}

#[test]
fn custom_labels_flow_into_rendered_rows() {
    let index = RelationIndex::from_pairs([("111", "222")]);
    let records = records(&[("222", "X")]);
    let aggregation = aggregate(&records, &index);
    let rows = build_rows(&aggregation.families);
    let labels = Labels {
        missing_parent: "INCOMPLETO (Só Filho encontrado)".to_string(),
        child_role: "1. UNIDADE (FILHO)".to_string(),
        ..Labels::default()
    };
    let report = render(&rows, &data_columns(), &ReportHeaders::default(), &labels);
    assert_eq!(report.rows[0].cells[0], "INCOMPLETO (Só Filho encontrado)");
    assert_eq!(report.rows[0].cells[1], "1. UNIDADE (FILHO)");
}
