//! Plain-text tables for console output.

use itertools::Itertools;

const COLUMN_GAP: &str = "  ";

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| cell_width(h)).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_width(cell));
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat((*w).max(1))).collect();
    std::iter::once(headers)
        .chain(std::iter::once(rule.as_slice()))
        .chain(rows.iter().map(Vec::as_slice))
        .map(|cells| format_line(cells, &widths))
        .map(|line| line + "\n")
        .collect()
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let flat = flatten(cell);
            let pad = width.saturating_sub(cell_width(&flat));
            format!("{flat}{}", " ".repeat(pad))
        })
        .join(COLUMN_GAP);
    line.trim_end().to_string()
}

fn cell_width(value: &str) -> usize {
    value.chars().count()
}

/// Line breaks and tabs inside a cell would break the layout.
fn flatten(value: &str) -> String {
    value.replace(['\n', '\r', '\t'], " ")
}
