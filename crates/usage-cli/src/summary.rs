use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, ContentArrangement, Table};

use usage_db::LoadedTable;

use crate::types::{RunResult, SplitResult};

pub fn print_run_summary(result: &RunResult) {
    println!("Output: {}", result.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Days"),
        header_cell("Entities"),
        header_cell("Dropped dupes"),
        header_cell("Gap fill"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Center);
    for category in &result.categories {
        table.add_row(vec![
            Cell::new(&category.key),
            Cell::new(category.days),
            Cell::new(category.entities),
            Cell::new(category.dropped_duplicates),
            Cell::new(if category.gap_filled { "yes" } else { "-" }),
        ]);
    }
    println!("{table}");
}

pub fn print_split_summary(result: &SplitResult) {
    println!("Split {} files into {}", result.files.len(), result.output_dir.display());
    for file in &result.files {
        println!("  {}", file.display());
    }
}

pub fn print_load_summary(loaded: &[LoadedTable]) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Table"), header_cell("Rows")]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for entry in loaded {
        table.add_row(vec![Cell::new(&entry.table), Cell::new(entry.rows)]);
    }
    println!("{table}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn header_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
