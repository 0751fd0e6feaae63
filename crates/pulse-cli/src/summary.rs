use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pulse_core::WaveOutcome;
use pulse_cli::types::{AggregateResult, CacheResult, SmoothResult};
use pulse_model::SchemaReport;

pub fn print_batch_summary(result: &AggregateResult) {
    println!("Output: {}", result.output_dir.display());
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Week"),
        header_cell("Status"),
        header_cell("Cells"),
        header_cell("Missing questions"),
        header_cell("Missing dimensions"),
        header_cell("Unclassified"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 1, CellAlignment::Center);
    for index in 2..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    let mut total_cells = 0usize;
    for outcome in &result.report.outcomes {
        match outcome {
            WaveOutcome::Succeeded {
                week,
                cells,
                report,
            } => {
                total_cells += cells;
                table.add_row(success_row(*week, *cells, report));
            }
            WaveOutcome::Failed { week, .. } => {
                table.add_row(vec![
                    Cell::new(week),
                    Cell::new("failed")
                        .fg(Color::Red)
                        .add_attribute(Attribute::Bold),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ]);
            }
        }
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        Cell::new(format!(
            "{}/{} ok",
            result.report.succeeded(),
            result.report.outcomes.len()
        ))
        .add_attribute(Attribute::Bold),
        Cell::new(total_cells).add_attribute(Attribute::Bold),
        dim_cell("-"),
        dim_cell("-"),
        dim_cell("-"),
    ]);
    println!("{table}");

    if result.report.failed() > 0 {
        eprintln!("Errors:");
        for (week, error) in result.report.failures() {
            eprintln!("- week {week}: {error}");
        }
    }
}

fn success_row(week: u32, cells: usize, report: &SchemaReport) -> Vec<Cell> {
    let status = if report.has_drift() {
        Cell::new("drift").fg(Color::Yellow)
    } else {
        Cell::new("ok").fg(Color::Green)
    };
    vec![
        Cell::new(week),
        status.add_attribute(Attribute::Bold),
        Cell::new(cells),
        count_cell(report.missing_questions.len(), Color::Yellow),
        count_cell(report.missing_dimensions.len(), Color::Yellow),
        count_cell(report.unclassified_columns.len(), Color::Yellow),
    ]
}

pub fn print_smooth_summary(result: &SmoothResult) {
    println!(
        "Smoothed {} rows with {} workers into {}",
        result.rows,
        result.workers,
        result.output_dir.display()
    );
}

pub fn print_cache_summary(result: &CacheResult) {
    let flavour = if result.smoothed {
        "raw and smoothed"
    } else {
        "raw only"
    };
    println!(
        "Wrote {} cache files ({flavour}) to {}",
        result.files,
        result.cache_dir.display()
    );
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}
