use serde_json::json;
use stockdash_core::table::{rows, TableRow, HEADERS};
use stockdash_core::{
    fixtures, DashboardConfig, FetchOrchestrator, FetchOutcome, RangeSelector, StockApi,
    StockRecord, Symbol,
};

use crate::cli::TableArgs;
use crate::error::CliError;

use super::{apply_range_args, command_clock, CommandResult};

pub async fn run(
    args: &TableArgs,
    config: &DashboardConfig,
    api: &StockApi,
    mock: bool,
) -> Result<CommandResult, CliError> {
    if mock && args.symbols.is_empty() {
        let records = fixtures::home_records();
        return Ok(render(&records, json!(null)));
    }

    let symbols = if args.symbols.is_empty() {
        vec![config.default_symbol.clone()]
    } else {
        args.symbols
            .iter()
            .map(|raw| Symbol::parse(raw))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut selector = RangeSelector::new(command_clock(mock), config.default_period)?;
    apply_range_args(&mut selector, &args.range, config.default_period)?;
    let range = selector.current();

    let mut records = Vec::new();
    let mut failures = Vec::new();
    for symbol in &symbols {
        let orchestrator = FetchOrchestrator::new(api.clone(), config.failure_policy);
        match orchestrator.fetch_range(symbol, range).await {
            FetchOutcome::Failed { error, .. } => {
                failures.push(format!("{symbol}: {}: {error}", error.code()));
            }
            _ => records.extend(orchestrator.records()),
        }
    }

    let mut result = render(&records, json!(range));
    if !range.is_ordered() {
        result = result.with_warning(format!("end date precedes start date ({range})"));
    }
    for failure in failures {
        result = result.with_error(failure);
    }
    Ok(result)
}

fn render(records: &[StockRecord], range: serde_json::Value) -> CommandResult {
    let table = rows(records);
    let lines = if table.is_empty() {
        vec![String::from("No data available")]
    } else {
        layout(&table)
    };
    let data = json!({
        "range": range,
        "headers": HEADERS,
        "rows": table,
    });
    CommandResult::ok(data, lines)
}

fn layout(table: &[TableRow]) -> Vec<String> {
    let mut widths = HEADERS.map(str::len);
    for row in table {
        for (width, cell) in widths.iter_mut().zip(&row.cells) {
            *width = (*width).max(cell.len());
        }
    }

    let mut lines = vec![format_line(HEADERS.iter().copied(), &widths)];
    lines.extend(
        table
            .iter()
            .map(|row| format_line(row.cells.iter().map(String::as_str), &widths)),
    );
    lines
}

fn format_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize; 9]) -> String {
    cells
        .zip(widths)
        .enumerate()
        .map(|(index, (cell, &width))| {
            // Symbol and date left-aligned, numbers right-aligned.
            if index < 2 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>width$}")
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}
