use serde::Serialize;
use serde_json::{json, Value};
use stockdash_core::table::fixed2;
use stockdash_core::{
    ChartView, DashboardConfig, DateRange, FetchOutcome, OverlayToggles, PageConfig,
    RangeSelector, SeriesSet, SinglePage, StockApi, Symbol,
};

use crate::cli::{ChartArgs, ChartKind};
use crate::error::CliError;

use super::{apply_range_args, command_clock, CommandResult};

#[derive(Debug, Serialize)]
struct ChartResponseData {
    symbol: Symbol,
    range: DateRange,
    fetch: Value,
    view: ChartView,
}

pub async fn run(
    args: &ChartArgs,
    config: &DashboardConfig,
    api: StockApi,
    mock: bool,
) -> Result<CommandResult, CliError> {
    let symbol = match &args.symbol {
        Some(raw) => Symbol::parse(raw)?,
        None => config.default_symbol.clone(),
    };

    let clock = command_clock(mock);
    let mut selector = RangeSelector::new(clock, config.default_period)?;
    apply_range_args(&mut selector, &args.range, config.default_period)?;
    let range = selector.current();

    let overlays: OverlayToggles = args.overlays.iter().map(|o| (*o).into()).collect();
    let mut page_config = PageConfig::from_dashboard(config)
        .with_overlays(overlays)
        .with_moving_averages(args.with_sma);
    page_config.default_symbol = symbol.clone();
    if let Some(policy) = args.policy {
        page_config.failure_policy = policy.into();
    }

    let mut page = SinglePage::new(page_config, api, clock)?;
    let outcome = page.set_range(range).await;
    let view = restrict_to_kind(page.view(), args.kind);

    let lines = render_lines(&range, &view, args.kind);
    let fetch = outcome_json(&outcome);
    let data = serde_json::to_value(ChartResponseData {
        symbol,
        range,
        fetch,
        view,
    })?;

    let mut result = CommandResult::ok(data, lines);
    if !range.is_ordered() {
        result = result.with_warning(format!(
            "end date precedes start date ({range}); the API will likely return no records"
        ));
    }
    if let FetchOutcome::Failed { error, .. } = &outcome {
        result = result.with_error(format!("{}: {error}", error.code()));
    }
    Ok(result)
}

fn outcome_json(outcome: &FetchOutcome) -> Value {
    match outcome {
        FetchOutcome::Applied {
            generation,
            records,
        } => json!({ "status": "applied", "generation": generation, "records": records }),
        FetchOutcome::Failed { generation, error } => json!({
            "status": "failed",
            "generation": generation,
            "code": error.code(),
            "message": error.to_string(),
        }),
        FetchOutcome::Superseded { generation } => {
            json!({ "status": "superseded", "generation": generation })
        }
    }
}

fn restrict_to_kind(view: ChartView, kind: ChartKind) -> ChartView {
    match view {
        ChartView::Chart { symbol, mut series } => {
            match kind {
                ChartKind::Line => series.ohlc.clear(),
                ChartKind::Candle => series.close.clear(),
                ChartKind::Both => {}
            }
            ChartView::Chart { symbol, series }
        }
        no_data => no_data,
    }
}

fn render_lines(range: &DateRange, view: &ChartView, kind: ChartKind) -> Vec<String> {
    let (symbol, series) = match view {
        ChartView::NoData { symbol } => {
            return vec![format!("No data available for {symbol}")];
        }
        ChartView::Chart { symbol, series } => (symbol, series),
    };

    let mut lines = vec![format!("{symbol} Stock Price  {range}")];
    lines.push(header(series, kind));
    for index in 0..series.len() {
        lines.push(row(series, kind, index));
    }
    lines
}

fn header(series: &SeriesSet, kind: ChartKind) -> String {
    let mut columns = vec![format!("{:<12}", "Date")];
    if kind != ChartKind::Candle {
        columns.push(format!("{:>10}", "Close"));
    }
    if kind != ChartKind::Line {
        for name in ["Open", "High", "Low", "Close"] {
            columns.push(format!("{name:>10}"));
        }
    }
    for overlay in &series.overlays {
        columns.push(format!("{:>10}", overlay.average.field().to_ascii_uppercase()));
    }
    columns.join(" ").trim_end().to_owned()
}

fn row(series: &SeriesSet, kind: ChartKind, index: usize) -> String {
    let mut columns = vec![format!("{:<12}", series.labels[index])];
    if let Some(point) = series.close.get(index) {
        columns.push(format!("{:>10}", fixed2(point.y)));
    }
    if let Some(point) = series.ohlc.get(index).filter(|_| kind != ChartKind::Line) {
        for value in point.y {
            columns.push(format!("{:>10}", fixed2(value)));
        }
    }
    for overlay in &series.overlays {
        let cell = overlay
            .points
            .get(index)
            .and_then(|point| point.y)
            .map(fixed2)
            .unwrap_or_else(|| String::from("-"));
        columns.push(format!("{cell:>10}"));
    }
    columns.join(" ").trim_end().to_owned()
}
