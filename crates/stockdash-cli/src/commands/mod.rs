mod chart;
mod periods;
mod table;

use std::sync::Arc;

use serde_json::Value;
use stockdash_core::{
    fixtures, parse_iso_date, Clock, DashboardConfig, FixedClock, HttpClient, MockStockClient,
    Period, RangeSelector, ReqwestHttpClient, StockApi, SystemClock,
};

use crate::cli::{Cli, Command, RangeArgs};
use crate::error::CliError;

/// Output of one command: a JSON document and its text rendering.
pub struct CommandResult {
    pub data: Value,
    pub lines: Vec<String>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value, lines: Vec<String>) -> Self {
        Self {
            data,
            lines,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.errors.push(error.into());
        self
    }
}

pub async fn run(cli: &Cli) -> Result<CommandResult, CliError> {
    let config = resolve_config(cli)?;
    let api = build_api(cli, &config);

    match &cli.command {
        Command::Table(args) => table::run(args, &config, &api, cli.mock).await,
        Command::Chart(args) => chart::run(args, &config, api, cli.mock).await,
        Command::Periods => periods::run(),
    }
}

fn resolve_config(cli: &Cli) -> Result<DashboardConfig, CliError> {
    let mut config = DashboardConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    Ok(config)
}

fn build_api(cli: &Cli, config: &DashboardConfig) -> StockApi {
    let http_client: Arc<dyn HttpClient> = if cli.mock {
        Arc::new(MockStockClient::default())
    } else {
        Arc::new(ReqwestHttpClient::new())
    };

    StockApi::new(config.base_url.clone(), http_client)
        .with_endpoint(config.range_endpoint())
        .with_timeout_ms(config.timeout_ms)
}

/// Today for range selection; offline runs end on the last sample date.
fn command_clock(mock: bool) -> FixedClock {
    if mock {
        FixedClock(fixtures::SAMPLE_TODAY)
    } else {
        FixedClock(SystemClock.today())
    }
}

/// Apply `--period`, then any `--start`/`--end` edits, to `selector`.
fn apply_range_args<C: Clock>(
    selector: &mut RangeSelector<C>,
    args: &RangeArgs,
    default_period: Period,
) -> Result<(), CliError> {
    selector.select(args.period.unwrap_or(default_period))?;
    if let Some(start) = &args.start {
        selector.set_start(parse_iso_date(start)?);
    }
    if let Some(end) = &args.end {
        selector.set_end(parse_iso_date(end)?);
    }
    Ok(())
}
