use serde_json::json;
use stockdash_core::{select_period, Clock, DateRange, Period, SystemClock};
use time::Date;

use crate::error::CliError;

use super::CommandResult;

pub fn run() -> Result<CommandResult, CliError> {
    list(SystemClock.today())
}

fn list(today: Date) -> Result<CommandResult, CliError> {
    let resolved = Period::ALL
        .iter()
        .map(|period| -> Result<(Period, DateRange), CliError> {
            Ok((*period, select_period(period.days(), today)?))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let data = json!({
        "today": stockdash_core::format_iso_date(today),
        "periods": resolved
            .iter()
            .map(|(period, range)| json!({
                "code": period.code(),
                "label": period.label(),
                "days": period.days(),
                "range": range,
            }))
            .collect::<Vec<_>>(),
    });

    let mut lines = vec![format!("{:<6}{:<10}{}", "Code", "Label", "Range")];
    lines.extend(
        resolved
            .iter()
            .map(|(period, range)| format!("{:<6}{:<10}{range}", period.code(), period.label())),
    );

    Ok(CommandResult::ok(data, lines))
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn lists_every_period_against_today() {
        let result = list(date!(2025 - 02 - 22)).expect("periods");

        assert_eq!(result.lines.len(), 6);
        assert!(result.lines[1].starts_with("5d"));
        assert!(result.lines[1].ends_with("2025-02-17..2025-02-22"));
        assert_eq!(result.data["periods"][4]["range"]["start"], "2024-02-23");
        assert_eq!(result.data["today"], "2025-02-22");
    }
}
