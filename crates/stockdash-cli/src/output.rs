use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::CommandResult;
use crate::error::CliError;

pub fn render(result: &CommandResult, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    match format {
        OutputFormat::Json => {
            let document = json!({
                "data": result.data,
                "warnings": result.warnings,
                "errors": result.errors,
            });
            let payload = if pretty {
                serde_json::to_string_pretty(&document)?
            } else {
                serde_json::to_string(&document)?
            };
            println!("{payload}");
        }
        OutputFormat::Table => render_table(result),
    }

    Ok(())
}

fn render_table(result: &CommandResult) {
    for line in &result.lines {
        println!("{line}");
    }

    // Diagnostics go to stderr so the table stays pipeable.
    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }
    for error in &result.errors {
        eprintln!("error: {error}");
    }
}
