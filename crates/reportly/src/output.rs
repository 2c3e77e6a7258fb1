//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders records in the format selected by `--output`. Tables are built
//! from a resource's `Tabulate` columns, structured formats use serde, and
//! plain emits one id per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::Style;

use reportly_core::{Notification, NotificationKind, Tabulate, TablePage};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled on stderr.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render one page of records in the chosen format.
pub fn render_page<R: Tabulate>(
    format: OutputFormat,
    page: &TablePage<R>,
) -> Result<String, CliError> {
    let rows: Vec<&R> = page.rows.iter().map(AsRef::as_ref).collect();
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(R::COLUMNS.iter().map(|c| c.to_uppercase()));
            for row in &rows {
                builder.push_record(R::COLUMNS.iter().map(|c| row.cell(c).to_string()));
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(&rows, false),
        OutputFormat::JsonCompact => render_json(&rows, true),
        OutputFormat::Yaml => render_yaml(&rows),
        OutputFormat::Plain => Ok(rows
            .iter()
            .map(|r| r.cell("id").to_string())
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

/// Render a single record: a two-column field/value table, or serde output.
pub fn render_record<R: Tabulate>(format: OutputFormat, record: &R) -> Result<String, CliError> {
    match format {
        OutputFormat::Table => {
            let mut builder = Builder::default();
            for column in R::COLUMNS {
                builder.push_record([(*column).to_owned(), record.cell(column).to_string()]);
            }
            Ok(builder.build().with(Style::rounded()).to_string())
        }
        OutputFormat::Json => render_json(record, false),
        OutputFormat::JsonCompact => render_json(record, true),
        OutputFormat::Yaml => render_yaml(record),
        OutputFormat::Plain => Ok(record.cell("id").to_string()),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

/// Print a notification to stderr as a one-line toast.
pub fn print_notification(notification: &Notification, color: bool) {
    let line = match (notification.kind, color) {
        (NotificationKind::Success, true) => format!("{} {}", "✓".green(), notification.text),
        (NotificationKind::Error, true) => {
            format!("{} {}", "✗".red(), notification.text.red())
        }
        (NotificationKind::Success, false) => format!("✓ {}", notification.text),
        (NotificationKind::Error, false) => format!("✗ {}", notification.text),
    };
    let _ = writeln!(io::stderr().lock(), "{line}");
}

// ── Format-specific renderers ────────────────────────────────────────

pub(crate) fn render_json<T: Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let text = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(text)
}

pub(crate) fn render_yaml<T: Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use reportly_core::{CoverType, Tabulation};

    use super::*;

    fn page() -> TablePage<CoverType> {
        let records = vec![
            Arc::new(CoverType {
                id: Some(1),
                code: "FOR".into(),
                description: "Forest".into(),
                version: Some(2),
            }),
            Arc::new(CoverType {
                id: Some(2),
                code: "WET".into(),
                description: "Wetland".into(),
                version: Some(1),
            }),
        ];
        Tabulation::new(10).unwrap().apply(&records).unwrap()
    }

    #[test]
    fn table_has_header_and_rows() {
        let out = render_page(OutputFormat::Table, &page()).unwrap();
        assert!(out.contains("DESCRIPTION"));
        assert!(out.contains("Forest"));
        assert!(out.contains("WET"));
    }

    #[test]
    fn plain_lists_ids() {
        assert_eq!(render_page(OutputFormat::Plain, &page()).unwrap(), "1\n2");
    }

    #[test]
    fn compact_json_is_one_line() {
        let out = render_page(OutputFormat::JsonCompact, &page()).unwrap();
        assert!(!out.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["code"], "FOR");
    }

    #[test]
    fn single_record_table_lists_fields() {
        let p = page();
        let out = render_record(OutputFormat::Table, p.rows[0].as_ref()).unwrap();
        assert!(out.contains("code"));
        assert!(out.contains("FOR"));
    }
}
