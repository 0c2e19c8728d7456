//! Rendering for `--output`.
//!
//! Every command produces one serializable report. `table` hands it to a
//! command-specific detail view, `plain` to a one-value-per-line view, and
//! the structured formats go straight through serde.

use std::io::{self, IsTerminal, Write};

use owo_colors::{OwoColorize, Style as Paint};
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};

pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal(),
    }
}

/// Named styles for detail views. `paint` returns the text untouched when
/// color is off.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    enabled: bool,
    pub heading: Paint,
    pub accent: Paint,
    pub done: Paint,
    pub muted: Paint,
    pub warn: Paint,
}

impl Palette {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            heading: Paint::new().bold().magenta(),
            accent: Paint::new().cyan(),
            done: Paint::new().green(),
            muted: Paint::new().dimmed(),
            warn: Paint::new().yellow().bold(),
        }
    }

    pub fn paint(&self, style: Paint, text: &str) -> String {
        if !self.enabled {
            return text.to_owned();
        }
        format!("{}", text.style(style))
    }
}

pub fn render_single<T>(
    format: &OutputFormat,
    report: &T,
    detail: impl FnOnce(&T) -> String,
    plain: impl FnOnce(&T) -> String,
) -> String
where
    T: Serialize + ?Sized,
{
    let structured = match format {
        OutputFormat::Table => return detail(report),
        OutputFormat::Plain => return plain(report),
        OutputFormat::Json => serde_json::to_string_pretty(report).map_err(|e| e.to_string()),
        OutputFormat::JsonCompact => serde_json::to_string(report).map_err(|e| e.to_string()),
        OutputFormat::Yaml => serde_yaml::to_string(report).map_err(|e| e.to_string()),
    };
    structured.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not serialize output");
        String::new()
    })
}

/// Rounded table used inside roadmap detail views.
pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

/// Write to stdout unless `--quiet` or there is nothing to show.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{}", output.trim_end_matches('\n'));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Progress {
        name: &'static str,
        percent: u8,
    }

    const REPORT: Progress = Progress {
        name: "Data Analyst",
        percent: 40,
    };

    fn render(format: &OutputFormat) -> String {
        render_single(
            format,
            &REPORT,
            |r| format!("{} at {}%", r.name, r.percent),
            |r| r.percent.to_string(),
        )
    }

    #[test]
    fn table_and_plain_use_the_views() {
        assert_eq!(render(&OutputFormat::Table), "Data Analyst at 40%");
        assert_eq!(render(&OutputFormat::Plain), "40");
    }

    #[test]
    fn compact_json_is_single_line() {
        assert_eq!(
            render(&OutputFormat::JsonCompact),
            r#"{"name":"Data Analyst","percent":40}"#
        );
    }

    #[test]
    fn yaml_has_one_key_per_line() {
        let out = render(&OutputFormat::Yaml);
        assert!(out.contains("name: Data Analyst\n"));
        assert!(out.contains("percent: 40"));
    }

    #[test]
    fn table_has_header() {
        #[derive(Tabled)]
        struct Row {
            #[tabled(rename = "Skill")]
            name: &'static str,
        }
        let out = render_table(&[Row { name: "SQL" }]);
        assert!(out.contains("Skill"));
        assert!(out.contains("SQL"));
    }

    #[test]
    fn palette_without_color_is_plain() {
        let p = Palette::new(false);
        assert_eq!(p.paint(p.heading, "Plan"), "Plan");
    }
}
