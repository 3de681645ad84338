//! Matrix formatters
//!
//! Renders a finished result matrix as a table, JSON, or CSV.

use chrono::Utc;

use crate::models::{Cell, ResultMatrix, Status};

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    JsonPretty,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

/// Placeholder for cells that were never exercised
const NULL_CELL: &str = "––";

/// Matrix formatter
pub struct MatrixFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl MatrixFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    pub fn no_color(mut self) -> Self {
        self.colorize = false;
        self
    }

    pub fn format(&self, matrix: &ResultMatrix) -> String {
        match self.format {
            OutputFormat::Table => self.format_table(matrix),
            OutputFormat::Json => serde_json::to_string(matrix).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(matrix).unwrap_or_default(),
            OutputFormat::Csv => self.format_csv(matrix),
        }
    }

    fn format_table(&self, matrix: &ResultMatrix) -> String {
        let cell_text =
            |cell: &Option<Cell>| cell.as_ref().map_or(NULL_CELL.to_string(), |c| c.0.clone());

        // Column widths: header row plus every cell in that column
        let server_width = matrix
            .servers
            .iter()
            .map(|row| row.name.chars().count())
            .max()
            .unwrap_or(0);
        let mut widths: Vec<usize> = matrix.tests.iter().map(|t| t.chars().count()).collect();
        for row in &matrix.servers {
            for (i, cell) in row.results.iter().enumerate() {
                widths[i] = widths[i].max(cell_text(cell).chars().count());
            }
        }

        let mut out = String::new();
        out.push_str(&format!("\nProject: {}\n\n", matrix.project));

        out.push_str(&rule("┌", "┬", "┐", server_width, &widths));

        out.push_str(&format!("│ {} │", pad("", server_width)));
        for (test, width) in matrix.tests.iter().zip(&widths) {
            out.push_str(&format!(" {} │", pad(test, *width)));
        }
        out.push('\n');

        out.push_str(&rule("├", "┼", "┤", server_width, &widths));

        for row in &matrix.servers {
            out.push_str(&format!("│ {} │", pad(&row.name, server_width)));
            for (cell, width) in row.results.iter().zip(&widths) {
                let padded = pad(&cell_text(cell), *width);
                let painted = match cell {
                    Some(c) if self.colorize => self.paint(&padded, &c.1),
                    _ => padded,
                };
                out.push_str(&format!(" {painted} │"));
            }
            out.push('\n');
        }

        out.push_str(&rule("└", "┴", "┘", server_width, &widths));
        out.push_str(&format!(
            "Generated: {}\n",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
        ));
        out
    }

    fn paint(&self, text: &str, status: &Status) -> String {
        match status {
            Status::Ok => format!("\x1b[32m{text}\x1b[0m"),
            Status::Error | Status::Exception => format!("\x1b[31m{text}\x1b[0m"),
            Status::Custom(_) => format!("\x1b[33m{text}\x1b[0m"),
        }
    }

    fn format_csv(&self, matrix: &ResultMatrix) -> String {
        let mut out = String::new();

        out.push_str("server");
        for test in &matrix.tests {
            out.push(',');
            out.push_str(&csv_quote(test));
        }
        out.push('\n');

        for row in &matrix.servers {
            out.push_str(&csv_quote(&row.name));
            for cell in &row.results {
                out.push(',');
                if let Some(cell) = cell {
                    out.push_str(&csv_quote(&cell.0));
                }
            }
            out.push('\n');
        }

        out
    }
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

fn rule(left: &str, middle: &str, right: &str, server_width: usize, widths: &[usize]) -> String {
    let mut out = String::new();
    out.push_str(left);
    out.push_str(&"─".repeat(server_width + 2));
    for width in widths {
        out.push_str(middle);
        out.push_str(&"─".repeat(width + 2));
    }
    out.push_str(right);
    out.push('\n');
    out
}

fn csv_quote(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
