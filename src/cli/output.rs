//! Report rendering for every output format
//!
//! Each command turns its plan into something implementing [`Report`]. The
//! serialized formats (YAML, JSON) come straight from serde; the tabular
//! formats are built from the key/value fields plus an optional table.

use console::style;
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::{resolve_format, styled};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::Config;
use crate::sampling::ColorTag;

/// Rows shown under the summary fields (e.g. one row per interval)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// A calculation result that can be rendered in any [`OutputFormat`]
pub trait Report: Serialize {
    fn title(&self) -> String;

    /// Summary fields in display order
    fn fields(&self) -> Vec<(&'static str, String)>;

    fn table(&self) -> Option<Table> {
        None
    }

    /// Headline verdict shown in color by the human format
    fn highlight(&self) -> Option<(String, ColorTag)> {
        None
    }

    /// Caveats, such as table lookups that had to be approximated
    fn notes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Render a report in the requested format
pub fn render<R: Report>(report: &R, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => serde_yml::to_string(report).into_diagnostic(),
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).into_diagnostic()?;
            Ok(format!("{}\n", json))
        }
        OutputFormat::Csv => render_delimited(report, b','),
        OutputFormat::Tsv => render_delimited(report, b'\t'),
        OutputFormat::Md => Ok(render_markdown(report)),
        OutputFormat::Auto => Ok(render_human(report)),
    }
}

/// CSV/TSV: the table when there is one, otherwise a single row of fields
fn render_delimited<R: Report>(report: &R, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    match report.table() {
        Some(table) => {
            writer.write_record(&table.headers).into_diagnostic()?;
            for row in &table.rows {
                writer.write_record(row).into_diagnostic()?;
            }
        }
        None => {
            let fields = report.fields();
            writer
                .write_record(fields.iter().map(|(key, _)| *key))
                .into_diagnostic()?;
            writer
                .write_record(fields.iter().map(|(_, value)| value.as_str()))
                .into_diagnostic()?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| miette!("Failed to flush output: {}", e.error()))?;
    String::from_utf8(bytes).into_diagnostic()
}

fn render_markdown<R: Report>(report: &R) -> String {
    let mut output = String::new();
    output.push_str(&format!("# {}\n\n", report.title()));

    let mut summary = Builder::default();
    summary.push_record(["Field", "Value"]);
    for (key, value) in report.fields() {
        summary.push_record([key.to_string(), value]);
    }
    output.push_str(&summary.build().with(Style::markdown()).to_string());
    output.push('\n');

    if let Some((verdict, _)) = report.highlight() {
        output.push_str(&format!("\n**{}**\n", verdict));
    }

    if let Some(table) = report.table() {
        output.push('\n');
        output.push_str(&build_table(&table).with(Style::markdown()).to_string());
        output.push('\n');
    }

    let notes = report.notes();
    if !notes.is_empty() {
        output.push_str("\n## Notes\n\n");
        for note in notes {
            output.push_str(&format!("- {}\n", note));
        }
    }
    output
}

fn render_human<R: Report>(report: &R) -> String {
    let mut output = String::new();
    output.push_str(&format!("{}\n", style(report.title()).bold()));

    let fields = report.fields();
    let width = fields.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    for (key, value) in &fields {
        output.push_str(&format!(
            "  {:<width$}  {}\n",
            style(key).dim(),
            value,
            width = width
        ));
    }

    if let Some((verdict, color)) = report.highlight() {
        output.push_str(&format!("\n{}\n", styled(verdict, color).bold()));
    }

    if let Some(table) = report.table() {
        output.push('\n');
        output.push_str(&build_table(&table).with(Style::rounded()).to_string());
        output.push('\n');
    }

    for note in report.notes() {
        output.push_str(&format!("{} {}\n", style("!").yellow(), note));
    }
    output
}

fn build_table(table: &Table) -> tabled::Table {
    let mut builder = Builder::default();
    builder.push_record(table.headers.iter().copied());
    for row in &table.rows {
        builder.push_record(row.iter().map(String::as_str));
    }
    builder.build()
}

/// Write rendered content to a file, or stdout when no path is given
pub fn write_output(content: &str, output_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    match output_path {
        Some(path) => {
            let file = File::create(&path).into_diagnostic()?;
            let mut writer = BufWriter::new(file);
            writer.write_all(content.as_bytes()).into_diagnostic()?;
            writer.flush().into_diagnostic()?;
            if !quiet {
                eprintln!("Report written to: {}", path.display());
            }
        }
        None => {
            print!("{}", content);
        }
    }
    Ok(())
}

/// Render in the effective format and write it out
pub fn emit<R: Report>(report: &R, global: &GlobalOpts, config: &Config) -> Result<()> {
    let format = resolve_format(global, config);
    let content = render(report, format)?;
    write_output(&content, global.output.clone(), global.quiet)
}
