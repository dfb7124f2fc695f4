//! Report output: CSV files and console rendering.

use comfy_table::{presets, Attribute, Cell, ContentArrangement, Table};
use std::io::Write;
use std::path::Path;

use crate::models::{ReportRow, REPORT_HEADERS};

/// Console rendering style
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    /// Box-drawn table (human-readable)
    Table,
    /// Pretty-printed JSON array (machine-readable)
    Json,
    /// One block of labelled lines per article
    Plain,
    /// CSV with header row
    Csv,
}

/// Errors that can occur while writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write `rows` as CSV to any writer; the header is written even with no rows
pub fn write_csv_to<W: Write>(rows: &[ReportRow], writer: W) -> Result<(), ReportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(!rows.is_empty())
        .from_writer(writer);

    if rows.is_empty() {
        csv_writer.write_record(REPORT_HEADERS)?;
    }

    for row in rows {
        csv_writer.serialize(row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write `rows` as CSV to `path`, creating parent directories as needed
pub fn write_csv(rows: &[ReportRow], path: &Path) -> Result<(), ReportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = std::fs::File::create(path)?;
    write_csv_to(rows, std::io::BufWriter::new(file))?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "Wrote CSV report");
    Ok(())
}

/// Render `rows` for display in the given format
pub fn render(rows: &[ReportRow], format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Json => Ok(serde_json::to_string_pretty(rows)?),
        ReportFormat::Csv => {
            let mut buf = Vec::new();
            write_csv_to(rows, &mut buf)?;
            Ok(String::from_utf8_lossy(&buf).into_owned())
        }
        ReportFormat::Plain => Ok(render_plain(rows)),
        ReportFormat::Table => Ok(render_table(rows)),
    }
}

fn render_plain(rows: &[ReportRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!("{} ({}) - {}\n", row.title, row.publication_date, row.pmid));
        out.push_str(&format!("  Non-academic authors: {}\n", row.authors_joined()));
        out.push_str(&format!("  Companies: {}\n", row.affiliations_joined()));
        if !row.corresponding_email.is_empty() {
            out.push_str(&format!("  Email: {}\n", row.corresponding_email));
        }
        out.push('\n');
    }
    out
}

fn render_table(rows: &[ReportRow]) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(REPORT_HEADERS.to_vec());

    for row in rows {
        table.add_row(vec![
            Cell::new(&row.pmid),
            Cell::new(&row.title).add_attribute(Attribute::Bold),
            Cell::new(&row.publication_date),
            Cell::new(row.authors_joined()),
            Cell::new(row.affiliations_joined()),
            Cell::new(&row.corresponding_email),
        ]);
    }

    table.to_string()
}
