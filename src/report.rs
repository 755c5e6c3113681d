//! Output record assembly and JSON rendering.

use std::io::Write;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::{Error, Result};
use crate::model::{ExtractedSection, OutputRecord, RankedSection, ReportMetadata, Request, Section};

/// Maximum length of a heading-derived section title, in characters.
pub const TITLE_MAX_CHARS: usize = 80;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Display title of a section.
///
/// Body text is labelled by its page; headings keep their first
/// [`TITLE_MAX_CHARS`] characters.
pub fn section_title(section: &Section) -> String {
    if section.level.is_heading() {
        return section.text.chars().take(TITLE_MAX_CHARS).collect();
    }
    match section.page {
        Some(page) => format!("Content from page {}", page),
        None => "Content from unknown page".to_string(),
    }
}

/// Format a generation time as ISO-8601 UTC with milliseconds.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Assemble the output record from ranked sections.
///
/// `ranked` must already be in rank order.
pub fn build_report(
    request: &Request,
    ranked: &[RankedSection],
    generated_at: DateTime<Utc>,
) -> OutputRecord {
    OutputRecord {
        metadata: ReportMetadata {
            input_documents: request.filenames(),
            persona: request.persona.role.clone(),
            job_to_be_done: request.job_to_be_done.task.clone(),
            processing_timestamp: format_timestamp(generated_at),
        },
        extracted_sections: ranked
            .iter()
            .map(|r| ExtractedSection {
                document: r.section.source_document.clone(),
                section_title: section_title(&r.section),
                importance_rank: r.importance_rank,
                page_number: r.section.page,
            })
            .collect(),
        subsection_analysis: Vec::new(),
    }
}

/// Convert a record to JSON.
pub fn to_json(record: &OutputRecord, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(record),
        JsonFormat::Compact => serde_json::to_string(record),
    };

    result.map_err(|e| Error::Serialize(format!("JSON serialization error: {}", e)))
}

/// Write a record to `path`, creating the parent directory.
///
/// The JSON goes to a temporary file in the target directory which is then
/// renamed over `path`, so readers never observe a partial file.
pub fn write_report<P: AsRef<Path>>(path: P, record: &OutputRecord, format: JsonFormat) -> Result<()> {
    let path = path.as_ref();
    let json = to_json(record, format)?;

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent)?;

    let mut file = tempfile::NamedTempFile::new_in(parent)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::Io(e.error))?;

    log::info!("Wrote {} sections to {}", record.extracted_sections.len(), path.display());
    Ok(())
}
