//! Section extraction.
//!
//! A document's sections come from its native outline when it has one,
//! otherwise from the font-metrics heuristic.

pub mod font_metrics;
pub mod outline;

pub use font_metrics::{FontHistogram, LeveledRun, SizeLevels};
pub use outline::{resolve_outline, OutlineEntry, PageTarget};

use crate::error::Result;
use crate::model::Section;
use crate::options::ErrorMode;
use crate::source::TextSource;

/// Which extractor produced a document's sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    Outline,
    FontMetrics,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Outline => f.write_str("outline"),
            ExtractionMethod::FontMetrics => f.write_str("font metrics"),
        }
    }
}

/// Sections of one document and how they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub method: ExtractionMethod,
    pub sections: Vec<Section>,
}

/// Extract the sections of one document.
pub fn extract_sections<S: TextSource + ?Sized>(
    source: &S,
    document: &str,
    mode: ErrorMode,
) -> Result<Extraction> {
    if let Some(entries) = resolve_outline(source) {
        log::debug!("{}: {} outline entries", document, entries.len());
        return Ok(Extraction {
            method: ExtractionMethod::Outline,
            sections: entries
                .into_iter()
                .map(|entry| entry.into_section(document))
                .collect(),
        });
    }

    log::debug!("{}: no outline, using font metrics", document);
    Ok(Extraction {
        method: ExtractionMethod::FontMetrics,
        sections: font_metrics::detect_sections(source, document, mode)?,
    })
}
