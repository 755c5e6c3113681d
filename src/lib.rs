//! # pdfrank
//!
//! Persona-driven section ranking for PDF collections.
//!
//! Given a persona, a task and a set of PDFs, this library splits every
//! document into leveled sections (from the native outline when present,
//! from font-size statistics otherwise), embeds them, and ranks the pooled
//! sections by cosine similarity to the persona/task query.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pdfrank::{analyze_file, HashEmbedder};
//!
//! fn main() -> pdfrank::Result<()> {
//!     let record = analyze_file("input/challenge1b_input.json", "input/PDF", HashEmbedder::default())?;
//!     for section in &record.extracted_sections {
//!         println!("{:>3}  {}  {}", section.importance_rank, section.document, section.section_title);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Outline first**: native bookmarks become `H1`..`H3` sections
//! - **Font-metrics fallback**: the most frequent font sizes mark headings
//! - **Pluggable embeddings**: offline feature hashing or an HTTP endpoint (`remote`)
//! - **Parallel embedding**: uses Rayon to embed sections concurrently

pub mod detect;
pub mod embed;
pub mod error;
pub mod extract;
pub mod model;
pub mod options;
pub mod pipeline;
pub mod rank;
pub mod report;
pub mod source;

// Re-export commonly used types
pub use detect::{check_bytes, check_file, PdfVersion};
pub use embed::{Embedder, HashEmbedder};
#[cfg(feature = "remote")]
pub use embed::{OpenAiConfig, OpenAiEmbedder};
pub use error::{Error, Result};
pub use extract::{extract_sections, Extraction, ExtractionMethod};
pub use model::{
    DocumentRef, ExtractedSection, Level, OutputRecord, RankedSection, Request, Section,
    TextRun,
};
pub use options::{AnalyzeOptions, ErrorMode};
pub use pipeline::{AnalyzeEvent, Analyzer};
pub use rank::{cosine_similarity, Ranker};
pub use report::{build_report, to_json, write_report, JsonFormat};
pub use source::{LopdfSource, TextSource};

use std::path::Path;

/// Extract the leveled sections of one PDF file.
///
/// # Example
///
/// ```no_run
/// use pdfrank::sections_from_file;
///
/// let extraction = sections_from_file("guide.pdf").unwrap();
/// println!("{} sections via {}", extraction.sections.len(), extraction.method);
/// ```
pub fn sections_from_file<P: AsRef<Path>>(path: P) -> Result<Extraction> {
    let path = path.as_ref();
    let source = LopdfSource::open(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    extract_sections(&source, &name, ErrorMode::Strict)
}

/// Extract the leveled sections of a PDF held in memory.
pub fn sections_from_bytes(data: &[u8], name: &str) -> Result<Extraction> {
    let source = LopdfSource::from_bytes(data)?;
    extract_sections(&source, name, ErrorMode::Strict)
}

/// Run a request file against a directory of PDFs.
///
/// # Arguments
///
/// * `request` - Path to the request JSON
/// * `document_dir` - Directory holding the request's PDFs
/// * `embedder` - Embedding provider used for the query and every section
pub fn analyze_file<P, D, E>(request: P, document_dir: D, embedder: E) -> Result<OutputRecord>
where
    P: AsRef<Path>,
    D: AsRef<Path>,
    E: Embedder,
{
    let request = Request::from_path(request)?;
    let options = AnalyzeOptions::new().with_document_dir(document_dir.as_ref());
    Analyzer::new(embedder, options).analyze(&request)
}
