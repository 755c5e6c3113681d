//! Output record types.

use serde::{Deserialize, Serialize};

/// The single artifact produced by a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputRecord {
    pub metadata: ReportMetadata,
    /// Ordered by `importance_rank` ascending
    pub extracted_sections: Vec<ExtractedSection>,
    /// Reserved; always empty
    pub subsection_analysis: Vec<SubsectionAnalysis>,
}

/// Request context echoed into the output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Filenames in original request order
    pub input_documents: Vec<String>,
    pub persona: String,
    pub job_to_be_done: String,
    /// ISO-8601 generation time
    pub processing_timestamp: String,
}

/// One ranked entry of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedSection {
    pub document: String,
    pub section_title: String,
    pub importance_rank: u32,
    /// `null` when the page could not be resolved
    pub page_number: Option<u32>,
}

/// Refined per-section text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionAnalysis {
    pub document: String,
    pub refined_text: String,
    pub page_number: Option<u32>,
}
