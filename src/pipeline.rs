//! End-to-end analysis: extract every document, rank the pooled sections
//! against the persona/task query, and assemble the report.

use chrono::Utc;

use crate::embed::Embedder;
use crate::error::Result;
use crate::extract::{extract_sections, Extraction};
use crate::model::{DocumentRef, OutputRecord, RankedSection, Request, Section};
use crate::options::AnalyzeOptions;
use crate::rank::Ranker;
use crate::report::{build_report, write_report};
use crate::source::{LopdfSource, TextSource};

/// Progress notifications emitted while a request runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnalyzeEvent<'a> {
    /// A document is about to be opened.
    DocumentStart {
        index: usize,
        document: &'a DocumentRef,
    },
    /// A document's sections were extracted.
    DocumentEnd {
        index: usize,
        document: &'a DocumentRef,
        sections: usize,
    },
    /// All documents are done; the pooled sections are being ranked.
    Ranking { sections: usize },
}

/// Runs requests against an injected embedder.
///
/// # Example
///
/// ```no_run
/// use pdfrank::{AnalyzeOptions, Analyzer, HashEmbedder, Request};
///
/// let request = Request::from_path("input/challenge1b_input.json")?;
/// let analyzer = Analyzer::new(
///     HashEmbedder::default(),
///     AnalyzeOptions::new().with_document_dir("input/PDF"),
/// );
/// let record = analyzer.analyze(&request)?;
/// println!("{} sections", record.extracted_sections.len());
/// # Ok::<(), pdfrank::Error>(())
/// ```
pub struct Analyzer<E: Embedder> {
    embedder: E,
    options: AnalyzeOptions,
}

impl<E: Embedder> Analyzer<E> {
    pub fn new(embedder: E, options: AnalyzeOptions) -> Self {
        Self { embedder, options }
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Open a request document from the configured directory.
    pub fn open_document(&self, document: &DocumentRef) -> Result<LopdfSource> {
        let path = self.options.document_dir.join(&document.filename);
        LopdfSource::open(&path).map_err(|e| e.in_document(&document.filename))
    }

    /// Extract sections from an already opened source.
    pub fn extract_source<S: TextSource + ?Sized>(
        &self,
        source: &S,
        name: &str,
    ) -> Result<Extraction> {
        let extraction = extract_sections(source, name, self.options.error_mode)
            .map_err(|e| e.in_document(name))?;
        log::info!(
            "{}: {} sections via {}",
            name,
            extraction.sections.len(),
            extraction.method
        );
        Ok(extraction)
    }

    /// Rank pooled sections against the request's query.
    pub fn rank(&self, request: &Request, sections: Vec<Section>) -> Result<Vec<RankedSection>> {
        Ranker::new(&self.embedder)
            .with_parallel(self.options.parallel)
            .rank(&request.query_text(), sections)
    }

    /// Run a request against the PDFs in the document directory.
    pub fn analyze(&self, request: &Request) -> Result<OutputRecord> {
        self.analyze_with(request, |document| self.open_document(document))
    }

    /// Run a request with a caller-supplied way of opening documents.
    ///
    /// Documents are processed one at a time in request order; the first
    /// failure aborts the run.
    pub fn analyze_with<S, F>(&self, request: &Request, open: F) -> Result<OutputRecord>
    where
        S: TextSource,
        F: FnMut(&DocumentRef) -> Result<S>,
    {
        self.analyze_with_events(request, open, |_| {})
    }

    /// Like [`Analyzer::analyze_with`], reporting progress to `on_event`.
    pub fn analyze_with_events<S, F, P>(
        &self,
        request: &Request,
        mut open: F,
        mut on_event: P,
    ) -> Result<OutputRecord>
    where
        S: TextSource,
        F: FnMut(&DocumentRef) -> Result<S>,
        P: FnMut(AnalyzeEvent<'_>),
    {
        request.validate()?;
        log::info!(
            "Analyzing {} documents for '{}'",
            request.documents.len(),
            request.persona.role
        );

        let mut pooled = Vec::new();
        for (index, document) in request.documents.iter().enumerate() {
            on_event(AnalyzeEvent::DocumentStart { index, document });
            let source = open(document)?;
            let extraction = self.extract_source(&source, &document.filename)?;
            on_event(AnalyzeEvent::DocumentEnd {
                index,
                document,
                sections: extraction.sections.len(),
            });
            pooled.extend(extraction.sections);
        }

        on_event(AnalyzeEvent::Ranking {
            sections: pooled.len(),
        });
        let ranked = self.rank(request, pooled)?;
        Ok(self.report(request, &ranked))
    }

    /// Assemble the output record, stamped with the current time.
    pub fn report(&self, request: &Request, ranked: &[RankedSection]) -> OutputRecord {
        build_report(request, ranked, Utc::now())
    }

    /// Analyze and write the report to `path` in the configured JSON layout.
    pub fn analyze_to_file<P: AsRef<std::path::Path>>(
        &self,
        request: &Request,
        path: P,
    ) -> Result<OutputRecord> {
        let record = self.analyze(request)?;
        write_report(path, &record, self.options.json_format)?;
        Ok(record)
    }
}
