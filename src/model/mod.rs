//! Data model shared by extraction, ranking and reporting.
//!
//! Runs are produced by a [`TextSource`](crate::source::TextSource), turned
//! into [`Section`]s by the extractors, scored into [`RankedSection`]s and
//! finally rendered into an [`OutputRecord`].

mod report;
mod request;
mod run;
mod section;

pub use report::{ExtractedSection, OutputRecord, ReportMetadata, SubsectionAnalysis};
pub use request::{DocumentRef, JobToBeDone, Persona, Request};
pub use run::TextRun;
pub use section::{Level, RankedSection, Section};
