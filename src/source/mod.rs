//! PDF text source abstraction.
//!
//! A [`TextSource`] yields positioned text runs page by page and, when the
//! document has one, its native outline. The extractors only talk to this
//! trait; [`LopdfSource`] is the concrete implementation backed by `lopdf`.

mod backend;
mod content;
mod text;

pub use backend::LopdfSource;
pub use content::ContentScanner;
pub use text::{decode_pdf_string, is_spaceless_script_char};

use crate::error::Result;
use crate::model::TextRun;

/// Where an outline entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Indirect reference to a page object (object number, generation)
    PageRef(u32, u16),
    /// Zero-based page index
    PageIndex(u32),
    /// Named destination, looked up in the document's name dictionaries
    Named(Vec<u8>),
}

/// One entry of a native outline tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub title: String,
    /// `None` when the entry has no destination or an unsupported action
    pub destination: Option<Destination>,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(title: impl Into<String>, destination: Option<Destination>) -> Self {
        Self {
            title: title.into(),
            destination,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }
}

/// Abstract interface for per-document text access.
///
/// A source is used by one extraction pass at a time; pages are requested
/// in ascending order.
pub trait TextSource {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Positioned text runs of one page (1-indexed), in content order.
    fn page_runs(&self, page: u32) -> Result<Vec<TextRun>>;

    /// Native outline roots. An empty vector means the document has none.
    fn outline(&self) -> Result<Vec<OutlineNode>>;

    /// Resolve an outline destination to a 1-indexed page number.
    fn resolve_destination(&self, destination: &Destination) -> Result<u32>;
}
