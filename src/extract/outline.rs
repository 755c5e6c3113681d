//! Native outline resolution.
//!
//! Flattens a document's bookmark tree into leveled sections, parents
//! before children, siblings in source order. Nesting deeper than three
//! levels is folded into `H3`.

use crate::model::{Level, Section};
use crate::source::{OutlineNode, TextSource};

/// Result of resolving one outline entry's destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageTarget {
    /// Destination resolved to a 1-indexed page
    Page(u32),
    /// Destination missing or unresolvable, with the reason
    Unresolved(String),
}

impl PageTarget {
    /// Page number if resolved.
    pub fn page(&self) -> Option<u32> {
        match self {
            PageTarget::Page(page) => Some(*page),
            PageTarget::Unresolved(_) => None,
        }
    }
}

/// One flattened outline entry.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub level: Level,
    pub title: String,
    pub target: PageTarget,
}

impl OutlineEntry {
    /// Convert into a section of the given document.
    pub fn into_section(self, document: &str) -> Section {
        Section::new(self.level, self.title, self.target.page(), document)
    }
}

/// Flatten the source's native outline.
///
/// Returns `None` when the document has no outline, or when the outline
/// cannot be read at all; callers fall back to font metrics in both cases.
pub fn resolve_outline<S: TextSource + ?Sized>(source: &S) -> Option<Vec<OutlineEntry>> {
    let roots = match source.outline() {
        Ok(roots) => roots,
        Err(e) => {
            log::warn!("Outline could not be read, ignoring it: {}", e);
            return None;
        }
    };
    if roots.is_empty() {
        return None;
    }

    let mut entries = Vec::new();
    walk(source, &roots, 1, &mut entries);
    Some(entries)
}

fn walk<S: TextSource + ?Sized>(
    source: &S,
    nodes: &[OutlineNode],
    depth: usize,
    entries: &mut Vec<OutlineEntry>,
) {
    for node in nodes {
        let target = match &node.destination {
            Some(destination) => match source.resolve_destination(destination) {
                Ok(page) => PageTarget::Page(page),
                Err(e) => {
                    log::debug!("Unresolved destination for '{}': {}", node.title, e);
                    PageTarget::Unresolved(e.to_string())
                }
            },
            None => PageTarget::Unresolved("entry has no destination".to_string()),
        };

        entries.push(OutlineEntry {
            level: Level::from_depth(depth),
            title: node.title.trim().to_string(),
            target,
        });

        walk(source, &node.children, depth + 1, entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::model::TextRun;
    use crate::source::Destination;

    struct OutlineOnly {
        roots: Result<Vec<OutlineNode>>,
    }

    impl TextSource for OutlineOnly {
        fn page_count(&self) -> u32 {
            10
        }

        fn page_runs(&self, _page: u32) -> Result<Vec<TextRun>> {
            Ok(Vec::new())
        }

        fn outline(&self) -> Result<Vec<OutlineNode>> {
            match &self.roots {
                Ok(roots) => Ok(roots.clone()),
                Err(_) => Err(Error::PdfParse("broken /Outlines".to_string())),
            }
        }

        fn resolve_destination(&self, destination: &Destination) -> Result<u32> {
            match destination {
                Destination::PageIndex(i) if *i < 10 => Ok(i + 1),
                _ => Err(Error::PdfParse("dangling destination".to_string())),
            }
        }
    }

    fn node(title: &str, index: u32) -> OutlineNode {
        OutlineNode::new(title, Some(Destination::PageIndex(index)))
    }

    #[test]
    fn test_no_outline_is_none() {
        let source = OutlineOnly { roots: Ok(vec![]) };
        assert!(resolve_outline(&source).is_none());
    }

    #[test]
    fn test_unreadable_outline_is_none() {
        let source = OutlineOnly {
            roots: Err(Error::Other(String::new())),
        };
        assert!(resolve_outline(&source).is_none());
    }

    #[test]
    fn test_depth_first_order_and_levels() {
        let source = OutlineOnly {
            roots: Ok(vec![
                node(" Intro ", 0).with_children(vec![node("Scope", 1), node("Terms", 1)]),
                node("Methods", 2),
            ]),
        };

        let entries = resolve_outline(&source).unwrap();
        let flat: Vec<(Level, &str, Option<u32>)> = entries
            .iter()
            .map(|e| (e.level, e.title.as_str(), e.target.page()))
            .collect();
        assert_eq!(
            flat,
            vec![
                (Level::H1, "Intro", Some(1)),
                (Level::H2, "Scope", Some(2)),
                (Level::H2, "Terms", Some(2)),
                (Level::H1, "Methods", Some(3)),
            ]
        );
    }

    #[test]
    fn test_four_levels_capped_at_h3() {
        let source = OutlineOnly {
            roots: Ok(vec![node("1", 0).with_children(vec![node("1.1", 0)
                .with_children(vec![node("1.1.1", 0)
                    .with_children(vec![node("1.1.1.1", 0)])])])]),
        };

        let levels: Vec<Level> = resolve_outline(&source)
            .unwrap()
            .into_iter()
            .map(|e| e.level)
            .collect();
        assert_eq!(levels, vec![Level::H1, Level::H2, Level::H3, Level::H3]);
    }

    #[test]
    fn test_unresolved_destination_keeps_entry() {
        let source = OutlineOnly {
            roots: Ok(vec![
                node("Appendix", 99),
                OutlineNode::new("Loose", None),
                node("Index", 4),
            ]),
        };

        let entries = resolve_outline(&source).unwrap();
        assert_eq!(entries.len(), 3);
        assert!(matches!(entries[0].target, PageTarget::Unresolved(_)));
        assert!(matches!(entries[1].target, PageTarget::Unresolved(_)));
        assert_eq!(entries[2].target, PageTarget::Page(5));

        let section = entries[0].clone().into_section("doc.pdf");
        assert_eq!(section.page, None);
        assert_eq!(section.source_document, "doc.pdf");
    }
}
