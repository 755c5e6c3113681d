//! Leveled sections and their ranked form.

use serde::{Deserialize, Serialize};

/// Heading level of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    H1,
    H2,
    H3,
    /// Body text with no heading
    P,
}

impl Level {
    /// Deepest heading level ever emitted.
    pub const MAX_DEPTH: usize = 3;

    /// Heading level for a 1-based nesting depth, capped at `H3`.
    ///
    /// Depth 0 is treated like depth 1.
    pub fn from_depth(depth: usize) -> Self {
        match depth.min(Self::MAX_DEPTH) {
            0 | 1 => Level::H1,
            2 => Level::H2,
            _ => Level::H3,
        }
    }

    /// Whether this is one of the heading levels.
    pub fn is_heading(self) -> bool {
        !matches!(self, Level::P)
    }

    /// Label used in serialized output.
    pub fn as_str(self) -> &'static str {
        match self {
            Level::H1 => "H1",
            Level::H2 => "H2",
            Level::H3 => "H3",
            Level::P => "P",
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A leveled, possibly merged unit of text from one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Heading level, fixed once assigned
    pub level: Level,
    /// Section text
    pub text: String,
    /// Page number (1-indexed), `None` when an outline target was unresolved
    pub page: Option<u32>,
    /// Filename of the document this section came from
    pub source_document: String,
}

impl Section {
    /// Create a new section.
    pub fn new(
        level: Level,
        text: impl Into<String>,
        page: Option<u32>,
        source_document: impl Into<String>,
    ) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            source_document: source_document.into(),
        }
    }
}

/// A section with its relevance score and position in the pooled ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedSection {
    pub section: Section,
    /// Cosine similarity against the query vector
    pub relevance_score: f32,
    /// 1-based dense rank, 1 = most relevant
    pub importance_rank: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_depth_caps_at_h3() {
        assert_eq!(Level::from_depth(1), Level::H1);
        assert_eq!(Level::from_depth(2), Level::H2);
        assert_eq!(Level::from_depth(3), Level::H3);
        assert_eq!(Level::from_depth(4), Level::H3);
        assert_eq!(Level::from_depth(12), Level::H3);
    }

    #[test]
    fn test_level_serializes_as_label() {
        assert_eq!(serde_json::to_string(&Level::H2).unwrap(), "\"H2\"");
        assert_eq!(serde_json::to_string(&Level::P).unwrap(), "\"P\"");
        assert!(!Level::P.is_heading());
        assert!(Level::H3.is_heading());
    }
}
