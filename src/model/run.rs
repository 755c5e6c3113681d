//! Positioned text runs.

/// One contiguous piece of text as yielded by a text source.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// Trimmed, non-empty text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
    /// Font size proxy: magnitude of the glyph transform's scaling components
    pub size: f32,
    /// Baseline position; larger values are higher on the page
    pub y: f32,
}

impl TextRun {
    /// Create a run from raw extracted text.
    ///
    /// Returns `None` when the text is empty after trimming.
    pub fn new(text: &str, page: u32, size: f32, y: f32) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(Self {
            text: text.to_string(),
            page,
            size,
            y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_is_trimmed() {
        let run = TextRun::new("  Overview \n", 2, 14.0, 700.0).unwrap();
        assert_eq!(run.text, "Overview");
        assert_eq!(run.page, 2);
    }

    #[test]
    fn test_blank_run_is_skipped() {
        assert!(TextRun::new(" \t\n", 1, 12.0, 0.0).is_none());
        assert!(TextRun::new("", 1, 12.0, 0.0).is_none());
    }
}
