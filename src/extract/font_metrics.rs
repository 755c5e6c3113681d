//! Heading detection from font-size statistics.
//!
//! Used when a document carries no native outline. The three most
//! *frequent* font sizes become `H1`..`H3` in order of frequency and every
//! other size is body text. Runs are then put in reading order (page, then
//! top to bottom) and adjacent runs with the same level on the same page
//! are merged.

use std::collections::HashMap;

use crate::error::Result;
use crate::model::{Level, Section, TextRun};
use crate::options::ErrorMode;
use crate::source::TextSource;

/// Number of font sizes promoted to heading levels.
pub const HEADING_SIZE_COUNT: usize = 3;

/// Histogram key for a font size, at 0.01pt precision.
fn size_key(size: f32) -> i64 {
    (f64::from(size) * 100.0).round() as i64
}

/// Font size frequencies over a whole document.
///
/// Distinct sizes are kept in order of first occurrence so that equal
/// counts rank deterministically.
#[derive(Debug, Clone, Default)]
pub struct FontHistogram {
    counts: Vec<(i64, usize)>,
    index: HashMap<i64, usize>,
}

impl FontHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a histogram from every run's size.
    pub fn from_runs(runs: &[TextRun]) -> Self {
        let mut histogram = Self::new();
        for run in runs {
            histogram.add_size(run.size);
        }
        histogram
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        let key = size_key(size);
        match self.index.get(&key) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(key, self.counts.len());
                self.counts.push((key, 1));
            }
        }
    }

    /// Number of occurrences of a size.
    pub fn count(&self, size: f32) -> usize {
        self.index
            .get(&size_key(size))
            .map_or(0, |&i| self.counts[i].1)
    }

    /// Number of distinct sizes seen.
    pub fn distinct_sizes(&self) -> usize {
        self.counts.len()
    }

    /// Promote the most frequent sizes to heading levels.
    pub fn heading_levels(&self) -> SizeLevels {
        let mut ranked = self.counts.clone();
        // Stable: ties keep first-occurrence order
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        SizeLevels {
            keys: ranked
                .into_iter()
                .take(HEADING_SIZE_COUNT)
                .map(|(key, _)| key)
                .collect(),
        }
    }
}

/// Mapping from heading font sizes to levels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizeLevels {
    keys: Vec<i64>,
}

impl SizeLevels {
    /// Level for a font size; sizes that are not headings map to `P`.
    pub fn level_for(&self, size: f32) -> Level {
        match self.keys.iter().position(|&k| k == size_key(size)) {
            Some(0) => Level::H1,
            Some(1) => Level::H2,
            Some(2) => Level::H3,
            _ => Level::P,
        }
    }

    /// Heading sizes, `H1` first.
    pub fn heading_sizes(&self) -> Vec<f32> {
        self.keys.iter().map(|&k| k as f32 / 100.0).collect()
    }
}

/// A run with its assigned level.
#[derive(Debug, Clone, PartialEq)]
pub struct LeveledRun {
    pub level: Level,
    pub run: TextRun,
}

/// Scan every page of the source.
///
/// In lenient mode a page that fails to decode is skipped with a warning.
pub fn collect_runs<S: TextSource + ?Sized>(source: &S, mode: ErrorMode) -> Result<Vec<TextRun>> {
    let mut runs = Vec::new();
    for page in 1..=source.page_count() {
        match source.page_runs(page) {
            Ok(page_runs) => runs.extend(page_runs),
            Err(e) if mode == ErrorMode::Lenient => {
                log::warn!("Skipping page {}: {}", page, e);
            }
            Err(e) => return Err(e),
        }
    }
    Ok(runs)
}

/// Assign levels from the document-wide size histogram.
pub fn classify(runs: Vec<TextRun>) -> Vec<LeveledRun> {
    let histogram = FontHistogram::from_runs(&runs);
    let levels = histogram.heading_levels();
    log::debug!(
        "{} distinct sizes, headings (size, count): {:?}",
        histogram.distinct_sizes(),
        levels
            .heading_sizes()
            .into_iter()
            .map(|size| (size, histogram.count(size)))
            .collect::<Vec<_>>()
    );
    runs.into_iter()
        .map(|run| LeveledRun {
            level: levels.level_for(run.size),
            run,
        })
        .collect()
}

/// Put runs in reading order and merge same-level neighbours on a page.
pub fn merge(mut leveled: Vec<LeveledRun>, document: &str) -> Vec<Section> {
    leveled.sort_by(|a, b| {
        a.run
            .page
            .cmp(&b.run.page)
            .then_with(|| b.run.y.total_cmp(&a.run.y))
    });

    let mut sections: Vec<Section> = Vec::new();
    for LeveledRun { level, run } in leveled {
        match sections.last_mut() {
            Some(prev) if prev.level == level && prev.page == Some(run.page) => {
                prev.text.push(' ');
                prev.text.push_str(&run.text);
            }
            _ => sections.push(Section::new(level, run.text, Some(run.page), document)),
        }
    }
    sections
}

/// Detect leveled sections of a document from its typography.
pub fn detect_sections<S: TextSource + ?Sized>(
    source: &S,
    document: &str,
    mode: ErrorMode,
) -> Result<Vec<Section>> {
    let runs = collect_runs(source, mode)?;
    if runs.is_empty() {
        log::info!("{}: no extractable text", document);
        return Ok(Vec::new());
    }
    Ok(merge(classify(runs), document))
}
