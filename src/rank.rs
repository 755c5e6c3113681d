//! Relevance ranking.
//!
//! Every section is embedded, scored by cosine similarity against the query
//! vector and stably sorted by descending score. Every section gets its own
//! in-flight embedding call, so a run waits roughly as long as the slowest
//! single call. Results are gathered in input order before any scoring
//! happens.

use crate::embed::Embedder;
use crate::error::{Error, Result};
use crate::model::{RankedSection, Section};

/// Cosine similarity `dot(a, b) / (|a| * |b|)`.
///
/// Does not assume normalized input. A zero vector has no direction and
/// scores 0.0 against anything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if !score.is_finite() {
        return Err(Error::Embedding(
            "vector contains non-finite values".to_string(),
        ));
    }
    Ok(score.clamp(-1.0, 1.0) as f32)
}

/// Embed every text. Output order matches input.
///
/// When `parallel` is set, each text is embedded by its own task on a pool
/// with one thread per text, so all calls are in flight at once. Otherwise
/// the calls run one after another on the current thread.
pub fn embed_all<E: Embedder + ?Sized>(
    embedder: &E,
    texts: &[&str],
    parallel: bool,
) -> Result<Vec<Vec<f32>>> {
    if !parallel || texts.len() < 2 {
        return texts.iter().map(|text| embedder.embed(text)).collect();
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(texts.len())
        .thread_name(|i| format!("pdfrank-embed-{}", i))
        .build()
        .map_err(|e| Error::Other(format!("cannot start embedding threads: {}", e)))?;

    let mut slots: Vec<Option<Result<Vec<f32>>>> = texts.iter().map(|_| None).collect();
    pool.scope(|scope| {
        for (slot, text) in slots.iter_mut().zip(texts) {
            scope.spawn(move |_| *slot = Some(embedder.embed(text)));
        }
    });

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| {
                Err(Error::Embedding("embedding task did not finish".to_string()))
            })
        })
        .collect()
}

/// Score sections against a query vector and order them.
///
/// `vectors[i]` belongs to `sections[i]`. Ties keep their pooled order.
pub fn rank_by_vectors(
    query: &[f32],
    sections: Vec<Section>,
    vectors: &[Vec<f32>],
) -> Result<Vec<RankedSection>> {
    if sections.len() != vectors.len() {
        return Err(Error::Other(format!(
            "{} sections but {} vectors",
            sections.len(),
            vectors.len()
        )));
    }

    let mut scored = sections
        .into_iter()
        .zip(vectors)
        .map(|(section, vector)| Ok((section, cosine_similarity(query, vector)?)))
        .collect::<Result<Vec<_>>>()?;

    // sort_by is stable
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(i, (section, relevance_score))| RankedSection {
            section,
            relevance_score,
            importance_rank: i as u32 + 1,
        })
        .collect())
}

/// Ranks pooled sections with an injected embedder.
pub struct Ranker<'a, E: Embedder + ?Sized> {
    embedder: &'a E,
    parallel: bool,
}

impl<'a, E: Embedder + ?Sized> Ranker<'a, E> {
    pub fn new(embedder: &'a E) -> Self {
        Self {
            embedder,
            parallel: true,
        }
    }

    /// Enable or disable concurrent embedding.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Embed the query and every section, then rank.
    pub fn rank(&self, query: &str, sections: Vec<Section>) -> Result<Vec<RankedSection>> {
        let query_vector = self.embedder.embed(query)?;
        if sections.is_empty() {
            return Ok(Vec::new());
        }

        log::info!(
            "Embedding {} sections with {}",
            sections.len(),
            self.embedder.name()
        );
        let texts: Vec<&str> = sections.iter().map(|s| s.text.as_str()).collect();
        let vectors = embed_all(self.embedder, &texts, self.parallel)?;

        rank_by_vectors(&query_vector, sections, &vectors)
    }
}
