//! Deterministic offline embedder based on feature hashing.

use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::{l2_normalize, Embedder};
use crate::error::{Error, Result};

/// Vector length of the all-MiniLM-L6-v2 family.
pub const DEFAULT_DIMENSIONS: usize = 384;

/// Bigram features count half as much as single words.
const BIGRAM_WEIGHT: f32 = 0.5;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w+").expect("word pattern is valid"))
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Hashes words and word bigrams into a signed bag-of-features vector.
///
/// Needs no model files or network, and identical text always yields an
/// identical vector, which makes it the default for tests and offline runs.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given length.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Lowercased NFKC word tokens.
    fn tokens(text: &str) -> Vec<String> {
        let normalized: String = text.nfkc().collect::<String>().to_lowercase();
        word_pattern()
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect()
    }

    fn add_feature(&self, vector: &mut [f32], feature: &str, weight: f32) {
        let hash = fnv1a(feature.as_bytes());
        let index = (hash % self.dimensions as u64) as usize;
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[index] += sign * weight;
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if self.dimensions == 0 {
            return Err(Error::Embedding(
                "hash embedder configured with zero dimensions".to_string(),
            ));
        }

        let tokens = Self::tokens(text);
        let mut vector = vec![0.0; self.dimensions];
        for token in &tokens {
            self.add_feature(&mut vector, token, 1.0);
        }
        for pair in tokens.windows(2) {
            let bigram = format!("{} {}", pair[0], pair[1]);
            self.add_feature(&mut vector, &bigram, BIGRAM_WEIGHT);
        }

        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "hash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::cosine_similarity;

    #[test]
    fn test_deterministic_and_normalized() {
        let embedder = HashEmbedder::default();
        let a = embedder.embed("Plan a trip for college friends").unwrap();
        let b = embedder.embed("Plan a trip for college friends").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), DEFAULT_DIMENSIONS);

        let norm: f32 = a.iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_case_and_compatibility_forms() {
        let embedder = HashEmbedder::new(64);
        // U+FB01 is the "fi" ligature
        assert_eq!(
            embedder.embed("\u{FB01}ll FORMS").unwrap(),
            embedder.embed("fill forms").unwrap()
        );
    }

    #[test]
    fn test_overlap_scores_higher() {
        let embedder = HashEmbedder::default();
        let query = embedder.embed("fillable forms onboarding").unwrap();
        let related = embedder.embed("Create fillable forms for onboarding").unwrap();
        let unrelated = embedder.embed("Coastal towns and seafood").unwrap();

        let related_score = cosine_similarity(&query, &related).unwrap();
        let unrelated_score = cosine_similarity(&query, &unrelated).unwrap();
        assert!(related_score > unrelated_score);
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let embedder = HashEmbedder::new(8);
        assert_eq!(embedder.embed("  ").unwrap(), vec![0.0; 8]);
    }

    #[test]
    fn test_zero_dimensions_is_error() {
        assert!(matches!(
            HashEmbedder::new(0).embed("x"),
            Err(Error::Embedding(_))
        ));
    }
}
