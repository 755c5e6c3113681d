//! Embedding providers.
//!
//! The ranker only needs a deterministic `text -> vector` function; it is
//! passed in explicitly as an [`Embedder`] rather than held as global
//! state. Construct one embedder per run and share it by reference.

mod hash;
#[cfg(feature = "remote")]
mod openai;

pub use hash::HashEmbedder;
#[cfg(feature = "remote")]
pub use openai::{OpenAiConfig, OpenAiEmbedder};

use std::sync::Arc;

use crate::error::Result;

/// Maps text to a fixed-length, L2-normalized vector.
///
/// Implementations must be deterministic for identical input and safe to
/// call from several threads at once.
pub trait Embedder: Send + Sync {
    /// Embed one text.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Length of every returned vector.
    fn dimensions(&self) -> usize;

    /// Short human-readable name used in logs.
    fn name(&self) -> &str;
}

impl<E: Embedder + ?Sized> Embedder for &E {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: Embedder + ?Sized> Embedder for Box<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

impl<E: Embedder + ?Sized> Embedder for Arc<E> {
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        (**self).embed(text)
    }

    fn dimensions(&self) -> usize {
        (**self).dimensions()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Scale a vector to unit L2 norm in place. Zero vectors are left as is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        for v in vector.iter_mut() {
            *v /= norm;
        }
    }
}
