//! TF-IDF text vectorizer
//!
//! Maps raw text to a fixed-width row using a vocabulary and inverse document
//! frequencies fitted offline. Mirrors the behaviour of scikit-learn's
//! `TfidfVectorizer` with the default word analyzer.

use super::{Matrix, Vectorizer};
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Row normalization applied after weighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Norm {
    L1,
    L2,
}

fn default_lowercase() -> bool {
    true
}

fn default_ngram_range() -> (usize, usize) {
    (1, 1)
}

fn default_norm() -> Option<Norm> {
    Some(Norm::L2)
}

/// On-disk representation of a fitted vectorizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorizerArtifact {
    /// Term -> column index
    pub vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per column; plain counts when absent
    #[serde(default)]
    pub idf: Option<Vec<f64>>,
    #[serde(default = "default_lowercase")]
    pub lowercase: bool,
    #[serde(default = "default_ngram_range")]
    pub ngram_range: (usize, usize),
    #[serde(default)]
    pub stop_words: Vec<String>,
    #[serde(default)]
    pub binary: bool,
    #[serde(default)]
    pub sublinear_tf: bool,
    #[serde(default = "default_norm")]
    pub norm: Option<Norm>,
}

impl VectorizerArtifact {
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Fitted TF-IDF vectorizer
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Option<Vec<f64>>,
    lowercase: bool,
    ngram_range: (usize, usize),
    stop_words: HashSet<String>,
    binary: bool,
    sublinear_tf: bool,
    norm: Option<Norm>,
    width: usize,
}

impl TfidfVectorizer {
    /// Validate an artifact and build the vectorizer
    pub fn from_artifact(artifact: VectorizerArtifact) -> Result<Self> {
        let width = artifact.vocabulary.len();
        ensure!(width > 0, "vectorizer artifact has an empty vocabulary");
        ensure!(
            artifact.vocabulary.values().all(|idx| *idx < width),
            "vectorizer vocabulary indices must be below {}",
            width
        );
        let distinct: HashSet<usize> = artifact.vocabulary.values().copied().collect();
        ensure!(
            distinct.len() == width,
            "vectorizer vocabulary maps several terms to the same column"
        );
        if let Some(idf) = &artifact.idf {
            ensure!(
                idf.len() == width,
                "vectorizer has {} idf weights for {} terms",
                idf.len(),
                width
            );
        }
        let (min_n, max_n) = artifact.ngram_range;
        ensure!(
            min_n >= 1 && min_n <= max_n,
            "invalid ngram_range ({}, {})",
            min_n,
            max_n
        );

        Ok(Self {
            vocabulary: artifact.vocabulary,
            idf: artifact.idf,
            lowercase: artifact.lowercase,
            ngram_range: artifact.ngram_range,
            stop_words: artifact.stop_words.into_iter().collect(),
            binary: artifact.binary,
            sublinear_tf: artifact.sublinear_tf,
            norm: artifact.norm,
            width,
        })
    }

    /// Split a document into terms, including word n-grams
    fn analyze(&self, document: &str) -> Vec<String> {
        let text = if self.lowercase {
            document.to_lowercase()
        } else {
            document.to_string()
        };

        let words: Vec<&str> = tokenize(&text)
            .into_iter()
            .filter(|w| !self.stop_words.contains(*w))
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut terms = Vec::new();
        for n in min_n..=max_n {
            if n > words.len() {
                break;
            }
            for window in words.windows(n) {
                terms.push(window.join(" "));
            }
        }
        terms
    }

    fn vectorize(&self, document: &str) -> Vec<f64> {
        let mut counts = vec![0.0f64; self.width];
        for term in self.analyze(document) {
            if let Some(&idx) = self.vocabulary.get(&term) {
                counts[idx] += 1.0;
            }
        }

        for (idx, value) in counts.iter_mut().enumerate() {
            if *value == 0.0 {
                continue;
            }
            if self.binary {
                *value = 1.0;
            } else if self.sublinear_tf {
                *value = 1.0 + value.ln();
            }
            if let Some(idf) = &self.idf {
                *value *= idf[idx];
            }
        }

        let scale = match self.norm {
            Some(Norm::L2) => counts.iter().map(|v| v * v).sum::<f64>().sqrt(),
            Some(Norm::L1) => counts.iter().map(|v| v.abs()).sum::<f64>(),
            None => 1.0,
        };
        if scale > 0.0 {
            for value in &mut counts {
                *value /= scale;
            }
        }

        counts
    }
}

/// Runs of two or more word characters
///
/// Combining marks are not word characters, so a decomposed accent splits
/// the token the same way a `\w\w+` token pattern does.
fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|token| token.chars().count() >= 2)
        .collect()
}

impl Vectorizer for TfidfVectorizer {
    fn transform(&self, documents: &[&str]) -> Result<Matrix> {
        let mut data = Vec::with_capacity(documents.len() * self.width);
        for document in documents {
            data.extend(self.vectorize(document));
        }
        Ok(Matrix::from_shape_vec((documents.len(), self.width), data)?)
    }

    fn vocabulary_size(&self) -> usize {
        self.width
    }
}
