//! Batch-local text vectorization: tokenization, TF-IDF weighting, and
//! cosine similarity. The vocabulary and all weights are derived from the
//! batch at hand and discarded with it; nothing here persists across
//! invocations.

mod stopwords;

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashMap;
use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use stopwords::STOP_WORDS;

/// Vocabulary cap; beyond this the most frequent terms win.
pub const MAX_VOCABULARY: usize = 1_000;

static STEMMER: Lazy<Stemmer> = Lazy::new(|| Stemmer::create(Algorithm::English));

/// Lowercased, NFC-normalized, stop-word-filtered, stemmed tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfc().collect::<String>().to_lowercase();
    normalized
        .unicode_words()
        .filter(|w| w.chars().count() >= 2)
        .filter(|w| STOP_WORDS.binary_search(w).is_err())
        .map(|w| STEMMER.stem(w).into_owned())
        .collect()
}

/// Unigrams plus adjacent bigrams over the filtered token stream.
fn terms_of(tokens: &[String]) -> Vec<String> {
    let mut terms = Vec::with_capacity(tokens.len() * 2);
    terms.extend(tokens.iter().cloned());
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

/// TF-IDF vector space over one batch of documents. Rows are L2-normalized.
pub struct TfidfSpace {
    vocabulary: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl TfidfSpace {
    /// Builds the space from raw document texts. Fails when the batch
    /// yields no indexable terms (empty texts, stop words only) so callers
    /// can apply their documented fallback.
    pub fn build(texts: &[String]) -> Result<Self> {
        let docs: Vec<Vec<String>> = texts
            .iter()
            .map(|text| terms_of(&tokenize(text)))
            .collect();

        let mut corpus_counts: HashMap<&str, usize> = HashMap::new();
        for doc in &docs {
            for term in doc {
                *corpus_counts.entry(term.as_str()).or_insert(0) += 1;
            }
        }
        if corpus_counts.is_empty() {
            return Err(anyhow!("no indexable terms in batch"));
        }

        // Cap the vocabulary at the most frequent terms; ties break
        // lexicographically so the space is deterministic.
        let mut ranked: Vec<(&str, usize)> = corpus_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked.truncate(MAX_VOCABULARY);
        let vocabulary: Vec<String> = ranked.iter().map(|(term, _)| term.to_string()).collect();
        let index: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(col, term)| (term.as_str(), col))
            .collect();

        let mut df = vec![0usize; vocabulary.len()];
        let mut rows: Vec<Vec<f64>> = Vec::with_capacity(docs.len());
        for doc in &docs {
            let mut tf = vec![0.0f64; vocabulary.len()];
            for term in doc {
                if let Some(&col) = index.get(term.as_str()) {
                    tf[col] += 1.0;
                }
            }
            for (col, &count) in tf.iter().enumerate() {
                if count > 0.0 {
                    df[col] += 1;
                }
            }
            rows.push(tf);
        }

        // Smoothed IDF, then L2-normalize each row. All-zero rows (documents
        // fully outside the capped vocabulary) stay zero.
        let n = docs.len() as f64;
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();
        for row in &mut rows {
            for (col, weight) in row.iter_mut().enumerate() {
                *weight *= idf[col];
            }
            let norm = row.iter().map(|w| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for weight in row.iter_mut() {
                    *weight /= norm;
                }
            }
        }

        Ok(Self { vocabulary, rows })
    }

    pub fn doc_count(&self) -> usize {
        self.rows.len()
    }

    pub fn term_count(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn row(&self, doc: usize) -> &[f64] {
        &self.rows[doc]
    }

    /// Global term weights: the square root of each term's mean weight
    /// across the batch.
    pub fn term_importance(&self) -> Vec<f64> {
        let n = self.rows.len() as f64;
        (0..self.vocabulary.len())
            .map(|col| {
                let mean = self.rows.iter().map(|row| row[col]).sum::<f64>() / n;
                mean.sqrt()
            })
            .collect()
    }

    /// Symmetric pairwise cosine-similarity matrix over all documents.
    pub fn similarity_matrix(&self) -> Vec<Vec<f64>> {
        let n = self.rows.len();
        let mut matrix = vec![vec![0.0f64; n]; n];
        for i in 0..n {
            matrix[i][i] = 1.0;
            for j in (i + 1)..n {
                let similarity = cosine(&self.rows[i], &self.rows[j]);
                matrix[i][j] = similarity;
                matrix[j][i] = similarity;
            }
        }
        matrix
    }
}

/// Cosine similarity between two equal-length weight vectors, clamped to
/// [0, 1]. A near-zero magnitude on either side yields 0 rather than an
/// undefined ratio.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    let mag_a = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_a < 1e-9 || mag_b < 1e-9 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
}
