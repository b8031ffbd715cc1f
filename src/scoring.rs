//! Batch-relative importance scoring.
//!
//! Scores are only meaningful within the batch they were computed from:
//! the vector space is rebuilt per batch and normalization is min-max over
//! the batch's raw scores.

use tracing::warn;

use crate::item::CanonicalItem;
use crate::text::TfidfSpace;
use crate::{StageStatus, TARGET_PIPELINE};

/// Score assigned to every item when the batch is too degenerate to rank.
pub const UNIFORM_SCORE: f64 = 0.5;

/// One importance score per input item, in [0, 1], plus how the stage
/// arrived at them.
#[derive(Debug)]
pub struct ScoreSet {
    pub scores: Vec<f64>,
    pub status: StageStatus,
}

#[derive(Debug, Default)]
pub struct ImportanceScorer;

impl ImportanceScorer {
    pub fn new() -> Self {
        Self
    }

    /// Scores a batch. Never fails: a degenerate batch (no indexable
    /// vocabulary) falls back to a uniform score for every item.
    pub fn score(&self, items: &[CanonicalItem]) -> ScoreSet {
        if items.is_empty() {
            return ScoreSet {
                scores: Vec::new(),
                status: StageStatus::Ok,
            };
        }

        let texts: Vec<String> = items.iter().map(|item| item.raw_full_text()).collect();
        match raw_scores(&texts) {
            Ok(raw) => ScoreSet {
                scores: normalize(&raw),
                status: StageStatus::Ok,
            },
            Err(err) => {
                warn!(
                    target: TARGET_PIPELINE,
                    "Importance scoring degraded to uniform scores: {}", err
                );
                ScoreSet {
                    scores: vec![UNIFORM_SCORE; items.len()],
                    status: StageStatus::degraded(format!("uniform scores: {}", err)),
                }
            }
        }
    }
}

/// Raw score per document: the document's total weight times the dot
/// product of its vector with the global term-importance vector.
fn raw_scores(texts: &[String]) -> anyhow::Result<Vec<f64>> {
    let space = TfidfSpace::build(texts)?;
    let importance = space.term_importance();

    let scores = (0..space.doc_count())
        .map(|doc| {
            let row = space.row(doc);
            let length_factor: f64 = row.iter().sum();
            let relevance: f64 = row
                .iter()
                .zip(importance.iter())
                .map(|(w, imp)| w * imp)
                .sum();
            length_factor * relevance
        })
        .collect();
    Ok(scores)
}

/// Min-max normalization to [0, 1]. A batch whose raw scores are all equal
/// cannot be ranked; every item gets the uniform score instead.
fn normalize(raw: &[f64]) -> Vec<f64> {
    let min = raw.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = raw.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![UNIFORM_SCORE; raw.len()];
    }
    raw.iter().map(|s| (s - min) / (max - min)).collect()
}
