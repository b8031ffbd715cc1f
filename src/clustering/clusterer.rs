//! Single-pass greedy similarity clustering.

use tracing::{info, warn};

use super::types::{Cluster, ClusterSet};
use crate::item::CanonicalItem;
use crate::text::TfidfSpace;
use crate::{StageStatus, TARGET_PIPELINE};

pub struct SimilarityClusterer {
    pub threshold: f64,
}

impl SimilarityClusterer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Groups near-duplicate items. Never fails: when the batch cannot be
    /// vectorized, every item becomes its own singleton cluster.
    pub fn cluster(&self, items: &[CanonicalItem]) -> ClusterSet {
        if items.is_empty() {
            return ClusterSet {
                clusters: Vec::new(),
                status: StageStatus::Ok,
            };
        }

        let texts: Vec<String> = items.iter().map(|item| item.raw_full_text()).collect();
        let matrix = match TfidfSpace::build(&texts) {
            Ok(space) => space.similarity_matrix(),
            Err(err) => {
                warn!(
                    target: TARGET_PIPELINE,
                    "Similarity computation failed, falling back to singleton clusters: {}",
                    err
                );
                return ClusterSet {
                    clusters: (0..items.len())
                        .map(|i| Cluster { members: vec![i] })
                        .collect(),
                    status: StageStatus::degraded(format!("singleton clusters: {}", err)),
                };
            }
        };

        let mut clusters = cluster_with_matrix(items.len(), &matrix, self.threshold);

        // Largest stories first; ties keep discovery order.
        clusters.sort_by(|a, b| b.size().cmp(&a.size()));

        info!(
            target: TARGET_PIPELINE,
            "Grouped {} items into {} clusters",
            items.len(),
            clusters.len()
        );
        ClusterSet {
            clusters,
            status: StageStatus::Ok,
        }
    }
}

/// The greedy pass itself, over a precomputed similarity matrix.
///
/// Items are visited in batch order. An unclaimed item opens a cluster and
/// claims every later unclaimed item whose similarity to *it* meets the
/// threshold. Membership is decided against the cluster's opening item
/// only, so an item similar to a claimed member but not to the opener
/// starts its own cluster; the result depends on batch order.
pub fn cluster_with_matrix(n: usize, matrix: &[Vec<f64>], threshold: f64) -> Vec<Cluster> {
    let mut claimed = vec![false; n];
    let mut clusters = Vec::new();

    for i in 0..n {
        if claimed[i] {
            continue;
        }
        claimed[i] = true;
        let mut members = vec![i];

        for j in 0..n {
            if i != j && !claimed[j] && matrix[i][j] >= threshold {
                claimed[j] = true;
                members.push(j);
            }
        }

        clusters.push(Cluster { members });
    }

    clusters
}
