//! Collapses clusters to their representative item plus alternate sources.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use super::types::{Cluster, FormattedCluster, SourceRef};
use crate::item::CanonicalItem;
use crate::TARGET_PIPELINE;

pub struct ClusterFormatter {
    pub words_per_minute: u32,
}

impl ClusterFormatter {
    pub fn new(words_per_minute: u32) -> Self {
        Self { words_per_minute }
    }

    /// Formats clusters over a batch and its parallel importance scores,
    /// sorted by primary importance descending. The cap is applied after
    /// sorting so the most important clusters are never truncated away.
    pub fn format(
        &self,
        items: &[CanonicalItem],
        scores: &[f64],
        clusters: &[Cluster],
        max_clusters: usize,
    ) -> Vec<FormattedCluster> {
        let mut formatted: Vec<FormattedCluster> = clusters
            .iter()
            .filter(|cluster| !cluster.members.is_empty())
            .map(|cluster| self.format_one(items, scores, cluster))
            .collect();

        formatted.sort_by(|a, b| {
            b.importance_score
                .partial_cmp(&a.importance_score)
                .unwrap_or(Ordering::Equal)
        });
        formatted.truncate(max_clusters);

        debug!(
            target: TARGET_PIPELINE,
            "Formatted {} clusters (cap {})",
            formatted.len(),
            max_clusters
        );
        formatted
    }

    fn format_one(
        &self,
        items: &[CanonicalItem],
        scores: &[f64],
        cluster: &Cluster,
    ) -> FormattedCluster {
        // Primary member: highest importance, first in discovery order on a tie.
        let mut primary = cluster.members[0];
        for &member in &cluster.members[1..] {
            if scores[member] > scores[primary] {
                primary = member;
            }
        }

        let read_time_total: u32 = cluster
            .members
            .iter()
            .map(|&m| items[m].read_time_minutes(self.words_per_minute))
            .sum();
        let average_read_time = (read_time_total / cluster.members.len() as u32).max(1);

        let categories: BTreeSet<String> = cluster
            .members
            .iter()
            .flat_map(|&m| items[m].categories.iter().cloned())
            .collect();

        let sources = cluster
            .members
            .iter()
            .map(|&m| SourceRef {
                name: items[m].source_name.clone(),
                link: items[m].link.clone(),
                published_at: items[m].published_at,
                author: items[m].author.clone(),
            })
            .collect();

        FormattedCluster {
            title: items[primary].title.clone(),
            description: items[primary].description.clone(),
            link: items[primary].link.clone(),
            primary_source: items[primary].source_name.clone(),
            average_read_time,
            importance_score: scores[primary],
            categories,
            sources,
        }
    }
}
