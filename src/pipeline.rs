//! The curation pipeline: fetch → score → cluster → format → consensus.
//!
//! One pipeline value owns its collaborators and a reusable sentiment
//! backend handle; each invocation owns its batch, so no state is shared
//! across invocations.

use std::cmp::Ordering;
use tracing::info;

use crate::clustering::{ClusterFormatter, FormattedCluster, SimilarityClusterer};
use crate::config::CurateConfig;
use crate::consensus::{build_summary, cluster_consensus, ClusterSentiment, SentimentSummary};
use crate::feeds::FeedFetcher;
use crate::item::CanonicalItem;
use crate::scoring::ImportanceScorer;
use crate::sentiment::SentimentAnalyzer;
use crate::{StageStatus, TARGET_PIPELINE};

/// Clustering sees this many times the requested item count, so
/// near-duplicates of the top stories are available to merge before the
/// final cap is applied.
const CLUSTER_POOL_FACTOR: usize = 3;

#[derive(Debug, Clone)]
pub struct CurationRequest {
    /// Cap on the number of returned clusters, applied after ranking.
    pub max_items: usize,
    /// Optional case-insensitive keyword filter over each item's text.
    pub keywords: Option<Vec<String>>,
    /// Overrides the configured similarity threshold for this request.
    pub similarity_threshold: Option<f64>,
    /// Toggles the consensus stage and the batch summary.
    pub include_sentiment: bool,
}

impl Default for CurationRequest {
    fn default() -> Self {
        Self {
            max_items: 10,
            keywords: None,
            similarity_threshold: None,
            include_sentiment: false,
        }
    }
}

impl CurationRequest {
    /// A request carrying the configured defaults.
    pub fn from_config(config: &CurateConfig) -> Self {
        Self {
            max_items: config.max_items,
            ..Self::default()
        }
    }
}

#[derive(Debug)]
pub struct CuratedCluster {
    pub cluster: FormattedCluster,
    pub sentiment: Option<ClusterSentiment>,
}

#[derive(Debug)]
pub struct CurationResult {
    pub clusters: Vec<CuratedCluster>,
    pub summary: Option<SentimentSummary>,
    pub total_items_considered: usize,
    pub status: StageStatus,
}

pub struct CurationPipeline {
    config: CurateConfig,
    fetcher: FeedFetcher,
    scorer: ImportanceScorer,
    formatter: ClusterFormatter,
    analyzer: SentimentAnalyzer,
}

impl CurationPipeline {
    /// Builds the pipeline and its collaborators from one immutable
    /// configuration. The sentiment backend is initialized here, once, and
    /// reused across every request.
    pub async fn init(config: CurateConfig) -> anyhow::Result<Self> {
        let fetcher = FeedFetcher::new(&config)?;
        let analyzer = SentimentAnalyzer::init(&config).await;
        let formatter = ClusterFormatter::new(config.words_per_minute);
        Ok(Self {
            config,
            fetcher,
            scorer: ImportanceScorer::new(),
            formatter,
            analyzer,
        })
    }

    /// Retrieves every configured feed and curates the resulting batch.
    pub async fn curate(&self, request: &CurationRequest) -> CurationResult {
        let report = self.fetcher.fetch_all(&self.config.feeds).await;
        self.curate_batch(report.items, request)
    }

    /// Curates an already-materialized batch. Pre-filtered and unfiltered
    /// input is accepted uniformly; an empty batch yields a well-formed
    /// empty result, never an error.
    pub fn curate_batch(
        &self,
        items: Vec<CanonicalItem>,
        request: &CurationRequest,
    ) -> CurationResult {
        let total = items.len();
        let items = match &request.keywords {
            Some(keywords) if !keywords.is_empty() => filter_by_keywords(items, keywords),
            _ => items,
        };

        if items.is_empty() {
            info!(target: TARGET_PIPELINE, "No items to curate");
            return CurationResult {
                clusters: Vec::new(),
                summary: request
                    .include_sentiment
                    .then(|| build_summary(total, &[])),
                total_items_considered: total,
                status: StageStatus::Ok,
            };
        }

        let score_set = self.scorer.score(&items);

        // Rank by importance and keep a pool large enough for clustering.
        let mut order: Vec<usize> = (0..items.len()).collect();
        order.sort_by(|&a, &b| {
            score_set.scores[b]
                .partial_cmp(&score_set.scores[a])
                .unwrap_or(Ordering::Equal)
        });
        order.truncate(request.max_items.saturating_mul(CLUSTER_POOL_FACTOR));

        let batch: Vec<CanonicalItem> = order.iter().map(|&i| items[i].clone()).collect();
        let batch_scores: Vec<f64> = order.iter().map(|&i| score_set.scores[i]).collect();

        let clusterer = SimilarityClusterer::new(
            request
                .similarity_threshold
                .unwrap_or(self.config.similarity_threshold),
        );
        let cluster_set = clusterer.cluster(&batch);
        let formatted = self.formatter.format(
            &batch,
            &batch_scores,
            &cluster_set.clusters,
            request.max_items,
        );

        let mut status = score_set.status.merge(cluster_set.status);

        let (clusters, summary) = if request.include_sentiment {
            let mut curated = Vec::with_capacity(formatted.len());
            let mut entries = Vec::with_capacity(formatted.len());
            for cluster in formatted {
                let consensus = cluster_consensus(&self.analyzer, &cluster);
                status = status.merge(consensus.status);
                entries.push((consensus.baseline, cluster.categories.clone()));
                curated.push(CuratedCluster {
                    cluster,
                    sentiment: Some(consensus.sentiment),
                });
            }
            (curated, Some(build_summary(total, &entries)))
        } else {
            (
                formatted
                    .into_iter()
                    .map(|cluster| CuratedCluster {
                        cluster,
                        sentiment: None,
                    })
                    .collect(),
                None,
            )
        };

        info!(
            target: TARGET_PIPELINE,
            "Curated {} clusters from {} items", clusters.len(), total
        );
        CurationResult {
            clusters,
            summary,
            total_items_considered: total,
            status,
        }
    }
}

/// Case-insensitive substring filter over each item's full text.
pub fn filter_by_keywords(items: Vec<CanonicalItem>, keywords: &[String]) -> Vec<CanonicalItem> {
    items
        .into_iter()
        .filter(|item| {
            let text = item.raw_full_text().to_lowercase();
            keywords
                .iter()
                .any(|keyword| text.contains(&keyword.to_lowercase()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::BackendKind;
    use std::collections::BTreeSet;

    fn item(title: &str, description: &str, source: &str) -> CanonicalItem {
        CanonicalItem {
            title: title.to_string(),
            description: description.to_string(),
            link: format!("https://{}.example.com/story", source.to_lowercase()),
            source_name: source.to_string(),
            published_at: None,
            author: None,
            categories: BTreeSet::new(),
        }
    }

    fn four_item_batch() -> Vec<CanonicalItem> {
        vec![
            item(
                "Central bank raises rates to tame inflation",
                "The central bank raised interest rates citing persistent inflation \
                 pressure across markets",
                "A",
            ),
            item(
                "Central bank raises rates amid inflation fight",
                "The central bank raised interest rates citing persistent inflation \
                 pressure across economies",
                "B",
            ),
            item(
                "Local team clinches championship title",
                "Fans celebrated downtown after the team won its first championship \
                 in decades",
                "C",
            ),
            item(
                "New exoplanet discovered by space telescope",
                "Astronomers confirmed an exoplanet orbiting a distant star using \
                 the space telescope",
                "D",
            ),
        ]
    }

    async fn pipeline() -> CurationPipeline {
        let config = CurateConfig {
            sentiment_backend: BackendKind::Basic,
            ..CurateConfig::default()
        };
        CurationPipeline::init(config).await.unwrap()
    }

    #[tokio::test]
    async fn near_duplicates_merge_and_carry_both_sources() {
        let pipeline = pipeline().await;
        let request = CurationRequest {
            include_sentiment: true,
            ..CurationRequest::default()
        };
        let result = pipeline.curate_batch(four_item_batch(), &request);

        assert_eq!(result.clusters.len(), 3);
        assert_eq!(result.total_items_considered, 4);
        assert!(result.summary.is_some());

        let merged = result
            .clusters
            .iter()
            .find(|c| c.cluster.sources.len() == 2)
            .expect("one cluster should hold the near-duplicate pair");
        let names: Vec<&str> = merged
            .cluster
            .sources
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert!(names.contains(&"A") && names.contains(&"B"));

        let sentiment = merged.sentiment.as_ref().unwrap();
        let analyzed: Vec<&str> = sentiment
            .per_source
            .iter()
            .map(|s| s.source_name.as_str())
            .collect();
        assert!(analyzed.contains(&"A") && analyzed.contains(&"B"));

        // The two unrelated items stay singletons.
        assert_eq!(
            result
                .clusters
                .iter()
                .filter(|c| c.cluster.sources.len() == 1)
                .count(),
            2
        );
    }

    #[tokio::test]
    async fn empty_batch_yields_well_formed_empty_result() {
        let pipeline = pipeline().await;
        let request = CurationRequest {
            include_sentiment: true,
            ..CurationRequest::default()
        };
        let result = pipeline.curate_batch(Vec::new(), &request);

        assert!(result.clusters.is_empty());
        assert_eq!(result.total_items_considered, 0);
        assert_eq!(result.status, StageStatus::Ok);
        let summary = result.summary.unwrap();
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.positive.count, 0);
        assert_eq!(summary.neutral.count, 0);
        assert_eq!(summary.negative.count, 0);
    }

    #[tokio::test]
    async fn keyword_filter_narrows_the_batch() {
        let pipeline = pipeline().await;
        let request = CurationRequest {
            keywords: Some(vec!["exoplanet".to_string()]),
            ..CurationRequest::default()
        };
        let result = pipeline.curate_batch(four_item_batch(), &request);

        assert_eq!(result.clusters.len(), 1);
        assert_eq!(result.clusters[0].cluster.primary_source, "D");
        assert_eq!(result.total_items_considered, 4);
    }

    #[tokio::test]
    async fn filter_with_no_matches_is_empty_not_an_error() {
        let pipeline = pipeline().await;
        let request = CurationRequest {
            keywords: Some(vec!["cryptozoology".to_string()]),
            ..CurationRequest::default()
        };
        let result = pipeline.curate_batch(four_item_batch(), &request);

        assert!(result.clusters.is_empty());
        assert_eq!(result.status, StageStatus::Ok);
    }

    #[tokio::test]
    async fn max_items_caps_the_cluster_list() {
        let pipeline = pipeline().await;
        let request = CurationRequest {
            max_items: 2,
            ..CurationRequest::default()
        };
        let result = pipeline.curate_batch(four_item_batch(), &request);
        assert!(result.clusters.len() <= 2);
    }

    #[tokio::test]
    async fn degenerate_batch_degrades_but_still_answers() {
        let pipeline = pipeline().await;
        let batch = vec![item("the", "of and", "A"), item("the", "of and", "B")];
        let result = pipeline.curate_batch(batch, &CurationRequest::default());

        assert!(result.status.is_degraded());
        // Uniform scores and singleton clusters still produce output.
        assert!(!result.clusters.is_empty());
    }
}
