//! Sentiment consensus across the sources of one cluster, and the
//! batch-level summary across all clusters.

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;
use tracing::warn;

use crate::clustering::FormattedCluster;
use crate::sentiment::{SentimentAnalyzer, SentimentLabel, SentimentResult};
use crate::{StageStatus, TARGET_SENTIMENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsensusLevel {
    High,
    Moderate,
    Low,
}

/// One source's tone inside a cluster.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSentiment {
    pub source_name: String,
    pub sentiment: SentimentResult,
}

/// How the sources of one cluster agree or disagree in tone.
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSentiment {
    pub overall_label: SentimentLabel,
    pub mean_polarity: f64,
    pub polarity_variance: f64,
    pub consensus_level: ConsensusLevel,
    pub has_divergent_views: bool,
    pub most_positive_source: Option<String>,
    pub most_negative_source: Option<String>,
    pub per_source: Vec<SourceSentiment>,
}

impl ClusterSentiment {
    fn empty() -> Self {
        Self {
            overall_label: SentimentLabel::Neutral,
            mean_polarity: 0.0,
            polarity_variance: 0.0,
            consensus_level: ConsensusLevel::High,
            has_divergent_views: false,
            most_positive_source: None,
            most_negative_source: None,
            per_source: Vec::new(),
        }
    }
}

/// Consensus for one cluster plus the baseline reading of its content,
/// which feeds the batch summary.
#[derive(Debug)]
pub struct ClusterConsensus {
    pub sentiment: ClusterSentiment,
    pub baseline: SentimentResult,
    pub status: StageStatus,
}

/// Computes the consensus for one cluster. Source-level tone is read from
/// each source's display name; the cluster's own title and description
/// give the content baseline. Never fails: a cluster without sources
/// yields the neutral empty consensus and leaves siblings untouched.
pub fn cluster_consensus(
    analyzer: &SentimentAnalyzer,
    cluster: &FormattedCluster,
) -> ClusterConsensus {
    let baseline = analyzer.analyze(&format!("{} {}", cluster.title, cluster.description));

    if cluster.sources.is_empty() {
        warn!(
            target: TARGET_SENTIMENT,
            "Cluster '{}' has no sources, returning empty consensus", cluster.title
        );
        return ClusterConsensus {
            sentiment: ClusterSentiment::empty(),
            baseline,
            status: StageStatus::degraded("cluster has no sources"),
        };
    }

    let per_source: Vec<SourceSentiment> = cluster
        .sources
        .iter()
        .map(|source| SourceSentiment {
            source_name: source.name.clone(),
            sentiment: analyzer.analyze(&source.name),
        })
        .collect();

    let polarities: Vec<f64> = per_source.iter().map(|s| s.sentiment.polarity).collect();
    let mean_polarity = polarities.iter().sum::<f64>() / polarities.len() as f64;
    let polarity_variance = if polarities.len() < 2 {
        0.0
    } else {
        polarities
            .iter()
            .map(|p| (p - mean_polarity).powi(2))
            .sum::<f64>()
            / polarities.len() as f64
    };

    // Strictly-greater maxima keep the earliest source on ties.
    let mut most_positive = &per_source[0];
    let mut most_negative = &per_source[0];
    for source in &per_source[1..] {
        if source.sentiment.polarity > most_positive.sentiment.polarity {
            most_positive = source;
        }
        if source.sentiment.polarity < most_negative.sentiment.polarity {
            most_negative = source;
        }
    }

    let consensus_level = consensus_level(polarity_variance);
    let sentiment = ClusterSentiment {
        overall_label: overall_label(mean_polarity),
        mean_polarity,
        polarity_variance,
        consensus_level,
        has_divergent_views: consensus_level == ConsensusLevel::Low,
        most_positive_source: (most_positive.sentiment.polarity > 0.0)
            .then(|| most_positive.source_name.clone()),
        most_negative_source: (most_negative.sentiment.polarity < 0.0)
            .then(|| most_negative.source_name.clone()),
        per_source,
    };

    ClusterConsensus {
        sentiment,
        baseline,
        status: StageStatus::Ok,
    }
}

/// Agreement band from polarity variance. The band edges belong to the
/// weaker level: exactly 0.03 is moderate, exactly 0.1 is low.
pub fn consensus_level(variance: f64) -> ConsensusLevel {
    if variance < 0.03 {
        ConsensusLevel::High
    } else if variance < 0.1 {
        ConsensusLevel::Moderate
    } else {
        ConsensusLevel::Low
    }
}

/// Label from a mean polarity, strict ±0.1 thresholds.
fn overall_label(mean_polarity: f64) -> SentimentLabel {
    if mean_polarity > 0.1 {
        SentimentLabel::Positive
    } else if mean_polarity < -0.1 {
        SentimentLabel::Negative
    } else {
        SentimentLabel::Neutral
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelCount {
    pub count: usize,
    pub percent: f64,
}

/// Aggregate tone over the clusters sharing one category tag.
#[derive(Debug, Clone, Serialize)]
pub struct TopicSentiment {
    pub count: usize,
    pub average_polarity: f64,
    pub label: SentimentLabel,
}

/// Batch-level distribution of content tone across all clusters.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentSummary {
    pub overall_label: SentimentLabel,
    pub total_items: usize,
    pub positive: LabelCount,
    pub neutral: LabelCount,
    pub negative: LabelCount,
    pub topics: BTreeMap<String, TopicSentiment>,
}

/// Builds the summary from each cluster's baseline sentiment and category
/// tags. An empty batch produces the all-zero summary.
pub fn build_summary(
    total_items: usize,
    entries: &[(SentimentResult, BTreeSet<String>)],
) -> SentimentSummary {
    let mut positive = 0usize;
    let mut neutral = 0usize;
    let mut negative = 0usize;
    let mut topic_polarities: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for (baseline, categories) in entries {
        match baseline.label {
            SentimentLabel::Positive => positive += 1,
            SentimentLabel::Neutral => neutral += 1,
            SentimentLabel::Negative => negative += 1,
        }
        for category in categories {
            topic_polarities
                .entry(category.clone())
                .or_default()
                .push(baseline.polarity);
        }
    }

    let n = entries.len();
    let percent = |count: usize| {
        if n == 0 {
            0.0
        } else {
            count as f64 * 100.0 / n as f64
        }
    };
    let mean_polarity = if n == 0 {
        0.0
    } else {
        entries.iter().map(|(b, _)| b.polarity).sum::<f64>() / n as f64
    };

    let topics = topic_polarities
        .into_iter()
        .map(|(topic, polarities)| {
            let average = polarities.iter().sum::<f64>() / polarities.len() as f64;
            (
                topic,
                TopicSentiment {
                    count: polarities.len(),
                    average_polarity: average,
                    label: overall_label(average),
                },
            )
        })
        .collect();

    SentimentSummary {
        overall_label: overall_label(mean_polarity),
        total_items,
        positive: LabelCount {
            count: positive,
            percent: percent(positive),
        },
        neutral: LabelCount {
            count: neutral,
            percent: percent(neutral),
        },
        negative: LabelCount {
            count: negative,
            percent: percent(negative),
        },
        topics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clustering::SourceRef;
    use crate::config::CurateConfig;
    use crate::sentiment::BackendKind;

    fn formatted(sources: &[&str]) -> FormattedCluster {
        FormattedCluster {
            title: "Markets tumble worldwide".to_string(),
            description: "A terrible crash wiped out early gains across exchanges".to_string(),
            link: "https://example.com/story".to_string(),
            primary_source: sources.first().unwrap_or(&"none").to_string(),
            average_read_time: 1,
            importance_score: 0.8,
            categories: BTreeSet::new(),
            sources: sources
                .iter()
                .map(|name| SourceRef {
                    name: name.to_string(),
                    link: format!("https://example.com/{}", name),
                    published_at: None,
                    author: None,
                })
                .collect(),
        }
    }

    async fn analyzer() -> SentimentAnalyzer {
        let config = CurateConfig {
            sentiment_backend: BackendKind::Basic,
            ..CurateConfig::default()
        };
        SentimentAnalyzer::init(&config).await
    }

    #[test]
    fn consensus_level_band_edges() {
        assert_eq!(consensus_level(0.0299), ConsensusLevel::High);
        assert_eq!(consensus_level(0.03), ConsensusLevel::Moderate);
        assert_eq!(consensus_level(0.0999), ConsensusLevel::Moderate);
        assert_eq!(consensus_level(0.1), ConsensusLevel::Low);
    }

    #[tokio::test]
    async fn single_source_cluster_has_zero_variance() {
        let analyzer = analyzer().await;
        let consensus = cluster_consensus(&analyzer, &formatted(&["Wire Service"]));
        assert_eq!(consensus.sentiment.polarity_variance, 0.0);
        assert_eq!(consensus.sentiment.per_source.len(), 1);
        assert_eq!(consensus.status, StageStatus::Ok);
    }

    #[tokio::test]
    async fn sourceless_cluster_degrades_without_failing() {
        let analyzer = analyzer().await;
        let consensus = cluster_consensus(&analyzer, &formatted(&[]));
        assert!(consensus.status.is_degraded());
        assert!(consensus.sentiment.per_source.is_empty());
        assert_eq!(consensus.sentiment.overall_label, SentimentLabel::Neutral);
        assert!(consensus.sentiment.most_positive_source.is_none());
        assert!(consensus.sentiment.most_negative_source.is_none());
    }

    #[tokio::test]
    async fn neutral_sources_name_no_extremes() {
        let analyzer = analyzer().await;
        // Source display names carry no lexicon words, so every per-source
        // polarity is 0 and neither extreme is nameable.
        let consensus = cluster_consensus(&analyzer, &formatted(&["Morning Courier", "Daily Ledger"]));
        assert!(consensus.sentiment.most_positive_source.is_none());
        assert!(consensus.sentiment.most_negative_source.is_none());
        assert_eq!(consensus.sentiment.consensus_level, ConsensusLevel::High);
        assert!(!consensus.sentiment.has_divergent_views);
    }

    #[test]
    fn summary_counts_and_percentages() {
        let pos = SentimentResult {
            polarity: 0.6,
            subjectivity: 0.5,
            label: SentimentLabel::Positive,
            confidence: 1.0,
        };
        let neg = SentimentResult {
            polarity: -0.5,
            subjectivity: 0.5,
            label: SentimentLabel::Negative,
            confidence: 0.9,
        };
        let tags: BTreeSet<String> = ["ai".to_string()].into_iter().collect();
        let entries = vec![
            (pos.clone(), tags.clone()),
            (pos, BTreeSet::new()),
            (neg, tags),
        ];
        let summary = build_summary(7, &entries);

        assert_eq!(summary.total_items, 7);
        assert_eq!(summary.positive.count, 2);
        assert_eq!(summary.negative.count, 1);
        assert_eq!(summary.neutral.count, 0);
        assert!((summary.positive.percent - 66.666).abs() < 0.01);
        let ai = &summary.topics["ai"];
        assert_eq!(ai.count, 2);
        assert!((ai.average_polarity - 0.05).abs() < 1e-9);
        assert_eq!(ai.label, SentimentLabel::Neutral);
    }

    #[test]
    fn empty_summary_is_all_zero() {
        let summary = build_summary(0, &[]);
        assert_eq!(summary.overall_label, SentimentLabel::Neutral);
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.positive.count, 0);
        assert_eq!(summary.positive.percent, 0.0);
        assert!(summary.topics.is_empty());
    }
}
