use std::collections::BTreeSet;

use super::clusterer::{cluster_with_matrix, SimilarityClusterer};
use super::formatter::ClusterFormatter;
use super::types::Cluster;
use super::DEFAULT_SIMILARITY_THRESHOLD;
use crate::item::CanonicalItem;
use crate::StageStatus;

fn item(title: &str, description: &str, source: &str) -> CanonicalItem {
    CanonicalItem {
        title: title.to_string(),
        description: description.to_string(),
        link: format!("https://example.com/{}", source),
        source_name: source.to_string(),
        published_at: None,
        author: None,
        categories: BTreeSet::new(),
    }
}

#[test]
fn clusters_partition_the_batch() {
    let items = vec![
        item("Quantum chip unveiled", "A new quantum processor sets records", "A"),
        item("Quantum chip revealed", "A new quantum processor sets records", "B"),
        item("Elections postponed", "Voting delayed amid legal challenge", "C"),
        item("Transfer rumors swirl", "Striker linked with summer move abroad", "D"),
        item("Elections delayed", "Voting postponed amid court battle", "E"),
    ];
    let set = SimilarityClusterer::new(DEFAULT_SIMILARITY_THRESHOLD).cluster(&items);

    let mut seen: Vec<usize> = set
        .clusters
        .iter()
        .flat_map(|c| c.members.iter().copied())
        .collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..items.len()).collect::<Vec<_>>());
    assert!(set.clusters.iter().all(|c| !c.members.is_empty()));
}

#[test]
fn clustering_is_order_dependent_not_transitive() {
    // sim(A,B) and sim(B,C) meet the threshold, sim(A,C) does not. B is
    // claimed by A's cluster, so C never joins through B: it opens its own.
    let matrix = vec![
        vec![1.0, 0.70, 0.20],
        vec![0.70, 1.0, 0.65],
        vec![0.20, 0.65, 1.0],
    ];
    let clusters = cluster_with_matrix(3, &matrix, 0.6);

    assert_eq!(clusters.len(), 2);
    assert_eq!(clusters[0].members, vec![0, 1]);
    assert_eq!(clusters[1].members, vec![2]);
}

#[test]
fn clusters_sort_by_size_with_stable_ties() {
    let matrix = vec![
        vec![1.0, 0.1, 0.1, 0.1, 0.1],
        vec![0.1, 1.0, 0.9, 0.9, 0.1],
        vec![0.1, 0.9, 1.0, 0.9, 0.1],
        vec![0.1, 0.9, 0.9, 1.0, 0.1],
        vec![0.1, 0.1, 0.1, 0.1, 1.0],
    ];
    let mut clusters = cluster_with_matrix(5, &matrix, 0.6);
    clusters.sort_by(|a, b| b.size().cmp(&a.size()));

    assert_eq!(clusters[0].members, vec![1, 2, 3]);
    // The two singletons keep their discovery order.
    assert_eq!(clusters[1].members, vec![0]);
    assert_eq!(clusters[2].members, vec![4]);
}

#[test]
fn empty_batch_clusters_to_nothing() {
    let set = SimilarityClusterer::new(0.6).cluster(&[]);
    assert!(set.clusters.is_empty());
    assert_eq!(set.status, StageStatus::Ok);
}

#[test]
fn unvectorizable_batch_degrades_to_singletons() {
    let items = vec![item("the", "of and", "A"), item("", "", "B")];
    let set = SimilarityClusterer::new(0.6).cluster(&items);

    assert_eq!(set.clusters.len(), 2);
    assert!(set.clusters.iter().all(|c| c.members.len() == 1));
    assert!(set.status.is_degraded());
}

#[test]
fn formatter_picks_highest_scoring_primary_first_on_tie() {
    let items = vec![
        item("First", "short text here", "A"),
        item("Second", "short text here", "B"),
        item("Third", "short text here", "C"),
    ];
    let scores = vec![0.4, 0.9, 0.9];
    let cluster = Cluster {
        members: vec![0, 1, 2],
    };
    let formatted = ClusterFormatter::new(200).format(&items, &scores, &[cluster], 10);

    assert_eq!(formatted.len(), 1);
    // 0.9 tie between members 1 and 2 resolves to the earlier one.
    assert_eq!(formatted[0].primary_source, "B");
    assert_eq!(formatted[0].importance_score, 0.9);
    assert_eq!(formatted[0].sources.len(), 3);
    assert_eq!(formatted[0].average_read_time, 1);
}

#[test]
fn formatter_caps_after_sorting_by_importance() {
    let items = vec![
        item("Low", "text", "A"),
        item("High", "text", "B"),
        item("Mid", "text", "C"),
    ];
    let scores = vec![0.1, 0.9, 0.5];
    let clusters = vec![
        Cluster { members: vec![0] },
        Cluster { members: vec![1] },
        Cluster { members: vec![2] },
    ];
    let formatted = ClusterFormatter::new(200).format(&items, &scores, &clusters, 2);

    assert_eq!(formatted.len(), 2);
    assert_eq!(formatted[0].primary_source, "B");
    assert_eq!(formatted[1].primary_source, "C");
}
