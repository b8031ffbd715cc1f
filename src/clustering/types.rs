use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

use crate::StageStatus;

/// A group of batch items judged to describe the same story. Members are
/// indices into the batch, in discovery order; the first member opened the
/// cluster.
#[derive(Debug, Clone, Serialize)]
pub struct Cluster {
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Clusterer output: a strict partition of the input batch, plus how it
/// was produced.
#[derive(Debug)]
pub struct ClusterSet {
    pub clusters: Vec<Cluster>,
    pub status: StageStatus,
}

/// One member's provenance inside a formatted cluster.
#[derive(Debug, Clone, Serialize)]
pub struct SourceRef {
    pub name: String,
    pub link: String,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
}

/// A cluster collapsed to its representative item, with every member
/// retained as an alternate source.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedCluster {
    pub title: String,
    pub description: String,
    pub link: String,
    pub primary_source: String,
    pub average_read_time: u32,
    pub importance_score: f64,
    pub categories: BTreeSet<String>,
    pub sources: Vec<SourceRef>,
}
