use serde::Serialize;

/// Minimum trimmed length a text must have before any backend is invoked.
pub const MIN_TEXT_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

/// Tone classification for one span of text.
#[derive(Debug, Clone, Serialize)]
pub struct SentimentResult {
    /// -1 (negative) to 1 (positive).
    pub polarity: f64,
    /// 0 (objective) to 1 (subjective).
    pub subjectivity: f64,
    pub label: SentimentLabel,
    /// 0 to 1, scaled from the polarity's distance to the label threshold.
    pub confidence: f64,
}

impl SentimentResult {
    /// The fixed result for texts too short to analyze and for total
    /// backend failure.
    pub fn neutral() -> Self {
        Self {
            polarity: 0.0,
            subjectivity: 0.0,
            label: SentimentLabel::Neutral,
            confidence: 0.0,
        }
    }
}

/// The three interchangeable analyzer backends, in descending preference
/// order for the initialization fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Neural,
    Valence,
    Basic,
}
