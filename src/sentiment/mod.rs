//! Sentiment analysis over short text spans.
//!
//! Three interchangeable backends share one contract; construction walks a
//! fallback chain (neural → valence → basic) so an analyzer is always
//! available, and a per-call failure in the chosen backend falls back to
//! the basic lexicon for that call only.

pub mod basic;
pub mod neural;
pub mod types;
pub mod valence;

use tracing::warn;

use crate::config::CurateConfig;
use crate::TARGET_SENTIMENT;
use basic::BasicAnalyzer;
use neural::NeuralClassifier;
use valence::ValenceAnalyzer;

pub use types::{BackendKind, SentimentLabel, SentimentResult, MIN_TEXT_LEN};

enum Backend {
    Neural(NeuralClassifier),
    Valence(ValenceAnalyzer),
    Basic(BasicAnalyzer),
}

/// The reusable analyzer handle. Read-only after initialization and safe
/// to share across concurrent cluster analyses.
pub struct SentimentAnalyzer {
    backend: Backend,
    fallback: BasicAnalyzer,
}

impl SentimentAnalyzer {
    /// Builds the preferred backend, walking down the chain on failure.
    /// Always succeeds: the basic lexicon has no external dependencies.
    pub async fn init(config: &CurateConfig) -> Self {
        let backend = match config.sentiment_backend {
            BackendKind::Neural => match NeuralClassifier::init(config.neural.clone()).await {
                Ok(classifier) => Backend::Neural(classifier),
                Err(err) => {
                    warn!(
                        target: TARGET_SENTIMENT,
                        "Neural backend unavailable ({}), falling back to valence lexicon", err
                    );
                    Self::valence_or_basic()
                }
            },
            BackendKind::Valence => Self::valence_or_basic(),
            BackendKind::Basic => Backend::Basic(BasicAnalyzer::new()),
        };
        Self {
            backend,
            fallback: BasicAnalyzer::new(),
        }
    }

    fn valence_or_basic() -> Backend {
        match ValenceAnalyzer::new() {
            Ok(analyzer) => Backend::Valence(analyzer),
            Err(err) => {
                warn!(
                    target: TARGET_SENTIMENT,
                    "Valence backend unavailable ({}), falling back to basic lexicon", err
                );
                Backend::Basic(BasicAnalyzer::new())
            }
        }
    }

    /// Which backend ended up active after the fallback chain.
    pub fn kind(&self) -> BackendKind {
        match self.backend {
            Backend::Neural(_) => BackendKind::Neural,
            Backend::Valence(_) => BackendKind::Valence,
            Backend::Basic(_) => BackendKind::Basic,
        }
    }

    /// Classifies the tone of a text span. Texts below the minimum length
    /// get the fixed neutral result without touching any backend; backend
    /// errors degrade to the basic lexicon for this call, then to neutral.
    pub fn analyze(&self, text: &str) -> SentimentResult {
        if text.trim().chars().count() < MIN_TEXT_LEN {
            return SentimentResult::neutral();
        }

        let result = match &self.backend {
            Backend::Neural(classifier) => classifier.analyze(text),
            Backend::Valence(analyzer) => analyzer.analyze(text),
            Backend::Basic(analyzer) => analyzer.analyze(text),
        };

        match result {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    target: TARGET_SENTIMENT,
                    "Backend failed on one text ({}), retrying with basic lexicon", err
                );
                self.fallback
                    .analyze(text)
                    .unwrap_or_else(|_| SentimentResult::neutral())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::neural::NeuralConfig;

    fn config(backend: BackendKind) -> CurateConfig {
        CurateConfig {
            sentiment_backend: backend,
            neural: NeuralConfig {
                model_path: "does/not/exist.safetensors".to_string(),
                tokenizer_path: "does/not/exist.json".to_string(),
                download_missing: false,
                ..NeuralConfig::default()
            },
            ..CurateConfig::default()
        }
    }

    #[tokio::test]
    async fn short_text_is_fixed_neutral() {
        let analyzer = SentimentAnalyzer::init(&config(BackendKind::Basic)).await;
        let result = analyzer.analyze("short");
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.polarity, 0.0);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn unavailable_neural_backend_falls_back_to_valence() {
        let analyzer = SentimentAnalyzer::init(&config(BackendKind::Neural)).await;
        assert_eq!(analyzer.kind(), BackendKind::Valence);
        // The fallback backend is fully functional.
        let result = analyzer.analyze("an absolutely wonderful result for everyone");
        assert_eq!(result.label, SentimentLabel::Positive);
    }

    #[tokio::test]
    async fn requested_basic_backend_is_used_directly() {
        let analyzer = SentimentAnalyzer::init(&config(BackendKind::Basic)).await;
        assert_eq!(analyzer.kind(), BackendKind::Basic);
    }
}
