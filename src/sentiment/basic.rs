//! Lexicon-based sentiment backend. The simplest and always-available end
//! of the fallback chain: a built-in polarity/subjectivity word table,
//! averaged over matches, with a short negation window.

use anyhow::Result;
use unicode_segmentation::UnicodeSegmentation;

use super::types::{SentimentLabel, SentimentResult};

/// Word, polarity in [-1, 1], subjectivity in [0, 1]. Must stay sorted:
/// lookups binary-search this table.
const LEXICON: &[(&str, f64, f64)] = &[
    ("amazing", 0.6, 0.9),
    ("awful", -1.0, 1.0),
    ("bad", -0.7, 0.67),
    ("beautiful", 0.85, 1.0),
    ("best", 1.0, 0.3),
    ("better", 0.5, 0.5),
    ("boring", -1.0, 1.0),
    ("breakthrough", 0.5, 0.6),
    ("brilliant", 0.9, 0.9),
    ("broken", -0.4, 0.7),
    ("catastrophic", -0.9, 1.0),
    ("collapse", -0.6, 0.7),
    ("crash", -0.6, 0.6),
    ("crisis", -0.6, 0.8),
    ("damage", -0.5, 0.6),
    ("dangerous", -0.6, 0.9),
    ("decline", -0.4, 0.5),
    ("delight", 0.8, 0.9),
    ("disaster", -0.8, 0.9),
    ("dreadful", -1.0, 1.0),
    ("excellent", 1.0, 1.0),
    ("exciting", 0.45, 0.8),
    ("fail", -0.5, 0.5),
    ("failure", -0.6, 0.7),
    ("fake", -0.5, 0.9),
    ("fantastic", 0.4, 0.9),
    ("fear", -0.6, 0.8),
    ("fraud", -0.8, 0.9),
    ("gain", 0.4, 0.4),
    ("good", 0.7, 0.6),
    ("great", 0.8, 0.75),
    ("grim", -0.6, 0.8),
    ("growth", 0.4, 0.4),
    ("happy", 0.8, 1.0),
    ("hate", -0.8, 0.9),
    ("hope", 0.4, 0.6),
    ("horrible", -1.0, 1.0),
    ("impressive", 0.75, 0.9),
    ("improve", 0.4, 0.5),
    ("innovative", 0.5, 0.7),
    ("loss", -0.4, 0.4),
    ("love", 0.5, 0.6),
    ("miracle", 0.8, 0.9),
    ("mislead", -0.6, 0.8),
    ("nice", 0.6, 1.0),
    ("outstanding", 0.9, 0.9),
    ("panic", -0.7, 0.9),
    ("perfect", 1.0, 1.0),
    ("poor", -0.4, 0.6),
    ("powerful", 0.5, 0.7),
    ("problem", -0.3, 0.4),
    ("progress", 0.4, 0.4),
    ("promising", 0.5, 0.7),
    ("recovery", 0.4, 0.5),
    ("remarkable", 0.75, 0.75),
    ("risk", -0.4, 0.5),
    ("sad", -0.5, 1.0),
    ("scandal", -0.7, 0.8),
    ("slump", -0.5, 0.6),
    ("soar", 0.5, 0.5),
    ("strong", 0.45, 0.55),
    ("stunning", 0.7, 0.9),
    ("succeed", 0.5, 0.5),
    ("success", 0.6, 0.6),
    ("surge", 0.4, 0.5),
    ("terrible", -1.0, 1.0),
    ("threat", -0.6, 0.7),
    ("thrilling", 0.6, 0.9),
    ("tragedy", -0.8, 0.9),
    ("triumph", 0.8, 0.8),
    ("trouble", -0.4, 0.5),
    ("ugly", -0.7, 0.9),
    ("warning", -0.3, 0.4),
    ("weak", -0.4, 0.5),
    ("win", 0.8, 0.6),
    ("wonderful", 1.0, 1.0),
    ("worst", -1.0, 1.0),
    ("wrong", -0.5, 0.7),
];

/// A negated sentiment word counts against its own polarity at half
/// strength.
const NEGATION_FACTOR: f64 = -0.5;

/// Tokens a negator can reach forward over.
const NEGATION_WINDOW: usize = 3;

fn is_negation(word: &str) -> bool {
    matches!(word, "not" | "no" | "never" | "cannot" | "nothing") || word.ends_with("n't")
}

#[derive(Debug, Default, Clone)]
pub struct BasicAnalyzer;

impl BasicAnalyzer {
    pub fn new() -> Self {
        Self
    }

    pub fn analyze(&self, text: &str) -> Result<SentimentResult> {
        let lowered = text.to_lowercase();
        let mut polarities: Vec<f64> = Vec::new();
        let mut subjectivities: Vec<f64> = Vec::new();
        let mut negation_left = 0usize;

        for word in lowered.unicode_words() {
            if is_negation(word) {
                negation_left = NEGATION_WINDOW;
                continue;
            }
            if let Ok(idx) = LEXICON.binary_search_by(|entry| entry.0.cmp(word)) {
                let (_, mut polarity, subjectivity) = LEXICON[idx];
                if negation_left > 0 {
                    polarity *= NEGATION_FACTOR;
                    negation_left = 0;
                }
                polarities.push(polarity);
                subjectivities.push(subjectivity);
            }
            negation_left = negation_left.saturating_sub(1);
        }

        let polarity = mean(&polarities);
        let subjectivity = mean(&subjectivities);
        let (label, confidence) = classify(polarity);
        Ok(SentimentResult {
            polarity,
            subjectivity,
            label,
            confidence,
        })
    }
}

/// Label and confidence from polarity. The thresholds are strict: exactly
/// ±0.1 is still neutral.
pub(crate) fn classify(polarity: f64) -> (SentimentLabel, f64) {
    if polarity > 0.1 {
        (SentimentLabel::Positive, (polarity.abs() * 2.0).min(1.0))
    } else if polarity < -0.1 {
        (SentimentLabel::Negative, (polarity.abs() * 2.0).min(1.0))
    } else {
        (SentimentLabel::Neutral, 1.0 - (polarity.abs() * 10.0).min(0.8))
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_is_sorted() {
        let mut words: Vec<&str> = LEXICON.iter().map(|e| e.0).collect();
        let original = words.clone();
        words.sort_unstable();
        assert_eq!(words, original);
    }

    #[test]
    fn positive_text_classifies_positive() {
        let result = BasicAnalyzer::new()
            .analyze("A brilliant and impressive success for the whole team")
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.polarity > 0.1);
        assert!(result.subjectivity > 0.0);
    }

    #[test]
    fn negative_text_classifies_negative() {
        let result = BasicAnalyzer::new()
            .analyze("A terrible disaster and an awful failure")
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
        assert!(result.polarity < -0.1);
    }

    #[test]
    fn negation_flips_and_dampens() {
        let plain = BasicAnalyzer::new().analyze("the results were good").unwrap();
        let negated = BasicAnalyzer::new()
            .analyze("the results were not good")
            .unwrap();
        assert!(plain.polarity > 0.0);
        assert!(negated.polarity < 0.0);
        assert!(negated.polarity.abs() < plain.polarity.abs());
    }

    #[test]
    fn label_threshold_is_strictly_greater() {
        let (label, _) = classify(0.1);
        assert_eq!(label, SentimentLabel::Neutral);
        let (label, _) = classify(0.1000001);
        assert_eq!(label, SentimentLabel::Positive);
        let (label, _) = classify(-0.1);
        assert_eq!(label, SentimentLabel::Neutral);
        let (label, _) = classify(-0.1000001);
        assert_eq!(label, SentimentLabel::Negative);
    }

    #[test]
    fn neutral_confidence_grows_toward_zero_polarity() {
        let (_, at_zero) = classify(0.0);
        let (_, near_edge) = classify(0.09);
        assert!(at_zero > near_edge);
        assert!((at_zero - 1.0).abs() < 1e-9);
    }
}
