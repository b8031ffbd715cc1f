//! Valence-aware lexicon backend, tuned for short informal text: headline
//! fragments, social-style blurbs, source blurbs with punctuation emphasis.
//! Raw word valences on a -4..4 scale are summed with booster and negation
//! adjustments, then squashed into a [-1, 1] compound score.

use anyhow::{anyhow, Result};
use unicode_segmentation::UnicodeSegmentation;

use super::types::{SentimentLabel, SentimentResult};

/// Word valence on a -4..4 scale. Must stay sorted: lookups binary-search
/// this table.
const VALENCE: &[(&str, f64)] = &[
    ("amazing", 2.8),
    ("awesome", 3.1),
    ("awful", -2.0),
    ("bad", -2.5),
    ("best", 3.2),
    ("bleak", -1.5),
    ("boom", 1.6),
    ("breakthrough", 2.1),
    ("brilliant", 2.8),
    ("catastrophe", -3.4),
    ("celebrate", 2.7),
    ("chaos", -2.7),
    ("cheer", 2.3),
    ("collapse", -2.2),
    ("crash", -2.4),
    ("crisis", -3.1),
    ("damn", -1.7),
    ("dead", -2.9),
    ("defeat", -2.3),
    ("delight", 2.9),
    ("destroy", -2.9),
    ("disaster", -3.1),
    ("doom", -2.5),
    ("epic", 2.5),
    ("fail", -2.5),
    ("fantastic", 2.6),
    ("fear", -2.2),
    ("fun", 2.3),
    ("glad", 2.0),
    ("gloomy", -1.9),
    ("good", 1.9),
    ("great", 3.1),
    ("happy", 2.7),
    ("hate", -2.7),
    ("hero", 2.6),
    ("hope", 1.9),
    ("horrible", -2.5),
    ("hype", 1.1),
    ("kill", -3.7),
    ("lol", 1.6),
    ("lose", -1.7),
    ("loss", -1.3),
    ("love", 3.2),
    ("lucky", 2.4),
    ("mess", -1.6),
    ("miracle", 2.8),
    ("nice", 1.8),
    ("panic", -2.6),
    ("perfect", 2.7),
    ("plunge", -1.9),
    ("promising", 1.6),
    ("rally", 1.4),
    ("ruin", -2.4),
    ("sad", -2.1),
    ("scam", -2.6),
    ("scandal", -2.2),
    ("slump", -1.8),
    ("soar", 2.0),
    ("stellar", 2.6),
    ("strong", 2.3),
    ("stunning", 2.4),
    ("success", 2.7),
    ("surge", 1.7),
    ("sweet", 2.0),
    ("terrible", -2.7),
    ("terrific", 2.9),
    ("threat", -1.8),
    ("thrilled", 2.8),
    ("tragedy", -3.4),
    ("triumph", 2.9),
    ("ugly", -2.2),
    ("warn", -1.2),
    ("weak", -1.9),
    ("win", 2.8),
    ("wonderful", 2.7),
    ("worst", -3.1),
    ("wow", 2.8),
    ("wrong", -2.1),
];

/// Intensity modifiers applied when the word directly precedes a valence
/// hit; positive entries amplify, negative entries dampen. Sorted.
const BOOSTERS: &[(&str, f64)] = &[
    ("absolutely", 0.293),
    ("almost", -0.293),
    ("barely", -0.293),
    ("completely", 0.293),
    ("deeply", 0.293),
    ("enormously", 0.293),
    ("especially", 0.293),
    ("exceptionally", 0.293),
    ("extremely", 0.293),
    ("hardly", -0.293),
    ("hugely", 0.293),
    ("incredibly", 0.293),
    ("marginally", -0.293),
    ("partly", -0.293),
    ("really", 0.293),
    ("remarkably", 0.293),
    ("scarcely", -0.293),
    ("slightly", -0.293),
    ("so", 0.293),
    ("somewhat", -0.293),
    ("totally", 0.293),
    ("truly", 0.293),
    ("utterly", 0.293),
    ("very", 0.293),
];

/// Scaling applied to a valence hit preceded by a negator.
const NEGATION_SCALE: f64 = -0.74;

/// How many preceding tokens a negator can act across.
const NEGATION_REACH: usize = 3;

/// Per-exclamation-mark emphasis, capped at four marks.
const EXCLAMATION_BOOST: f64 = 0.292;

/// Normalization constant for squashing the summed valence into [-1, 1].
const SQUASH_ALPHA: f64 = 15.0;

fn is_negation(word: &str) -> bool {
    matches!(word, "not" | "no" | "never" | "cannot" | "neither" | "nothing")
        || word.ends_with("n't")
}

#[derive(Debug, Clone)]
pub struct ValenceAnalyzer;

impl ValenceAnalyzer {
    pub fn new() -> Result<Self> {
        if VALENCE.is_empty() {
            return Err(anyhow!("valence lexicon is empty"));
        }
        Ok(Self)
    }

    pub fn analyze(&self, text: &str) -> Result<SentimentResult> {
        let lowered = text.to_lowercase();
        let tokens: Vec<&str> = lowered.unicode_words().collect();

        let mut sum = 0.0f64;
        let mut hits = 0usize;
        for (i, token) in tokens.iter().enumerate() {
            let idx = match VALENCE.binary_search_by(|entry| entry.0.cmp(token)) {
                Ok(idx) => idx,
                Err(_) => continue,
            };
            let mut valence = VALENCE[idx].1;

            if i > 0 {
                if let Ok(b) = BOOSTERS.binary_search_by(|entry| entry.0.cmp(&tokens[i - 1])) {
                    valence += BOOSTERS[b].1 * valence.signum();
                }
            }
            let window_start = i.saturating_sub(NEGATION_REACH);
            if tokens[window_start..i].iter().copied().any(is_negation) {
                valence *= NEGATION_SCALE;
            }

            sum += valence;
            hits += 1;
        }

        let exclamations = text.chars().filter(|&c| c == '!').count().min(4) as f64;
        if sum > 0.0 {
            sum += exclamations * EXCLAMATION_BOOST;
        } else if sum < 0.0 {
            sum -= exclamations * EXCLAMATION_BOOST;
        }

        let compound = sum / (sum * sum + SQUASH_ALPHA).sqrt();
        let subjectivity = if tokens.is_empty() {
            0.0
        } else {
            (hits as f64 / tokens.len() as f64).min(1.0)
        };
        let (label, confidence) = classify(compound);
        Ok(SentimentResult {
            polarity: compound,
            subjectivity,
            label,
            confidence,
        })
    }
}

/// Label and confidence from the compound score. Unlike the basic backend
/// the ±0.05 thresholds are inclusive.
fn classify(compound: f64) -> (SentimentLabel, f64) {
    if compound >= 0.05 {
        (
            SentimentLabel::Positive,
            ((compound.abs() - 0.05) * 2.0).min(1.0),
        )
    } else if compound <= -0.05 {
        (
            SentimentLabel::Negative,
            ((compound.abs() - 0.05) * 2.0).min(1.0),
        )
    } else {
        (SentimentLabel::Neutral, 1.0 - (compound.abs() * 10.0).min(0.8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_sorted() {
        let mut words: Vec<&str> = VALENCE.iter().map(|e| e.0).collect();
        let original = words.clone();
        words.sort_unstable();
        assert_eq!(words, original);

        let mut boosters: Vec<&str> = BOOSTERS.iter().map(|e| e.0).collect();
        let original = boosters.clone();
        boosters.sort_unstable();
        assert_eq!(boosters, original);
    }

    #[test]
    fn informal_positive_text_scores_positive() {
        let analyzer = ValenceAnalyzer::new().unwrap();
        let result = analyzer.analyze("wow this launch is awesome!!").unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert!(result.polarity > 0.05);
    }

    #[test]
    fn exclamation_marks_amplify_the_score() {
        let analyzer = ValenceAnalyzer::new().unwrap();
        let plain = analyzer.analyze("the release was great").unwrap();
        let shouted = analyzer.analyze("the release was great!!!").unwrap();
        assert!(shouted.polarity > plain.polarity);
    }

    #[test]
    fn boosters_amplify_and_negators_flip() {
        let analyzer = ValenceAnalyzer::new().unwrap();
        let plain = analyzer.analyze("the outcome was good").unwrap();
        let boosted = analyzer.analyze("the outcome was extremely good").unwrap();
        let negated = analyzer.analyze("the outcome was not good").unwrap();
        assert!(boosted.polarity > plain.polarity);
        assert!(negated.polarity < 0.0);
    }

    #[test]
    fn neutral_band_is_inclusive_outside_thresholds() {
        let (label, _) = classify(0.049);
        assert_eq!(label, SentimentLabel::Neutral);
        let (label, _) = classify(0.05);
        assert_eq!(label, SentimentLabel::Positive);
        let (label, _) = classify(-0.05);
        assert_eq!(label, SentimentLabel::Negative);
    }
}
