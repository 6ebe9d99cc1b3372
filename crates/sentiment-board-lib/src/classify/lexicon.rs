//! Deterministic word-list sentiment classifier.
//!
//! Counts positive and negative cue words (a preceding negation flips the cue)
//! and returns the majority label. No model files are needed, which makes it
//! the backend of choice for local development and for tests.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Classification, ClassifierError, SentimentClassifier};
use crate::model::sentiment::SentimentLabel;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-z]+(?:'[a-z]+)?").expect("static regex"));

static POSITIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "amazing", "awesome", "beautiful", "best", "brilliant", "cool", "enjoy", "enjoyed",
        "excellent", "fantastic", "fun", "good", "great", "happy", "helpful", "like", "liked",
        "love", "loved", "lovely", "nice", "perfect", "recommend", "super", "thanks", "useful",
        "wonderful", "wow",
    ]
    .into_iter()
    .collect()
});

static NEGATIVE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "annoying", "awful", "bad", "boring", "broken", "confusing", "disappointed",
        "disappointing", "dislike", "hate", "hated", "horrible", "poor", "sad", "slow", "stupid",
        "terrible", "useless", "waste", "worse", "worst", "wrong",
    ]
    .into_iter()
    .collect()
});

static NEGATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["not", "no", "never", "don't", "doesn't", "didn't", "isn't", "wasn't", "can't"]
        .into_iter()
        .collect()
});

/// How many tokens after a negation word it still applies to.
const NEGATION_REACH: usize = 2;

/// Word-list classifier; see module docs.
#[derive(Debug, Default, Clone)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Return (positive_hits, negative_hits) for `text`.
    fn count_cues(text: &str) -> (usize, usize) {
        let lowered = text.to_lowercase();
        let mut positive = 0usize;
        let mut negative = 0usize;
        // Tokens remaining in which a negation is still active.
        let mut negated_for = 0usize;

        for m in WORD_RE.find_iter(&lowered) {
            let word = m.as_str();
            if NEGATIONS.contains(word) {
                negated_for = NEGATION_REACH;
                continue;
            }
            let polarity = if POSITIVE_WORDS.contains(word) {
                Some(true)
            } else if NEGATIVE_WORDS.contains(word) {
                Some(false)
            } else {
                None
            };
            if let Some(is_positive) = polarity {
                match (is_positive, negated_for > 0) {
                    (true, false) | (false, true) => positive += 1,
                    (false, false) | (true, true) => negative += 1,
                }
                negated_for = 0;
            } else {
                negated_for = negated_for.saturating_sub(1);
            }
        }
        (positive, negative)
    }
}

impl SentimentClassifier for LexiconClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        let (positive, negative) = Self::count_cues(text);
        let total = positive + negative;
        let classification = if negative > positive {
            Classification {
                label: SentimentLabel::Negative,
                score: negative as f32 / total as f32,
            }
        } else if positive > negative {
            Classification {
                label: SentimentLabel::Positive,
                score: positive as f32 / total as f32,
            }
        } else {
            // No cue or a tie: lean positive with no confidence either way.
            Classification {
                label: SentimentLabel::Positive,
                score: 0.5,
            }
        };
        tracing::debug!(positive, negative, label = %classification.label, "lexicon classification");
        Ok(classification)
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
