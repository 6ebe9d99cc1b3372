//! Sidebar aggregates over the full (unfiltered) store.

use serde::Serialize;

use crate::model::{comment_record::CommentRecord, sentiment::SentimentLabel};

/// Counts and percentages shown in the "Overall Comments Analysis" sidebar.
///
/// Percentages are taken against `total`, which includes records with labels
/// other than POSITIVE/NEGATIVE. Such records fall in neither bucket, so the
/// two percentages then add up to less than 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentSummary {
    pub total: usize,
    pub positive: usize,
    pub negative: usize,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
}

impl SentimentSummary {
    /// Tally `records`. An empty slice yields zero counts and 0% for both.
    pub fn from_records(records: &[CommentRecord]) -> Self {
        let total = records.len();
        let positive = records
            .iter()
            .filter(|r| *r.sentiment() == SentimentLabel::Positive)
            .count();
        let negative = records
            .iter()
            .filter(|r| *r.sentiment() == SentimentLabel::Negative)
            .count();
        Self {
            total,
            positive,
            negative,
            positive_percentage: percentage(positive, total),
            negative_percentage: percentage(negative, total),
        }
    }

    /// Records carrying any other label.
    pub fn other(&self) -> usize {
        self.total - self.positive - self.negative
    }
}

fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}
