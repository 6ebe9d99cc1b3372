//! Comment business logic: classify-and-append, and sentiment filtering.

use anyhow::{Context, Result};

use crate::classify::SentimentClassifier;
use crate::model::{comment_record::CommentRecord, sentiment::SortOption};
use crate::store::CommentStore;

/// Classify `text` and append the resulting record to `store`.
///
/// The classifier runs before the store is touched, so a classification
/// failure is returned to the caller and leaves the store unchanged. Empty
/// text is still sent to the classifier; an empty username is replaced by the
/// placeholder (see [`CommentRecord::new`]).
pub fn add_comment<'s>(
    store: &'s mut CommentStore,
    classifier: &dyn SentimentClassifier,
    username: &str,
    text: &str,
) -> Result<&'s CommentRecord> {
    let classification = classifier
        .classify(text)
        .with_context(|| format!("classifying comment with {} backend", classifier.name()))?;
    let record = CommentRecord::new(username, text, classification.label);
    tracing::info!(
        username = record.username(),
        sentiment = %record.sentiment(),
        score = classification.score,
        "comment added"
    );
    Ok(store.push(record))
}

/// Select the records matching `criterion`, preserving their order.
///
/// `SortOption::None` yields every record. The result borrows from `records`.
pub fn filter(records: &[CommentRecord], criterion: SortOption) -> Vec<&CommentRecord> {
    match criterion.label() {
        None => records.iter().collect(),
        Some(label) => records
            .iter()
            .filter(|r| *r.sentiment() == label)
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{Classification, ClassifierError};
    use crate::model::sentiment::SentimentLabel;

    /// Returns the label encoded as the text itself ("positive" → POSITIVE).
    struct EchoClassifier;

    impl SentimentClassifier for EchoClassifier {
        fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
            Ok(Classification {
                label: SentimentLabel::from_raw(text),
                score: 1.0,
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    /// Hands back the label untouched, as a backend with its own label
    /// strings would.
    struct RawLabelClassifier;

    impl SentimentClassifier for RawLabelClassifier {
        fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
            Ok(Classification {
                label: SentimentLabel::Other(text.to_string()),
                score: 0.7,
            })
        }

        fn name(&self) -> &str {
            "raw"
        }
    }

    struct FailingClassifier;

    impl SentimentClassifier for FailingClassifier {
        fn classify(&self, _text: &str) -> Result<Classification, ClassifierError> {
            Err(ClassifierError::Inference("model unavailable".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_add_comment_appends_in_call_order() {
        let mut store = CommentStore::new();
        let texts = ["positive", "negative", "neutral", "positive"];
        for (i, t) in texts.iter().enumerate() {
            add_comment(&mut store, &EchoClassifier, &format!("u{}", i), t).unwrap();
        }
        assert_eq!(store.len(), texts.len());
        for (i, rec) in store.records().iter().enumerate() {
            assert_eq!(rec.username(), format!("u{}", i));
            assert_eq!(rec.text(), texts[i]);
        }
        assert_eq!(
            store.records()[2].sentiment(),
            &SentimentLabel::Other("NEUTRAL".to_string())
        );
    }

    #[test]
    fn test_raw_backend_labels_are_upper_cased() {
        let mut store = CommentStore::new();
        let rec = add_comment(&mut store, &RawLabelClassifier, "Alice", "positive").unwrap();
        assert_eq!(rec.sentiment().as_str(), "POSITIVE");
        add_comment(&mut store, &RawLabelClassifier, "Carol", "neutral").unwrap();

        let positives = filter(store.records(), SortOption::Positive);
        assert_eq!(positives.len(), 1);
        assert_eq!(positives[0].username(), "Alice");
        let summary = crate::stats::SentimentSummary::from_records(store.records());
        assert_eq!(summary.positive, 1);
        assert_eq!(store.records()[1].sentiment().as_str(), "NEUTRAL");
    }

    #[test]
    fn test_failed_classification_leaves_store_unchanged() {
        let mut store = CommentStore::new();
        add_comment(&mut store, &EchoClassifier, "a", "positive").unwrap();
        let err = add_comment(&mut store, &FailingClassifier, "b", "anything").unwrap_err();
        assert!(format!("{:#}", err).contains("model unavailable"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_filter_none_is_identity() {
        let mut store = CommentStore::new();
        for t in ["negative", "positive", "other"] {
            add_comment(&mut store, &EchoClassifier, "u", t).unwrap();
        }
        let all = filter(store.records(), SortOption::None);
        assert_eq!(all.len(), 3);
        for (a, b) in all.iter().zip(store.records()) {
            assert!(std::ptr::eq(*a, b));
        }
    }

    #[test]
    fn test_filter_selects_matching_subsequence() {
        let mut store = CommentStore::new();
        for (user, t) in [("a", "positive"), ("b", "negative"), ("c", "positive"), ("d", "neutral")] {
            add_comment(&mut store, &EchoClassifier, user, t).unwrap();
        }
        let pos: Vec<&str> = filter(store.records(), SortOption::Positive)
            .iter()
            .map(|r| r.username())
            .collect();
        assert_eq!(pos, vec!["a", "c"]);
        let neg: Vec<&str> = filter(store.records(), SortOption::Negative)
            .iter()
            .map(|r| r.username())
            .collect();
        assert_eq!(neg, vec!["b"]);
    }
}
