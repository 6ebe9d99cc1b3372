// Serde derives are kept so records can be returned from the JSON API as-is.
use serde::{Deserialize, Serialize};

use crate::model::sentiment::SentimentLabel;

/// Placeholder used when a comment is submitted without a username.
pub const DEFAULT_USERNAME: &str = "User";

/// A single submitted comment.
///
/// `sentiment` is computed once from `text` when the record is built and is
/// never recomputed; fields are private so a stored record cannot be edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentRecord {
    username: String,
    text: String,
    sentiment: SentimentLabel,
}

impl CommentRecord {
    /// Build a record from already-classified input.
    ///
    /// An empty (or whitespace-only) username is replaced by [`DEFAULT_USERNAME`];
    /// the text is kept exactly as submitted. The label is stored in its
    /// upper-case canonical form whatever the classifier handed back.
    pub fn new(username: &str, text: &str, sentiment: SentimentLabel) -> Self {
        let username = if username.trim().is_empty() {
            DEFAULT_USERNAME.to_string()
        } else {
            username.to_string()
        };
        Self {
            username,
            text: text.to_string(),
            sentiment: sentiment.normalized(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn sentiment(&self) -> &SentimentLabel {
        &self.sentiment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_username_falls_back_to_placeholder() {
        let rec = CommentRecord::new("   ", "hello", SentimentLabel::Positive);
        assert_eq!(rec.username(), DEFAULT_USERNAME);
        assert_eq!(rec.text(), "hello");
    }

    #[test]
    fn text_is_stored_verbatim() {
        let rec = CommentRecord::new("Alice", "  spaced  ", SentimentLabel::Negative);
        assert_eq!(rec.username(), "Alice");
        assert_eq!(rec.text(), "  spaced  ");
        assert_eq!(rec.sentiment(), &SentimentLabel::Negative);
    }

    #[test]
    fn lower_case_label_is_canonicalised() {
        let rec = CommentRecord::new("Alice", "hi", SentimentLabel::Other("negative".to_string()));
        assert_eq!(rec.sentiment(), &SentimentLabel::Negative);
        let rec = CommentRecord::new("Alice", "hi", SentimentLabel::Other("mixed".to_string()));
        assert_eq!(rec.sentiment().as_str(), "MIXED");
    }
}
