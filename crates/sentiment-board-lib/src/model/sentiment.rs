// Sentiment labels as produced by the classifier, normalised to upper case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Discrete sentiment label attached to a comment.
///
/// The classifier is a black box, so anything other than the two SST-2 labels
/// is kept verbatim (upper-cased) in `Other` instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Other(String),
}

impl SentimentLabel {
    /// Build a label from a raw classifier string (case-insensitive).
    ///
    /// Only the case is normalised; surrounding whitespace is kept, so
    /// `" positive"` becomes `Other(" POSITIVE")`.
    pub fn from_raw(raw: &str) -> Self {
        let upper = raw.to_uppercase();
        match upper.as_str() {
            "POSITIVE" => SentimentLabel::Positive,
            "NEGATIVE" => SentimentLabel::Negative,
            _ => SentimentLabel::Other(upper),
        }
    }

    /// Canonical form of `self`: an `Other` that upper-cases to one of the
    /// known labels becomes that label, and any other `Other` is upper-cased.
    pub fn normalized(self) -> Self {
        match self {
            SentimentLabel::Other(raw) => SentimentLabel::from_raw(&raw),
            known => known,
        }
    }

    /// Upper-case display form, e.g. `POSITIVE`.
    pub fn as_str(&self) -> &str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Other(s) => s.as_str(),
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for SentimentLabel {
    fn from(s: String) -> Self {
        SentimentLabel::from_raw(&s)
    }
}

impl From<SentimentLabel> for String {
    fn from(label: SentimentLabel) -> Self {
        label.as_str().to_string()
    }
}

/// Filter criterion offered by the "Sort Comments by Sentiment" selector.
///
/// The wire/display strings are exactly `None`, `Positive` and `Negative`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOption {
    #[default]
    None,
    Positive,
    Negative,
}

impl SortOption {
    /// All options in selector order.
    pub const ALL: [SortOption; 3] = [SortOption::None, SortOption::Positive, SortOption::Negative];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::None => "None",
            SortOption::Positive => "Positive",
            SortOption::Negative => "Negative",
        }
    }

    /// Label a record must carry to pass this filter; `None` passes everything.
    pub fn label(&self) -> Option<SentimentLabel> {
        match self {
            SortOption::None => None,
            SortOption::Positive => Some(SentimentLabel::Positive),
            SortOption::Negative => Some(SentimentLabel::Negative),
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|opt| opt.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unsupported sort option '{}'; expected None|Positive|Negative", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_upper_cased() {
        assert_eq!(SentimentLabel::from_raw("positive"), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_raw("Negative"), SentimentLabel::Negative);
        assert_eq!(
            SentimentLabel::from_raw("neutral"),
            SentimentLabel::Other("NEUTRAL".to_string())
        );
        assert_eq!(SentimentLabel::from_raw("neutral").to_string(), "NEUTRAL");
    }

    #[test]
    fn from_raw_keeps_whitespace() {
        assert_eq!(
            SentimentLabel::from_raw(" positive"),
            SentimentLabel::Other(" POSITIVE".to_string())
        );
    }

    #[test]
    fn normalized_canonicalises_hand_built_other() {
        assert_eq!(
            SentimentLabel::Other("positive".to_string()).normalized(),
            SentimentLabel::Positive
        );
        assert_eq!(
            SentimentLabel::Other("Neutral".to_string()).normalized(),
            SentimentLabel::Other("NEUTRAL".to_string())
        );
        assert_eq!(SentimentLabel::Negative.normalized(), SentimentLabel::Negative);
    }

    #[test]
    fn label_serializes_as_plain_string() {
        let json = serde_json::to_string(&SentimentLabel::Positive).unwrap();
        assert_eq!(json, "\"POSITIVE\"");
        let back: SentimentLabel = serde_json::from_str("\"label_2\"").unwrap();
        assert_eq!(back, SentimentLabel::Other("LABEL_2".to_string()));
    }

    #[test]
    fn sort_option_parses_exact_strings_only() {
        assert_eq!("None".parse::<SortOption>().unwrap(), SortOption::None);
        assert_eq!("Positive".parse::<SortOption>().unwrap(), SortOption::Positive);
        assert_eq!("Negative".parse::<SortOption>().unwrap(), SortOption::Negative);
        assert!("positive".parse::<SortOption>().is_err());
        assert!("Neutral".parse::<SortOption>().is_err());
    }
}
