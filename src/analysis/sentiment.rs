//! Sentiment labels for conversation scores.
//!
//! Scores arrive from the backend in [-1, 1]. The banding is deliberately
//! asymmetric: the negative thresholds are inclusive (`<=`) and the
//! positive ones are exclusive (`<`), so -0.2 is "Bad" while 0.2 is "Good".

use serde::Serialize;
use std::fmt;

/// Discrete label for a conversation sentiment score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum SentimentLabel {
    /// No score available
    Unknown,
    /// score <= -0.6
    Terrible,
    /// -0.6 < score <= -0.2
    Bad,
    /// -0.2 < score < 0.2
    Fair,
    /// 0.2 <= score < 0.6
    Good,
    /// score >= 0.6
    Excellent,
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Unknown => write!(f, "Unknown"),
            SentimentLabel::Terrible => write!(f, "Terrible"),
            SentimentLabel::Bad => write!(f, "Bad"),
            SentimentLabel::Fair => write!(f, "Fair"),
            SentimentLabel::Good => write!(f, "Good"),
            SentimentLabel::Excellent => write!(f, "Excellent"),
        }
    }
}

/// Map a score to its label. Total over every input, NaN included
/// (NaN fails every comparison and lands on `Excellent`, like any
/// other value above the last threshold).
pub fn classify(score: Option<f64>) -> SentimentLabel {
    let Some(score) = score else {
        return SentimentLabel::Unknown;
    };

    if score <= -0.6 {
        SentimentLabel::Terrible
    } else if score <= -0.2 {
        SentimentLabel::Bad
    } else if score < 0.2 {
        SentimentLabel::Fair
    } else if score < 0.6 {
        SentimentLabel::Good
    } else {
        SentimentLabel::Excellent
    }
}

/// Display string for a score: `"0.35 (Good)"`, or `"Unknown"` when absent.
pub fn format_sentiment(score: Option<f64>) -> String {
    match score {
        Some(value) => format!("{:.2} ({})", value, classify(Some(value))),
        None => SentimentLabel::Unknown.to_string(),
    }
}
