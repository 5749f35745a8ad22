//! Dashboard aggregation.
//!
//! Pure functions that turn fetched records into the numbers and banners
//! shown on the pages: the rolling summary, flagged sentence extraction
//! and the conversation/caretaker warning banners.

use crate::analysis::sentiment::format_sentiment;
use crate::models::{Conversation, ConversationCard, DashboardSummary, Sentence};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// Length of the dashboard's rolling window.
pub const SUMMARY_WINDOW_HOURS: i64 = 72;

/// Summarize the conversations started in the last 72 hours.
pub fn summarize(conversations: &[Conversation], now: DateTime<Utc>) -> DashboardSummary {
    summarize_within(conversations, now, Duration::hours(SUMMARY_WINDOW_HOURS))
}

/// Summarize the conversations with `start_time >= now - window`.
///
/// Conversations without a readable start time are outside every window.
pub fn summarize_within(
    conversations: &[Conversation],
    now: DateTime<Utc>,
    window: Duration,
) -> DashboardSummary {
    let cutoff = now - window;

    let recent: Vec<&Conversation> = conversations
        .iter()
        .filter(|conv| conv.started_at().is_some_and(|start| start >= cutoff))
        .collect();

    DashboardSummary {
        flag_count: recent.iter().map(|conv| conv.flag_count()).sum(),
        conversation_count: recent.len(),
        ..DashboardSummary::default()
    }
}

/// Resolve a flag entry to a sentence index.
///
/// Integers are taken as-is, non-negative floats are truncated, strings
/// contribute their leading decimal digits ("12", " 7", "3abc" all parse).
/// Negative or non-numeric entries yield `None`.
pub fn parse_flag_index(flag: &Value) -> Option<usize> {
    match flag {
        Value::Number(number) => {
            if let Some(index) = number.as_u64() {
                usize::try_from(index).ok()
            } else {
                number
                    .as_f64()
                    .filter(|f| f.is_finite() && *f >= 0.0)
                    .map(|f| f.trunc() as usize)
            }
        }
        Value::String(text) => parse_leading_int(text),
        _ => None,
    }
}

fn parse_leading_int(text: &str) -> Option<usize> {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];

    if digits.is_empty() {
        return None;
    }
    // "-0" is zero; any other negative is out of range.
    if negative && digits.bytes().any(|b| b != b'0') {
        return None;
    }
    digits.parse().ok()
}

/// Sentences referenced by the conversation's flags, in flag order.
///
/// Flags that do not resolve to an index inside the transcript are dropped.
pub fn extract_flagged(conversation: &Conversation) -> Vec<&Sentence> {
    let sentences = conversation.sentences();

    conversation
        .flags()
        .iter()
        .filter_map(parse_flag_index)
        .filter_map(|index| sentences.get(index))
        .collect()
}

/// True when the conversation has at least one flag.
pub fn has_flags(conversation: &Conversation) -> bool {
    conversation.flag_count() > 0
}

/// True when a caretaker should be shown with a warning (one alert is enough).
pub fn has_alerts(alerts: u64) -> bool {
    alerts >= 1
}

/// Warning banner for a caretaker, if they have alerts.
pub fn alert_banner(alerts: u64) -> Option<String> {
    has_alerts(alerts).then(|| {
        format!(
            "⚠️ {} alert{} for this caretaker",
            alerts,
            if alerts > 1 { "s" } else { "" }
        )
    })
}

/// Warning banner for a conversation, if it has flags.
pub fn flag_banner(flag_count: usize) -> Option<String> {
    (flag_count > 0).then(|| {
        format!(
            "⚠️ {} flag{} in this conversation",
            flag_count,
            if flag_count > 1 { "s" } else { "" }
        )
    })
}

/// Build the list-view card for a conversation.
pub fn conversation_card(conversation: &Conversation) -> ConversationCard {
    let flag_count = conversation.flag_count();

    ConversationCard {
        id: conversation.id.clone(),
        started_at: conversation.started_at(),
        flag_count,
        has_flags: has_flags(conversation),
        banner: flag_banner(flag_count),
        sentiment: format_sentiment(conversation.sentiment_score()),
        summary: conversation.summary.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SentimentPlaceholder;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
    }

    fn conversation_at(start: DateTime<Utc>, flags: Value) -> Conversation {
        serde_json::from_value(json!({
            "_id": "c",
            "start_time": start.to_rfc3339(),
            "flags": flags,
        }))
        .unwrap()
    }

    fn transcript(flags: Value, texts: &[&str]) -> Conversation {
        let sentences: Vec<Value> = texts.iter().map(|t| json!({ "text": t })).collect();
        serde_json::from_value(json!({
            "_id": "c",
            "flags": flags,
            "sentences": sentences,
        }))
        .unwrap()
    }

    #[test]
    fn test_summarize_empty() {
        let summary = summarize(&[], now());
        assert_eq!(summary.flag_count, 0);
        assert_eq!(summary.conversation_count, 0);
        assert_eq!(summary.sentiment, SentimentPlaceholder);
    }

    #[test]
    fn test_summarize_excludes_old_conversations() {
        let conversations = vec![
            conversation_at(now() - Duration::hours(1), json!([0, 1])),
            conversation_at(now() - Duration::hours(100), json!([0])),
        ];

        let summary = summarize(&conversations, now());
        assert_eq!(summary.flag_count, 2);
        assert_eq!(summary.conversation_count, 1);
    }

    #[test]
    fn test_summarize_cutoff_is_inclusive() {
        let conversations = vec![
            conversation_at(now() - Duration::hours(72), json!(["3"])),
            conversation_at(
                now() - Duration::hours(72) - Duration::seconds(1),
                json!(["1", "2"]),
            ),
        ];

        let summary = summarize(&conversations, now());
        assert_eq!(summary.conversation_count, 1);
        assert_eq!(summary.flag_count, 1);
    }

    #[test]
    fn test_summarize_counts_missing_flags_as_zero() {
        let mut conv = conversation_at(now() - Duration::hours(2), json!(null));
        conv.flags = None;

        let summary = summarize(&[conv], now());
        assert_eq!(summary.conversation_count, 1);
        assert_eq!(summary.flag_count, 0);
    }

    #[test]
    fn test_summarize_skips_unreadable_start_time() {
        let conv: Conversation =
            serde_json::from_value(json!({"_id": "c", "start_time": "soon", "flags": [0]}))
                .unwrap();

        let summary = summarize(&[conv], now());
        assert_eq!(summary.conversation_count, 0);
    }

    #[test]
    fn test_summarize_within_custom_window() {
        let conversations = vec![
            conversation_at(now() - Duration::hours(5), json!([0])),
            conversation_at(now() - Duration::hours(30), json!([0, 1, 2])),
        ];

        let summary = summarize_within(&conversations, now(), Duration::hours(24));
        assert_eq!(summary.conversation_count, 1);
        assert_eq!(summary.flag_count, 1);
    }

    #[test]
    fn test_parse_flag_index() {
        assert_eq!(parse_flag_index(&json!(2)), Some(2));
        assert_eq!(parse_flag_index(&json!("7")), Some(7));
        assert_eq!(parse_flag_index(&json!(" 12abc")), Some(12));
        assert_eq!(parse_flag_index(&json!(1.9)), Some(1));
        assert_eq!(parse_flag_index(&json!("-0")), Some(0));
        assert_eq!(parse_flag_index(&json!(-1)), None);
        assert_eq!(parse_flag_index(&json!("-3")), None);
        assert_eq!(parse_flag_index(&json!("abc")), None);
        assert_eq!(parse_flag_index(&json!(null)), None);
    }

    #[test]
    fn test_extract_flagged_drops_out_of_range() {
        let conv = transcript(json!([0, 2, 99]), &["first", "second", "third"]);
        let texts: Vec<&str> = extract_flagged(&conv)
            .iter()
            .map(|s| s.display_text())
            .collect();
        assert_eq!(texts, vec!["first", "third"]);
    }

    #[test]
    fn test_extract_flagged_with_two_sentences() {
        let conv = transcript(json!([0, 2, 99]), &["only", "two"]);
        let flagged = extract_flagged(&conv);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].display_text(), "only");
    }

    #[test]
    fn test_extract_flagged_preserves_flag_order() {
        let conv = transcript(json!(["2", "0", "1"]), &["a", "b", "c"]);
        let texts: Vec<&str> = extract_flagged(&conv)
            .iter()
            .map(|s| s.display_text())
            .collect();
        assert_eq!(texts, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_extract_flagged_empty_inputs() {
        assert!(extract_flagged(&transcript(json!([]), &["a"])).is_empty());
        assert!(extract_flagged(&transcript(json!([0, 1]), &[])).is_empty());
        assert!(extract_flagged(&Conversation::default()).is_empty());
    }

    #[test]
    fn test_has_alerts_threshold() {
        assert!(!has_alerts(0));
        assert!(has_alerts(1));
        assert!(has_alerts(5));
    }

    #[test]
    fn test_banners() {
        assert_eq!(alert_banner(0), None);
        assert_eq!(
            alert_banner(1).as_deref(),
            Some("⚠️ 1 alert for this caretaker")
        );
        assert_eq!(
            alert_banner(3).as_deref(),
            Some("⚠️ 3 alerts for this caretaker")
        );
        assert_eq!(flag_banner(0), None);
        assert_eq!(
            flag_banner(1).as_deref(),
            Some("⚠️ 1 flag in this conversation")
        );
        assert_eq!(
            flag_banner(2).as_deref(),
            Some("⚠️ 2 flags in this conversation")
        );
    }

    #[test]
    fn test_conversation_card() {
        let mut conv = conversation_at(now(), json!(["0", "1"]));
        conv.sentiment = Some(json!(-0.3));
        conv.summary = Some("Disagreement noted".to_string());

        let card = conversation_card(&conv);
        assert_eq!(card.flag_count, 2);
        assert_eq!(
            card.banner.as_deref(),
            Some("⚠️ 2 flags in this conversation")
        );
        assert_eq!(card.sentiment, "-0.30 (Bad)");
        assert_eq!(card.started_at, Some(now()));
        assert!(card.has_flags);
        assert!(!has_flags(&Conversation::default()));
    }
}
