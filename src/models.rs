//! Data models for the dashboard.
//!
//! Wire records (`Person`, `Conversation`, `Sentence`, `FlagSummary`) mirror
//! what the backend serialises and are never mutated after decoding. View
//! models (`EnrichedPerson`, `DashboardSummary`, `ConversationCard`) are
//! derived from them by the analysis functions.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

/// Fallback shown for a sentence without text.
pub const NO_TEXT_FALLBACK: &str = "(no text available)";

/// A caretaker or other person known to the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Person {
    /// Backend identifier, if serialised.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name; unique key used in URLs.
    #[serde(default)]
    pub name: String,
    /// Role such as "Nurse" or "Caregiver".
    #[serde(default)]
    pub role: String,
    /// References to the conversations this person took part in.
    ///
    /// The backend sends ids as strings, older fixtures as numbers.
    #[serde(default)]
    pub conversations: Option<Vec<Value>>,
}

impl Person {
    /// Number of conversation references (absent counts as zero).
    pub fn conversation_count(&self) -> usize {
        self.conversations.as_ref().map_or(0, Vec::len)
    }
}

/// A single sentence of a conversation transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Id of the person who spoke.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Backend-defined sentiment payload (label or score map).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub total_time: u64,
}

impl Sentence {
    /// Text to show for this sentence, falling back to a placeholder.
    pub fn display_text(&self) -> &str {
        match self.text.as_deref() {
            Some(text) if !text.is_empty() => text,
            _ => NO_TEXT_FALLBACK,
        }
    }
}

/// A recorded conversation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// ISO-8601 start time as sent by the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    /// Duration in seconds.
    #[serde(default)]
    pub total_time: u64,
    #[serde(default)]
    pub participants: Option<Vec<Value>>,
    /// Overall score in [-1, 1]. Non-numeric payloads count as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Value>,
    /// Sentence indices, as integers or numeric strings.
    #[serde(default)]
    pub flags: Option<Vec<Value>>,
    #[serde(default)]
    pub sentences: Option<Vec<Sentence>>,
    /// Short free-text summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Conversation {
    /// Parsed start time. Naive timestamps are read as UTC; unparseable
    /// values are treated as absent.
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_time.as_deref().and_then(parse_timestamp)
    }

    /// Numeric sentiment score, if any.
    pub fn sentiment_score(&self) -> Option<f64> {
        self.sentiment.as_ref().and_then(Value::as_f64)
    }

    pub fn flags(&self) -> &[Value] {
        self.flags.as_deref().unwrap_or(&[])
    }

    pub fn sentences(&self) -> &[Sentence] {
        self.sentences.as_deref().unwrap_or(&[])
    }

    /// Number of flags, regardless of whether they resolve to a sentence.
    pub fn flag_count(&self) -> usize {
        self.flags().len()
    }
}

/// Parse a backend timestamp (RFC 3339, or naive ISO-8601 as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Response of `GET /flags/{name}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlagSummary {
    #[serde(default)]
    pub total_flags: Option<u64>,
}

impl FlagSummary {
    pub fn total(&self) -> u64 {
        self.total_flags.unwrap_or(0)
    }
}

/// Response of `GET /person/{name}`: wrapped, bare, or an error marker.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PersonEnvelope {
    Error { error: String },
    Wrapped { person: Person },
    Bare(Person),
}

/// Response of `GET /conversation/{id}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ConversationEnvelope {
    Error { error: String },
    Found(Conversation),
}

/// A person joined with their alert count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedPerson {
    pub name: String,
    /// Number of conversation references.
    pub conversations: usize,
    pub role: String,
    /// Total flags attributed to this person.
    pub alerts: u64,
}

/// Marker for the overall dashboard sentiment, which is not computed yet.
///
/// Serialises and displays as `"XX"` so consumers keep seeing the field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentPlaceholder;

impl SentimentPlaceholder {
    pub const MARKER: &'static str = "XX";
}

impl fmt::Display for SentimentPlaceholder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(Self::MARKER)
    }
}

impl Serialize for SentimentPlaceholder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(Self::MARKER)
    }
}

/// Rolling summary shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub flag_count: usize,
    pub conversation_count: usize,
    pub sentiment: SentimentPlaceholder,
}

/// A conversation prepared for a list view.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationCard {
    pub id: String,
    pub started_at: Option<DateTime<Utc>>,
    pub flag_count: usize,
    pub has_flags: bool,
    /// Warning banner, present only when the conversation has flags.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
    /// Score and label, e.g. "0.35 (Good)", or "Unknown".
    pub sentiment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_decode_conversation_from_backend() {
        let conv: Conversation = serde_json::from_value(json!({
            "_id": "65f0a1",
            "start_time": "2024-03-01T10:00:00",
            "total_time": 120,
            "participants": ["p1", "p2"],
            "sentiment": 0.42,
            "flags": ["0", "2"],
            "sentences": [
                {"_id": "s1", "speaker": "p1", "text": "Hello", "sentiment": "positive"},
                {"text": "How are you?"}
            ]
        }))
        .unwrap();

        assert_eq!(conv.id, "65f0a1");
        assert_eq!(conv.flag_count(), 2);
        assert_eq!(conv.sentences().len(), 2);
        assert_eq!(conv.sentiment_score(), Some(0.42));
        assert_eq!(
            conv.started_at(),
            Some(Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_decode_conversation_with_missing_fields() {
        let conv: Conversation = serde_json::from_value(json!({
            "_id": "c1",
            "flags": null,
            "sentiment": ""
        }))
        .unwrap();

        assert_eq!(conv.flag_count(), 0);
        assert!(conv.sentences().is_empty());
        assert_eq!(conv.sentiment_score(), None);
        assert_eq!(conv.started_at(), None);
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2024-03-01T10:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T12:00:00+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01T10:00:00.000"), Some(expected));
        assert_eq!(parse_timestamp("2024-03-01 10:00:00"), Some(expected));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn test_sentence_display_text_fallback() {
        let with_text = Sentence {
            text: Some("I fell down".to_string()),
            ..Sentence::default()
        };
        assert_eq!(with_text.display_text(), "I fell down");
        assert_eq!(Sentence::default().display_text(), NO_TEXT_FALLBACK);

        let empty = Sentence {
            text: Some(String::new()),
            ..Sentence::default()
        };
        assert_eq!(empty.display_text(), NO_TEXT_FALLBACK);
    }

    #[test]
    fn test_person_envelope_shapes() {
        let wrapped: PersonEnvelope =
            serde_json::from_value(json!({"person": {"name": "Alice", "role": "Nurse"}})).unwrap();
        assert!(matches!(wrapped, PersonEnvelope::Wrapped { ref person } if person.name == "Alice"));

        let bare: PersonEnvelope =
            serde_json::from_value(json!({"name": "Bob", "conversations": [1, 2]})).unwrap();
        match bare {
            PersonEnvelope::Bare(person) => assert_eq!(person.conversation_count(), 2),
            other => panic!("unexpected envelope: {:?}", other),
        }

        let error: PersonEnvelope =
            serde_json::from_value(json!({"error": "Person not found"})).unwrap();
        assert!(matches!(error, PersonEnvelope::Error { ref error } if error == "Person not found"));
    }

    #[test]
    fn test_flag_summary_defaults_to_zero() {
        let summary: FlagSummary = serde_json::from_value(json!({})).unwrap();
        assert_eq!(summary.total(), 0);

        let summary: FlagSummary = serde_json::from_value(json!({"total_flags": 3})).unwrap();
        assert_eq!(summary.total(), 3);
    }

    #[test]
    fn test_sentiment_placeholder_serializes_as_marker() {
        let summary = DashboardSummary::default();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["sentiment"], "XX");
        assert_eq!(summary.sentiment.to_string(), "XX");
    }
}
