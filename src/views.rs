//! Page assembly.
//!
//! Each page owns the snapshot it fetched. Every flow ends in a
//! `PageState`: either the fully assembled page or an error marker.
//! Fetch failures never escape an assembler.

use crate::analysis::{
    alert_banner, conversation_card, enrich_person, extract_flagged, join_alerts, summarize,
    summarize_within, SUMMARY_WINDOW_HOURS,
};
use crate::api::RecordSource;
use crate::models::{
    Conversation, ConversationCard, ConversationEnvelope, DashboardSummary, EnrichedPerson,
    PersonEnvelope, Sentence,
};
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{info, warn};

pub const DASHBOARD_ERROR: &str = "Failed to fetch dashboard data";
pub const PERSON_ERROR: &str = "Failed to fetch caretaker details";
pub const CONVERSATION_ERROR: &str = "Failed to fetch conversation";

/// Outcome of loading a page.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PageState<T> {
    Loaded(T),
    Error { error: String },
}

impl<T> PageState<T> {
    pub fn error(reason: impl Into<String>) -> Self {
        PageState::Error {
            error: reason.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, PageState::Error { .. })
    }
}

/// A caretaker card with its warning banner.
#[derive(Debug, Clone, Serialize)]
pub struct CaretakerCard {
    #[serde(flatten)]
    pub person: EnrichedPerson,
    pub has_alerts: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner: Option<String>,
}

impl From<EnrichedPerson> for CaretakerCard {
    fn from(person: EnrichedPerson) -> Self {
        let banner = alert_banner(person.alerts);
        Self {
            has_alerts: banner.is_some(),
            banner,
            person,
        }
    }
}

/// The `/` page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardPage {
    pub generated_at: DateTime<Utc>,
    pub window_hours: i64,
    pub summary: DashboardSummary,
    pub caretakers: Vec<CaretakerCard>,
    pub conversations: Vec<ConversationCard>,
}

/// The `/person/:name` page.
#[derive(Debug, Clone, Serialize)]
pub struct PersonPage {
    pub caretaker: CaretakerCard,
    pub conversations: Vec<ConversationCard>,
}

/// The `/conversation/:id` page.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationPage {
    pub card: ConversationCard,
    pub flagged_sentences: Vec<FlaggedSentence>,
}

/// A flagged sentence ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedSentence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speaker: Option<String>,
    pub text: String,
}

impl From<&Sentence> for FlaggedSentence {
    fn from(sentence: &Sentence) -> Self {
        Self {
            speaker: sentence.speaker.clone(),
            text: sentence.display_text().to_string(),
        }
    }
}

/// Assemble the dashboard: people and conversations are fetched
/// concurrently, then every person is enriched with their alert count.
/// The summary covers the last 72 hours.
pub async fn assemble_dashboard(
    source: &dyn RecordSource,
    now: DateTime<Utc>,
) -> PageState<DashboardPage> {
    let window = Duration::hours(SUMMARY_WINDOW_HOURS);
    load_dashboard(source, now, window, |conversations| {
        summarize(conversations, now)
    })
    .await
}

/// Assemble the dashboard with a custom summary window.
pub async fn assemble_dashboard_within(
    source: &dyn RecordSource,
    now: DateTime<Utc>,
    window: Duration,
) -> PageState<DashboardPage> {
    load_dashboard(source, now, window, |conversations| {
        summarize_within(conversations, now, window)
    })
    .await
}

async fn load_dashboard(
    source: &dyn RecordSource,
    now: DateTime<Utc>,
    window: Duration,
    summarizer: impl FnOnce(&[Conversation]) -> DashboardSummary,
) -> PageState<DashboardPage> {
    info!("Loading dashboard");

    let (people, conversations) = tokio::join!(source.people(), source.conversations());

    let (people, conversations) = match (people, conversations) {
        (Ok(people), Ok(conversations)) => (people, conversations),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Dashboard fetch failed: {}", e);
            return PageState::error(DASHBOARD_ERROR);
        }
    };

    let caretakers = join_alerts(&people, source)
        .await
        .into_iter()
        .map(CaretakerCard::from)
        .collect();

    let summary = summarizer(&conversations);
    info!(
        "Dashboard: {} flags across {} recent conversations",
        summary.flag_count, summary.conversation_count
    );

    PageState::Loaded(DashboardPage {
        generated_at: now,
        window_hours: window.num_hours(),
        summary,
        caretakers,
        conversations: conversations.iter().map(conversation_card).collect(),
    })
}

/// Assemble a caretaker's page from their record, flag summary and
/// conversations.
pub async fn assemble_person(source: &dyn RecordSource, name: &str) -> PageState<PersonPage> {
    info!("Loading caretaker {}", name);

    let person = match source.person(name).await {
        Ok(PersonEnvelope::Error { error }) => {
            warn!("Backend reported error for {}: {}", name, error);
            return PageState::error(error);
        }
        Ok(PersonEnvelope::Wrapped { person }) | Ok(PersonEnvelope::Bare(person)) => person,
        Err(e) => {
            warn!("Person fetch failed for {}: {}", name, e);
            return PageState::error(PERSON_ERROR);
        }
    };

    let flags = match source.flags_for(&person.name).await {
        Ok(flags) => flags,
        Err(e) => {
            warn!("Flag fetch failed for {}: {}", person.name, e);
            return PageState::error(PERSON_ERROR);
        }
    };

    let conversations = match source.conversations_for(&person.name).await {
        Ok(conversations) => conversations,
        Err(e) => {
            warn!("Conversation fetch failed for {}: {}", person.name, e);
            return PageState::error(PERSON_ERROR);
        }
    };

    let mut enriched = enrich_person(&person, &flags);
    if enriched.role.is_empty() {
        enriched.role = "Unknown".to_string();
    }

    PageState::Loaded(PersonPage {
        caretaker: CaretakerCard::from(enriched),
        conversations: conversations.iter().map(conversation_card).collect(),
    })
}

/// Assemble a conversation's page with its flagged sentences.
pub async fn assemble_conversation(
    source: &dyn RecordSource,
    id: &str,
) -> PageState<ConversationPage> {
    info!("Loading conversation {}", id);

    match source.conversation(id).await {
        Ok(ConversationEnvelope::Found(conversation)) => {
            PageState::Loaded(conversation_page(&conversation))
        }
        Ok(ConversationEnvelope::Error { error }) => {
            warn!("Backend reported error for conversation {}: {}", id, error);
            PageState::error(error)
        }
        Err(e) => {
            warn!("Conversation fetch failed for {}: {}", id, e);
            PageState::error(CONVERSATION_ERROR)
        }
    }
}

fn conversation_page(conversation: &Conversation) -> ConversationPage {
    ConversationPage {
        card: conversation_card(conversation),
        flagged_sentences: extract_flagged(conversation)
            .into_iter()
            .map(FlaggedSentence::from)
            .collect(),
    }
}
