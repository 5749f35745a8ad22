//! Page rendering.
//!
//! Turns assembled pages into Markdown for the terminal or JSON for
//! other tools. Rendering never fetches or computes anything itself.

use crate::models::ConversationCard;
use crate::views::{
    CaretakerCard, ConversationPage, DashboardPage, FlaggedSentence, PageState, PersonPage,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Placeholder shown while a page is loading.
pub const LOADING_TEXT: &str = "Loading...";

/// Render any page state as Markdown.
pub fn generate_markdown<T>(state: &PageState<T>, render: impl Fn(&T) -> String) -> String {
    match state {
        PageState::Loaded(page) => render(page),
        PageState::Error { error } => generate_error_section(error),
    }
}

/// Render any page state as pretty JSON.
pub fn generate_json<T: Serialize>(state: &PageState<T>) -> Result<String> {
    serde_json::to_string_pretty(state).map_err(Into::into)
}

/// Render the dashboard.
pub fn generate_dashboard_markdown(page: &DashboardPage) -> String {
    let mut output = String::new();

    output.push_str("# Caretaker Dashboard\n\n");
    output.push_str(&format!(
        "*Generated {}*\n\n",
        page.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    output.push_str(&format!("## Last {} Hours\n\n", page.window_hours));
    output.push_str("| Flags | Conversations | Sentiment |\n");
    output.push_str("|:---:|:---:|:---:|\n");
    output.push_str(&format!(
        "| {} | {} | {} |\n\n",
        page.summary.flag_count, page.summary.conversation_count, page.summary.sentiment
    ));

    output.push_str("## Caretakers\n\n");
    if page.caretakers.is_empty() {
        output.push_str("No caretakers found.\n\n");
    }
    for caretaker in &page.caretakers {
        output.push_str(&generate_caretaker_block(caretaker));
    }

    output.push_str("## Conversations\n\n");
    output.push_str(&generate_conversation_list(&page.conversations));

    output
}

/// Render a caretaker's page.
pub fn generate_person_markdown(page: &PersonPage) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {}\n\n", page.caretaker.person.name));
    output.push_str(&generate_caretaker_block(&page.caretaker));

    output.push_str("## Conversations\n\n");
    output.push_str(&generate_conversation_list(&page.conversations));

    output
}

/// Render a conversation's page with its flagged dialogue.
pub fn generate_conversation_markdown(page: &ConversationPage) -> String {
    let mut output = String::new();

    output.push_str("# Conversation\n\n");
    output.push_str(&generate_conversation_block(&page.card));

    if !page.flagged_sentences.is_empty() {
        output.push_str("## Flagged Dialogue\n\n");
        for sentence in &page.flagged_sentences {
            output.push_str(&generate_flagged_line(sentence));
        }
        output.push('\n');
    }

    output
}

fn generate_error_section(error: &str) -> String {
    format!("# Error\n\n{}\n", error)
}

fn generate_caretaker_block(caretaker: &CaretakerCard) -> String {
    let mut block = String::new();

    if let Some(ref banner) = caretaker.banner {
        block.push_str(&format!("> {}\n\n", banner));
    }

    let person = &caretaker.person;
    block.push_str(&format!("### {}\n\n", person.name));
    block.push_str(&format!("- **Role:** {}\n", person.role));
    block.push_str(&format!("- **Conversations:** {}\n", person.conversations));
    block.push_str(&format!("- **Alerts:** {}\n\n", person.alerts));

    block
}

fn generate_conversation_list(cards: &[ConversationCard]) -> String {
    if cards.is_empty() {
        return "No conversations found.\n\n".to_string();
    }
    cards.iter().map(generate_conversation_block).collect()
}

fn generate_conversation_block(card: &ConversationCard) -> String {
    let mut block = String::new();

    if let Some(ref banner) = card.banner {
        block.push_str(&format!("> {}\n\n", banner));
    }

    block.push_str(&format!("### {}\n\n", format_start(card.started_at)));
    block.push_str(&format!("- **Id:** `{}`\n", card.id));
    block.push_str(&format!("- **Flags:** {}\n", card.flag_count));
    block.push_str(&format!("- **Sentiment:** {}\n", card.sentiment));
    if let Some(ref summary) = card.summary {
        block.push_str(&format!("- **Summary:** {}\n", summary));
    }
    block.push('\n');

    block
}

fn generate_flagged_line(sentence: &FlaggedSentence) -> String {
    match sentence.speaker {
        Some(ref speaker) => format!("- **{}:** {}\n", speaker, sentence.text),
        None => format!("- {}\n", sentence.text),
    }
}

fn format_start(started_at: Option<DateTime<Utc>>) -> String {
    started_at
        .map(|start| start.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "Unknown start time".to_string())
}
