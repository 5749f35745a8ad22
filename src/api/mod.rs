//! Backend record fetching.
//!
//! `RecordSource` is the seam between the page assemblers and the
//! backend. `HttpRecordSource` talks to the real API; tests use an
//! in-memory source.

pub mod client;

pub use client::{ApiConfig, HttpRecordSource};

use crate::error::Result;
use crate::models::{Conversation, ConversationEnvelope, FlagSummary, Person, PersonEnvelope};
use async_trait::async_trait;

/// Read-only access to the backend collections.
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// `GET /people`
    async fn people(&self) -> Result<Vec<Person>>;

    /// `GET /flags/{name}`
    async fn flags_for(&self, name: &str) -> Result<FlagSummary>;

    /// `GET /conversations`
    async fn conversations(&self) -> Result<Vec<Conversation>>;

    /// `GET /conversations/{name}`
    async fn conversations_for(&self, name: &str) -> Result<Vec<Conversation>>;

    /// `GET /conversation/{id}`
    async fn conversation(&self, id: &str) -> Result<ConversationEnvelope>;

    /// `GET /person/{name}`
    async fn person(&self, name: &str) -> Result<PersonEnvelope>;
}
