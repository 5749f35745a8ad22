//! Caretaker alert enrichment.
//!
//! Each person's flag summary is looked up concurrently; the joined list
//! keeps the order of the input, not the order lookups finish in.

use crate::api::RecordSource;
use crate::models::{EnrichedPerson, FlagSummary, Person};
use futures::future::join_all;
use tracing::{debug, warn};

/// Join a person with their flag summary.
pub fn enrich_person(person: &Person, flags: &FlagSummary) -> EnrichedPerson {
    EnrichedPerson {
        name: person.name.clone(),
        conversations: person.conversation_count(),
        role: person.role.clone(),
        alerts: flags.total(),
    }
}

/// Enrich every person with their alert count.
///
/// A failed lookup only affects that person: their alerts degrade to 0.
/// Resolves once every lookup has finished.
pub async fn join_alerts(people: &[Person], source: &dyn RecordSource) -> Vec<EnrichedPerson> {
    debug!("Looking up flags for {} people", people.len());

    let lookups = people.iter().map(|person| async move {
        let flags = match source.flags_for(&person.name).await {
            Ok(flags) => flags,
            Err(e) => {
                warn!("Flag lookup failed for {}: {}", person.name, e);
                FlagSummary::default()
            }
        };
        enrich_person(person, &flags)
    });

    join_all(lookups).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::has_alerts;
    use crate::api::testing::MemorySource;
    use serde_json::json;
    use std::time::Duration;

    fn person(name: &str, role: &str, conversations: usize) -> Person {
        Person {
            id: None,
            name: name.to_string(),
            role: role.to_string(),
            conversations: Some((0..conversations).map(|i| json!(i)).collect()),
        }
    }

    #[tokio::test]
    async fn test_join_alerts_single_person() {
        let mut source = MemorySource::default();
        source.flags.insert("Alice".to_string(), 3);

        let people = vec![person("Alice", "Nurse", 2)];
        let enriched = join_alerts(&people, &source).await;

        assert_eq!(
            enriched,
            vec![EnrichedPerson {
                name: "Alice".to_string(),
                conversations: 2,
                role: "Nurse".to_string(),
                alerts: 3,
            }]
        );
        assert!(has_alerts(enriched[0].alerts));
    }

    #[tokio::test]
    async fn test_join_alerts_preserves_input_order() {
        let mut source = MemorySource::default();
        source.flags.insert("Alice".to_string(), 1);
        source.flags.insert("Bob".to_string(), 2);
        source.flags.insert("Carol".to_string(), 3);
        // Alice finishes last, Carol first.
        source
            .delays
            .insert("Alice".to_string(), Duration::from_millis(60));
        source
            .delays
            .insert("Bob".to_string(), Duration::from_millis(30));

        let people = vec![
            person("Alice", "Nurse", 1),
            person("Bob", "Caregiver", 0),
            person("Carol", "Nurse", 4),
        ];
        let enriched = join_alerts(&people, &source).await;

        let names: Vec<&str> = enriched.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Alice", "Bob", "Carol"]);
        let alerts: Vec<u64> = enriched.iter().map(|p| p.alerts).collect();
        assert_eq!(alerts, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_join_alerts_isolates_failures() {
        let mut source = MemorySource::default();
        source.flags.insert("Alice".to_string(), 4);
        source.flags.insert("Bob".to_string(), 7);
        source.failing.insert("Bob".to_string());

        let people = vec![person("Alice", "Nurse", 1), person("Bob", "Nurse", 1)];
        let enriched = join_alerts(&people, &source).await;

        assert_eq!(enriched.len(), 2);
        assert_eq!(enriched[0].alerts, 4);
        assert_eq!(enriched[1].alerts, 0);
        assert!(!has_alerts(enriched[1].alerts));
    }

    #[tokio::test]
    async fn test_join_alerts_missing_total_is_zero() {
        let source = MemorySource::default();
        let enriched = join_alerts(&[person("Dana", "", 0)], &source).await;
        assert_eq!(enriched[0].alerts, 0);
        assert_eq!(enriched[0].conversations, 0);
    }

    #[test]
    fn test_join_alerts_empty() {
        let source = MemorySource::default();
        let enriched = tokio_test::block_on(join_alerts(&[], &source));
        assert!(enriched.is_empty());
    }
}
