//! Active-state, inventory, health and character-state shapes, along with
//! the transient change records applied to them while building a page.
use serde::{Deserialize, Serialize};

use crate::core::normalize::NameKeyedMap;

/// A free-text entry carrying a stable, prefixed identifier (`th-3`, `inv-1`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyedEntry {
    pub id: String,
    pub text: String,
}

impl KeyedEntry {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// What kind of narrative question an open thread poses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ThreadType {
    Mystery,
    Quest,
    Relationship,
    Danger,
    Information,
    Resource,
    Moral,
}

/// How pressing a thread or promise is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Default for Urgency {
    fn default() -> Self {
        Self::Medium
    }
}

/// An open narrative thread as it sits in the active state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadEntry {
    pub id: String,
    pub text: String,
    pub thread_type: ThreadType,
    pub urgency: Urgency,
}

/// A thread proposed by the writer, before it has been given an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadAddition {
    pub text: String,
    pub thread_type: ThreadType,
    #[serde(default)]
    pub urgency: Urgency,
}

/// Location, threats, constraints and open threads at a point in the story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveState {
    pub current_location: String,
    pub active_threats: Vec<KeyedEntry>,
    pub active_constraints: Vec<KeyedEntry>,
    pub open_threads: Vec<ThreadEntry>,
}

impl ActiveState {
    pub fn open_thread(&self, id: &str) -> Option<&ThreadEntry> {
        self.open_threads.iter().find(|thread| thread.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.current_location.is_empty()
            && self.active_threats.is_empty()
            && self.active_constraints.is_empty()
            && self.open_threads.is_empty()
    }
}

/// Typed delta consumed by the active-state reducer.
///
/// `new_location` is `None` when the location did not change; an empty
/// location string is never used to mean "nowhere".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveStateChanges {
    pub new_location: Option<String>,
    pub threats_added: Vec<String>,
    pub threats_removed: Vec<String>,
    pub constraints_added: Vec<String>,
    pub constraints_removed: Vec<String>,
    pub threads_added: Vec<ThreadAddition>,
    pub threads_resolved: Vec<String>,
}

impl ActiveStateChanges {
    pub fn is_empty(&self) -> bool {
        self.new_location.is_none()
            && self.threats_added.is_empty()
            && self.threats_removed.is_empty()
            && self.constraints_added.is_empty()
            && self.constraints_removed.is_empty()
            && self.threads_added.is_empty()
            && self.threads_resolved.is_empty()
    }
}

/// Add/remove delta for an ordered list of keyed entries (inventory, health).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyedChanges {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl KeyedChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// New situational facts for one character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterStateAddition {
    pub character_name: String,
    pub states: Vec<String>,
}

/// Per-page character-state delta: additions grouped by character, removals by `cs-` id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterStateChanges {
    pub added: Vec<CharacterStateAddition>,
    pub removed: Vec<String>,
}

impl CharacterStateChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Character name (first-stored casing) to that character's ordered facts.
pub type AccumulatedCharacterState = NameKeyedMap<Vec<KeyedEntry>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_thread_lookup() {
        let state = ActiveState {
            current_location: "Docks".to_string(),
            open_threads: vec![ThreadEntry {
                id: "td-2".to_string(),
                text: "Who hired the smugglers?".to_string(),
                thread_type: ThreadType::Mystery,
                urgency: Urgency::High,
            }],
            ..ActiveState::default()
        };
        assert_eq!(state.open_thread("td-2").map(|t| t.urgency), Some(Urgency::High));
        assert!(state.open_thread("td-1").is_none());
        assert!(!state.is_empty());
        assert!(ActiveState::default().is_empty());
    }

    #[test]
    fn enums_use_screaming_case_on_the_wire() {
        assert_eq!(
            ron::to_string(&ThreadType::Relationship).unwrap(),
            "RELATIONSHIP"
        );
        let parsed: Urgency = ron::from_str("HIGH").unwrap();
        assert_eq!(parsed, Urgency::High);
    }

    #[test]
    fn thread_addition_urgency_defaults_to_medium() {
        let parsed: ThreadAddition =
            ron::from_str(r#"(text: "Find the key", threadType: QUEST)"#).unwrap();
        assert_eq!(parsed.urgency, Urgency::Medium);
    }

    #[test]
    fn change_records_report_emptiness() {
        assert!(ActiveStateChanges::default().is_empty());
        assert!(KeyedChanges::default().is_empty());
        assert!(CharacterStateChanges::default().is_empty());
        let changes = ActiveStateChanges {
            new_location: Some("Cellar".to_string()),
            ..ActiveStateChanges::default()
        };
        assert!(!changes.is_empty());
    }
}
