//! Already-parsed outputs of the writer, accountant and analyst stages.
//!
//! These are the engine's only inputs besides the parent page. They arrive
//! schema-checked; every field defaults when absent so partial payloads
//! from the collaborators still deserialize.
use serde::{Deserialize, Serialize};

use super::page::{Choice, ProtagonistAffect};
use super::promise::DetectedPromise;
use super::relationship::{NpcAgenda, NpcRelationship};
use super::state::{CharacterStateAddition, ThreadAddition};

/// Narrative plus every raw delta produced for one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageBuildResult {
    pub narrative: String,
    pub scene_summary: String,
    pub choices: Vec<Choice>,
    pub current_location: String,
    pub threats_added: Vec<String>,
    pub threats_removed: Vec<String>,
    pub constraints_added: Vec<String>,
    pub constraints_removed: Vec<String>,
    pub threads_added: Vec<ThreadAddition>,
    pub threads_resolved: Vec<String>,
    pub inventory_added: Vec<String>,
    pub inventory_removed: Vec<String>,
    pub health_added: Vec<String>,
    pub health_removed: Vec<String>,
    pub character_state_changes_added: Vec<CharacterStateAddition>,
    pub character_state_changes_removed: Vec<String>,
    pub npc_agenda_updates: Vec<NpcAgenda>,
    pub npc_relationship_updates: Vec<NpcRelationship>,
    pub protagonist_affect: Option<ProtagonistAffect>,
    pub is_ending: bool,
}

/// How well a resolved thread paid off, according to the analyst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SatisfactionLevel {
    Rushed,
    Adequate,
    WellEarned,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPayoffAssessment {
    pub thread_id: String,
    #[serde(default)]
    pub thread_text: String,
    pub satisfaction_level: SatisfactionLevel,
    #[serde(default)]
    pub reasoning: String,
}

/// Narrative analysis of a freshly written page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalystResult {
    pub thread_payoff_assessments: Vec<ThreadPayoffAssessment>,
    pub promises_detected: Vec<DetectedPromise>,
    pub promises_resolved: Vec<String>,
}
