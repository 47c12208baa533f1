use serde::{Deserialize, Serialize};

use crate::core::normalize::NameKeyedMap;

/// An NPC's current standing with the protagonist.
///
/// `valence` runs from -5 (hostile) to 5 (devoted).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcRelationship {
    pub npc_name: String,
    pub valence: i8,
    pub dynamic: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub current_tension: String,
    #[serde(default)]
    pub leverage: String,
}

/// What an NPC is pursuing while off the page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NpcAgenda {
    pub npc_name: String,
    pub current_goal: String,
    #[serde(default)]
    pub leverage: String,
    #[serde(default)]
    pub fear: String,
    #[serde(default)]
    pub off_screen_behavior: String,
}

/// A character produced by the story-setup decomposition step.
///
/// The protagonist is the entry whose `relationship` is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposedCharacter {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub relationship: Option<DecomposedRelationship>,
}

/// The seed relationship a decomposed NPC starts the story with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecomposedRelationship {
    pub valence: i8,
    pub dynamic: String,
    #[serde(default)]
    pub history: String,
    #[serde(default)]
    pub current_tension: String,
    #[serde(default)]
    pub leverage: String,
}

/// NPC name to that NPC's single current agenda.
pub type AccumulatedNpcAgendas = NameKeyedMap<NpcAgenda>;

/// NPC name to that NPC's single current relationship.
pub type AccumulatedNpcRelationships = NameKeyedMap<NpcRelationship>;
