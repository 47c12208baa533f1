use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::promise::{PromiseScope, PromiseType, TrackedPromise};
use super::relationship::{AccumulatedNpcAgendas, AccumulatedNpcRelationships};
use super::state::{
    AccumulatedCharacterState, ActiveState, ActiveStateChanges, CharacterStateChanges,
    KeyedChanges, KeyedEntry, ThreadType, Urgency,
};

/// Newtype wrapper for page IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PageId(pub u32);

/// Where a page sits in the story's act/beat structure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructurePosition {
    pub act_index: usize,
    pub beat_index: usize,
}

impl StructurePosition {
    pub fn new(act_index: usize, beat_index: usize) -> Self {
        Self {
            act_index,
            beat_index,
        }
    }
}

/// A choice offered to the protagonist at the end of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub text: String,
    #[serde(default)]
    pub choice_type: Option<String>,
    #[serde(default)]
    pub primary_delta: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmotionIntensity {
    Mild,
    Moderate,
    Strong,
    Overwhelming,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecondaryEmotion {
    pub emotion: String,
    pub cause: String,
}

/// The protagonist's emotional state at the end of a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtagonistAffect {
    pub primary_emotion: String,
    pub primary_intensity: EmotionIntensity,
    pub primary_cause: String,
    #[serde(default)]
    pub secondary_emotions: Vec<SecondaryEmotion>,
    #[serde(default)]
    pub dominant_motivation: String,
}

/// Snapshot of a thread taken at the moment it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedThreadMeta {
    pub thread_type: ThreadType,
    pub urgency: Urgency,
}

/// Snapshot of a promise taken at the moment it was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedPromiseMeta {
    pub promise_type: PromiseType,
    pub scope: PromiseScope,
    pub urgency: Urgency,
}

/// Open thread id to the number of pages it has stayed open.
pub type ThreadAges = FxHashMap<String, u32>;

/// This page's own deltas, kept for display and replay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDeltas {
    pub active_state: ActiveStateChanges,
    pub inventory: KeyedChanges,
    pub health: KeyedChanges,
    pub character_state: CharacterStateChanges,
}

/// The accumulated world model of a branch as of one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccumulatedSnapshots {
    pub active_state: ActiveState,
    pub inventory: Vec<KeyedEntry>,
    pub health: Vec<KeyedEntry>,
    pub character_state: AccumulatedCharacterState,
    pub thread_ages: ThreadAges,
    pub promises: Vec<TrackedPromise>,
    pub npc_agendas: Arc<AccumulatedNpcAgendas>,
    pub npc_relationships: Arc<AccumulatedNpcRelationships>,
}

/// An immutable node of the story tree.
///
/// Pages are assembled once by the page pipeline and only read afterwards;
/// every snapshot is derived from the parent's snapshots plus this page's
/// deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    id: PageId,
    parent_page_id: Option<PageId>,
    parent_choice_index: Option<usize>,
    narrative: String,
    scene_summary: String,
    choices: Vec<Choice>,
    protagonist_affect: Option<ProtagonistAffect>,
    is_ending: bool,
    deltas: PageDeltas,
    snapshots: AccumulatedSnapshots,
    resolved_thread_meta: FxHashMap<String, ResolvedThreadMeta>,
    resolved_promise_meta: FxHashMap<String, ResolvedPromiseMeta>,
    position: StructurePosition,
}

/// Field bundle handed to [`Page::assemble`]; only the page pipeline builds one.
pub(crate) struct PageParts {
    pub id: PageId,
    pub parent: Option<(PageId, usize)>,
    pub narrative: String,
    pub scene_summary: String,
    pub choices: Vec<Choice>,
    pub protagonist_affect: Option<ProtagonistAffect>,
    pub is_ending: bool,
    pub deltas: PageDeltas,
    pub snapshots: AccumulatedSnapshots,
    pub resolved_thread_meta: FxHashMap<String, ResolvedThreadMeta>,
    pub resolved_promise_meta: FxHashMap<String, ResolvedPromiseMeta>,
    pub position: StructurePosition,
}

impl Page {
    pub(crate) fn assemble(parts: PageParts) -> Self {
        Self {
            id: parts.id,
            parent_page_id: parts.parent.map(|(id, _)| id),
            parent_choice_index: parts.parent.map(|(_, index)| index),
            narrative: parts.narrative,
            scene_summary: parts.scene_summary,
            choices: parts.choices,
            protagonist_affect: parts.protagonist_affect,
            is_ending: parts.is_ending,
            deltas: parts.deltas,
            snapshots: parts.snapshots,
            resolved_thread_meta: parts.resolved_thread_meta,
            resolved_promise_meta: parts.resolved_promise_meta,
            position: parts.position,
        }
    }

    pub fn id(&self) -> PageId {
        self.id
    }

    /// `None` for the opening page.
    pub fn parent_page_id(&self) -> Option<PageId> {
        self.parent_page_id
    }

    pub fn parent_choice_index(&self) -> Option<usize> {
        self.parent_choice_index
    }

    pub fn is_opening(&self) -> bool {
        self.parent_page_id.is_none()
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn scene_summary(&self) -> &str {
        &self.scene_summary
    }

    pub fn choices(&self) -> &[Choice] {
        &self.choices
    }

    pub fn protagonist_affect(&self) -> Option<&ProtagonistAffect> {
        self.protagonist_affect.as_ref()
    }

    pub fn is_ending(&self) -> bool {
        self.is_ending
    }

    pub fn deltas(&self) -> &PageDeltas {
        &self.deltas
    }

    pub fn snapshots(&self) -> &AccumulatedSnapshots {
        &self.snapshots
    }

    pub fn active_state(&self) -> &ActiveState {
        &self.snapshots.active_state
    }

    pub fn inventory(&self) -> &[KeyedEntry] {
        &self.snapshots.inventory
    }

    pub fn health(&self) -> &[KeyedEntry] {
        &self.snapshots.health
    }

    pub fn character_state(&self) -> &AccumulatedCharacterState {
        &self.snapshots.character_state
    }

    pub fn thread_ages(&self) -> &ThreadAges {
        &self.snapshots.thread_ages
    }

    pub fn promises(&self) -> &[TrackedPromise] {
        &self.snapshots.promises
    }

    pub fn npc_agendas(&self) -> &Arc<AccumulatedNpcAgendas> {
        &self.snapshots.npc_agendas
    }

    pub fn npc_relationships(&self) -> &Arc<AccumulatedNpcRelationships> {
        &self.snapshots.npc_relationships
    }

    pub fn resolved_thread_meta(&self) -> &FxHashMap<String, ResolvedThreadMeta> {
        &self.resolved_thread_meta
    }

    pub fn resolved_promise_meta(&self) -> &FxHashMap<String, ResolvedPromiseMeta> {
        &self.resolved_promise_meta
    }

    pub fn position(&self) -> StructurePosition {
        self.position
    }
}
