use serde::{Deserialize, Serialize};

use super::state::Urgency;

/// The kind of narrative commitment a promise represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromiseType {
    ChekhovGun,
    Foreshadowing,
    DramaticQuestion,
    DramaticIrony,
    TickingClock,
    UnresolvedEmotion,
}

/// The narrative horizon over which a promise stays relevant.
///
/// Only `Scene` promises are subject to age-based expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PromiseScope {
    Scene,
    Beat,
    Act,
    Story,
}

/// A promise reported by the analyst on this page, not yet tracked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedPromise {
    pub description: String,
    pub promise_type: PromiseType,
    pub scope: PromiseScope,
    #[serde(default)]
    pub resolution_hint: String,
    #[serde(default)]
    pub suggested_urgency: Urgency,
}

/// A promise carried forward along a branch, aged once per page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedPromise {
    pub id: String,
    pub description: String,
    pub promise_type: PromiseType,
    pub scope: PromiseScope,
    pub resolution_hint: String,
    pub suggested_urgency: Urgency,
    pub age: u32,
}

impl TrackedPromise {
    /// Start tracking a detected promise under `id` at age 0.
    pub fn from_detected(id: String, detected: &DetectedPromise) -> Self {
        Self {
            id,
            description: detected.description.trim().to_string(),
            promise_type: detected.promise_type,
            scope: detected.scope,
            resolution_hint: detected.resolution_hint.trim().to_string(),
            suggested_urgency: detected.suggested_urgency,
            age: 0,
        }
    }
}
