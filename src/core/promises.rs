//! Promise lifecycle — aging, SCENE-scoped expiry, id assignment and
//! resolution snapshots for tracked narrative promises.
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::ids::{get_max_id_number, mint_ids, PROMISE_PREFIX};
use crate::schema::page::ResolvedPromiseMeta;
use crate::schema::promise::{DetectedPromise, PromiseScope, TrackedPromise};

/// Accumulated promises after one page, with the ids that expired on it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromiseUpdate {
    pub promises: Vec<TrackedPromise>,
    pub expired_ids: Vec<String>,
}

/// Age, expire and extend the parent's promises.
///
/// Resolved promises are dropped, survivors age by one page, and `Scene`
/// promises older than `scene_expiry` (when set) expire. Detected promises
/// with a non-blank description are appended as `pr-<max_existing_id + i>`.
pub fn update_promises(
    parent_promises: &[TrackedPromise],
    resolved_ids: &[String],
    detected: &[DetectedPromise],
    max_existing_id: u32,
    scene_expiry: Option<u32>,
) -> PromiseUpdate {
    let resolved: FxHashSet<&str> = resolved_ids.iter().map(String::as_str).collect();
    let mut update = PromiseUpdate::default();

    for promise in parent_promises {
        if resolved.contains(promise.id.as_str()) {
            continue;
        }
        let age = promise.age.saturating_add(1);
        let expired = promise.scope == PromiseScope::Scene
            && scene_expiry.is_some_and(|threshold| age > threshold);
        if expired {
            tracing::trace!(promise_id = %promise.id, age, "scene promise expired");
            update.expired_ids.push(promise.id.clone());
            continue;
        }
        update.promises.push(TrackedPromise {
            age,
            ..promise.clone()
        });
    }

    let fresh: Vec<&DetectedPromise> = detected
        .iter()
        .filter(|d| !d.description.trim().is_empty())
        .collect();
    let ids = mint_ids(PROMISE_PREFIX, max_existing_id, fresh.len());
    update.promises.extend(
        ids.zip(fresh)
            .map(|(id, detected)| TrackedPromise::from_detected(id, detected)),
    );

    update
}

/// Next page's accumulated promises: surviving aged promises first, in
/// their original order, followed by newly detected ones.
pub fn compute_accumulated_promises(
    parent_promises: &[TrackedPromise],
    resolved_ids: &[String],
    detected: &[DetectedPromise],
    max_existing_id: u32,
    scene_expiry: Option<u32>,
) -> Vec<TrackedPromise> {
    update_promises(
        parent_promises,
        resolved_ids,
        detected,
        max_existing_id,
        scene_expiry,
    )
    .promises
}

/// Largest `pr-<n>` number among `promises`; malformed ids are ignored.
pub fn get_max_promise_id_number(promises: &[TrackedPromise]) -> u32 {
    get_max_id_number(promises.iter().map(|p| p.id.as_str()), PROMISE_PREFIX)
}

/// Snapshot type, scope and urgency of each resolved promise found among
/// the parent's promises. Unknown ids are skipped.
pub fn build_resolved_promise_meta(
    resolved_ids: &[String],
    parent_promises: &[TrackedPromise],
) -> FxHashMap<String, ResolvedPromiseMeta> {
    if resolved_ids.is_empty() {
        return FxHashMap::default();
    }
    let by_id: FxHashMap<&str, &TrackedPromise> = parent_promises
        .iter()
        .map(|promise| (promise.id.as_str(), promise))
        .collect();

    resolved_ids
        .iter()
        .filter_map(|id| {
            by_id.get(id.as_str()).map(|promise| {
                (
                    id.clone(),
                    ResolvedPromiseMeta {
                        promise_type: promise.promise_type,
                        scope: promise.scope,
                        urgency: promise.suggested_urgency,
                    },
                )
            })
        })
        .collect()
}
