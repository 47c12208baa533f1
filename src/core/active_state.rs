//! Active-state reducer: applies an `ActiveStateChanges` delta to the
//! parent's threats, constraints, open threads and location.
use rustc_hash::FxHashSet;

use crate::core::ids::{
    get_max_id_number, mint_ids, CONSTRAINT_PREFIX, THREAD_PREFIX, THREAT_PREFIX,
};
use crate::core::keyed::apply_keyed_changes;
use crate::schema::state::{ActiveState, ActiveStateChanges, KeyedChanges, ThreadEntry};

/// Largest `td-<n>` among open threads; new thread ids continue from here.
pub fn max_open_thread_id(open_threads: &[ThreadEntry]) -> u32 {
    get_max_id_number(open_threads.iter().map(|t| t.id.as_str()), THREAD_PREFIX)
}

pub fn apply_active_state_changes(
    current: &ActiveState,
    changes: &ActiveStateChanges,
) -> ActiveState {
    let current_location = match &changes.new_location {
        Some(location) => location.clone(),
        None => current.current_location.clone(),
    };

    let active_threats = apply_keyed_changes(
        &current.active_threats,
        &KeyedChanges {
            added: changes.threats_added.clone(),
            removed: changes.threats_removed.clone(),
        },
        THREAT_PREFIX,
    );
    let active_constraints = apply_keyed_changes(
        &current.active_constraints,
        &KeyedChanges {
            added: changes.constraints_added.clone(),
            removed: changes.constraints_removed.clone(),
        },
        CONSTRAINT_PREFIX,
    );

    ActiveState {
        current_location,
        active_threats,
        active_constraints,
        open_threads: apply_thread_changes(&current.open_threads, changes),
    }
}

/// New thread ids are minted from the largest id still open on the parent,
/// matching the ids handed out by the thread-age computation.
fn apply_thread_changes(current: &[ThreadEntry], changes: &ActiveStateChanges) -> Vec<ThreadEntry> {
    let start = max_open_thread_id(current);
    let resolved: FxHashSet<&str> = changes.threads_resolved.iter().map(String::as_str).collect();

    let mut open: Vec<ThreadEntry> = current
        .iter()
        .filter(|thread| !resolved.contains(thread.id.as_str()))
        .cloned()
        .collect();
    open.extend(
        mint_ids(THREAD_PREFIX, start, changes.threads_added.len())
            .zip(&changes.threads_added)
            .map(|(id, added)| ThreadEntry {
                id,
                text: added.text.clone(),
                thread_type: added.thread_type,
                urgency: added.urgency,
            }),
    );
    open
}
