//! Maps the flat delta fields produced by the writer and accountant into the
//! typed `ActiveStateChanges` consumed by the active-state reducer.
use crate::core::keyed::trimmed_non_empty;
use crate::schema::build::PageBuildResult;
use crate::schema::state::{ActiveStateChanges, ThreadAddition};

/// An empty `current_location` means the location did not change.
pub fn map_to_active_state_changes(
    result: &PageBuildResult,
    effective_threads_resolved: &[String],
) -> ActiveStateChanges {
    let location = result.current_location.trim();
    let new_location = if location.is_empty() {
        None
    } else {
        Some(location.to_string())
    };

    let threads_added = result
        .threads_added
        .iter()
        .filter(|thread| !thread.text.trim().is_empty())
        .map(|thread| ThreadAddition {
            text: thread.text.trim().to_string(),
            ..thread.clone()
        })
        .collect();

    ActiveStateChanges {
        new_location,
        threats_added: trimmed_non_empty(&result.threats_added),
        threats_removed: trimmed_non_empty(&result.threats_removed),
        constraints_added: trimmed_non_empty(&result.constraints_added),
        constraints_removed: trimmed_non_empty(&result.constraints_removed),
        threads_added,
        threads_resolved: trimmed_non_empty(effective_threads_resolved),
    }
}
