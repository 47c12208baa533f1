//! Ordered keyed-entry lists (inventory, health): delta construction and the
//! shared add/remove-by-id reducer.
use rustc_hash::FxHashSet;

use crate::core::ids::{get_max_id_number, mint_ids};
use crate::schema::state::{KeyedChanges, KeyedEntry};

/// Trim every text and id, dropping blanks.
pub fn create_keyed_changes(added: &[String], removed: &[String]) -> KeyedChanges {
    KeyedChanges {
        added: trimmed_non_empty(added),
        removed: trimmed_non_empty(removed),
    }
}

pub(crate) fn trimmed_non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .collect()
}

/// Remove entries by id, then append additions with ids minted after the
/// largest `<prefix>-<n>` still present. Unknown removal ids are ignored.
pub fn apply_keyed_changes(
    current: &[KeyedEntry],
    changes: &KeyedChanges,
    prefix: &str,
) -> Vec<KeyedEntry> {
    let max_existing = get_max_id_number(current.iter().map(|e| e.id.as_str()), prefix);
    let removed: FxHashSet<&str> = changes.removed.iter().map(String::as_str).collect();

    let mut next: Vec<KeyedEntry> = current
        .iter()
        .filter(|entry| !removed.contains(entry.id.as_str()))
        .cloned()
        .collect();
    next.extend(
        mint_ids(prefix, max_existing, changes.added.len())
            .zip(&changes.added)
            .map(|(id, text)| KeyedEntry::new(id, text.as_str())),
    );
    next
}
