//! Character state accumulator — free-text situational facts per character,
//! matched by name case- and punctuation-insensitively.
use rustc_hash::FxHashSet;

use crate::core::ids::{get_max_id_number, mint_ids, CHARACTER_STATE_PREFIX};
use crate::core::keyed::trimmed_non_empty;
use crate::core::normalize::normalize_name;
use crate::schema::state::{
    AccumulatedCharacterState, CharacterStateAddition, CharacterStateChanges, KeyedEntry,
};

/// Build a well-formed character-state delta from raw writer output.
///
/// Names are normalized, states trimmed; additions left with no name or no
/// states are dropped, as are blank removal ids.
pub fn create_character_state_changes(
    added: &[CharacterStateAddition],
    removed: &[String],
) -> CharacterStateChanges {
    let added = added
        .iter()
        .filter_map(|addition| {
            let character_name = normalize_name(&addition.character_name);
            let states = trimmed_non_empty(&addition.states);
            if character_name.is_empty() || states.is_empty() {
                None
            } else {
                Some(CharacterStateAddition {
                    character_name,
                    states,
                })
            }
        })
        .collect();

    CharacterStateChanges {
        added,
        removed: trimmed_non_empty(removed),
    }
}

/// Facts recorded for `character_name`, or an empty slice.
pub fn get_character_state<'a>(
    state: &'a AccumulatedCharacterState,
    character_name: &str,
) -> &'a [KeyedEntry] {
    state
        .get(character_name)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

/// Whether `character_name` carries a fact whose text matches `state_entry`,
/// ignoring case and surrounding whitespace.
pub fn has_character_state(
    state: &AccumulatedCharacterState,
    character_name: &str,
    state_entry: &str,
) -> bool {
    let wanted = state_entry.trim().to_lowercase();
    get_character_state(state, character_name)
        .iter()
        .any(|entry| entry.text.trim().to_lowercase() == wanted)
}

/// Remove facts by `cs-` id across every character, then append additions
/// under the matching character with freshly minted ids. Characters left
/// without facts are dropped.
pub fn apply_character_state_changes(
    current: &AccumulatedCharacterState,
    changes: &CharacterStateChanges,
) -> AccumulatedCharacterState {
    if changes.is_empty() {
        return current.clone();
    }

    let max_existing = get_max_id_number(
        current
            .values()
            .flat_map(|entries| entries.iter().map(|e| e.id.as_str())),
        CHARACTER_STATE_PREFIX,
    );
    let removed: FxHashSet<&str> = changes.removed.iter().map(String::as_str).collect();

    let mut next = current.clone();
    if !removed.is_empty() {
        for (_, entries) in next.iter_mut() {
            entries.retain(|entry| !removed.contains(entry.id.as_str()));
        }
    }

    let total_added = changes.added.iter().map(|a| a.states.len()).sum();
    let mut ids = mint_ids(CHARACTER_STATE_PREFIX, max_existing, total_added);
    for addition in &changes.added {
        let bucket = next.get_or_insert_with(&addition.character_name, Vec::new);
        for (text, id) in addition.states.iter().zip(ids.by_ref()) {
            bucket.push(KeyedEntry::new(id, text.as_str()));
        }
    }

    next.retain(|_, entries| !entries.is_empty());
    next
}

/// Render every character's facts for a prompt: a `Name:` header followed
/// by `- [id] text` bullets, characters separated by a blank line.
pub fn format_character_state_for_prompt(state: &AccumulatedCharacterState) -> String {
    state
        .iter()
        .filter(|(_, entries)| !entries.is_empty())
        .map(|(name, entries)| {
            let mut block = format!("{}:", name);
            for entry in entries {
                block.push_str(&format!("\n- [{}] {}", entry.id, entry.text));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
