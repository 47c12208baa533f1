//! NPC agenda and relationship accumulation. Each NPC has exactly one current
//! record; updates replace it in place under the first-stored name.
use std::sync::Arc;

use crate::core::normalize::NameKeyedMap;
use crate::schema::relationship::{
    AccumulatedNpcAgendas, AccumulatedNpcRelationships, DecomposedCharacter, NpcAgenda,
    NpcRelationship,
};

/// A per-NPC record keyed by the NPC's name.
pub trait NpcRecord: Clone {
    fn npc_name(&self) -> &str;
}

impl NpcRecord for NpcAgenda {
    fn npc_name(&self) -> &str {
        &self.npc_name
    }
}

impl NpcRecord for NpcRelationship {
    fn npc_name(&self) -> &str {
        &self.npc_name
    }
}

/// Replace-in-place merge of `updates` into `current`.
///
/// With no updates the very same `Arc` is returned, so callers can detect a
/// no-op with `Arc::ptr_eq`. Otherwise a matching NPC keeps its stored key
/// and takes the update's value; an unmatched NPC is inserted under the
/// update's name and can be matched by later updates in the same batch.
/// Updates with a blank name are skipped.
pub fn apply_npc_updates<R: NpcRecord>(
    current: &Arc<NameKeyedMap<R>>,
    updates: &[R],
) -> Arc<NameKeyedMap<R>> {
    if updates.is_empty() {
        return Arc::clone(current);
    }

    let mut next: NameKeyedMap<R> = (**current).clone();
    for update in updates {
        if update.npc_name().trim().is_empty() {
            continue;
        }
        next.upsert(update.npc_name(), update.clone());
    }
    Arc::new(next)
}

pub fn apply_agenda_updates(
    current: &Arc<AccumulatedNpcAgendas>,
    updates: &[NpcAgenda],
) -> Arc<AccumulatedNpcAgendas> {
    apply_npc_updates(current, updates)
}

pub fn apply_relationship_updates(
    current: &Arc<AccumulatedNpcRelationships>,
    updates: &[NpcRelationship],
) -> Arc<AccumulatedNpcRelationships> {
    apply_npc_updates(current, updates)
}

/// Seed relationships from the story's decomposed cast, skipping the
/// protagonist (the character without a relationship).
pub fn build_initial_npc_relationships(
    decomposed_characters: &[DecomposedCharacter],
) -> AccumulatedNpcRelationships {
    let mut relationships = AccumulatedNpcRelationships::new();
    for character in decomposed_characters {
        let Some(seed) = &character.relationship else {
            continue;
        };
        relationships.upsert(
            &character.name,
            NpcRelationship {
                npc_name: character.name.clone(),
                valence: seed.valence,
                dynamic: seed.dynamic.clone(),
                history: seed.history.clone(),
                current_tension: seed.current_tension.clone(),
                leverage: seed.leverage.clone(),
            },
        );
    }
    relationships
}
