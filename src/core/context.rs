//! Page build context — the parent-derived input to the page pipeline, as an
//! explicit opening/continuation sum type.
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::schema::page::{AccumulatedSnapshots, Page, PageId, StructurePosition, ThreadAges};
use crate::schema::promise::TrackedPromise;
use crate::schema::relationship::{AccumulatedNpcAgendas, AccumulatedNpcRelationships};
use crate::schema::state::{AccumulatedCharacterState, ActiveState, KeyedEntry};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    #[error("parent page {0:?} given without a choice index")]
    MissingChoiceIndex(PageId),
    #[error("choice index {0} given without a parent page")]
    ChoiceIndexWithoutParent(usize),
    #[error("page {0:?} is an ending and cannot be continued")]
    ParentIsEnding(PageId),
    #[error("choice {index} out of range for page {page:?} with {available} choices")]
    ChoiceOutOfRange {
        page: PageId,
        index: usize,
        available: usize,
    },
}

/// Everything a continuation page inherits from its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct ContinuationContext {
    pub parent_page_id: PageId,
    pub parent_choice_index: usize,
    pub parent: AccumulatedSnapshots,
    pub position: StructurePosition,
}

/// Input to the page pipeline.
///
/// The opening page starts from empty accumulated state; a continuation
/// starts from its parent's snapshots.
#[derive(Debug, Clone, PartialEq)]
pub enum PageBuildContext {
    Opening { position: StructurePosition },
    Continuation(ContinuationContext),
}

impl PageBuildContext {
    pub fn opening(position: StructurePosition) -> Self {
        Self::Opening { position }
    }

    /// Continue from `parent` through the choice at `choice_index`.
    pub fn continuing_from(
        parent: &Page,
        choice_index: usize,
        position: StructurePosition,
    ) -> Result<Self, ContextError> {
        if parent.is_ending() {
            return Err(ContextError::ParentIsEnding(parent.id()));
        }
        let available = parent.choices().len();
        if choice_index >= available {
            return Err(ContextError::ChoiceOutOfRange {
                page: parent.id(),
                index: choice_index,
                available,
            });
        }
        Ok(Self::Continuation(ContinuationContext {
            parent_page_id: parent.id(),
            parent_choice_index: choice_index,
            parent: parent.snapshots().clone(),
            position,
        }))
    }

    pub fn position(&self) -> StructurePosition {
        match self {
            Self::Opening { position } => *position,
            Self::Continuation(continuation) => continuation.position,
        }
    }

    pub fn parent_page_id(&self) -> Option<PageId> {
        match self {
            Self::Opening { .. } => None,
            Self::Continuation(continuation) => Some(continuation.parent_page_id),
        }
    }

    pub fn is_opening(&self) -> bool {
        matches!(self, Self::Opening { .. })
    }
}

/// The nullable-parent form in which callers may hold a build context.
/// Converted once into a [`PageBuildContext`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FlatPageBuildContext {
    pub parent_page_id: Option<PageId>,
    pub parent_choice_index: Option<usize>,
    pub parent_accumulated_active_state: ActiveState,
    pub parent_accumulated_inventory: Vec<KeyedEntry>,
    pub parent_accumulated_health: Vec<KeyedEntry>,
    pub parent_accumulated_character_state: AccumulatedCharacterState,
    pub parent_thread_ages: ThreadAges,
    pub parent_accumulated_promises: Vec<TrackedPromise>,
    pub parent_accumulated_npc_agendas: AccumulatedNpcAgendas,
    pub parent_accumulated_npc_relationships: AccumulatedNpcRelationships,
    pub page_act_index: usize,
    pub page_beat_index: usize,
}

impl FlatPageBuildContext {
    fn carries_inherited_state(&self) -> bool {
        !self.parent_accumulated_active_state.is_empty()
            || !self.parent_accumulated_inventory.is_empty()
            || !self.parent_accumulated_health.is_empty()
            || !self.parent_accumulated_character_state.is_empty()
            || !self.parent_thread_ages.is_empty()
            || !self.parent_accumulated_promises.is_empty()
            || !self.parent_accumulated_npc_agendas.is_empty()
            || !self.parent_accumulated_npc_relationships.is_empty()
    }
}

impl TryFrom<FlatPageBuildContext> for PageBuildContext {
    type Error = ContextError;

    fn try_from(flat: FlatPageBuildContext) -> Result<Self, Self::Error> {
        let position = StructurePosition::new(flat.page_act_index, flat.page_beat_index);
        match (flat.parent_page_id, flat.parent_choice_index) {
            (None, Some(index)) => Err(ContextError::ChoiceIndexWithoutParent(index)),
            (Some(page), None) => Err(ContextError::MissingChoiceIndex(page)),
            (None, None) => {
                if flat.carries_inherited_state() {
                    tracing::warn!("opening context carried inherited state; discarding it");
                }
                Ok(Self::Opening { position })
            }
            (Some(parent_page_id), Some(parent_choice_index)) => {
                Ok(Self::Continuation(ContinuationContext {
                    parent_page_id,
                    parent_choice_index,
                    parent: AccumulatedSnapshots {
                        active_state: flat.parent_accumulated_active_state,
                        inventory: flat.parent_accumulated_inventory,
                        health: flat.parent_accumulated_health,
                        character_state: flat.parent_accumulated_character_state,
                        thread_ages: flat.parent_thread_ages,
                        promises: flat.parent_accumulated_promises,
                        npc_agendas: Arc::new(flat.parent_accumulated_npc_agendas),
                        npc_relationships: Arc::new(flat.parent_accumulated_npc_relationships),
                    },
                    position,
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_without_parent_is_opening() {
        let flat = FlatPageBuildContext {
            page_act_index: 0,
            page_beat_index: 1,
            ..FlatPageBuildContext::default()
        };
        let context = PageBuildContext::try_from(flat).unwrap();
        assert!(context.is_opening());
        assert_eq!(context.position(), StructurePosition::new(0, 1));
        assert_eq!(context.parent_page_id(), None);
    }

    #[test]
    fn flat_opening_discards_inherited_state() {
        let flat = FlatPageBuildContext {
            parent_accumulated_inventory: vec![KeyedEntry::new("inv-1", "lantern")],
            ..FlatPageBuildContext::default()
        };
        assert_eq!(
            PageBuildContext::try_from(flat),
            Ok(PageBuildContext::Opening {
                position: StructurePosition::default()
            })
        );
    }

    #[test]
    fn flat_with_parent_is_continuation() {
        let flat = FlatPageBuildContext {
            parent_page_id: Some(PageId(3)),
            parent_choice_index: Some(1),
            parent_accumulated_health: vec![KeyedEntry::new("hp-1", "bruised ribs")],
            page_act_index: 1,
            page_beat_index: 2,
            ..FlatPageBuildContext::default()
        };
        match PageBuildContext::try_from(flat).unwrap() {
            PageBuildContext::Continuation(continuation) => {
                assert_eq!(continuation.parent_page_id, PageId(3));
                assert_eq!(continuation.parent_choice_index, 1);
                assert_eq!(continuation.parent.health.len(), 1);
                assert_eq!(continuation.position, StructurePosition::new(1, 2));
            }
            other => panic!("expected continuation, got {:?}", other),
        }
    }

    #[test]
    fn flat_rejects_mismatched_parent_fields() {
        let flat = FlatPageBuildContext {
            parent_page_id: Some(PageId(3)),
            ..FlatPageBuildContext::default()
        };
        assert_eq!(
            PageBuildContext::try_from(flat),
            Err(ContextError::MissingChoiceIndex(PageId(3)))
        );

        let flat = FlatPageBuildContext {
            parent_choice_index: Some(0),
            ..FlatPageBuildContext::default()
        };
        assert_eq!(
            PageBuildContext::try_from(flat),
            Err(ContextError::ChoiceIndexWithoutParent(0))
        );
    }
}
