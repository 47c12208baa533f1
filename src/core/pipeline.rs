//! The page pipeline: parent snapshots + page deltas → immutable `Page`.
//!
//! Runs the thread, promise, active-state, inventory, health, character and
//! NPC reconcilers in a fixed order. Every step is pure; unknown ids coming
//! from the language-model collaborators are dropped and reported, never
//! raised.
use rustc_hash::FxHashSet;
use std::path::Path;
use thiserror::Error;

use crate::core::active_state::{apply_active_state_changes, max_open_thread_id};
use crate::core::character_state::{
    apply_character_state_changes, create_character_state_changes,
};
use crate::core::config::{ConfigError, EngineConfig};
use crate::core::context::{ContextError, PageBuildContext};
use crate::core::ids::{HEALTH_PREFIX, INVENTORY_PREFIX};
use crate::core::keyed::{apply_keyed_changes, create_keyed_changes, trimmed_non_empty};
use crate::core::npc::{apply_agenda_updates, apply_relationship_updates};
use crate::core::promises::{
    build_resolved_promise_meta, get_max_promise_id_number, update_promises,
};
use crate::core::state_changes::map_to_active_state_changes;
use crate::core::threads::{
    build_resolved_thread_meta, compute_continuation_thread_ages, compute_opening_thread_ages,
    resolve_threads_with_analyst, ThreadResolution,
};
use crate::schema::build::{AnalystResult, PageBuildResult};
use crate::schema::page::{AccumulatedSnapshots, Page, PageDeltas, PageId, PageParts};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("context error: {0}")]
    Context(#[from] ContextError),
}

/// Ids the collaborators referenced that this branch never held, and what
/// the safety net and expiry changed. Reported alongside every page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationReport {
    pub analyst_resolved_thread_ids: Vec<String>,
    pub unknown_analyst_thread_ids: Vec<String>,
    pub unknown_resolved_thread_ids: Vec<String>,
    pub unknown_resolved_promise_ids: Vec<String>,
    pub expired_promise_ids: Vec<String>,
}

impl ReconciliationReport {
    /// Number of collaborator-supplied ids that were silently ignored.
    pub fn dropped_id_count(&self) -> usize {
        self.unknown_analyst_thread_ids.len()
            + self.unknown_resolved_thread_ids.len()
            + self.unknown_resolved_promise_ids.len()
    }
}

/// A freshly built page together with its reconciliation report.
#[derive(Debug, Clone)]
pub struct PageBuildOutcome {
    pub page: Page,
    pub report: ReconciliationReport,
}

/// The reconciliation engine for one story. Built via `StoryEngine::builder()`.
#[derive(Debug, Clone, Default)]
pub struct StoryEngine {
    config: EngineConfig,
}

/// Builder for constructing a `StoryEngine`.
#[derive(Debug, Default)]
pub struct StoryEngineBuilder {
    config_path: Option<String>,
    config: Option<EngineConfig>,
    scene_promise_expiry: Option<Option<u32>>,
}

impl StoryEngine {
    pub fn builder() -> StoryEngineBuilder {
        StoryEngineBuilder::default()
    }

    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Build the page `page_id` from its context and already-generated deltas.
    #[tracing::instrument(level = "debug", skip_all, fields(page_id = page_id.0))]
    pub fn build_page(
        &self,
        page_id: PageId,
        context: &PageBuildContext,
        result: &PageBuildResult,
        analyst: Option<&AnalystResult>,
    ) -> PageBuildOutcome {
        let opening_parent;
        let (parent, parent_link) = match context {
            PageBuildContext::Opening { .. } => {
                opening_parent = AccumulatedSnapshots::default();
                (&opening_parent, None)
            }
            PageBuildContext::Continuation(continuation) => (
                &continuation.parent,
                Some((continuation.parent_page_id, continuation.parent_choice_index)),
            ),
        };
        let parent_threads = &parent.active_state.open_threads;

        let resolution = match context {
            PageBuildContext::Opening { .. } => ThreadResolution {
                resolved: result.threads_resolved.clone(),
                ..ThreadResolution::default()
            },
            PageBuildContext::Continuation(_) => {
                resolve_threads_with_analyst(&result.threads_resolved, analyst, parent_threads)
            }
        };
        for id in &resolution.added_by_analyst {
            tracing::debug!(
                thread_id = %id,
                "analyst payoff resolved a thread the reconciler missed"
            );
        }

        let active_state_changes = map_to_active_state_changes(result, &resolution.resolved);
        let threads_resolved = &active_state_changes.threads_resolved;

        let thread_ages = match context {
            PageBuildContext::Opening { .. } => {
                compute_opening_thread_ages(&active_state_changes.threads_added)
            }
            PageBuildContext::Continuation(_) => compute_continuation_thread_ages(
                &parent.thread_ages,
                parent_threads.iter().map(|t| t.id.as_str()),
                &active_state_changes.threads_added,
                threads_resolved,
                max_open_thread_id(parent_threads),
            ),
        };

        let (promises_resolved, promises_detected) = match analyst {
            Some(analyst) => (
                trimmed_non_empty(&analyst.promises_resolved),
                analyst.promises_detected.as_slice(),
            ),
            None => (Vec::new(), &[][..]),
        };
        let promise_update = update_promises(
            &parent.promises,
            &promises_resolved,
            promises_detected,
            get_max_promise_id_number(&parent.promises),
            self.config.scene_promise_expiry,
        );

        let resolved_thread_meta = build_resolved_thread_meta(threads_resolved, parent_threads);
        let resolved_promise_meta =
            build_resolved_promise_meta(&promises_resolved, &parent.promises);

        let report = ReconciliationReport {
            analyst_resolved_thread_ids: resolution.added_by_analyst,
            unknown_analyst_thread_ids: resolution.unknown_analyst_ids,
            unknown_resolved_thread_ids: unknown_ids(
                threads_resolved,
                parent_threads.iter().map(|t| t.id.as_str()),
            ),
            unknown_resolved_promise_ids: unknown_ids(
                &promises_resolved,
                parent.promises.iter().map(|p| p.id.as_str()),
            ),
            expired_promise_ids: promise_update.expired_ids,
        };
        if report.dropped_id_count() > 0 {
            tracing::debug!(
                unknown_analyst_threads = ?report.unknown_analyst_thread_ids,
                unknown_resolved_threads = ?report.unknown_resolved_thread_ids,
                unknown_resolved_promises = ?report.unknown_resolved_promise_ids,
                "dropped ids not present on the parent chain"
            );
        }

        let inventory_changes =
            create_keyed_changes(&result.inventory_added, &result.inventory_removed);
        let health_changes = create_keyed_changes(&result.health_added, &result.health_removed);
        let character_state_changes = create_character_state_changes(
            &result.character_state_changes_added,
            &result.character_state_changes_removed,
        );

        let snapshots = AccumulatedSnapshots {
            active_state: apply_active_state_changes(&parent.active_state, &active_state_changes),
            inventory: apply_keyed_changes(&parent.inventory, &inventory_changes, INVENTORY_PREFIX),
            health: apply_keyed_changes(&parent.health, &health_changes, HEALTH_PREFIX),
            character_state: apply_character_state_changes(
                &parent.character_state,
                &character_state_changes,
            ),
            thread_ages,
            promises: promise_update.promises,
            npc_agendas: apply_agenda_updates(&parent.npc_agendas, &result.npc_agenda_updates),
            npc_relationships: apply_relationship_updates(
                &parent.npc_relationships,
                &result.npc_relationship_updates,
            ),
        };

        let page = Page::assemble(PageParts {
            id: page_id,
            parent: parent_link,
            narrative: result.narrative.clone(),
            scene_summary: result.scene_summary.clone(),
            choices: result.choices.clone(),
            protagonist_affect: result.protagonist_affect.clone(),
            is_ending: result.is_ending,
            deltas: PageDeltas {
                active_state: active_state_changes,
                inventory: inventory_changes,
                health: health_changes,
                character_state: character_state_changes,
            },
            snapshots,
            resolved_thread_meta,
            resolved_promise_meta,
            position: context.position(),
        });

        tracing::debug!(
            opening = context.is_opening(),
            open_threads = page.active_state().open_threads.len(),
            promises = page.promises().len(),
            resolved_threads = page.resolved_thread_meta().len(),
            "page assembled"
        );

        PageBuildOutcome { page, report }
    }
}

/// Ids in `ids` that do not appear in `known`, in order, without repeats.
fn unknown_ids<'a, I>(ids: &[String], known: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let known: FxHashSet<&str> = known.into_iter().collect();
    let mut seen = FxHashSet::default();
    ids.iter()
        .filter(|id| !known.contains(id.as_str()) && seen.insert(id.as_str()))
        .cloned()
        .collect()
}

impl StoryEngineBuilder {
    /// Load configuration from a RON file when it exists.
    pub fn config_path(mut self, path: &str) -> Self {
        self.config_path = Some(path.to_string());
        self
    }

    /// Provide configuration directly (for testing without files).
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override the SCENE promise expiry regardless of any loaded file.
    pub fn scene_promise_expiry(mut self, threshold: Option<u32>) -> Self {
        self.scene_promise_expiry = Some(threshold);
        self
    }

    pub fn build(self) -> Result<StoryEngine, EngineError> {
        let mut config = self.config.unwrap_or_default();

        if let Some(ref path) = self.config_path {
            if Path::new(path).exists() {
                config = EngineConfig::load_from_ron(Path::new(path))?;
            } else {
                tracing::warn!(path = %path, "config file not found; using defaults");
            }
        }

        if let Some(threshold) = self.scene_promise_expiry {
            config.scene_promise_expiry = threshold;
        }

        Ok(StoryEngine { config })
    }
}
