//! Thread lifecycle — ages for open threads, the analyst safety net for
//! missed resolutions, and resolution snapshots.
use rustc_hash::{FxHashMap, FxHashSet};

use crate::core::ids::{mint_ids, THREAD_PREFIX};
use crate::core::keyed::trimmed_non_empty;
use crate::schema::build::AnalystResult;
use crate::schema::page::{ResolvedThreadMeta, ThreadAges};
use crate::schema::state::{ThreadAddition, ThreadEntry};

/// Ages for the opening page: `td-1..td-n` in input order, all at age 0.
pub fn compute_opening_thread_ages(threads_added: &[ThreadAddition]) -> ThreadAges {
    mint_ids(THREAD_PREFIX, 0, threads_added.len())
        .map(|id| (id, 0))
        .collect()
}

/// Ages for a continuation page.
///
/// Every parent thread that stays open ages by one page (a missing parent
/// age counts as 0). Resolved threads disappear from the map. Each added
/// thread gets `td-<new_thread_start_id + i + 1>` at age 0.
pub fn compute_continuation_thread_ages<'a, I>(
    parent_ages: &ThreadAges,
    parent_open_thread_ids: I,
    threads_added: &[ThreadAddition],
    threads_resolved: &[String],
    new_thread_start_id: u32,
) -> ThreadAges
where
    I: IntoIterator<Item = &'a str>,
{
    let resolved: FxHashSet<&str> = threads_resolved.iter().map(String::as_str).collect();
    let mut ages = FxHashMap::default();

    for id in parent_open_thread_ids {
        if resolved.contains(id) {
            continue;
        }
        let parent_age = parent_ages.get(id).copied().unwrap_or(0);
        ages.insert(id.to_string(), parent_age.saturating_add(1));
    }

    for id in mint_ids(THREAD_PREFIX, new_thread_start_id, threads_added.len()) {
        ages.insert(id, 0);
    }

    ages
}

/// Resolution set after the analyst safety net, with what it changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadResolution {
    /// Reconciler ids followed by any ids only the analyst reported.
    pub resolved: Vec<String>,
    /// Ids the analyst contributed that the reconciler had missed.
    pub added_by_analyst: Vec<String>,
    /// Analyst ids that were never open on the parent page.
    pub unknown_analyst_ids: Vec<String>,
}

/// Merge the analyst's payoff assessments into the reconciler's resolved
/// ids, reporting what was added and what was ignored.
pub fn resolve_threads_with_analyst(
    reconciler_resolved: &[String],
    analyst: Option<&AnalystResult>,
    parent_open_threads: &[ThreadEntry],
) -> ThreadResolution {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut resolution = ThreadResolution {
        resolved: trimmed_non_empty(reconciler_resolved)
            .into_iter()
            .filter(|id| seen.insert(id.clone()))
            .collect(),
        ..ThreadResolution::default()
    };
    let Some(analyst) = analyst else {
        return resolution;
    };

    let open: FxHashSet<&str> = parent_open_threads.iter().map(|t| t.id.as_str()).collect();

    for assessment in &analyst.thread_payoff_assessments {
        let id = assessment.thread_id.trim();
        if !open.contains(id) {
            if !resolution.unknown_analyst_ids.iter().any(|u| u == id) {
                resolution.unknown_analyst_ids.push(id.to_string());
            }
            continue;
        }
        if seen.insert(id.to_string()) {
            resolution.resolved.push(id.to_string());
            resolution.added_by_analyst.push(id.to_string());
        }
    }

    resolution
}

/// Safety net: add threads the analyst saw paid off but the reconciler did
/// not mark resolved. Ids that were not open on the parent are ignored.
pub fn augment_threads_resolved_from_analyst(
    reconciler_resolved: &[String],
    analyst: Option<&AnalystResult>,
    parent_open_threads: &[ThreadEntry],
) -> Vec<String> {
    resolve_threads_with_analyst(reconciler_resolved, analyst, parent_open_threads).resolved
}

/// Snapshot type and urgency of each resolved thread that was open on the
/// parent page. Unknown ids are skipped.
pub fn build_resolved_thread_meta(
    resolved_ids: &[String],
    parent_open_threads: &[ThreadEntry],
) -> FxHashMap<String, ResolvedThreadMeta> {
    if resolved_ids.is_empty() {
        return FxHashMap::default();
    }
    let by_id: FxHashMap<&str, &ThreadEntry> = parent_open_threads
        .iter()
        .map(|thread| (thread.id.as_str(), thread))
        .collect();

    resolved_ids
        .iter()
        .filter_map(|id| {
            by_id.get(id.as_str()).map(|thread| {
                (
                    id.clone(),
                    ResolvedThreadMeta {
                        thread_type: thread.thread_type,
                        urgency: thread.urgency,
                    },
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::build::{SatisfactionLevel, ThreadPayoffAssessment};
    use crate::schema::state::{ThreadType, Urgency};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn addition(text: &str) -> ThreadAddition {
        ThreadAddition {
            text: text.to_string(),
            thread_type: ThreadType::Quest,
            urgency: Urgency::Medium,
        }
    }

    fn open_thread(id: &str, thread_type: ThreadType, urgency: Urgency) -> ThreadEntry {
        ThreadEntry {
            id: id.to_string(),
            text: format!("thread {}", id),
            thread_type,
            urgency,
        }
    }

    fn payoff(id: &str) -> ThreadPayoffAssessment {
        ThreadPayoffAssessment {
            thread_id: id.to_string(),
            thread_text: String::new(),
            satisfaction_level: SatisfactionLevel::Adequate,
            reasoning: String::new(),
        }
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn opening_mints_sequential_ids_at_zero() {
        let ages = compute_opening_thread_ages(&[addition("a"), addition("b")]);
        assert_eq!(ages.len(), 2);
        assert_eq!(ages.get("td-1"), Some(&0));
        assert_eq!(ages.get("td-2"), Some(&0));
        assert!(compute_opening_thread_ages(&[]).is_empty());
    }

    #[test]
    fn continuation_mints_after_start_id() {
        let ages = compute_continuation_thread_ages(
            &ThreadAges::default(),
            Vec::<&str>::new(),
            &[addition("t0"), addition("t1")],
            &[],
            2,
        );
        let expected: ThreadAges = [("td-3".to_string(), 0), ("td-4".to_string(), 0)]
            .into_iter()
            .collect();
        assert_eq!(ages, expected);
    }

    #[test]
    fn continuation_ages_survivors_and_drops_resolved() {
        let parent: ThreadAges = [("td-1".to_string(), 3), ("td-2".to_string(), 0)]
            .into_iter()
            .collect();
        let ages = compute_continuation_thread_ages(
            &parent,
            ["td-1", "td-2"],
            &[],
            &ids(&["td-2"]),
            2,
        );
        assert_eq!(ages.get("td-1"), Some(&4));
        assert!(!ages.contains_key("td-2"));
        assert_eq!(ages.len(), 1);
    }

    #[test]
    fn continuation_defaults_missing_parent_age_to_zero() {
        let ages = compute_continuation_thread_ages(
            &ThreadAges::default(),
            ["td-5"],
            &[],
            &[],
            5,
        );
        assert_eq!(ages.get("td-5"), Some(&1));
    }

    #[test]
    fn aging_holds_for_random_parent_states() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let open_count = rng.gen_range(0..8u32);
            let open_ids: Vec<String> = (1..=open_count).map(|n| format!("td-{}", n)).collect();
            let mut parent = ThreadAges::default();
            for id in &open_ids {
                if rng.gen_bool(0.8) {
                    parent.insert(id.clone(), rng.gen_range(0..20));
                }
            }
            let resolved: Vec<String> = open_ids
                .iter()
                .filter(|_| rng.gen_bool(0.3))
                .cloned()
                .collect();

            let ages = compute_continuation_thread_ages(
                &parent,
                open_ids.iter().map(String::as_str),
                &[],
                &resolved,
                open_count,
            );

            for id in &open_ids {
                if resolved.contains(id) {
                    assert!(!ages.contains_key(id));
                } else {
                    let expected = parent.get(id).copied().unwrap_or(0) + 1;
                    assert_eq!(ages.get(id), Some(&expected));
                }
            }
        }
    }

    #[test]
    fn safety_net_does_not_duplicate() {
        let analyst = AnalystResult {
            thread_payoff_assessments: vec![payoff("td-1")],
            ..AnalystResult::default()
        };
        let parent = vec![open_thread("td-1", ThreadType::Quest, Urgency::Low)];
        let resolved =
            augment_threads_resolved_from_analyst(&ids(&["td-1"]), Some(&analyst), &parent);
        assert_eq!(resolved, ids(&["td-1"]));
    }

    #[test]
    fn safety_net_adds_missed_resolution() {
        let analyst = AnalystResult {
            thread_payoff_assessments: vec![payoff("td-2"), payoff("td-2")],
            ..AnalystResult::default()
        };
        let parent = vec![
            open_thread("td-1", ThreadType::Quest, Urgency::Low),
            open_thread("td-2", ThreadType::Danger, Urgency::High),
        ];
        let resolution = resolve_threads_with_analyst(&ids(&["td-1"]), Some(&analyst), &parent);
        assert_eq!(resolution.resolved, ids(&["td-1", "td-2"]));
        assert_eq!(resolution.added_by_analyst, ids(&["td-2"]));
        assert!(resolution.unknown_analyst_ids.is_empty());
    }

    #[test]
    fn safety_net_matches_padded_reconciler_ids() {
        let analyst = AnalystResult {
            thread_payoff_assessments: vec![payoff("td-1")],
            ..AnalystResult::default()
        };
        let parent = vec![open_thread("td-1", ThreadType::Quest, Urgency::Low)];
        let resolution =
            resolve_threads_with_analyst(&ids(&[" td-1", "td-1 ", ""]), Some(&analyst), &parent);
        assert_eq!(resolution.resolved, ids(&["td-1"]));
        assert!(resolution.added_by_analyst.is_empty());
    }

    #[test]
    fn parent_age_saturates_instead_of_overflowing() {
        let parent: ThreadAges = [("td-1".to_string(), u32::MAX)].into_iter().collect();
        let ages = compute_continuation_thread_ages(&parent, ["td-1"], &[], &[], u32::MAX);
        assert_eq!(ages.get("td-1"), Some(&u32::MAX));
    }

    #[test]
    fn safety_net_ignores_ids_not_open_on_parent() {
        let analyst = AnalystResult {
            thread_payoff_assessments: vec![payoff("td-9")],
            ..AnalystResult::default()
        };
        let parent = vec![open_thread("td-1", ThreadType::Quest, Urgency::Low)];
        let resolution = resolve_threads_with_analyst(&[], Some(&analyst), &parent);
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.unknown_analyst_ids, ids(&["td-9"]));
    }

    #[test]
    fn safety_net_without_analyst_is_passthrough() {
        let resolved = augment_threads_resolved_from_analyst(&ids(&["td-3"]), None, &[]);
        assert_eq!(resolved, ids(&["td-3"]));
    }

    #[test]
    fn resolved_meta_snapshots_parent_thread() {
        let parent = vec![
            open_thread("td-1", ThreadType::Mystery, Urgency::High),
            open_thread("td-2", ThreadType::Moral, Urgency::Low),
        ];
        let meta = build_resolved_thread_meta(&ids(&["td-1", "td-7"]), &parent);
        assert_eq!(meta.len(), 1);
        assert_eq!(
            meta.get("td-1"),
            Some(&ResolvedThreadMeta {
                thread_type: ThreadType::Mystery,
                urgency: Urgency::High,
            })
        );
        assert!(build_resolved_thread_meta(&[], &parent).is_empty());
    }
}
