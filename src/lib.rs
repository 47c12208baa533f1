//! Story State Engine — deterministic state reconciliation for branching stories.
//!
//! Each page of an interactive story carries the accumulated world model of
//! its branch: open threads, tracked promises, threats, constraints,
//! inventory, health, per-character facts, and NPC agendas and
//! relationships. Given a parent page and the already-parsed deltas produced
//! for a child, the engine derives the child page's accumulated state with
//! stable identifiers, correct aging and expiry, and no I/O.

pub mod core;
pub mod schema;
