pub mod active_state;
pub mod character_state;
pub mod config;
pub mod context;
pub mod ids;
pub mod keyed;
pub mod normalize;
pub mod npc;
pub mod pipeline;
pub mod promises;
pub mod state_changes;
pub mod threads;
