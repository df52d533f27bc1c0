//! Lootinyang Engine - Reward generation and progression logic
//!
//! Everything here is a pure computation over its arguments. Callers supply
//! the facts and a randomness source, and persist whatever comes back.

pub mod achievements;
pub mod catalog;
pub mod progression;
pub mod random;
pub mod rewards;

pub use achievements::{evaluate_all, evaluate_condition, evaluate_tag};
pub use catalog::{achievement_catalog, item_catalog};
pub use progression::{apply_experience, ExperienceGain, ProgressionConfig};
pub use random::{RandomSource, RngSource, SequenceSource};
pub use rewards::{generate_items, generate_items_from, select_rarity, RarityTable};
