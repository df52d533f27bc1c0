//! Reward box contents: rarity odds and item draws

mod generator;
mod rarity;

pub use generator::{generate_items, generate_items_from, MAX_DUPLICATE_RETRIES};
pub use rarity::{select_rarity, select_rarity_for_tag, RarityTable};
