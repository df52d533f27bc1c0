//! Static item and achievement catalogs
//!
//! Both catalogs are built on first use and never mutated afterwards.

mod achievements;
mod items;

pub use achievements::achievement_catalog;
pub use items::{item_catalog, items_of_rarity};
