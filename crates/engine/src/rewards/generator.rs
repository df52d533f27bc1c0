//! Item generation for an opened box

use super::rarity::select_rarity;
use crate::catalog::{item_catalog, items_of_rarity};
use crate::random::RandomSource;
use lootinyang_core::{BoxTier, Error, Item, Rarity, Result};
use tracing::{debug, trace};

/// Re-draws allowed per slot when the drawn item is already in the box
pub const MAX_DUPLICATE_RETRIES: usize = 3;

/// Draw the contents of a box of `tier` from the built-in catalog
pub fn generate_items<R: RandomSource + ?Sized>(tier: BoxTier, rng: &mut R) -> Result<Vec<Item>> {
    generate_items_from(item_catalog(), tier, rng)
}

/// Draw the contents of a box of `tier` from `catalog`.
///
/// One rarity draw per slot, then a uniform pick among items of that rarity
/// (common items when the rarity has none). A pick that repeats an item
/// already in the box is re-drawn up to `MAX_DUPLICATE_RETRIES` times, after
/// which the duplicate is kept.
pub fn generate_items_from<R: RandomSource + ?Sized>(
    catalog: &[Item],
    tier: BoxTier,
    rng: &mut R,
) -> Result<Vec<Item>> {
    let count = tier.item_count();
    let mut items: Vec<Item> = Vec::with_capacity(count);

    for slot in 0..count {
        let rarity = select_rarity(tier, rng);
        let pool = pool_for(catalog, rarity)?;

        let mut pick = pool[rng.next_index(pool.len())];
        let mut retries = 0;
        while retries < MAX_DUPLICATE_RETRIES && items.iter().any(|i| i.id == pick.id) {
            pick = pool[rng.next_index(pool.len())];
            retries += 1;
        }
        if retries == MAX_DUPLICATE_RETRIES && items.iter().any(|i| i.id == pick.id) {
            trace!(slot, item = %pick.id, "keeping duplicate after retries");
        }

        items.push(pick.clone());
    }

    Ok(items)
}

fn pool_for(catalog: &[Item], rarity: Rarity) -> Result<Vec<&Item>> {
    let pool = items_of_rarity(catalog, rarity);
    if !pool.is_empty() {
        return Ok(pool);
    }

    debug!(%rarity, "no items of drawn rarity, using common items");
    let common = items_of_rarity(catalog, Rarity::Common);
    if common.is_empty() {
        return Err(Error::EmptyCatalog(Rarity::Common.to_string()));
    }
    Ok(common)
}
