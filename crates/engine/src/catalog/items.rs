//! Reward item catalog

use lootinyang_core::{Item, ItemType, Rarity};
use std::sync::OnceLock;

static ITEMS: OnceLock<Vec<Item>> = OnceLock::new();

/// Every item a box can award. The common subset is never empty.
pub fn item_catalog() -> &'static [Item] {
    ITEMS.get_or_init(build_items)
}

/// Catalog items of one rarity, in catalog order
pub fn items_of_rarity(catalog: &[Item], rarity: Rarity) -> Vec<&Item> {
    catalog.iter().filter(|item| item.rarity == rarity).collect()
}

fn build_items() -> Vec<Item> {
    vec![
        // Common
        Item::new(
            "fish_snack",
            "Fish Snack",
            ItemType::Random,
            Rarity::Common,
            "A crunchy treat. Your cat purrs approvingly.",
            "🐟",
        ),
        Item::new(
            "yarn_ball",
            "Ball of Yarn",
            ItemType::Random,
            Rarity::Common,
            "Hours of tangled entertainment.",
            "🧶",
        ),
        Item::new(
            "cardboard_box",
            "Cardboard Box",
            ItemType::Random,
            Rarity::Common,
            "If it fits, it sits.",
            "📦",
        ),
        Item::new(
            "catnip_leaf",
            "Catnip Leaf",
            ItemType::Random,
            Rarity::Common,
            "A fresh sprig that makes your cat zoom around.",
            "🌿",
        ),
        Item::new(
            "exp_snack",
            "Energy Kibble",
            ItemType::Special,
            Rarity::Common,
            "Small bonus experience on the next check.",
            "🍪",
        )
        .with_effect("exp_boost"),
        // Rare
        Item::new(
            "streak_shield",
            "Streak Shield",
            ItemType::Protection,
            Rarity::Rare,
            "Protects your streak for one missed day.",
            "🛡️",
        )
        .with_effect("streak_protect"),
        Item::new(
            "bell_collar",
            "Bell Collar",
            ItemType::Random,
            Rarity::Rare,
            "Jingles every time a habit is checked.",
            "🔔",
        ),
        Item::new(
            "warm_cushion",
            "Warm Cushion",
            ItemType::Random,
            Rarity::Rare,
            "The best nap spot in the house.",
            "🛋️",
        ),
        // Epic
        Item::new(
            "exp_potion",
            "Double Exp Potion",
            ItemType::Special,
            Rarity::Epic,
            "Doubles experience earned for a day.",
            "🧪",
        )
        .with_effect("exp_double"),
        Item::new(
            "golden_fish",
            "Golden Fish",
            ItemType::Random,
            Rarity::Epic,
            "Shiny, rare and very tempting.",
            "🐠",
        ),
        Item::new(
            "cat_tower",
            "Cat Tower",
            ItemType::Random,
            Rarity::Epic,
            "A palace with a view.",
            "🏰",
        ),
        // Legendary
        Item::new(
            "cat_crown",
            "Crown of Cats",
            ItemType::Random,
            Rarity::Legendary,
            "Worn only by the most consistent of keepers.",
            "👑",
        ),
        Item::new(
            "time_turner",
            "Time Yarn",
            ItemType::Protection,
            Rarity::Legendary,
            "Restores a streak that was lost yesterday.",
            "⏳",
        )
        .with_effect("streak_restore"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_rarity_is_stocked() {
        for rarity in Rarity::ALL {
            assert!(
                !items_of_rarity(item_catalog(), rarity).is_empty(),
                "no {} items",
                rarity
            );
        }
    }

    #[test]
    fn test_ids_are_unique() {
        let ids: HashSet<&str> = item_catalog().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids.len(), item_catalog().len());
    }

    #[test]
    fn test_exp_potion_carries_effect() {
        let potion = item_catalog().iter().find(|i| i.id == "exp_potion").unwrap();
        assert_eq!(potion.effect.as_deref(), Some("exp_double"));
    }
}
