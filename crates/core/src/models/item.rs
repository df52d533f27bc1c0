//! Reward items

use crate::types::{ItemType, Rarity};
use serde::{Deserialize, Serialize};

/// A cosmetic or functional reward unit awarded from a box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub item_type: ItemType,
    pub rarity: Rarity,
    pub description: String,
    pub icon: String,
    /// Behavior tag, e.g. `exp_double`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect: Option<String>,
}

impl Item {
    pub fn new(
        id: &str,
        name: &str,
        item_type: ItemType,
        rarity: Rarity,
        description: &str,
        icon: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            item_type,
            rarity,
            description: description.to_string(),
            icon: icon.to_string(),
            effect: None,
        }
    }

    pub fn with_effect(mut self, effect: &str) -> Self {
        self.effect = Some(effect.to_string());
        self
    }
}
