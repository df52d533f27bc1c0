//! Reward boxes and the outcome of opening one

use super::item::Item;
use crate::types::BoxTier;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An unopened or opened reward container
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardBox {
    pub id: i64,
    pub user_id: String,
    pub tier: BoxTier,
    pub opened: bool,
    /// Empty until the box is opened
    #[serde(default)]
    pub items: Vec<Item>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub opened_at: Option<DateTime<Utc>>,
}

impl RewardBox {
    /// A fresh, unopened box
    pub fn new(id: i64, user_id: &str, tier: BoxTier, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            tier,
            opened: false,
            items: Vec::new(),
            created_at,
            opened_at: None,
        }
    }

    /// Open the box with the given items.
    ///
    /// Items and the opened flag are set together; a box that is already
    /// open is returned untouched as `AlreadyOpened`.
    pub fn open(mut self, items: Vec<Item>, at: DateTime<Utc>) -> OpenBoxOutcome {
        if self.opened {
            return OpenBoxOutcome::AlreadyOpened {
                box_id: self.id,
                opened_at: self.opened_at,
            };
        }
        self.items = items;
        self.opened = true;
        self.opened_at = Some(at);
        OpenBoxOutcome::Opened(self)
    }
}

/// Result of trying to open a box
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum OpenBoxOutcome {
    Opened(RewardBox),
    AlreadyOpened {
        box_id: i64,
        opened_at: Option<DateTime<Utc>>,
    },
    NotFound { box_id: i64 },
}

impl OpenBoxOutcome {
    pub fn is_opened(&self) -> bool {
        matches!(self, OpenBoxOutcome::Opened(_))
    }
}
