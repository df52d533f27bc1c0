//! Centralized notification system
//!
//! Level-ups, streak milestones, new reward boxes and achievement unlocks
//! are reported here by the commands that produce them. Each notification is
//! logged and kept in a short in-memory history the front end can poll.

use lootinyang_core::{Achievement, Item, RewardBox};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Notifications kept for `recent()`
const HISTORY_LIMIT: usize = 50;

// ─── Config ──────────────────────────────────────────────────────────

/// Per-category notification toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationConfig {
    /// Master switch, overrides every category
    pub enabled: bool,
    pub level_ups: bool,
    pub streak_milestones: bool,
    pub achievements: bool,
    /// New boxes and opened box contents
    pub reward_boxes: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level_ups: true,
            streak_milestones: true,
            achievements: true,
            reward_boxes: true,
        }
    }
}

// ─── Events ──────────────────────────────────────────────────────────

/// A delivered notification
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notification {
    LevelUp { level: u32 },
    StreakMilestone { days: u32 },
    AchievementUnlocked { achievement_id: String, name: String, points: u32 },
    RewardBoxIssued { box_id: i64, tier: String },
    RewardBoxOpened { box_id: i64, item_ids: Vec<String> },
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Shared handle for sending notifications from anywhere in the app
#[derive(Clone, Default)]
pub struct NotificationHandle {
    config: Arc<RwLock<NotificationConfig>>,
    history: Arc<RwLock<VecDeque<Notification>>>,
}

impl NotificationHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the notification configuration
    pub async fn set_config(&self, config: NotificationConfig) {
        *self.config.write().await = config;
    }

    /// Get the current notification configuration
    pub async fn get_config(&self) -> NotificationConfig {
        self.config.read().await.clone()
    }

    /// Most recent notifications, oldest first
    pub async fn recent(&self) -> Vec<Notification> {
        self.history.read().await.iter().cloned().collect()
    }

    pub async fn notify_level_up(&self, level: u32) {
        let cfg = self.config.read().await;
        if !cfg.enabled || !cfg.level_ups {
            return;
        }
        drop(cfg);

        self.send(
            "⬆️ Level Up",
            &format!("Your cat reached level {}!", level),
            Notification::LevelUp { level },
        )
        .await;
    }

    pub async fn notify_streak_milestone(&self, days: u32) {
        let cfg = self.config.read().await;
        if !cfg.enabled || !cfg.streak_milestones {
            return;
        }
        drop(cfg);

        self.send(
            "🔥 Streak Milestone",
            &format!("{} days in a row. Keep going!", days),
            Notification::StreakMilestone { days },
        )
        .await;
    }

    pub async fn notify_achievement(&self, achievement: &Achievement) {
        let cfg = self.config.read().await;
        if !cfg.enabled || !cfg.achievements {
            return;
        }
        drop(cfg);

        self.send(
            "🏅 Achievement Unlocked",
            &format!("{} {} (+{} pts)", achievement.icon, achievement.name, achievement.points),
            Notification::AchievementUnlocked {
                achievement_id: achievement.id.clone(),
                name: achievement.name.clone(),
                points: achievement.points,
            },
        )
        .await;
    }

    pub async fn notify_box_issued(&self, reward_box: &RewardBox) {
        let cfg = self.config.read().await;
        if !cfg.enabled || !cfg.reward_boxes {
            return;
        }
        drop(cfg);

        self.send(
            "🎁 New Reward Box",
            &format!("You earned a {} box", reward_box.tier),
            Notification::RewardBoxIssued {
                box_id: reward_box.id,
                tier: reward_box.tier.to_string(),
            },
        )
        .await;
    }

    pub async fn notify_box_opened(&self, box_id: i64, items: &[Item]) {
        let cfg = self.config.read().await;
        if !cfg.enabled || !cfg.reward_boxes {
            return;
        }
        drop(cfg);

        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        self.send(
            "📦 Box Opened",
            &format!("Inside: {}", names.join(", ")),
            Notification::RewardBoxOpened {
                box_id,
                item_ids: items.iter().map(|i| i.id.clone()).collect(),
            },
        )
        .await;
    }

    async fn send(&self, title: &str, body: &str, notification: Notification) {
        info!(title, body, "notification");

        let mut history = self.history.write().await;
        if history.len() >= HISTORY_LIMIT {
            history.pop_front();
        }
        history.push_back(notification);
        debug!(queued = history.len(), "notification recorded");
    }
}
