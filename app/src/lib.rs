//! Lootinyang App - Habit tracker workflows over the reward engine

pub mod commands;
pub mod notifications;
mod state;

pub use notifications::{Notification, NotificationConfig, NotificationHandle};
pub use state::AppState;
