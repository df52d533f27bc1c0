//! Data models for Lootinyang entities

mod achievement;
mod habit;
mod item;
mod progress;
mod reward_box;

pub use achievement::*;
pub use habit::*;
pub use item::*;
pub use progress::*;
pub use reward_box::*;
