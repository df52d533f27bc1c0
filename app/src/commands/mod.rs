//! Tracker commands
//!
//! Each command takes the shared `AppState`, runs one user-facing workflow
//! against the database and the engine, and reports notable events through
//! the notification handle.

pub mod achievements;
pub mod backup;
pub mod boxes;
pub mod habits;
pub mod progress;
pub mod settings;

pub use achievements::*;
pub use backup::*;
pub use boxes::*;
pub use habits::*;
pub use progress::*;
pub use settings::*;
