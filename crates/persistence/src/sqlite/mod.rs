//! SQLite database management

mod achievements;
mod boxes;
mod connection;
mod habits;
mod progress;
mod settings;
mod snapshot;

pub use achievements::*;
pub use boxes::*;
pub use connection::Database;
pub use habits::*;
pub use progress::*;
pub use settings::*;
pub use snapshot::*;
