//! Host layer: config loading, console commands and the session that wires
//! the engine to the text generator.

pub mod command;
pub mod config;
pub mod session;
pub mod shutdown;

pub use command::{Command, CommandError};
pub use config::load_config;
pub use session::Session;
pub use shutdown::ShutdownManager;
