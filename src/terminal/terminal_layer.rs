// Terminal layer - the interactive stand-in for the browser view.

#[path = "commands.rs"]
pub mod commands;
#[path = "render.rs"]
pub mod render;
#[path = "session.rs"]
pub mod session;

pub use session::{resolve_startup_config, PortalSession};
