//! tinytalk library root.

pub mod backend;
pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod sync;

pub use backend::{AuthSession, ChatService, HttpChatService};
pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use core::{aggregate, Conversation, Message, User};
pub use error::{Error, Result};
pub use sync::{run_watch, SyncEvent};
