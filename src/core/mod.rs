//! Core module - chat data model, roster aggregation, and recipient routing.
//!
//! This module contains the heart of tinytalk's conversation handling:
//! - User/Message/Conversation value types with lenient record decoding
//! - Roster aggregation (one conversation per chat partner)
//! - Recipient routing for the send path

pub mod model;
pub mod roster;
pub mod routing;

pub use model::{Conversation, Message, User};
pub use roster::aggregate;
