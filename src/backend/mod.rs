//! Backend module - the hosted chat platform seam.
//!
//! Everything that talks to the hosted service lives here:
//! - `ChatService` trait (what the rest of the crate programs against)
//! - HTTP implementation over the platform's REST surface
//! - Auth session state (bearer token, current user, expiry)

pub mod http;
pub mod service;
pub mod session;

pub use http::HttpChatService;
pub use service::ChatService;
pub use session::AuthSession;
