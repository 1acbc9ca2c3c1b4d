//! Chat service trait for tinytalk.

use async_trait::async_trait;

use crate::backend::session::AuthSession;
use crate::core::model::{Message, User};
use crate::error::Result;

/// The hosted chat platform, as the client sees it.
///
/// The aggregation core and the CLI program against this trait; the HTTP
/// implementation is the only place that knows the wire format.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Authenticate and obtain a session.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Invalidate the current session on the backend.
    async fn logout(&self) -> Result<()>;

    /// Fetch the user directory (for starting a new chat).
    async fn fetch_users(&self) -> Result<Vec<User>>;

    /// Fetch the recent-message inbox: one observation per raw record,
    /// pairing the chat partner with the message. This is the roster
    /// aggregator's input batch.
    async fn fetch_inbox(&self) -> Result<Vec<(User, Message)>>;

    /// Fetch the message history with one partner, oldest first.
    async fn fetch_thread(&self, partner_uid: &str) -> Result<Vec<Message>>;

    /// Send a text message to a user.
    async fn send_message(&self, to_uid: &str, text: &str) -> Result<Message>;
}
