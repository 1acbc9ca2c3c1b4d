//! CLI commands for tinytalk using clap.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::{AuthSession, ChatService, HttpChatService};
use crate::config::{load_settings, save_settings};
use crate::core::model::{Conversation, User};
use crate::core::{roster, routing};
use crate::error::Error;
use crate::sync::{self, SyncEvent};

/// tinytalk - headless 1:1 chat client for a hosted chat backend.
#[derive(Parser)]
#[command(name = "tinytalk")]
#[command(version = "0.1.0")]
#[command(about = "tinytalk - chat from the terminal", long_about = None)]
pub struct Commands {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Point tinytalk at a backend
    Setup {
        /// Backend base URL, e.g. https://chat.example.com
        base_url: String,
    },

    /// Log in and cache the session
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },

    /// Log out and clear the cached session
    Logout,

    /// Show the current session
    Whoami,

    /// List users you can start a chat with
    Users,

    /// Show the conversation list
    Chats,

    /// Show the message history with one user
    Open {
        /// Partner handle (@alice) or user id
        partner: String,
    },

    /// Send a message, e.g. send "@alice see you at 5"
    Send {
        /// "@handle text" payload
        message: String,
    },

    /// Watch the conversation list for updates
    Watch,
}

impl Commands {
    /// Run the parsed command.
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Setup { base_url } => cmd_setup(&base_url),
            Command::Login { email, password } => cmd_login(&email, &password).await,
            Command::Logout => cmd_logout().await,
            Command::Whoami => cmd_whoami(),
            Command::Users => cmd_users().await,
            Command::Chats => cmd_chats().await,
            Command::Open { partner } => cmd_open(&partner).await,
            Command::Send { message } => cmd_send(&message).await,
            Command::Watch => cmd_watch().await,
        }
    }
}

/// Prepend https:// when the operator omits the scheme.
fn normalize_url(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    }
}

fn cmd_setup(base_url: &str) -> Result<()> {
    let mut settings = crate::config::load_settings_or_default();
    settings.backend.base_url = normalize_url(base_url);
    save_settings(&settings)?;

    println!("Backend set to {}", settings.backend.base_url);
    Ok(())
}

async fn cmd_login(email: &str, password: &str) -> Result<()> {
    let mut settings = load_settings()?;
    let service = HttpChatService::from_settings(&settings)?;

    let session = service.login(email, password).await?;
    settings.session.token = Some(session.token.clone());
    settings.session.user_id = Some(session.user_id.clone());
    save_settings(&settings)?;

    println!("Logged in as {}", session.user_id);
    Ok(())
}

async fn cmd_logout() -> Result<()> {
    let mut settings = load_settings()?;

    if settings.session.token.is_some() {
        let service = HttpChatService::from_settings(&settings)?;
        if let Err(e) = service.logout().await {
            tracing::warn!("Backend logout failed: {}", e);
        }
    }

    // Clear the local session regardless of what the backend said.
    settings.session.token = None;
    settings.session.user_id = None;
    save_settings(&settings)?;

    println!("Logged out.");
    Ok(())
}

fn cmd_whoami() -> Result<()> {
    let settings = load_settings()?;

    let Some(token) = settings.session.token.as_deref() else {
        println!("Not logged in.");
        return Ok(());
    };

    let session = match settings.session.user_id.as_deref() {
        Some(uid) if !uid.is_empty() => AuthSession::new(token, uid),
        _ => AuthSession::from_token(token)?,
    };

    println!("User: {}", session.user_id);
    match session.expires_at {
        Some(exp) if session.is_expired() => println!("Session: expired ({})", format_unix_secs(exp)),
        Some(exp) => println!("Session: valid until {}", format_unix_secs(exp)),
        None => println!("Session: no expiry recorded"),
    }
    Ok(())
}

async fn cmd_users() -> Result<()> {
    let settings = load_settings()?;
    let service = HttpChatService::from_settings(&settings)?;

    let users = service.fetch_users().await?;
    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    for user in users {
        println!("@{} - {} ({})", user.username, user.display_name(), user.uid);
    }
    Ok(())
}

async fn cmd_chats() -> Result<()> {
    let settings = load_settings()?;
    let service = HttpChatService::from_settings(&settings)?;

    let batch = service.fetch_inbox().await?;
    let conversations = roster::aggregate(batch);

    print_roster(&conversations);
    Ok(())
}

async fn cmd_open(partner: &str) -> Result<()> {
    let settings = load_settings()?;
    let service = HttpChatService::from_settings(&settings)?;

    let user = resolve_user(&service, partner).await?;
    let messages = service.fetch_thread(&user.uid).await?;

    println!("Chat with {} (@{})", user.display_name(), user.username);
    if messages.is_empty() {
        println!("  (no messages yet)");
        return Ok(());
    }

    for msg in messages {
        let who = if msg.is_from_current_user {
            "me"
        } else {
            user.display_name()
        };
        println!("  [{}] {}: {}", format_unix_millis(msg.timestamp), who, msg.text);
    }
    Ok(())
}

async fn cmd_send(message: &str) -> Result<()> {
    let Some((handle, text)) = routing::parse_recipient(message) else {
        anyhow::bail!("Usage: tinytalk send \"@handle message\"");
    };

    let settings = load_settings()?;
    let service = HttpChatService::from_settings(&settings)?;

    let user = resolve_user(&service, &handle).await?;
    let sent = service.send_message(&user.uid, &text).await?;

    println!(
        "Sent to @{} at {}",
        user.username,
        format_unix_millis(sent.timestamp)
    );
    Ok(())
}

async fn cmd_watch() -> Result<()> {
    let settings = load_settings()?;
    let service = HttpChatService::from_settings(&settings)?;
    let interval = Duration::from_secs(settings.sync.poll_interval_secs);

    let (tx, mut rx) = mpsc::channel::<SyncEvent>(16);

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                SyncEvent::RosterUpdated(conversations) => {
                    println!("--- {} ---", chrono::Local::now().format("%H:%M:%S"));
                    print_roster(&conversations);
                }
                SyncEvent::FetchFailed(e) => {
                    eprintln!("fetch failed: {}", e);
                }
            }
        }
    });

    sync::run_watch(&service, interval, tx).await?;
    printer.await?;
    Ok(())
}

fn print_roster(conversations: &[Conversation]) {
    if conversations.is_empty() {
        println!("No conversations.");
        return;
    }

    for conv in conversations {
        let label = if conv.user.username.is_empty() {
            conv.partner_id().to_string()
        } else {
            format!("@{}", conv.user.username)
        };
        let prefix = if conv.message.is_from_current_user {
            "you: "
        } else {
            ""
        };
        println!(
            "{:<20} {}{} ({})",
            label,
            prefix,
            conv.message.text,
            format_unix_millis(conv.message.timestamp)
        );
    }
}

/// Resolve a partner query (handle with or without '@', or a raw uid)
/// against the user directory.
async fn resolve_user(service: &dyn ChatService, query: &str) -> Result<User> {
    let needle = query.trim().trim_start_matches('@');
    let users = service.fetch_users().await?;

    let found = users
        .into_iter()
        .find(|u| u.username.eq_ignore_ascii_case(needle) || u.uid == needle)
        .ok_or_else(|| Error::NotFound(format!("No user matching '{}'", query)))?;

    Ok(found)
}

fn format_unix_millis(millis: i64) -> String {
    if millis <= 0 {
        return "-".to_string();
    }
    match chrono::DateTime::from_timestamp_millis(millis) {
        Some(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

fn format_unix_secs(secs: i64) -> String {
    match chrono::DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url() {
        assert_eq!(normalize_url("chat.example.com"), "https://chat.example.com");
        assert_eq!(normalize_url("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(
            normalize_url("  https://chat.example.com  "),
            "https://chat.example.com"
        );
    }

    #[test]
    fn test_format_unix_millis_handles_zero() {
        assert_eq!(format_unix_millis(0), "-");
        assert_ne!(format_unix_millis(1_700_000_000_000), "-");
    }
}
