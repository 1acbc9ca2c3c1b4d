//! Roster refresh loop for tinytalk.
//!
//! Polls the inbox, re-aggregates, and emits roster updates over a channel
//! so the presentation layer never touches the backend directly.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use crate::backend::service::ChatService;
use crate::core::model::Conversation;
use crate::core::roster;
use crate::error::Result;

/// Events the sync loop emits to the presentation layer.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    /// The roster changed since the last emission.
    RosterUpdated(Vec<Conversation>),

    /// A fetch failed; the loop keeps polling.
    FetchFailed(String),
}

/// Run the polling refresh loop until Ctrl-C or until the receiver hangs up.
///
/// Every tick fetches the inbox and aggregates it fresh; an update is only
/// emitted when the roster differs from the last one sent. Fetch errors are
/// reported and do not stop the loop.
pub async fn run_watch(
    service: &dyn ChatService,
    interval: Duration,
    tx: mpsc::Sender<SyncEvent>,
) -> Result<()> {
    tracing::info!("Roster watch started (every {}s)", interval.as_secs());

    let mut previous: Vec<Conversation> = Vec::new();
    let mut first = true;

    loop {
        match service.fetch_inbox().await {
            Ok(batch) => {
                let next = roster::aggregate(batch);
                if first || roster_changed(&previous, &next) {
                    if tx.send(SyncEvent::RosterUpdated(next.clone())).await.is_err() {
                        break;
                    }
                    previous = next;
                    first = false;
                }
            }
            Err(e) => {
                tracing::warn!("Inbox fetch failed: {}", e);
                if tx.send(SyncEvent::FetchFailed(e.to_string())).await.is_err() {
                    break;
                }
            }
        }

        tokio::select! {
            _ = sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Roster watch stopping");
                break;
            }
        }
    }

    Ok(())
}

/// Whether two rosters differ for display purposes.
fn roster_changed(previous: &[Conversation], next: &[Conversation]) -> bool {
    if previous.len() != next.len() {
        return true;
    }
    previous.iter().zip(next).any(|(a, b)| {
        a.partner_id() != b.partner_id()
            || a.message.timestamp != b.message.timestamp
            || a.message.text != b.message.text
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::{Message, User};

    fn conversation(partner: &str, text: &str, timestamp: i64) -> Conversation {
        Conversation {
            user: User {
                uid: partner.to_string(),
                username: partner.to_string(),
                fullname: String::new(),
                profile_image_url: String::new(),
            },
            message: Message {
                text: text.to_string(),
                from_id: partner.to_string(),
                to_id: "me".to_string(),
                timestamp,
                is_from_current_user: false,
            },
        }
    }

    #[test]
    fn test_identical_rosters_unchanged() {
        let a = vec![conversation("a", "hi", 1), conversation("b", "yo", 2)];
        let b = a.clone();
        assert!(!roster_changed(&a, &b));
    }

    #[test]
    fn test_new_partner_detected() {
        let a = vec![conversation("a", "hi", 1)];
        let b = vec![conversation("a", "hi", 1), conversation("b", "yo", 2)];
        assert!(roster_changed(&a, &b));
    }

    #[test]
    fn test_new_message_detected() {
        let a = vec![conversation("a", "hi", 1)];
        let b = vec![conversation("a", "hi again", 4)];
        assert!(roster_changed(&a, &b));
    }

    #[test]
    fn test_reordering_detected() {
        let a = vec![conversation("a", "hi", 1), conversation("b", "yo", 2)];
        let b = vec![conversation("b", "yo", 2), conversation("a", "hi", 1)];
        assert!(roster_changed(&a, &b));
    }
}
