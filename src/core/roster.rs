//! Roster aggregation for tinytalk.
//!
//! Collapses a fetched batch of (user, message) observations into the
//! conversation list: one entry per chat partner, carrying the last
//! observation seen for that partner.

use std::collections::HashMap;

use super::model::{Conversation, Message, User};

/// Aggregate a batch of observations into a display-ordered roster.
///
/// Observations may arrive in any order and may repeat a partner; within a
/// batch the last observation for a partner wins. The result holds exactly
/// one conversation per distinct partner ID, sorted by message timestamp
/// descending with partner ID as tiebreak.
///
/// Total over any input: never fails, an empty batch yields an empty roster.
pub fn aggregate<I>(batch: I) -> Vec<Conversation>
where
    I: IntoIterator<Item = (User, Message)>,
{
    let mut by_partner: HashMap<String, Conversation> = HashMap::new();

    for (user, message) in batch {
        let partner_id = message.chat_partner_id().to_string();
        by_partner.insert(partner_id, Conversation { user, message });
    }

    let mut roster: Vec<Conversation> = by_partner.into_values().collect();
    roster.sort_by(|a, b| {
        b.message
            .timestamp
            .cmp(&a.message.timestamp)
            .then_with(|| a.partner_id().cmp(b.partner_id()))
    });

    roster
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn user(uid: &str) -> User {
        User {
            uid: uid.to_string(),
            username: uid.to_string(),
            fullname: String::new(),
            profile_image_url: String::new(),
        }
    }

    fn incoming(from: &str, text: &str, timestamp: i64) -> (User, Message) {
        (
            user(from),
            Message {
                text: text.to_string(),
                from_id: from.to_string(),
                to_id: "me".to_string(),
                timestamp,
                is_from_current_user: false,
            },
        )
    }

    fn outgoing(to: &str, text: &str, timestamp: i64) -> (User, Message) {
        (
            user(to),
            Message {
                text: text.to_string(),
                from_id: "me".to_string(),
                to_id: to.to_string(),
                timestamp,
                is_from_current_user: true,
            },
        )
    }

    #[test]
    fn test_empty_batch() {
        assert!(aggregate(Vec::new()).is_empty());
    }

    #[test]
    fn test_one_conversation_per_partner() {
        let roster = aggregate(vec![
            incoming("a", "m1", 1),
            incoming("b", "m2", 2),
            incoming("a", "m3", 3),
            outgoing("a", "m4", 4),
        ]);

        assert_eq!(roster.len(), 2);
        let ids: BTreeSet<&str> = roster.iter().map(|c| c.partner_id()).collect();
        assert_eq!(ids, BTreeSet::from(["a", "b"]));
    }

    #[test]
    fn test_partner_id_set_preserved() {
        let batch = vec![
            incoming("a", "m1", 1),
            incoming("b", "m2", 2),
            incoming("c", "m3", 3),
        ];
        let input_ids: BTreeSet<String> = batch
            .iter()
            .map(|(_, m)| m.chat_partner_id().to_string())
            .collect();

        let roster = aggregate(batch);
        let output_ids: BTreeSet<String> =
            roster.iter().map(|c| c.partner_id().to_string()).collect();

        assert_eq!(input_ids, output_ids);
    }

    #[test]
    fn test_reaggregation_is_idempotent() {
        let batch = vec![
            incoming("a", "m1", 5),
            incoming("b", "m2", 2),
            incoming("a", "m3", 9),
        ];

        let first = aggregate(batch.clone());
        let second = aggregate(batch);

        assert_eq!(first, second);
    }

    #[test]
    fn test_last_write_wins_within_batch() {
        // The later observation wins even with an older timestamp.
        let roster = aggregate(vec![incoming("a", "newer", 10), incoming("a", "later", 3)]);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].message.text, "later");
    }

    #[test]
    fn test_interleaved_partners_keep_last_message() {
        let roster = aggregate(vec![
            incoming("a", "m1", 1),
            incoming("b", "m2", 2),
            incoming("a", "m3", 3),
        ]);

        assert_eq!(roster.len(), 2);
        let a = roster.iter().find(|c| c.partner_id() == "a").unwrap();
        assert_eq!(a.message.text, "m3");
        assert_eq!(a.message.timestamp, 3);
    }

    #[test]
    fn test_ordered_by_recency_then_partner_id() {
        let roster = aggregate(vec![
            incoming("c", "m1", 1),
            incoming("a", "m2", 7),
            incoming("b", "m3", 7),
            incoming("d", "m4", 9),
        ]);

        let ids: Vec<&str> = roster.iter().map(|c| c.partner_id()).collect();
        assert_eq!(ids, vec!["d", "a", "b", "c"]);
    }

    #[test]
    fn test_defaulted_record_still_aggregates() {
        // A record with a missing recipient decodes to an empty partner id;
        // aggregation keeps it rather than failing.
        let msg = Message::from_record(&serde_json::json!({ "text": "?" }), "me");
        let roster = aggregate(vec![(user(""), msg)]);

        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].partner_id(), "");
        assert_eq!(roster[0].message.text, "?");
    }
}
