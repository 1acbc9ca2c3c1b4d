//! Recipient routing for tinytalk.
//!
//! Parses the `@handle message` prefix the send path accepts.

use regex::Regex;

/// Parse a recipient handle from a message prefix.
///
/// Returns the handle and remaining text if the message starts with
/// `@handle `. Handles are lowercased; dots, dashes and underscores are
/// allowed inside them.
pub fn parse_recipient(message: &str) -> Option<(String, String)> {
    let re = Regex::new(r"^@([\w.-]+)\s+(.+)$").ok()?;

    let caps = re.captures(message)?;
    let handle = caps.get(1)?.as_str().to_lowercase();
    let remaining = caps.get(2)?.as_str();

    Some((handle, remaining.to_string()))
}
