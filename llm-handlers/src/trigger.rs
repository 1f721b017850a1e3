//! Shared pure functions for the engage decision and mention stripping.
//!
//! Used by [`ChatHandler`](crate::ChatHandler) to decide when an inbound
//! message warrants a reply and to remove the @mention before the text goes
//! to normalization. No state, no side effects.

/// Returns true if the message should be answered: private chat, a reply to
/// one of the bot's own messages, or a case-insensitive @mention in the text.
/// An empty mention token never matches.
pub fn should_engage(
    chat_is_private: bool,
    text: &str,
    mention: &str,
    reply_to_bot: bool,
) -> bool {
    chat_is_private || reply_to_bot || is_mentioned(text, mention)
}

/// Returns true if `text` contains `mention`, compared ASCII-case-insensitively.
#[inline]
pub fn is_mentioned(text: &str, mention: &str) -> bool {
    find_ignore_ascii_case(text, mention).is_some()
}

/// Removes the first case-insensitive occurrence of `mention` by exact
/// substring span (applied once, not regex) and trims the result.
pub fn strip_mention(text: &str, mention: &str) -> String {
    match find_ignore_ascii_case(text, mention) {
        Some(start) => {
            let mut out = String::with_capacity(text.len().saturating_sub(mention.len()));
            out.push_str(&text[..start]);
            out.push_str(&text[start + mention.len()..]);
            out.trim().to_string()
        }
        None => text.trim().to_string(),
    }
}

/// Byte offset of the first ASCII-case-insensitive occurrence of `needle`.
/// Mention tokens are ASCII (@username), so a match always lands on char
/// boundaries of `haystack`.
fn find_ignore_ascii_case(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .as_bytes()
        .windows(needle.len())
        .position(|w| w.eq_ignore_ascii_case(needle.as_bytes()))
}
