//! Exact-match stage.

use std::collections::HashSet;

use dedup_types::Message;

/// Keep the first message for each distinct `content`, in submission order.
///
/// Contents are compared byte-for-byte; no case, whitespace or unicode
/// normalization. The seen-set lives only for this call.
pub fn retain_first_occurrences(messages: &[Message]) -> Vec<&Message> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(messages.len());
    messages
        .iter()
        .filter(|message| seen.insert(message.content.as_str()))
        .collect()
}
