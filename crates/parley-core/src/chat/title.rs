//! Conversation auto-titling.
//!
//! A conversation that still carries a placeholder title gets a short one
//! derived from its first user message: strip everything but alphanumerics
//! and apostrophes, drop stop-words, keep the first two meaningful tokens.
//! The heuristics here are deliberately simple and preserved as-is.

use parley_types::chat::{Conversation, DEFAULT_TITLE};

/// Words too generic to carry a title.
const TITLE_STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "you", "your", "with", "from", "that", "this", "what", "when",
    "where", "which", "will", "would", "could", "should", "have", "has", "had", "into", "about",
    "need", "help", "please", "make", "how", "can", "why", "does", "like", "want", "just", "been",
    "some", "more", "any", "guide",
];

/// Whether the conversation still carries a placeholder title.
///
/// A title counts as unnamed when it is empty, equals the conversation id
/// case-insensitively, starts with "conversation ", or is one of the stock
/// placeholders.
pub fn looks_unnamed(conversation: &Conversation) -> bool {
    let title = conversation.title.trim().to_lowercase();
    if title.is_empty() {
        return true;
    }
    if title == conversation.conversation_id.to_lowercase() {
        return true;
    }
    if title.starts_with("conversation ") {
        return true;
    }
    matches!(title.as_str(), "new conversation" | "untitled conversation")
}

/// Derive a short title from free text.
///
/// Tokens longer than two characters that are not stop-words win; when none
/// survive, the first raw tokens are used instead. Each kept token is
/// capitalized unless it is already all-uppercase.
pub fn title_from_text(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '\'' || c == ' ' {
                c
            } else {
                ' '
            }
        })
        .collect();
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() {
        return DEFAULT_TITLE.to_string();
    }

    let meaningful: Vec<&str> = words
        .iter()
        .copied()
        .filter(|word| word.len() > 2 && !TITLE_STOPWORDS.contains(&word.to_lowercase().as_str()))
        .collect();
    let candidates = if meaningful.is_empty() {
        &words
    } else {
        &meaningful
    };

    let formatted: Vec<String> = candidates
        .iter()
        .take(2)
        .map(|part| {
            if is_all_uppercase(part) {
                (*part).to_string()
            } else {
                capitalize(part)
            }
        })
        .collect();

    let title = formatted.join(" ");
    if title.is_empty() {
        DEFAULT_TITLE.to_string()
    } else {
        title
    }
}

/// At least one letter and no lowercase letters.
fn is_all_uppercase(word: &str) -> bool {
    word.chars().any(|c| c.is_alphabetic()) && !word.chars().any(|c| c.is_lowercase())
}

/// First character uppercased, remainder lowercased.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::chat::Conversation;

    fn conversation_titled(id: &str, title: &str) -> Conversation {
        Conversation::new(id, title, "gpt-4o-mini", "", None)
    }

    #[test]
    fn test_title_from_trip_planning_text() {
        assert_eq!(
            title_from_text("I need help planning a trip to Japan"),
            "Planning Trip"
        );
    }

    #[test]
    fn test_title_falls_back_to_raw_tokens() {
        // Every word is a stop-word or too short, so raw tokens win.
        assert_eq!(title_from_text("how are you"), "How Are");
    }

    #[test]
    fn test_title_preserves_all_uppercase() {
        assert_eq!(title_from_text("debugging NASA telemetry"), "Debugging NASA");
    }

    #[test]
    fn test_title_lowercases_tail_of_shouting() {
        assert_eq!(title_from_text("PLEASE explain Monads"), "Explain Monads");
    }

    #[test]
    fn test_title_from_symbols_only() {
        assert_eq!(title_from_text("?!?! ... ---"), DEFAULT_TITLE);
        assert_eq!(title_from_text(""), DEFAULT_TITLE);
    }

    #[test]
    fn test_title_keeps_apostrophes() {
        assert_eq!(title_from_text("what's wrong with don't?"), "What's Wrong");
    }

    #[test]
    fn test_looks_unnamed_variants() {
        assert!(looks_unnamed(&conversation_titled("trip", "")));
        assert!(looks_unnamed(&conversation_titled("trip", "TRIP")));
        assert!(looks_unnamed(&conversation_titled("trip", "New Conversation")));
        assert!(looks_unnamed(&conversation_titled(
            "trip",
            "Untitled Conversation"
        )));
        assert!(looks_unnamed(&conversation_titled("trip", "Conversation 42")));
        assert!(!looks_unnamed(&conversation_titled("trip", "Kyoto Itinerary")));
    }
}
