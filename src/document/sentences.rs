//! Sentence splitting with guards for abbreviations, initials, decimals,
//! and ellipses. Terminator scan uses memchr3 rather than a char walk.

use super::Sentence;
use memchr::memchr3_iter;

/// Abbreviations whose trailing period does not end a sentence.
/// Compared lowercase, dots removed ("e.g." matches as "eg").
const ABBREVIATIONS: &[&str] = &[
    "eg", "ie", "etc", "cf", "vs", "al", "approx", "dr", "mr", "mrs", "ms", "prof", "sr", "jr",
    "st", "no", "fig", "ch", "sec",
];

/// Split a paragraph into sentences on `.` / `!` / `?`.
///
/// A terminator only ends a sentence when followed (after optional
/// closing quotes or parens) by whitespace or end of text, and when it
/// is not part of an abbreviation, a single-letter initial, a decimal
/// number, or the interior of an ellipsis. Trailing text without a
/// terminator becomes a final sentence.
pub fn split_sentences(text: &str) -> Vec<Sentence> {
    let bytes = text.as_bytes();
    let mut sentences = Vec::new();
    let mut start = 0usize;

    for pos in memchr3_iter(b'.', b'!', b'?', bytes) {
        if pos < start {
            continue;
        }

        // Interior of an ellipsis or a "?!" run: defer to the last mark
        if bytes.get(pos + 1).is_some_and(|b| matches!(b, b'.' | b'!' | b'?')) {
            continue;
        }

        if bytes[pos] == b'.' && !period_ends_sentence(text, bytes, pos) {
            continue;
        }

        // Consume closing quotes/parens after the terminator
        let mut end = pos + 1;
        while bytes
            .get(end)
            .is_some_and(|b| matches!(b, b'"' | b'\'' | b')' | b']'))
        {
            end += 1;
        }

        // Boundary requires whitespace or end of text
        if end < bytes.len() && !bytes[end].is_ascii_whitespace() {
            continue;
        }

        push_sentence(&mut sentences, &text[start..end]);
        start = end;
    }

    // Unterminated tail
    if start < text.len() {
        push_sentence(&mut sentences, &text[start..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<Sentence>, raw: &str) {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let word_count = trimmed.split_whitespace().count();
    sentences.push(Sentence {
        text: trimmed.to_string(),
        word_count,
    });
}

/// Guards for a period at `pos`: decimals, abbreviations, and initials.
fn period_ends_sentence(text: &str, bytes: &[u8], pos: usize) -> bool {
    // Final dot of an ellipsis run: the pause belongs to the sentence
    if pos > 0 && bytes[pos - 1] == b'.' {
        return false;
    }

    // Decimal: digit on both sides (3.14)
    if pos > 0
        && bytes[pos - 1].is_ascii_digit()
        && bytes.get(pos + 1).is_some_and(|b| b.is_ascii_digit())
    {
        return false;
    }

    // Token immediately before the period, back to the last whitespace
    let before = &text[..pos];
    let token_start = before
        .rfind(|c: char| c.is_whitespace())
        .map(|i| i + 1)
        .unwrap_or(0);
    let token = before[token_start..].trim_start_matches(['(', '"', '\'']);

    // Single uppercase initial: "J. Smith"
    if token.len() == 1 && token.chars().all(|c| c.is_ascii_uppercase()) {
        return false;
    }

    // Known abbreviation (dots removed so "e.g" matches)
    let normalized: String = token
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .collect();
    if !token.contains(|c: char| c.is_ascii_digit()) && ABBREVIATIONS.contains(&normalized.as_str())
    {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(input: &str) -> Vec<String> {
        split_sentences(input)
            .into_iter()
            .map(|s| s.text)
            .collect()
    }

    #[test]
    fn test_basic_split() {
        let s = texts("First one. Second one! Third one?");
        assert_eq!(s, vec!["First one.", "Second one!", "Third one?"]);
    }

    #[test]
    fn test_word_counts() {
        let s = split_sentences("One two three. Four five.");
        assert_eq!(s[0].word_count, 3);
        assert_eq!(s[1].word_count, 2);
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let s = texts("We use e.g. apples and i.e. pears. Dr. Smith agrees.");
        assert_eq!(s.len(), 2);
        assert!(s[0].contains("e.g. apples"));
        assert!(s[1].starts_with("Dr. Smith"));
    }

    #[test]
    fn test_initials_do_not_split() {
        let s = texts("J. R. R. Tolkien wrote it. Everyone read it.");
        assert_eq!(s.len(), 2);
        assert!(s[0].starts_with("J. R. R. Tolkien"));
    }

    #[test]
    fn test_decimals_do_not_split() {
        let s = texts("The CV was 0.35 overall. That is fine.");
        assert_eq!(s.len(), 2);
        assert!(s[0].contains("0.35"));
    }

    #[test]
    fn test_ellipsis_is_one_boundary() {
        let s = texts("Well... maybe. Sure.");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], "Well... maybe.");
    }

    #[test]
    fn test_unterminated_tail() {
        let s = texts("Complete sentence. trailing fragment");
        assert_eq!(s.len(), 2);
        assert_eq!(s[1], "trailing fragment");
    }

    #[test]
    fn test_closing_quote_attaches() {
        let s = texts("She said \"stop.\" He left.");
        assert_eq!(s.len(), 2);
        assert_eq!(s[0], "She said \"stop.\"");
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   ").is_empty());
    }
}
