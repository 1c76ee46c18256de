/// Keep at most `max_chars` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Repeat a rule character to a fixed width.
pub fn rule(ch: char, width: usize) -> String {
    ch.to_string().repeat(width)
}
