/// Truncates to at most `max_chars` characters without splitting a char.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

/// Normalizes model output into postable reply text. Returns `None` when
/// nothing usable is left.
pub fn clean_generated_reply(raw: &str, max_chars: usize) -> Option<String> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("COMMENT:") {
        text = rest.trim();
    }
    if text.len() >= 2 && text.starts_with('"') && text.ends_with('"') {
        text = text[1..text.len() - 1].trim();
    }
    if text.is_empty() {
        return None;
    }
    let truncated = truncate_chars(text, max_chars).trim_end();
    if truncated.is_empty() {
        return None;
    }
    Some(truncated.to_string())
}
