//! Text helpers for prompt building and parsing model output

/// Cut `text` to at most `max_chars` characters, appending "..." when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Slice from the first `open` to the last `close`, inclusive.
///
/// Models often wrap JSON in prose or code fences; this recovers the
/// outermost array or object.
pub fn outermost_span(content: &str, open: char, close: char) -> Option<&str> {
    let start = content.find(open)?;
    let end = content.rfind(close)?;
    (end > start).then(|| &content[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("exactly", 7), "exactly");
        assert_eq!(truncate_chars("héllo wörld", 5), "héllo...");
    }

    #[test]
    fn outermost_span_finds_wrapped_json() {
        let text = "Here you go:\n```json\n[{\"a\": [1]}]\n```";
        assert_eq!(outermost_span(text, '[', ']'), Some("[{\"a\": [1]}]"));
        assert_eq!(outermost_span("no json", '{', '}'), None);
        assert_eq!(outermost_span("} backwards {", '{', '}'), None);
    }
}
