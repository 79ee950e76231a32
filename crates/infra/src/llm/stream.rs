//! Line decoding for streamed completions (SSE and NDJSON)

use cadence_domain::Result;
use reqwest::Response;

use super::error::ProviderError;

/// Accumulates raw body chunks and yields complete lines.
///
/// Chunks may split a line, or a multi-byte character, anywhere.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk`, returning every line it completed, without the
    /// terminator. Blank lines are kept: SSE uses them as event separators.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            lines.push(decode_line(&line[..line.len() - 1]));
        }
        lines
    }

    /// Whatever trails the last newline once the body has ended.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }
}

fn decode_line(bytes: &[u8]) -> String {
    let bytes = bytes.strip_suffix(b"\r").unwrap_or(bytes);
    String::from_utf8_lossy(bytes).into_owned()
}

/// Payload of an SSE `data:` line. `None` for comments, other fields,
/// blank separators and the `[DONE]` sentinel.
pub fn sse_data(line: &str) -> Option<&str> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        None
    } else {
        Some(data)
    }
}

/// Feed every line of `response` to `on_line` until the body ends or
/// `on_line` returns `Ok(false)`.
pub async fn for_each_line<F>(mut response: Response, mut on_line: F) -> Result<()>
where
    F: FnMut(&str) -> Result<bool> + Send,
{
    let mut buffer = LineBuffer::new();

    while let Some(chunk) = response.chunk().await.map_err(ProviderError::from)? {
        for line in buffer.push(&chunk) {
            if !on_line(&line)? {
                return Ok(());
            }
        }
    }

    if let Some(line) = buffer.finish() {
        on_line(&line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_lines_split_across_chunks() {
        let mut buffer = LineBuffer::new();

        assert!(buffer.push(b"data: {\"a\"").is_empty());
        assert_eq!(buffer.push(b":1}\r\n\ndata: [DO"), vec!["data: {\"a\":1}", ""]);
        assert_eq!(buffer.push(b"NE]\n"), vec!["data: [DONE]"]);
        assert_eq!(buffer.finish(), None);
    }

    #[test]
    fn keeps_split_utf8_sequences_intact() {
        let mut buffer = LineBuffer::new();
        let text = "{\"content\":\"caf\u{e9}\"}\n".as_bytes();
        let (head, tail) = text.split_at(text.len() - 4);

        assert!(buffer.push(head).is_empty());
        assert_eq!(buffer.push(tail), vec!["{\"content\":\"caf\u{e9}\"}"]);
    }

    #[test]
    fn trailing_line_without_newline() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"{\"done\":true}");
        assert_eq!(buffer.finish().as_deref(), Some("{\"done\":true}"));
    }

    #[test]
    fn sse_data_filters_non_payload_lines() {
        assert_eq!(sse_data("data: {\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(sse_data("data:{\"x\":1}"), Some("{\"x\":1}"));
        assert_eq!(sse_data("event: content_block_delta"), None);
        assert_eq!(sse_data(": keep-alive"), None);
        assert_eq!(sse_data("data: [DONE]"), None);
        assert_eq!(sse_data(""), None);
    }
}
