//! Minimal Server-Sent-Events frame parser

use todo_core::{Error, Result};

/// Largest unterminated frame kept in memory
pub const MAX_FRAME_BYTES: usize = 16 * 1024 * 1024;

/// One dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseMessage {
    pub event: Option<String>,
    pub data: String,
}

impl SseMessage {
    /// Event name, `message` when the frame carried none
    pub fn event_name(&self) -> &str {
        self.event.as_deref().unwrap_or("message")
    }
}

/// Accumulates raw chunks and yields complete frames
///
/// Bytes are buffered until a blank line, so multi-byte characters split
/// across chunks are decoded intact.
#[derive(Debug)]
pub struct SseParser {
    buffer: Vec<u8>,
    limit: usize,
}

impl Default for SseParser {
    fn default() -> Self {
        Self::with_limit(MAX_FRAME_BYTES)
    }
}

impl SseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            buffer: Vec::new(),
            limit,
        }
    }

    /// Feed a chunk and return every frame it completed
    ///
    /// Fails once the pending, unterminated frame grows past the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<SseMessage>> {
        self.buffer.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some((idx, len)) = frame_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..idx + len).collect();
            if let Some(message) = parse_frame(&String::from_utf8_lossy(&raw)) {
                messages.push(message);
            }
        }

        if self.buffer.len() > self.limit {
            let pending = self.buffer.len();
            self.buffer.clear();
            return Err(Error::Transport(format!(
                "Event frame exceeds {} bytes ({} pending)",
                self.limit, pending
            )));
        }
        Ok(messages)
    }
}

fn frame_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find(buffer, b"\n\n").map(|idx| (idx, 2));
    let crlf = find(buffer, b"\r\n\r\n").map(|idx| (idx, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn parse_frame(raw: &str) -> Option<SseMessage> {
    let mut event = None;
    let mut data: Vec<&str> = Vec::new();

    for line in raw.lines() {
        // Comments double as keep-alives
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        let value = value.strip_prefix(' ').unwrap_or(value);
        match field {
            "event" => event = Some(value.to_string()),
            "data" => data.push(value),
            _ => {}
        }
    }

    if data.is_empty() {
        return None;
    }
    Some(SseMessage {
        event,
        data: data.join("\n"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_event() {
        let mut parser = SseParser::new();
        let messages = parser.push(b"event: todos\ndata: []\n\n").unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event_name(), "todos");
        assert_eq!(messages[0].data, "[]");
    }

    #[test]
    fn test_frame_split_across_chunks() {
        let mut parser = SseParser::new();
        let frame = "event: todos\ndata: [{\"text\":\"Café\"}]\n\n".as_bytes();
        // Split inside the two-byte 'é'
        let split = frame.iter().position(|b| *b == 0xC3).unwrap() + 1;

        assert!(parser.push(&frame[..split]).unwrap().is_empty());
        let messages = parser.push(&frame[split..]).unwrap();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].data.contains("Café"));
    }

    #[test]
    fn test_keep_alive_and_multiple_frames() {
        let mut parser = SseParser::new();
        let messages = parser.push(b":\n\ndata: one\n\ndata: a\ndata: b\n\n").unwrap();

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].event_name(), "message");
        assert_eq!(messages[0].data, "one");
        assert_eq!(messages[1].data, "a\nb");
    }

    #[test]
    fn test_crlf_frames() {
        let mut parser = SseParser::new();
        let messages = parser.push(b"event: todos\r\ndata: []\r\n\r\n").unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].event_name(), "todos");
        assert_eq!(messages[0].data, "[]");
    }

    #[test]
    fn test_unterminated_frame_over_limit() {
        let mut parser = SseParser::with_limit(16);
        assert!(parser.push(b"data: 0123").unwrap().is_empty());

        let err = parser.push(b"456789abcdef").unwrap_err();
        assert!(matches!(err, Error::Transport(_)));

        // Complete frames under the limit still parse afterwards
        let messages = parser.push(b"data: ok\n\n").unwrap();
        assert_eq!(messages[0].data, "ok");
    }
}
