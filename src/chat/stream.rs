//! Newline-delimited JSON decoding for streamed chat replies.
//!
//! Network chunks do not respect line boundaries, so bytes are buffered
//! until a full line is available. Lines that fail to parse are dropped.

use serde::Deserialize;

/// One object of a `/api/chat` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponseLine {
    /// Message fragment.
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    /// Set on the final object.
    #[serde(default)]
    pub done: bool,
    /// Server-side failure reported inside a successful response.
    #[serde(default)]
    pub error: Option<String>,
}

/// The message part of a response line.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseMessage {
    /// Text fragment.
    #[serde(default)]
    pub content: String,
}

impl ChatResponseLine {
    /// The text fragment carried by this line, if non-empty.
    pub fn content(&self) -> Option<&str> {
        self.message
            .as_ref()
            .map(|m| m.content.as_str())
            .filter(|c| !c.is_empty())
    }
}

/// Incremental NDJSON decoder.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buffer: Vec<u8>,
    skipped: usize,
}

impl LineDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every complete line it finished.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<ChatResponseLine> {
        self.buffer.extend_from_slice(chunk);
        let mut out = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(parsed) = self.parse(&line) {
                out.push(parsed);
            }
        }
        out
    }

    /// Flush a trailing line that had no terminating newline.
    pub fn finish(&mut self) -> Option<ChatResponseLine> {
        let rest = std::mem::take(&mut self.buffer);
        self.parse(&rest)
    }

    /// Number of malformed lines dropped so far.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse(&mut self, raw: &[u8]) -> Option<ChatResponseLine> {
        let text = String::from_utf8_lossy(raw);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str(text) {
            Ok(line) => Some(line),
            Err(e) => {
                self.skipped += 1;
                tracing::debug!("Skipping malformed stream line: {}", e);
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(lines: &[ChatResponseLine]) -> Vec<String> {
        lines
            .iter()
            .filter_map(|l| l.content().map(str::to_string))
            .collect()
    }

    #[test]
    fn lines_split_across_chunks_are_reassembled() {
        let mut decoder = LineDecoder::new();
        let first = decoder.push(b"{\"message\":{\"content\":\"Hel");
        assert!(first.is_empty());

        let second = decoder.push(b"lo\"},\"done\":false}\n{\"message\":{\"content\":\" world\"}}\n");
        assert_eq!(contents(&second), vec!["Hello", " world"]);
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"{\"message\":{\"content\":\"a\"}}\nnot json\n\n{\"message\":{\"content\":\"b\"}}\n");
        assert_eq!(contents(&lines), vec!["a", "b"]);
        assert_eq!(decoder.skipped(), 1);
    }

    #[test]
    fn trailing_line_without_newline_is_flushed() {
        let mut decoder = LineDecoder::new();
        assert!(decoder.push(b"{\"message\":{\"content\":\"x\"},\"done\":true}").is_empty());
        let last = decoder.finish().unwrap();
        assert!(last.done);
        assert_eq!(last.content(), Some("x"));
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn multibyte_characters_survive_chunk_splits() {
        let text = "{\"message\":{\"content\":\"θ→0\"}}\n".as_bytes();
        let mut decoder = LineDecoder::new();
        let (a, b) = text.split_at(24);
        assert!(decoder.push(a).is_empty());
        assert_eq!(contents(&decoder.push(b)), vec!["θ→0"]);
    }

    #[test]
    fn error_objects_are_kept_not_skipped() {
        let mut decoder = LineDecoder::new();
        let lines = decoder.push(b"{\"error\":\"model runner crashed\"}\n");
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].error.as_deref(), Some("model runner crashed"));
        assert!(lines[0].content().is_none());
        assert_eq!(decoder.skipped(), 0);
    }
}
