//! Newline-delimited framing over a chunked response body.

/// Accumulates body bytes and hands back complete lines.
///
/// A network chunk may end mid-line (or mid-codepoint); the tail stays
/// buffered until the next push.
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buffer: Vec<u8>,
}

impl LineBuffer {
    /// Append `bytes` and drain every complete, non-blank line.
    pub(crate) fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(text) = decode(&line) {
                lines.push(text);
            }
        }
        lines
    }

    /// The trailing line, if the body did not end with a newline.
    pub(crate) fn finish(self) -> Option<String> {
        decode(&self.buffer)
    }
}

fn decode(line: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(line);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
