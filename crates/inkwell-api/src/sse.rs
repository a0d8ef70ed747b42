//! Server-Sent Events line decoder.
//!
//! Turns raw body chunks into `data:` lines. Chunk boundaries may fall
//! anywhere, including inside a UTF-8 sequence or inside a line, so both the
//! undecoded bytes and the unterminated line are carried to the next chunk.

/// One meaningful line of the event stream, with the prefix removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventLine {
    pub payload: String,
}

/// Incremental decoder from bytes to [`EventLine`]s.
#[derive(Debug)]
pub struct LineDecoder {
    prefix: String,
    /// Trailing bytes of an incomplete UTF-8 sequence.
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a newline.
    buffer: String,
    /// Length of `buffer` already searched for a newline.
    scanned: usize,
}

impl LineDecoder {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            pending: Vec::new(),
            buffer: String::new(),
            scanned: 0,
        }
    }

    /// Feed a chunk of bytes and return every line it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<EventLine> {
        self.decode(chunk);

        let mut lines = Vec::new();
        let mut consumed = 0;
        let mut search_from = self.scanned;
        while let Some(pos) = self.buffer[search_from..].find('\n') {
            let end = search_from + pos;
            if let Some(line) = self.classify(&self.buffer[consumed..end]) {
                lines.push(line);
            }
            consumed = end + 1;
            search_from = consumed;
        }
        self.buffer.drain(..consumed);
        self.scanned = self.buffer.len();

        lines
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Vec<EventLine> {
        if !self.pending.is_empty() {
            tracing::debug!(
                "Body ended inside a UTF-8 sequence ({} bytes)",
                self.pending.len()
            );
            self.pending.clear();
            self.buffer.push(char::REPLACEMENT_CHARACTER);
        }

        self.scanned = 0;
        let rest = std::mem::take(&mut self.buffer);
        self.classify(&rest).into_iter().collect()
    }

    /// Append `chunk` to the decoded buffer, holding back an incomplete tail.
    fn decode(&mut self, chunk: &[u8]) {
        self.pending.extend_from_slice(chunk);

        let mut start = 0;
        while start < self.pending.len() {
            match std::str::from_utf8(&self.pending[start..]) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    start = self.pending.len();
                }
                Err(e) => {
                    let valid_end = start + e.valid_up_to();
                    self.buffer
                        .push_str(&String::from_utf8_lossy(&self.pending[start..valid_end]));
                    match e.error_len() {
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            start = valid_end + bad;
                        }
                        None => {
                            start = valid_end;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..start);
    }

    fn classify(&self, line: &str) -> Option<EventLine> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if line.trim().is_empty() {
            return None;
        }
        match line.strip_prefix(self.prefix.as_str()) {
            Some(payload) => Some(EventLine {
                payload: payload.to_string(),
            }),
            None => {
                tracing::trace!("Ignoring non-event line: {line}");
                None
            }
        }
    }
}

impl Default for LineDecoder {
    fn default() -> Self {
        Self::new("data:")
    }
}
