//! Server-sent-event decoder for chat-completion token streams
//!
//! Turns raw response bytes into the ordered sequence of text deltas carried
//! in `data: {"choices":[{"delta":{"content":"..."}}]}` frames. Reads may end
//! anywhere: inside a line, inside a JSON payload, or inside a multi-byte
//! UTF-8 character.

use futures_util::{stream, Stream, StreamExt};
use serde_json::Value;
use std::collections::VecDeque;

/// Prefix of lines carrying a payload
pub const DATA_PREFIX: &str = "data: ";
/// Prefix of keep-alive comment lines
pub const COMMENT_PREFIX: char = ':';
/// Payload that ends the stream
pub const DONE_SENTINEL: &str = "[DONE]";

/// Where the decoder is in its frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderState {
    /// Buffer holds at most a partial line, or a complete line whose payload
    /// did not parse yet and is waiting for more bytes
    AwaitingFrame,
    /// The last line examined produced a frame; more lines may be buffered
    FrameParsed,
    /// The sentinel arrived or input ended; further bytes are discarded
    Terminated,
}

/// Classification of a single line
#[derive(Debug, PartialEq, Eq)]
enum Frame {
    /// Comment, blank, non-data, or a payload without text
    Skip,
    Delta(String),
    Done,
    /// Payload is not valid JSON (possibly truncated)
    Unparsed,
}

fn classify_line(raw: &str) -> Frame {
    let line = raw.strip_suffix('\r').unwrap_or(raw);

    if line.starts_with(COMMENT_PREFIX) || line.trim().is_empty() {
        return Frame::Skip;
    }

    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Frame::Skip;
    };

    let payload = payload.trim();
    if payload == DONE_SENTINEL {
        return Frame::Done;
    }

    match serde_json::from_str::<Value>(payload) {
        Ok(json) => match json
            .pointer("/choices/0/delta/content")
            .and_then(|v| v.as_str())
        {
            Some(content) if !content.is_empty() => Frame::Delta(content.to_string()),
            _ => Frame::Skip,
        },
        Err(_) => Frame::Unparsed,
    }
}

/// Incremental decoder. Feed it byte chunks in arrival order, then call
/// [`SseDecoder::finish`] once the input ends.
#[derive(Debug)]
pub struct SseDecoder {
    state: DecoderState,
    /// Decoded text not yet consumed as a frame
    buffer: String,
    /// Trailing bytes of a UTF-8 character split across reads
    utf8_tail: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self {
            state: DecoderState::AwaitingFrame,
            buffer: String::new(),
            utf8_tail: Vec::new(),
        }
    }

    pub fn state(&self) -> DecoderState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == DecoderState::Terminated
    }

    /// Consume one read and return the deltas it completed, in order
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.is_terminated() {
            return deltas;
        }

        self.push_bytes(chunk);

        while let Some(newline) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=newline).collect();
            let line = &line[..line.len() - 1];

            match classify_line(line) {
                Frame::Skip => {}
                Frame::Delta(text) => {
                    self.state = DecoderState::FrameParsed;
                    deltas.push(text);
                }
                Frame::Done => {
                    self.terminate();
                    return deltas;
                }
                Frame::Unparsed => {
                    log::debug!("Incomplete stream frame, waiting for more data");
                    self.buffer.insert(0, '\n');
                    self.buffer.insert_str(0, line);
                    self.state = DecoderState::AwaitingFrame;
                    return deltas;
                }
            }
        }

        self.state = DecoderState::AwaitingFrame;
        deltas
    }

    /// End of input: give the residue one last pass, then discard it
    pub fn finish(&mut self) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.is_terminated() {
            return deltas;
        }

        if !self.utf8_tail.is_empty() {
            let tail = std::mem::take(&mut self.utf8_tail);
            self.buffer.push_str(&String::from_utf8_lossy(&tail));
        }

        let residue = std::mem::take(&mut self.buffer);
        for line in residue.split('\n') {
            match classify_line(line) {
                Frame::Delta(text) => deltas.push(text),
                Frame::Done => break,
                Frame::Unparsed => {
                    log::debug!("Dropping unparseable frame at end of stream");
                }
                Frame::Skip => {}
            }
        }

        self.terminate();
        deltas
    }

    fn terminate(&mut self) {
        self.state = DecoderState::Terminated;
        self.buffer.clear();
        self.utf8_tail.clear();
    }

    fn push_bytes(&mut self, chunk: &[u8]) {
        let mut bytes = std::mem::take(&mut self.utf8_tail);
        bytes.extend_from_slice(chunk);

        let mut rest: &[u8] = &bytes;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        // Character continues in the next read
                        None => {
                            self.utf8_tail = after.to_vec();
                            break;
                        }
                        Some(len) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[len..];
                        }
                    }
                }
            }
        }
    }
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a whole in-memory byte sequence, split into the given chunks
pub fn decode_chunks<I, B>(chunks: I) -> Vec<String>
where
    I: IntoIterator<Item = B>,
    B: AsRef<[u8]>,
{
    let mut decoder = SseDecoder::new();
    let mut deltas = Vec::new();
    for chunk in chunks {
        deltas.extend(decoder.feed(chunk.as_ref()));
        if decoder.is_terminated() {
            return deltas;
        }
    }
    deltas.extend(decoder.finish());
    deltas
}

struct DeltaStreamState<S> {
    inner: S,
    decoder: SseDecoder,
    ready: VecDeque<String>,
    exhausted: bool,
}

/// Lazily map a byte stream to text deltas.
///
/// Reading stops at the sentinel. A read error is yielded once and ends the
/// sequence.
pub fn decode_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<String, E>>
where
    S: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
{
    let state = DeltaStreamState {
        inner: bytes,
        decoder: SseDecoder::new(),
        ready: VecDeque::new(),
        exhausted: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(delta) = st.ready.pop_front() {
                return Some((Ok(delta), st));
            }
            if st.exhausted {
                return None;
            }
            if st.decoder.is_terminated() {
                st.exhausted = true;
                continue;
            }

            match st.inner.next().await {
                Some(Ok(chunk)) => {
                    let deltas = st.decoder.feed(chunk.as_ref());
                    st.ready.extend(deltas);
                }
                Some(Err(err)) => {
                    st.exhausted = true;
                    return Some((Err(err), st));
                }
                None => {
                    let deltas = st.decoder.finish();
                    st.ready.extend(deltas);
                    st.exhausted = true;
                }
            }
        }
    })
}
