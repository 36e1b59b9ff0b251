// Parsers for assistant output: the SSE token stream and embedded action blocks

pub mod action_block;
pub mod sse;

pub use action_block::{display_filter, extract_action, provisional_filter, ACTION_FENCE};
pub use sse::{decode_chunks, decode_stream, DecoderState, SseDecoder};
