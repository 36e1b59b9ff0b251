// Drives one chat turn: session bookkeeping around a streamed copilot reply

use super::session::ChatSession;
use super::transport::{AssistantTransport, TransportError};
use crate::backlog::SprintBoard;
use crate::models::{ChatMessage, CopilotRequest};
use crate::utils::lock_mutex_recover;
use futures_util::StreamExt;
use std::sync::Mutex;

/// How a call to [`send_message`] ended
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Blank input, or a reply was already streaming. Nothing changed.
    Rejected,
    /// Stream completed; `None` when the assistant sent no text at all
    Completed(Option<ChatMessage>),
    /// Transport failed; the error is already in the history as a message
    Failed(TransportError),
}

impl SendOutcome {
    pub fn is_accepted(&self) -> bool {
        !matches!(self, SendOutcome::Rejected)
    }
}

/// Send `text` to the assistant and stream the reply into `session`.
///
/// The session lock is taken once per step and never held across the network
/// read, so other callers can observe the growing reply. Transport failures
/// end up in the history and are never returned as `Err`.
pub async fn send_message<T>(
    session: &Mutex<ChatSession>,
    board: &Mutex<SprintBoard>,
    transport: &T,
    text: &str,
) -> SendOutcome
where
    T: AssistantTransport + ?Sized,
{
    match begin_turn(session, text) {
        Some(message) => stream_turn(session, board, transport, message).await,
        None => SendOutcome::Rejected,
    }
}

/// Open a turn for `text`. Returns the message to send, or `None` when the
/// input is blank or a reply is already streaming.
pub fn begin_turn(session: &Mutex<ChatSession>, text: &str) -> Option<String> {
    lock_mutex_recover(session).try_begin_turn(text)
}

/// Stream the reply to a turn already opened with [`begin_turn`]
pub async fn stream_turn<T>(
    session: &Mutex<ChatSession>,
    board: &Mutex<SprintBoard>,
    transport: &T,
    message: String,
) -> SendOutcome
where
    T: AssistantTransport + ?Sized,
{
    let request = {
        let mut board = lock_mutex_recover(board);
        let snapshot = board.snapshot();
        CopilotRequest::new(message, &snapshot.stories, &snapshot.metrics)
    };

    log::debug!(
        "Sending copilot request with {} stories",
        request.stories.len()
    );

    match stream_reply(session, transport, &request).await {
        Ok(deltas) => {
            let reply = lock_mutex_recover(session).finish_turn();
            log::debug!("Copilot reply complete after {} deltas", deltas);
            SendOutcome::Completed(reply)
        }
        Err(e) => {
            log::warn!("Copilot reply failed: {}", e);
            lock_mutex_recover(session).fail_turn(&e.to_string());
            SendOutcome::Failed(e)
        }
    }
}

async fn stream_reply<T>(
    session: &Mutex<ChatSession>,
    transport: &T,
    request: &CopilotRequest,
) -> Result<usize, TransportError>
where
    T: AssistantTransport + ?Sized,
{
    let mut deltas = transport.stream_reply(request).await?;
    let mut count = 0;
    while let Some(delta) = deltas.next().await {
        let delta = delta?;
        lock_mutex_recover(session).append_delta(&delta);
        count += 1;
    }
    Ok(count)
}
