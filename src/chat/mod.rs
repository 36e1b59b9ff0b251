// Copilot chat: session state, the streaming turn driver, transport and the
// breakdown applicator

pub mod applicator;
pub mod driver;
pub mod session;
pub mod transport;

pub use applicator::{apply_breakdown, apply_message_action, ApplyError, BreakdownResult};
pub use driver::{begin_turn, send_message, stream_turn, SendOutcome};
pub use session::{ChatSession, NoopObserver, SessionEvent, SessionObserver};
pub use transport::{AssistantTransport, DeltaStream, HttpTransport, TransportError};
