//! Transport seam between the connection store and the wire.
//!
//! A transport opens one WebSocket session per [`HandshakeRequest`] and
//! reports what happens to it through the [`EventSink`] it was given. Every
//! event carries the epoch of the session that produced it so the store can
//! drop events from sessions it has already abandoned.

use futures_channel::mpsc::UnboundedSender;
use url::Url;

/// Query parameter carrying the client type on the handshake URL.
pub const CLIENT_TYPE_PARAM: &str = "clientType";

/// Lifecycle and data events reported by a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// Handshake completed
    Opened,
    /// Text frame received
    Message(String),
    /// Handshake failed before the session opened
    Failed(String),
    /// Open session ended unexpectedly
    Dropped(String),
    /// Session closed at the client's request
    Closed,
}

/// A transport event tagged with its session epoch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub epoch: u64,
    pub event: TransportEvent,
}

/// Where a transport session sends its events.
#[derive(Clone)]
pub struct EventSink {
    epoch: u64,
    sender: UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(epoch: u64, sender: UnboundedSender<SessionEvent>) -> Self {
        Self { epoch, sender }
    }

    pub fn emit(&self, event: TransportEvent) {
        let event = SessionEvent {
            epoch: self.epoch,
            event,
        };
        if self.sender.unbounded_send(event).is_err() {
            crate::log_debug!("Realtime event dropped, store is gone");
        }
    }
}

/// Parameters of one handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub url: Url,
    pub client_type: String,
    pub epoch: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("no open session")]
    NotOpen,
    #[error("send failed: {0}")]
    Send(String),
}

pub trait Transport {
    /// Begin a handshake. Completion or failure is reported through `events`.
    fn open(&mut self, request: HandshakeRequest, events: EventSink);

    /// Queue a text frame on the current session.
    fn send(&mut self, text: String) -> Result<(), TransportError>;

    /// Close the current session, if any. Idempotent.
    fn close(&mut self);
}

/// Build the handshake URL, tagging the session with its client type.
pub fn handshake_url(endpoint: &Url, client_type: &str) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair(CLIENT_TYPE_PARAM, client_type);
    url
}

#[cfg(target_arch = "wasm32")]
mod transport_wasm;
#[cfg(target_arch = "wasm32")]
pub use transport_wasm::WebSocketTransport;

#[cfg(not(target_arch = "wasm32"))]
mod transport_native;
#[cfg(not(target_arch = "wasm32"))]
pub use transport_native::WebSocketTransport;

/// The WebSocket transport for the current platform.
pub fn platform_transport() -> Box<dyn Transport> {
    Box::new(WebSocketTransport::default())
}
