//! Native/Desktop WebSocket transport using tokio-tungstenite.

use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};

use super::{EventSink, HandshakeRequest, Transport, TransportError, TransportEvent};

enum Outbound {
    Text(String),
    Close,
}

/// One tokio task per session. Outbound frames go through an unbounded
/// channel owned by the current session.
#[derive(Default)]
pub struct WebSocketTransport {
    outbound: Option<UnboundedSender<Outbound>>,
}

impl Transport for WebSocketTransport {
    fn open(&mut self, request: HandshakeRequest, events: EventSink) {
        self.close();

        let (sender, receiver) = unbounded();
        self.outbound = Some(sender);

        tokio::spawn(run_session(request, receiver, events));
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let sender = self.outbound.as_ref().ok_or(TransportError::NotOpen)?;
        sender
            .unbounded_send(Outbound::Text(text))
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    fn close(&mut self) {
        if let Some(sender) = self.outbound.take() {
            let _ = sender.unbounded_send(Outbound::Close);
        }
    }
}

async fn run_session(
    request: HandshakeRequest,
    mut outbound: UnboundedReceiver<Outbound>,
    events: EventSink,
) {
    let (ws_stream, _response) = match connect_async(request.url.as_str()).await {
        Ok(ok) => ok,
        Err(e) => {
            crate::log_error!("Realtime handshake to {} failed: {}", request.url, e);
            events.emit(TransportEvent::Failed(e.to_string()));
            return;
        }
    };

    crate::log_info!(
        "Realtime session {} open as '{}'",
        request.epoch,
        request.client_type
    );
    events.emit(TransportEvent::Opened);

    let (mut write, mut read) = ws_stream.split();

    loop {
        tokio::select! {
            cmd = outbound.next() => match cmd {
                Some(Outbound::Text(text)) => {
                    crate::log_debug!("Realtime send: {}", text);
                    if let Err(e) = write.send(Message::Text(text.into())).await {
                        crate::log_error!("Realtime send failed: {}", e);
                        events.emit(TransportEvent::Dropped(e.to_string()));
                        return;
                    }
                }
                // Close requested, or the transport was dropped
                Some(Outbound::Close) | None => {
                    let _ = write.send(Message::Close(None)).await;
                    events.emit(TransportEvent::Closed);
                    return;
                }
            },
            msg = read.next() => match msg {
                Some(Ok(Message::Text(text))) => {
                    events.emit(TransportEvent::Message(text.as_str().to_string()));
                }
                // Any close the client did not ask for goes through the reconnect policy
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame
                        .map(|f| format!("closed by peer ({})", f.code))
                        .unwrap_or_else(|| "closed by peer".to_string());
                    crate::log_warn!("Realtime session {}: {}", request.epoch, reason);
                    events.emit(TransportEvent::Dropped(reason));
                    return;
                }
                // Pong is handled by tungstenite; binary frames are not part of the protocol
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    crate::log_error!("Realtime read error: {}", e);
                    events.emit(TransportEvent::Dropped(e.to_string()));
                    return;
                }
                None => {
                    events.emit(TransportEvent::Dropped("stream ended".to_string()));
                    return;
                }
            },
        }
    }
}
