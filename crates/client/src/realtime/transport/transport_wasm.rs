//! WASM/Web WebSocket transport using web_sys::WebSocket.

use std::cell::Cell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{js_sys, CloseEvent, MessageEvent, WebSocket};

use super::{EventSink, HandshakeRequest, Transport, TransportError, TransportEvent};

/// RFC 6455 normal closure
const CLOSE_NORMAL: u16 = 1000;

/// Browser socket driven by its event callbacks.
#[derive(Default)]
pub struct WebSocketTransport {
    socket: Option<WebSocket>,
    /// Set when the client asked the current socket to close
    closing: Rc<Cell<bool>>,
}

impl Transport for WebSocketTransport {
    fn open(&mut self, request: HandshakeRequest, events: EventSink) {
        self.close();

        let ws = match WebSocket::new(request.url.as_str()) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log_error!("Failed to create WebSocket: {:?}", e);
                events.emit(TransportEvent::Failed(format!("{:?}", e)));
                return;
            }
        };

        let opened = Rc::new(Cell::new(false));
        let closing = Rc::new(Cell::new(false));
        self.closing = closing.clone();

        let opened_for_open = opened.clone();
        let events_for_open = events.clone();
        let client_type = request.client_type.clone();
        let epoch = request.epoch;
        let onopen_callback = Closure::wrap(Box::new(move |_: web_sys::Event| {
            crate::log_info!("Realtime session {} open as '{}'", epoch, client_type);
            opened_for_open.set(true);
            events_for_open.emit(TransportEvent::Opened);
        }) as Box<dyn FnMut(web_sys::Event)>);
        ws.set_onopen(Some(onopen_callback.as_ref().unchecked_ref()));
        onopen_callback.forget();

        // Errors are always followed by a close event, which carries the outcome
        let onerror_callback = Closure::wrap(Box::new(move |_: web_sys::ErrorEvent| {
            crate::log_error!("Realtime socket error");
        }) as Box<dyn FnMut(web_sys::ErrorEvent)>);
        ws.set_onerror(Some(onerror_callback.as_ref().unchecked_ref()));
        onerror_callback.forget();

        let events_for_close = events.clone();
        let onclose_callback = Closure::wrap(Box::new(move |e: CloseEvent| {
            let reason = if e.reason().is_empty() {
                format!("code {}", e.code())
            } else {
                e.reason()
            };
            crate::log_info!("Realtime socket closed: {}", reason);
            // A close the client did not ask for is a drop, whatever its code
            let event = if closing.get() {
                TransportEvent::Closed
            } else if !opened.get() {
                TransportEvent::Failed(reason)
            } else {
                TransportEvent::Dropped(reason)
            };
            events_for_close.emit(event);
        }) as Box<dyn FnMut(CloseEvent)>);
        ws.set_onclose(Some(onclose_callback.as_ref().unchecked_ref()));
        onclose_callback.forget();

        let onmessage_callback = Closure::wrap(Box::new(move |e: MessageEvent| {
            if let Ok(text) = e.data().dyn_into::<js_sys::JsString>() {
                events.emit(TransportEvent::Message(text.into()));
            }
        }) as Box<dyn FnMut(MessageEvent)>);
        ws.set_onmessage(Some(onmessage_callback.as_ref().unchecked_ref()));
        onmessage_callback.forget();

        self.socket = Some(ws);
    }

    fn send(&mut self, text: String) -> Result<(), TransportError> {
        let ws = self.socket.as_ref().ok_or(TransportError::NotOpen)?;
        if ws.ready_state() != WebSocket::OPEN {
            return Err(TransportError::NotOpen);
        }
        crate::log_debug!("Realtime send: {}", text);
        ws.send_with_str(&text)
            .map_err(|e| TransportError::Send(format!("{:?}", e)))
    }

    fn close(&mut self) {
        if let Some(ws) = self.socket.take() {
            self.closing.set(true);
            let _ = ws.close_with_code(CLOSE_NORMAL);
        }
    }
}
