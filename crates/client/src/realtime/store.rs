//! The connection store: one owned state machine for one realtime connection.
//!
//! The store is mutated from a single task. UI code calls [`ConnectionStore::connect`],
//! [`ConnectionStore::disconnect`] and the room operations; the transport's
//! events come back through [`ConnectionStore::handle_event`]. The guard check
//! and the state write in `connect` happen in one `&mut self` call, so two
//! connects can never both pass the guard.

use std::time::Duration;

use agentdesk_shared::{
    create_subscribe_message, create_unsubscribe_message, RoomAction, RoomConfig, RoomError,
};
use futures_channel::mpsc::UnboundedSender;
use url::Url;

use super::policy::ReconnectPolicy;
use super::state::ConnectionState;
use super::transport::{
    handshake_url, EventSink, HandshakeRequest, SessionEvent, Transport, TransportEvent,
};

/// Client type the dashboard connects as.
pub const DEFAULT_CLIENT_TYPE: &str = "agent";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectOptions {
    pub client_type: String,
}

impl ConnectOptions {
    pub fn new(client_type: impl Into<String>) -> Self {
        Self {
            client_type: client_type.into(),
        }
    }
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self::new(DEFAULT_CLIENT_TYPE)
    }
}

/// A pending retry. Only valid for the session that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTicket {
    pub delay: Duration,
    epoch: u64,
}

pub struct ConnectionStore {
    state: ConnectionState,
    endpoint: Url,
    transport: Box<dyn Transport>,
    policy: Box<dyn ReconnectPolicy>,
    events: UnboundedSender<SessionEvent>,
    /// Epoch of the most recent session; events from older ones are ignored
    epoch: u64,
    handshake_in_flight: bool,
    client_type: Option<String>,
    /// Retries consumed in the current reconnect episode
    attempt: u32,
    scheduled_retry: Option<RetryTicket>,
    last_error: Option<String>,
    /// Room ids to keep joined with their subscriber counts, in subscription order
    rooms: Vec<(String, usize)>,
}

impl ConnectionStore {
    pub fn new(
        endpoint: Url,
        transport: Box<dyn Transport>,
        policy: Box<dyn ReconnectPolicy>,
        events: UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            endpoint,
            transport,
            policy,
            events,
            epoch: 0,
            handshake_in_flight: false,
            client_type: None,
            attempt: 0,
            scheduled_retry: None,
            last_error: None,
            rooms: Vec::new(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn client_type(&self) -> Option<&str> {
        self.client_type.as_deref()
    }

    /// Tracked room ids, in subscription order.
    pub fn rooms(&self) -> impl Iterator<Item = &str> {
        self.rooms.iter().map(|(id, _)| id.as_str())
    }

    /// Number of live subscriptions to `room_id`.
    pub fn subscribers(&self, room_id: &str) -> usize {
        self.rooms
            .iter()
            .find(|(id, _)| id == room_id)
            .map_or(0, |(_, count)| *count)
    }

    /// Start connecting unless a connection already exists, is being
    /// established, or has failed. Returns whether a handshake was started.
    pub fn connect(&mut self, options: &ConnectOptions) -> bool {
        if self.state.blocks_connect() {
            crate::log_debug!("Realtime connect ignored in state {}", self.state);
            return false;
        }

        self.client_type = Some(options.client_type.clone());
        self.attempt = 0;
        self.last_error = None;
        self.transition(ConnectionState::Connecting);
        self.begin_handshake()
    }

    /// Deliberately close the connection. A later `connect` is accepted again.
    pub fn disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected && !self.handshake_in_flight {
            return;
        }

        self.transport.close();
        self.epoch += 1;
        self.handshake_in_flight = false;
        self.scheduled_retry = None;
        self.attempt = 0;
        self.transition(ConnectionState::Disconnected);
    }

    /// Retry after a drop, once the ticket's delay has elapsed.
    pub fn retry(&mut self, ticket: RetryTicket) -> bool {
        if ticket.epoch != self.epoch
            || self.state != ConnectionState::Reconnecting
            || self.handshake_in_flight
        {
            crate::log_debug!("Realtime retry ignored in state {}", self.state);
            return false;
        }

        self.scheduled_retry = None;
        self.begin_handshake()
    }

    /// Delay the driver should wait before calling [`ConnectionStore::retry`].
    pub fn take_scheduled_retry(&mut self) -> Option<RetryTicket> {
        self.scheduled_retry.take()
    }

    /// Apply one transport event. Returns the text of an inbound message
    /// from the current session.
    pub fn handle_event(&mut self, event: SessionEvent) -> Option<String> {
        if event.epoch != self.epoch {
            crate::log_debug!(
                "Ignoring {:?} from stale realtime session {}",
                event.event,
                event.epoch
            );
            return None;
        }

        match event.event {
            TransportEvent::Opened => {
                self.handshake_in_flight = false;
                self.attempt = 0;
                self.scheduled_retry = None;
                self.last_error = None;
                self.transition(ConnectionState::Connected);
                self.rejoin_rooms();
            }
            TransportEvent::Message(text) => return Some(text),
            TransportEvent::Failed(reason) => {
                self.handshake_in_flight = false;
                if self.state == ConnectionState::Reconnecting {
                    self.schedule_retry(reason);
                } else {
                    self.fail(reason);
                }
            }
            TransportEvent::Dropped(reason) => {
                self.handshake_in_flight = false;
                crate::log_warn!("Realtime connection dropped: {}", reason);
                self.transition(ConnectionState::Reconnecting);
                self.schedule_retry(reason);
            }
            TransportEvent::Closed => {
                self.handshake_in_flight = false;
                self.scheduled_retry = None;
                self.transition(ConnectionState::Disconnected);
            }
        }
        None
    }

    /// Add a subscriber to a room. The first subscriber joins it now if
    /// connected, otherwise on the next open.
    pub fn subscribe(&mut self, room: &RoomConfig) -> Result<String, RoomError> {
        let room_id = room.room_id();
        if let Some((_, count)) = self.rooms.iter_mut().find(|(id, _)| *id == room_id) {
            *count += 1;
            return Ok(room_id);
        }

        self.rooms.push((room_id.clone(), 1));
        if self.state.is_connected() {
            if let Err(e) = self.send_control(RoomAction::Join, &room_id) {
                self.rooms.retain(|(id, _)| *id != room_id);
                return Err(e);
            }
        }
        Ok(room_id)
    }

    /// Remove a subscriber from a room. The last one out leaves it if connected.
    pub fn unsubscribe(&mut self, room: &RoomConfig) -> Result<String, RoomError> {
        let room_id = room.room_id();
        let Some(index) = self.rooms.iter().position(|(id, _)| *id == room_id) else {
            return Err(RoomError::new("not subscribed", room_id));
        };

        let count = &mut self.rooms[index].1;
        *count -= 1;
        if *count > 0 {
            return Ok(room_id);
        }

        self.rooms.remove(index);
        if self.state.is_connected() {
            self.send_control(RoomAction::Leave, &room_id)?;
        }
        Ok(room_id)
    }

    fn begin_handshake(&mut self) -> bool {
        if self.handshake_in_flight {
            return false;
        }
        let Some(client_type) = self.client_type.clone() else {
            return false;
        };

        self.epoch += 1;
        self.handshake_in_flight = true;
        let request = HandshakeRequest {
            url: handshake_url(&self.endpoint, &client_type),
            client_type,
            epoch: self.epoch,
        };
        crate::log_info!("Realtime handshake {} to {}", request.epoch, request.url);
        self.transport
            .open(request, EventSink::new(self.epoch, self.events.clone()));
        true
    }

    fn schedule_retry(&mut self, reason: String) {
        match self.policy.next_delay(self.attempt) {
            Some(delay) => {
                self.attempt += 1;
                crate::log_info!(
                    "Realtime reconnect in {}ms (attempt {})",
                    delay.as_millis(),
                    self.attempt
                );
                self.last_error = Some(reason);
                self.scheduled_retry = Some(RetryTicket {
                    delay,
                    epoch: self.epoch,
                });
            }
            None => {
                self.fail(format!(
                    "{reason} (gave up after {} reconnect attempts)",
                    self.attempt
                ));
            }
        }
    }

    fn fail(&mut self, reason: String) {
        crate::log_error!("Realtime connection failed: {}", reason);
        self.scheduled_retry = None;
        self.last_error = Some(reason);
        self.transition(ConnectionState::Error);
    }

    fn rejoin_rooms(&mut self) {
        let room_ids: Vec<String> = self.rooms.iter().map(|(id, _)| id.clone()).collect();
        for room_id in room_ids {
            if let Err(e) = self.send_control(RoomAction::Join, &room_id) {
                crate::log_error!("{}", e);
            }
        }
    }

    fn send_control(&mut self, action: RoomAction, room_id: &str) -> Result<(), RoomError> {
        let text = match action {
            RoomAction::Join => create_subscribe_message(room_id),
            RoomAction::Leave => create_unsubscribe_message(room_id),
        };
        self.transport
            .send(text)
            .map_err(|e| RoomError::new(format!("{action:?} failed: {e}"), room_id))
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            crate::log_info!("Realtime state {} -> {}", self.state, next);
            self.state = next;
        }
    }
}
