//! Realtime connection for the agent dashboard.
//!
//! ```text
//!   RealtimeProvider ──owns──▶ ConnectionStore ──drives──▶ Transport
//!         │                        ▲                          │
//!         │ context                └──── SessionEvent ────────┘
//!         ▼
//!   RealtimeBootstrap (connects when disconnected)
//!   use_connection_state / use_room_subscription
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! rsx! {
//!     RealtimeProvider { config,
//!         RealtimeBootstrap {}
//!         // Your app here
//!     }
//! }
//!
//! // In a component
//! let state = use_connection_state();
//! let room_error = use_room_subscription(
//!     RoomConfig::new(RoomCategory::Chat).with_sub_category(RoomSubCategory::Agent),
//! );
//! ```

mod bootstrap;
mod hooks;
mod policy;
mod provider;
mod state;
mod store;
mod transport;

pub use bootstrap::{ensure_connected, RealtimeBootstrap};
pub use hooks::{use_connection_state, use_realtime, use_room_subscription};
pub use policy::{ExponentialBackoff, NoReconnect, ReconnectPolicy};
pub use provider::{RealtimeContext, RealtimeProvider};
pub use state::ConnectionState;
pub use store::{ConnectOptions, ConnectionStore, RetryTicket, DEFAULT_CLIENT_TYPE};
pub use transport::{
    handshake_url, platform_transport, EventSink, HandshakeRequest, SessionEvent, Transport,
    TransportError, TransportEvent, WebSocketTransport,
};
