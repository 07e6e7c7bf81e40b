//! agentdesk client
//!
//! Realtime session core and permission-aware navigation for the agent
//! dashboard, built on Dioxus for web and desktop.

pub mod config;
pub mod logging;
pub mod navigation;
pub mod realtime;

pub use config::RealtimeConfig;
pub use navigation::{use_permissions_provider, use_visible_nav_items, PermissionsContext};
pub use realtime::{
    use_connection_state, use_realtime, use_room_subscription, ConnectionState, RealtimeBootstrap,
    RealtimeProvider,
};
