//! Shared types and utilities for the agentdesk client and its realtime peers.

pub mod error;
pub mod navigation;
pub mod protocol;
pub mod room;

pub use error::*;
pub use navigation::*;
pub use protocol::*;
pub use room::*;
