//! Realtime hooks for Dioxus components.

use agentdesk_shared::{RoomConfig, RoomError};
use dioxus::prelude::*;

use super::provider::RealtimeContext;
use super::state::ConnectionState;

/// The realtime context provided by `RealtimeProvider`.
pub fn use_realtime() -> RealtimeContext {
    use_context::<RealtimeContext>()
}

/// Current connection state (reactive).
pub fn use_connection_state() -> ConnectionState {
    use_realtime().state()
}

/// Join a room for as long as the calling component is mounted.
///
/// # Returns
/// A signal holding the error if the subscribe or a later unsubscribe failed.
pub fn use_room_subscription(room: RoomConfig) -> Signal<Option<RoomError>> {
    let mut realtime = use_realtime();
    let mut error = use_signal(|| None::<RoomError>);

    let room_for_drop = room.clone();
    let mut store = realtime.store;

    // Writes only, so this runs once after the first render
    use_effect(move || {
        if let Err(e) = realtime.subscribe(&room) {
            crate::log_warn!("{}", e);
            error.set(Some(e));
        }
    });

    use_drop(move || {
        if let Ok(mut store) = store.try_write() {
            if let Err(e) = store.unsubscribe(&room_for_drop) {
                crate::log_warn!("{}", e);
            }
        }
    });

    error
}
