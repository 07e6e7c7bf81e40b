use dioxus::prelude::*;

use super::provider::RealtimeContext;
use super::store::{ConnectOptions, ConnectionStore};

/// Make sure a connection is established or under way.
///
/// Safe to call on every state change: it only connects from `Disconnected`.
pub fn ensure_connected(store: &mut ConnectionStore, options: &ConnectOptions) -> bool {
    if store.state().blocks_connect() {
        return false;
    }
    store.connect(options)
}

/// Keeps the realtime session alive for the current client.
///
/// Re-runs whenever the connection state changes and reconnects after a
/// deliberate close. Renders nothing.
#[component]
pub fn RealtimeBootstrap() -> Element {
    let realtime = use_context::<RealtimeContext>();

    use_effect(move || {
        let mut store = realtime.store;
        let state = store.read().state();
        if state.blocks_connect() {
            return;
        }
        crate::log_debug!("RealtimeBootstrap: state is {}, connecting", state);
        ensure_connected(&mut store.write(), &realtime.options);
    });

    rsx! {}
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::realtime::policy::{ExponentialBackoff, NoReconnect};
    use crate::realtime::state::ConnectionState;
    use crate::realtime::store::tests::store_with;
    use crate::realtime::transport::{SessionEvent, TransportEvent};

    #[test]
    fn reconciler_connects_once_per_disconnection() {
        let (mut store, recorded, mut rx) = store_with(Box::new(NoReconnect));
        let options = ConnectOptions::default();

        assert!(ensure_connected(&mut store, &options));
        for _ in 0..3 {
            assert!(!ensure_connected(&mut store, &options));
        }
        assert_eq!(recorded.borrow().opens.len(), 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn reconciler_reconnects_after_disconnect() {
        let (mut store, recorded, _rx) = store_with(Box::new(NoReconnect));
        let options = ConnectOptions::default();
        ensure_connected(&mut store, &options);
        let epoch = recorded.borrow().opens[0].epoch;
        store.handle_event(SessionEvent {
            epoch,
            event: TransportEvent::Opened,
        });
        store.disconnect();
        assert_eq!(store.state(), ConnectionState::Disconnected);

        assert!(ensure_connected(&mut store, &options));
        assert!(!ensure_connected(&mut store, &options));
        assert_eq!(recorded.borrow().opens.len(), 2);
    }

    #[test]
    fn reconciler_does_not_bypass_reconnect_backoff() {
        let (mut store, recorded, _rx) = store_with(Box::new(ExponentialBackoff {
            initial: Duration::from_millis(1000),
            max: Duration::from_millis(1000),
            multiplier: 1.0,
            max_attempts: 2,
        }));
        let options = ConnectOptions::default();
        ensure_connected(&mut store, &options);

        for _ in 0..10 {
            let epoch = recorded.borrow().opens.last().unwrap().epoch;
            store.handle_event(SessionEvent {
                epoch,
                event: TransportEvent::Opened,
            });
            store.handle_event(SessionEvent {
                epoch,
                event: TransportEvent::Dropped("closed by peer (1000)".into()),
            });
            assert!(!ensure_connected(&mut store, &options));
            let ticket = store.take_scheduled_retry().unwrap();
            assert_eq!(ticket.delay, Duration::from_millis(1000));
            assert!(store.retry(ticket));
        }

        assert_eq!(store.state(), ConnectionState::Reconnecting);
        assert_eq!(recorded.borrow().opens.len(), 11);
    }

    #[test]
    fn reconciler_leaves_error_state_alone() {
        let (mut store, recorded, _rx) = store_with(Box::new(NoReconnect));
        let options = ConnectOptions::default();
        ensure_connected(&mut store, &options);
        let epoch = recorded.borrow().opens[0].epoch;
        store.handle_event(SessionEvent {
            epoch,
            event: TransportEvent::Failed("refused".into()),
        });

        assert!(!ensure_connected(&mut store, &options));
        assert_eq!(store.state(), ConnectionState::Error);
    }
}
