//! Owns the connection store for the lifetime of the app and hands it to
//! components through context.

use std::time::Duration;

use agentdesk_shared::{RoomConfig, RoomError};
use dioxus::prelude::*;
use futures_channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures_util::StreamExt;

use super::state::ConnectionState;
use super::store::{ConnectOptions, ConnectionStore};
use super::transport::{platform_transport, SessionEvent};
use crate::config::RealtimeConfig;

/// Realtime context provided to the app.
#[derive(Clone)]
pub struct RealtimeContext {
    pub store: Signal<ConnectionStore>,
    pub options: ConnectOptions,
}

impl RealtimeContext {
    /// Current state. Reading subscribes the calling scope.
    pub fn state(&self) -> ConnectionState {
        self.store.read().state()
    }

    pub fn last_error(&self) -> Option<String> {
        self.store.read().last_error().map(str::to_string)
    }

    pub fn connect(&mut self) -> bool {
        let options = self.options.clone();
        self.store.write().connect(&options)
    }

    pub fn disconnect(&mut self) {
        self.store.write().disconnect();
    }

    pub fn subscribe(&mut self, room: &RoomConfig) -> Result<String, RoomError> {
        self.store.write().subscribe(room)
    }

    pub fn unsubscribe(&mut self, room: &RoomConfig) -> Result<String, RoomError> {
        self.store.write().unsubscribe(room)
    }
}

/// Creates the store, pumps transport events into it and closes the
/// connection when unmounted.
#[component]
pub fn RealtimeProvider(
    config: RealtimeConfig,
    on_message: Option<EventHandler<String>>,
    children: Element,
) -> Element {
    let options = ConnectOptions::new(config.client_type.clone());

    use_realtime_provider(options, on_message, move |events| {
        ConnectionStore::new(
            config.endpoint.clone(),
            platform_transport(),
            config.reconnect_policy(),
            events,
        )
    });

    children
}

/// Body of [`RealtimeProvider`], with the store construction left to the caller.
pub(crate) fn use_realtime_provider(
    options: ConnectOptions,
    on_message: Option<EventHandler<String>>,
    make_store: impl FnOnce(UnboundedSender<SessionEvent>) -> ConnectionStore,
) -> RealtimeContext {
    let mut store = use_hook(move || {
        let (sender, receiver) = unbounded();
        let store = Signal::new(make_store(sender));
        spawn(pump_events(store, receiver, on_message));
        store
    });

    let context = use_context_provider(|| RealtimeContext { store, options });

    use_drop(move || {
        if let Ok(mut store) = store.try_write() {
            store.disconnect();
        }
    });

    context
}

/// Apply transport events in arrival order, forward messages and arm retry
/// timers. Handlers run after the store borrow is released.
async fn pump_events(
    mut store: Signal<ConnectionStore>,
    mut events: UnboundedReceiver<SessionEvent>,
    on_message: Option<EventHandler<String>>,
) {
    while let Some(event) = events.next().await {
        let (message, ticket) = {
            let mut store = store.write();
            let message = store.handle_event(event);
            (message, store.take_scheduled_retry())
        };

        if let (Some(text), Some(handler)) = (message, on_message) {
            handler.call(text);
        }

        if let Some(ticket) = ticket {
            spawn(async move {
                sleep(ticket.delay).await;
                store.write().retry(ticket);
            });
        }
    }
}

#[cfg(target_arch = "wasm32")]
async fn sleep(delay: Duration) {
    gloo_timers::future::sleep(delay).await;
}

#[cfg(not(target_arch = "wasm32"))]
async fn sleep(delay: Duration) {
    tokio::time::sleep(delay).await;
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use agentdesk_shared::{RoomCategory, RoomSubCategory};

    use super::*;
    use crate::realtime::bootstrap::RealtimeBootstrap;
    use crate::realtime::hooks::use_room_subscription;
    use crate::realtime::policy::NoReconnect;
    use crate::realtime::store::tests::{fake_store, Recorded};
    use crate::realtime::transport::TransportEvent;

    /// Shared between the test body and the mounted app.
    #[derive(Clone, Default)]
    struct Rig {
        recorded: Rc<RefCell<Recorded>>,
        context: Rc<RefCell<Option<RealtimeContext>>>,
    }

    fn rig_app(rig: Rig) -> Element {
        let recorded = rig.recorded.clone();
        let context = use_realtime_provider(ConnectOptions::default(), None, move |events| {
            fake_store(recorded, Box::new(NoReconnect), events)
        });
        rig.context.borrow_mut().replace(context);

        rsx! {
            RealtimeBootstrap {}
            AgentRoom {}
        }
    }

    #[component]
    fn AgentRoom() -> Element {
        use_room_subscription(
            RoomConfig::new(RoomCategory::Chat).with_sub_category(RoomSubCategory::Agent),
        );
        rsx! {}
    }

    /// Let effects, the event pump and re-renders run until the dom goes idle.
    async fn settle(dom: &mut VirtualDom) {
        loop {
            tokio::select! {
                _ = dom.wait_for_work() => {
                    dom.render_immediate_to_vec();
                }
                _ = tokio::time::sleep(Duration::from_millis(50)) => return,
            }
        }
    }

    fn mount() -> (VirtualDom, Rig) {
        let rig = Rig::default();
        let mut dom = VirtualDom::new_with_props(rig_app, rig.clone());
        dom.rebuild_in_place();
        (dom, rig)
    }

    #[tokio::test]
    async fn bootstrap_connects_once_and_again_after_disconnect() {
        let (mut dom, rig) = mount();
        settle(&mut dom).await;
        assert_eq!(rig.recorded.borrow().opens.len(), 1);

        rig.recorded.borrow().emit(TransportEvent::Opened);
        settle(&mut dom).await;
        assert_eq!(rig.recorded.borrow().opens.len(), 1);

        let mut context = rig.context.borrow().clone().unwrap();
        dom.in_scope(ScopeId::APP, || {
            assert_eq!(context.state(), ConnectionState::Connected);
            context.disconnect();
        });
        settle(&mut dom).await;

        assert_eq!(rig.recorded.borrow().opens.len(), 2);
        dom.in_scope(ScopeId::APP, || {
            assert_eq!(context.state(), ConnectionState::Connecting)
        });
    }

    #[tokio::test]
    async fn room_is_joined_on_open_and_left_on_unmount() {
        let (mut dom, rig) = mount();
        settle(&mut dom).await;
        assert!(rig.recorded.borrow().sent.is_empty());

        rig.recorded.borrow().emit(TransportEvent::Opened);
        settle(&mut dom).await;
        assert_eq!(
            rig.recorded.borrow().sent,
            [agentdesk_shared::create_subscribe_message("chat:agent")]
        );

        drop(dom);

        let recorded = rig.recorded.borrow();
        assert_eq!(
            recorded.sent,
            [
                agentdesk_shared::create_subscribe_message("chat:agent"),
                agentdesk_shared::create_unsubscribe_message("chat:agent"),
            ]
        );
        assert_eq!(recorded.closes, 1);
    }
}
