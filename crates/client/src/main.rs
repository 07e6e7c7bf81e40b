//! agentdesk client - Main entry point
//!
//! Supports both web (WASM) and desktop platforms.

#![allow(non_snake_case)]

use agentdesk_client::{
    log_error, logging, use_connection_state, use_permissions_provider, use_realtime,
    use_visible_nav_items, ConnectionState, RealtimeBootstrap, RealtimeConfig, RealtimeProvider,
};
use agentdesk_shared::NavItem;
use dioxus::prelude::*;

fn main() {
    logging::init();
    dioxus::launch(App);
}

fn sidebar_items() -> Vec<NavItem> {
    vec![
        NavItem::new("/agents", "Agents"),
        NavItem::new("/campaigns", "Campaigns"),
        NavItem::new("/analytics", "Analytics"),
        NavItem::new("/billing", "Billing"),
        NavItem::new("/audit-logs", "Audit logs"),
        NavItem::new("/manage", "Manage"),
    ]
}

#[component]
fn App() -> Element {
    // Filled in by the auth layer once the user's permissions are known
    use_permissions_provider(None);

    let config = use_hook(|| RealtimeConfig::from_env().map_err(|e| format!("{e:#}")));

    match config {
        Ok(config) => rsx! {
            RealtimeProvider { config,
                RealtimeBootstrap {}
                ConnectionBadge {}
                SidebarNav {}
            }
        },
        Err(reason) => {
            log_error!("Invalid realtime configuration: {}", reason);
            rsx! {
                div { "Invalid realtime configuration: {reason}" }
            }
        }
    }
}

#[component]
fn ConnectionBadge() -> Element {
    let mut realtime = use_realtime();
    let state = use_connection_state();
    let last_error = realtime.last_error();
    let class = if state.is_connecting() {
        "connection-state pending"
    } else {
        "connection-state"
    };

    rsx! {
        span { class, "Realtime: {state}" }
        if state == ConnectionState::Error {
            if let Some(reason) = last_error {
                span { class: "connection-error", "{reason}" }
            }
            button {
                onclick: move |_| {
                    realtime.disconnect();
                    realtime.connect();
                },
                "Retry"
            }
        }
    }
}

#[component]
fn SidebarNav() -> Element {
    let items = use_visible_nav_items(sidebar_items());
    rsx! {
        nav {
            for item in items.read().iter() {
                a { key: "{item.url}", href: "{item.url}", "{item.title}" }
            }
        }
    }
}
