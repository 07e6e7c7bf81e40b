//! Client configuration from environment variables.
//!
//! Environment variables:
//! - `AGENTDESK_WS_URL`: realtime endpoint (default: `ws://localhost:8080/api/ws`,
//!   or the page origin's `/api/ws` in the browser)
//! - `AGENTDESK_CLIENT_TYPE`: client type tag sent on the handshake (default: `agent`)
//! - `AGENTDESK_RECONNECT_INITIAL_MS`, `AGENTDESK_RECONNECT_MAX_MS`,
//!   `AGENTDESK_RECONNECT_MULTIPLIER`, `AGENTDESK_RECONNECT_MAX_ATTEMPTS`:
//!   exponential backoff. All four must be set to enable reconnects; with none
//!   set the client does not reconnect on its own.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

use crate::realtime::{ExponentialBackoff, NoReconnect, ReconnectPolicy, DEFAULT_CLIENT_TYPE};

pub const ENV_WS_URL: &str = "AGENTDESK_WS_URL";
pub const ENV_CLIENT_TYPE: &str = "AGENTDESK_CLIENT_TYPE";
pub const ENV_RECONNECT_INITIAL_MS: &str = "AGENTDESK_RECONNECT_INITIAL_MS";
pub const ENV_RECONNECT_MAX_MS: &str = "AGENTDESK_RECONNECT_MAX_MS";
pub const ENV_RECONNECT_MULTIPLIER: &str = "AGENTDESK_RECONNECT_MULTIPLIER";
pub const ENV_RECONNECT_MAX_ATTEMPTS: &str = "AGENTDESK_RECONNECT_MAX_ATTEMPTS";

const WS_PATH: &str = "/api/ws";
const LOCAL_WS_URL: &str = "ws://localhost:8080/api/ws";

#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeConfig {
    pub endpoint: Url,
    pub client_type: String,
    pub reconnect: Option<ExponentialBackoff>,
}

impl RealtimeConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let raw_endpoint = lookup(ENV_WS_URL).unwrap_or_else(default_endpoint);
        let endpoint = Url::parse(&raw_endpoint)
            .with_context(|| format!("{ENV_WS_URL} is not a valid URL: {raw_endpoint}"))?;
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            bail!("{ENV_WS_URL} must use ws:// or wss://, got {raw_endpoint}");
        }

        let client_type = lookup(ENV_CLIENT_TYPE)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_CLIENT_TYPE.to_string());

        Ok(Self {
            endpoint,
            client_type,
            reconnect: reconnect_from_lookup(&lookup)?,
        })
    }

    pub fn reconnect_policy(&self) -> Box<dyn ReconnectPolicy> {
        match &self.reconnect {
            Some(backoff) => Box::new(backoff.clone()),
            None => Box::new(NoReconnect),
        }
    }
}

fn reconnect_from_lookup(
    lookup: &impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Option<ExponentialBackoff>> {
    let keys = [
        ENV_RECONNECT_INITIAL_MS,
        ENV_RECONNECT_MAX_MS,
        ENV_RECONNECT_MULTIPLIER,
        ENV_RECONNECT_MAX_ATTEMPTS,
    ];
    let present = keys.iter().filter(|k| lookup(k).is_some()).count();
    if present == 0 {
        return Ok(None);
    }
    if present != keys.len() {
        bail!("reconnect settings are partial; set all of {}", keys.join(", "));
    }

    let initial_ms: u64 = parse(lookup, ENV_RECONNECT_INITIAL_MS)?;
    let max_ms: u64 = parse(lookup, ENV_RECONNECT_MAX_MS)?;
    let multiplier: f64 = parse(lookup, ENV_RECONNECT_MULTIPLIER)?;
    let max_attempts: u32 = parse(lookup, ENV_RECONNECT_MAX_ATTEMPTS)?;

    if !multiplier.is_finite() || multiplier < 1.0 {
        bail!("{ENV_RECONNECT_MULTIPLIER} must be a finite number of at least 1.0, got {multiplier}");
    }
    if max_ms < initial_ms {
        bail!("{ENV_RECONNECT_MAX_MS} ({max_ms}) is below {ENV_RECONNECT_INITIAL_MS} ({initial_ms})");
    }

    Ok(Some(ExponentialBackoff {
        initial: Duration::from_millis(initial_ms),
        max: Duration::from_millis(max_ms),
        multiplier,
        max_attempts,
    }))
}

fn parse<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = lookup(key).with_context(|| format!("{key} is not set"))?;
    raw.trim()
        .parse()
        .with_context(|| format!("{key} has an invalid value: {raw}"))
}

/// Same origin as the page, with the scheme swapped to ws/wss.
#[cfg(target_arch = "wasm32")]
fn default_endpoint() -> String {
    let origin = web_sys::window().and_then(|w| w.location().origin().ok());
    match origin {
        Some(origin) if origin.starts_with("https://") => {
            format!("{}{}", origin.replacen("https://", "wss://", 1), WS_PATH)
        }
        Some(origin) if origin.starts_with("http://") => {
            format!("{}{}", origin.replacen("http://", "ws://", 1), WS_PATH)
        }
        _ => LOCAL_WS_URL.to_string(),
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn default_endpoint() -> String {
    LOCAL_WS_URL.to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = RealtimeConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.endpoint.as_str(), LOCAL_WS_URL);
        assert_eq!(config.client_type, "agent");
        assert!(config.reconnect.is_none());
        assert!(config.reconnect_policy().next_delay(0).is_none());
    }

    #[test]
    fn reads_endpoint_and_client_type() {
        let config = RealtimeConfig::from_lookup(lookup_from(&[
            (ENV_WS_URL, "wss://rt.example.com/ws"),
            (ENV_CLIENT_TYPE, "widget"),
        ]))
        .unwrap();
        assert_eq!(config.endpoint.host_str(), Some("rt.example.com"));
        assert_eq!(config.client_type, "widget");
    }

    #[test]
    fn rejects_http_endpoint() {
        let err = RealtimeConfig::from_lookup(lookup_from(&[(ENV_WS_URL, "http://x.test/ws")]))
            .unwrap_err();
        assert!(err.to_string().contains("ws://"));
    }

    #[test]
    fn full_reconnect_settings_enable_backoff() {
        let config = RealtimeConfig::from_lookup(lookup_from(&[
            (ENV_RECONNECT_INITIAL_MS, "500"),
            (ENV_RECONNECT_MAX_MS, "8000"),
            (ENV_RECONNECT_MULTIPLIER, "2"),
            (ENV_RECONNECT_MAX_ATTEMPTS, "5"),
        ]))
        .unwrap();
        let backoff = config.reconnect.clone().unwrap();
        assert_eq!(backoff.initial, Duration::from_millis(500));
        assert_eq!(backoff.max_attempts, 5);
        assert_eq!(
            config.reconnect_policy().next_delay(1),
            Some(Duration::from_millis(1000))
        );
    }

    #[test]
    fn partial_reconnect_settings_are_rejected() {
        let err = RealtimeConfig::from_lookup(lookup_from(&[(ENV_RECONNECT_INITIAL_MS, "500")]))
            .unwrap_err();
        assert!(err.to_string().contains("partial"));
    }

    #[test]
    fn invalid_number_names_the_key() {
        let err = RealtimeConfig::from_lookup(lookup_from(&[
            (ENV_RECONNECT_INITIAL_MS, "soon"),
            (ENV_RECONNECT_MAX_MS, "8000"),
            (ENV_RECONNECT_MULTIPLIER, "2"),
            (ENV_RECONNECT_MAX_ATTEMPTS, "5"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(ENV_RECONNECT_INITIAL_MS));
    }

    #[test]
    fn non_finite_multiplier_is_rejected() {
        for raw in ["NaN", "inf"] {
            let err = RealtimeConfig::from_lookup(lookup_from(&[
                (ENV_RECONNECT_INITIAL_MS, "500"),
                (ENV_RECONNECT_MAX_MS, "8000"),
                (ENV_RECONNECT_MULTIPLIER, raw),
                (ENV_RECONNECT_MAX_ATTEMPTS, "5"),
            ]))
            .unwrap_err();
            assert!(err.to_string().contains(ENV_RECONNECT_MULTIPLIER), "{raw}");
        }
    }
}
