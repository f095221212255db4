// Server configuration loaded from environment variables.
// Decision: Every setting has a default so `cargo run` works with an empty environment
// Decision: No DATABASE_URL means in-memory dev mode

use eventhub_core::EventState;
use std::time::Duration;

use crate::storage::backend::DEFAULT_CALL_TIMEOUT;

/// What cancelling a registration does to the event it claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CancellationPolicy {
    /// Delete the registration only; the event stays unavailable
    #[default]
    LeaveClaimed,
    /// Delete the registration and mark the event available again
    ReopenEvent,
}

impl CancellationPolicy {
    /// State the event is left in once its registration is gone
    pub fn state_after_cancel(self) -> EventState {
        match self {
            CancellationPolicy::LeaveClaimed => EventState::Claimed,
            CancellationPolicy::ReopenEvent => EventState::Open,
        }
    }

    pub fn reopens_event(self) -> bool {
        self.state_after_cancel().is_available()
    }
}

impl std::str::FromStr for CancellationPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leave-claimed" => Ok(CancellationPolicy::LeaveClaimed),
            "reopen-event" => Ok(CancellationPolicy::ReopenEvent),
            other => Err(format!("unknown cancellation policy: {other}")),
        }
    }
}

impl std::fmt::Display for CancellationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationPolicy::LeaveClaimed => write!(f, "leave-claimed"),
            CancellationPolicy::ReopenEvent => write!(f, "reopen-event"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Listen address for the HTTP server
    pub http_addr: String,
    /// Prefix for all API routes, e.g. "/api"
    pub api_prefix: String,
    /// Origins allowed by CORS. Empty means same-origin only.
    pub cors_origins: Vec<String>,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    /// Deadline applied to every store call
    pub store_call_timeout: Duration,
    pub cancel_policy: CancellationPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: "0.0.0.0:3000".to_string(),
            api_prefix: String::new(),
            cors_origins: Vec::new(),
            database_url: None,
            database_max_connections: 10,
            store_call_timeout: DEFAULT_CALL_TIMEOUT,
            cancel_policy: CancellationPolicy::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let http_addr = var("HTTP_ADDR")
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.http_addr);

        let api_prefix = var("API_PREFIX").unwrap_or_default();

        // Example: CORS_ALLOWED_ORIGINS="https://app.example.com,https://admin.example.com"
        let cors_origins = var("CORS_ALLOWED_ORIGINS")
            .map(|s| {
                s.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let database_url = var("DATABASE_URL").filter(|s| !s.is_empty());

        let database_max_connections = var("DATABASE_MAX_CONNECTIONS")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.database_max_connections);

        let store_call_timeout = var("STORE_CALL_TIMEOUT_MS")
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.store_call_timeout);

        let cancel_policy = match var("REGISTRATION_CANCEL_POLICY") {
            Some(raw) => raw.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {}", e, CancellationPolicy::default());
                CancellationPolicy::default()
            }),
            None => CancellationPolicy::default(),
        };

        Self {
            http_addr,
            api_prefix,
            cors_origins,
            database_url,
            database_max_connections,
            store_call_timeout,
            cancel_policy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.http_addr, "0.0.0.0:3000");
        assert!(config.api_prefix.is_empty());
        assert!(config.cors_origins.is_empty());
        assert!(config.database_url.is_none());
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.store_call_timeout, Duration::from_millis(5000));
        assert_eq!(config.cancel_policy, CancellationPolicy::LeaveClaimed);
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("HTTP_ADDR", "127.0.0.1:8080"),
            ("API_PREFIX", "/api"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
            ("DATABASE_URL", "postgres://localhost/eventhub"),
            ("STORE_CALL_TIMEOUT_MS", "250"),
            ("REGISTRATION_CANCEL_POLICY", "reopen-event"),
        ]);
        assert_eq!(config.http_addr, "127.0.0.1:8080");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.database_url.is_some());
        assert_eq!(config.store_call_timeout, Duration::from_millis(250));
        assert!(config.cancel_policy.reopens_event());
    }

    #[test]
    fn test_empty_database_url_means_dev_mode() {
        let config = config_from(&[("DATABASE_URL", "")]);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_cancel_policy_parsing() {
        assert_eq!(
            "LEAVE-CLAIMED".parse::<CancellationPolicy>(),
            Ok(CancellationPolicy::LeaveClaimed)
        );
        assert_eq!(
            "reopen-event".parse::<CancellationPolicy>(),
            Ok(CancellationPolicy::ReopenEvent)
        );
        assert!("sometimes".parse::<CancellationPolicy>().is_err());

        let config = config_from(&[("REGISTRATION_CANCEL_POLICY", "sometimes")]);
        assert_eq!(config.cancel_policy, CancellationPolicy::LeaveClaimed);
    }

    #[test]
    fn test_state_after_cancel() {
        assert_eq!(
            CancellationPolicy::LeaveClaimed.state_after_cancel(),
            EventState::Claimed
        );
        assert_eq!(
            CancellationPolicy::ReopenEvent.state_after_cancel(),
            EventState::Open
        );
        assert!(!CancellationPolicy::LeaveClaimed.reopens_event());
    }
}
