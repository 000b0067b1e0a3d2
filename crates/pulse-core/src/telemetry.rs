//! Telemetry collaborator - fire-and-forget analytics events
//!
//! The sink is injected into the classifier, synthesizer, and tracker at
//! construction rather than living in a process-wide global. Emission is
//! best-effort: failures are logged and swallowed, never surfaced to the
//! caller of a core operation.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

/// Open string-keyed property bag attached to telemetry events
///
/// Merge policy: keys set through [`EventProperties::with`] are reserved and
/// are never overwritten by caller-supplied extras merged in later.
#[derive(Debug, Clone, Default, Serialize)]
pub struct EventProperties {
    #[serde(flatten)]
    fields: BTreeMap<String, Value>,
}

impl EventProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a reserved property
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Merge caller-supplied extras without overwriting reserved keys
    pub fn merge_extras(&mut self, extras: &serde_json::Map<String, Value>) {
        for (key, value) in extras {
            self.fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }
}

/// Destination for analytics events
///
/// `open` and `close` bracket the sink's lifecycle; both default to no-ops so
/// trivial sinks only implement `emit`. `emit` must never block or fail the
/// calling operation.
pub trait TelemetrySink: Send + Sync {
    fn open(&self) {}

    fn emit(&self, event: &str, properties: EventProperties);

    fn close(&self) {}
}

/// Sink that drops every event - the default when telemetry is unconfigured
pub struct NoopSink;

impl TelemetrySink for NoopSink {
    fn emit(&self, event: &str, _properties: EventProperties) {
        debug!(event, "Telemetry not configured, dropping event");
    }
}

/// HTTP sink that ships events to an external analytics collector
///
/// Events are posted on a detached tokio task; delivery errors are logged at
/// warn level and otherwise ignored.
pub struct HttpSink {
    endpoint: String,
    api_key: Option<String>,
    session_id: String,
    client: reqwest::Client,
}

impl HttpSink {
    pub fn new(endpoint: String, api_key: Option<String>) -> Self {
        Self {
            endpoint,
            api_key,
            session_id: format!("session-{}", Utc::now().timestamp_millis()),
            client: reqwest::Client::new(),
        }
    }

    /// Create from environment, if configured
    ///
    /// Reads `PULSE_TELEMETRY_URL` (required) and `PULSE_TELEMETRY_KEY`
    /// (optional). Only this collaborator consumes these variables.
    pub fn from_env() -> Option<Self> {
        let endpoint = std::env::var("PULSE_TELEMETRY_URL").ok()?;
        let api_key = std::env::var("PULSE_TELEMETRY_KEY").ok();
        Some(Self::new(endpoint, api_key))
    }
}

impl TelemetrySink for HttpSink {
    fn open(&self) {
        debug!(session = %self.session_id, endpoint = %self.endpoint, "Telemetry session opened");
    }

    fn emit(&self, event: &str, properties: EventProperties) {
        let payload = serde_json::json!({
            "event": event,
            "session_id": self.session_id,
            "timestamp": Utc::now().to_rfc3339(),
            "properties": properties,
        });

        // Emission must never block the core computation, so the post runs on
        // a detached task. Without a runtime the event is dropped.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            debug!(event, "No async runtime, dropping telemetry event");
            return;
        };

        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();
        let event = event.to_string();
        handle.spawn(async move {
            let mut request = client.post(&endpoint).json(&payload);
            if let Some(key) = api_key {
                request = request.bearer_auth(key);
            }
            match request.send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    warn!(event, status = %response.status(), "Telemetry event rejected");
                }
                Err(e) => {
                    warn!(event, error = %e, "Telemetry emission failed");
                }
            }
        });
    }

    fn close(&self) {
        debug!(session = %self.session_id, "Telemetry session closed");
    }
}

/// Build the sink from the environment, falling back to a no-op
pub fn sink_from_env() -> Arc<dyn TelemetrySink> {
    match HttpSink::from_env() {
        Some(sink) => {
            sink.open();
            Arc::new(sink)
        }
        None => Arc::new(NoopSink),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_keys_win() {
        let mut props = EventProperties::new().with("category", "user_metrics");

        let mut extras = serde_json::Map::new();
        extras.insert("category".to_string(), Value::from("spoofed"));
        extras.insert("source".to_string(), Value::from("cli"));
        props.merge_extras(&extras);

        assert_eq!(props.get("category").unwrap(), "user_metrics");
        assert_eq!(props.get("source").unwrap(), "cli");
    }

    #[test]
    fn test_noop_sink_swallows_events() {
        let sink = NoopSink;
        sink.open();
        sink.emit("query_classified", EventProperties::new());
        sink.close();
    }
}
