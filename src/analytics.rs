//! Best-effort usage analytics
//!
//! Events are fire-and-forget: recording never blocks the caller and no
//! failure is ever reported back. Without a configured sink every call is a
//! no-op.

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::Config;

const COLLECT_URL: &str = "https://www.google-analytics.com/mp/collect";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsEvent {
    Event {
        category: String,
        action: String,
        label: Option<String>,
        value: Option<i64>,
    },
    PageView {
        path: String,
    },
}

/// Destination for analytics events. Implementations must not block and
/// must swallow their own failures.
pub trait AnalyticsSink: Send + Sync {
    fn record(&self, event: AnalyticsEvent);
}

#[derive(Clone, Default)]
pub struct Analytics {
    sink: Option<Arc<dyn AnalyticsSink>>,
}

impl Analytics {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink: Some(sink) }
    }

    pub fn disabled() -> Self {
        Self { sink: None }
    }

    /// Measurement Protocol analytics when both the measurement id and the
    /// API secret are configured, disabled otherwise.
    pub fn from_config(config: &Config) -> Self {
        match (&config.measurement_id, &config.api_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                tracing::debug!(measurement_id = %id, "analytics enabled");
                Self::new(Arc::new(MeasurementProtocolSink::new(id, secret)))
            }
            _ => {
                tracing::debug!("analytics measurement id not configured; analytics disabled");
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    pub fn track_event(&self, category: &str, action: &str, label: Option<&str>, value: Option<i64>) {
        if let Some(sink) = &self.sink {
            sink.record(AnalyticsEvent::Event {
                category: category.to_string(),
                action: action.to_string(),
                label: label.map(str::to_string),
                value,
            });
        }
    }

    pub fn track_page_view(&self, path: &str) {
        if let Some(sink) = &self.sink {
            sink.record(AnalyticsEvent::PageView {
                path: path.to_string(),
            });
        }
    }
}

#[derive(Debug, Serialize)]
struct CollectPayload {
    client_id: String,
    events: Vec<CollectEvent>,
}

#[derive(Debug, Serialize)]
struct CollectEvent {
    name: String,
    params: Map<String, Value>,
}

/// Sends events to the GA4 Measurement Protocol collect endpoint.
pub struct MeasurementProtocolSink {
    client: Client,
    measurement_id: String,
    api_secret: String,
    client_id: String,
}

impl MeasurementProtocolSink {
    pub fn new(measurement_id: &str, api_secret: &str) -> Self {
        Self {
            client: Client::new(),
            measurement_id: measurement_id.to_string(),
            api_secret: api_secret.to_string(),
            client_id: Uuid::new_v4().to_string(),
        }
    }

    fn payload(&self, event: AnalyticsEvent) -> CollectPayload {
        let event = match event {
            AnalyticsEvent::Event {
                category,
                action,
                label,
                value,
            } => {
                let mut params = Map::new();
                params.insert("event_category".to_string(), json!(category));
                if let Some(label) = label {
                    params.insert("event_label".to_string(), json!(label));
                }
                if let Some(value) = value {
                    params.insert("value".to_string(), json!(value));
                }
                CollectEvent {
                    name: event_name(&action),
                    params,
                }
            }
            AnalyticsEvent::PageView { path } => {
                let mut params = Map::new();
                params.insert("page_path".to_string(), json!(path));
                CollectEvent {
                    name: "page_view".to_string(),
                    params,
                }
            }
        };

        CollectPayload {
            client_id: self.client_id.clone(),
            events: vec![event],
        }
    }
}

impl AnalyticsSink for MeasurementProtocolSink {
    fn record(&self, event: AnalyticsEvent) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no async runtime; dropping analytics event");
            return;
        };

        let payload = self.payload(event);
        let request = self
            .client
            .post(COLLECT_URL)
            .query(&[
                ("measurement_id", self.measurement_id.as_str()),
                ("api_secret", self.api_secret.as_str()),
            ])
            .json(&payload);

        handle.spawn(async move {
            match request.send().await {
                Ok(response) if !response.status().is_success() => {
                    tracing::debug!(status = %response.status(), "analytics collect rejected");
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "analytics collect failed"),
            }
        });
    }
}

/// GA4 event names are limited to letters, digits and underscores.
fn event_name(action: &str) -> String {
    action
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
