//! Domain event publishing.
//!
//! Events go to NATS as JSON when a connection is configured. Publishing is
//! best effort: a failure is logged and never fails the request that caused it.

use std::sync::{Arc, Mutex};

use crate::domain::events::DomainEvent;

#[derive(Clone, Default)]
pub struct EventPublisher {
    sink: Sink,
}

#[derive(Clone, Default)]
enum Sink {
    #[default]
    Disabled,
    Nats(async_nats::Client),
    Memory(Arc<Mutex<Vec<DomainEvent>>>),
}

impl EventPublisher {
    pub fn disabled() -> Self {
        Self::default()
    }

    pub async fn connect(url: &str) -> Result<Self, async_nats::ConnectError> {
        let client = async_nats::connect(url).await?;
        tracing::info!(url, "Connected to NATS");
        Ok(Self { sink: Sink::Nats(client) })
    }

    /// Keeps events in memory; the returned handle sees everything published.
    pub fn recording() -> (Self, Arc<Mutex<Vec<DomainEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        (Self { sink: Sink::Memory(events.clone()) }, events)
    }

    pub async fn publish(&self, event: &DomainEvent) {
        match &self.sink {
            Sink::Disabled => {}
            Sink::Memory(events) => {
                if let Ok(mut events) = events.lock() {
                    events.push(event.clone());
                }
            }
            Sink::Nats(client) => {
                let payload = match serde_json::to_vec(event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(error = %e, subject = event.subject(), "Failed to encode event");
                        return;
                    }
                };
                if let Err(e) = client.publish(event.subject().to_string(), payload.into()).await {
                    tracing::warn!(error = %e, subject = event.subject(), "Failed to publish event");
                }
            }
        }
    }
}
