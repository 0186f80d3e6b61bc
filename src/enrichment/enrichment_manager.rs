//! Enrichment runtime component.
//!
//! This manager listens for album selections on the bus, resolves them on its
//! own thread, and publishes results tagged with the originating request id.
//! It never decides whether a result is current; the browser state does.

use log::{debug, info, warn};
use tokio::sync::broadcast::{
    error::{RecvError, TryRecvError},
    Receiver, Sender,
};

use crate::enrichment::enrichment_resolver::EnrichmentResolver;
use crate::protocol::{EnrichmentMessage, EnrichmentResult, EnrichmentTicket, Message};

/// Resolves album selections received over the bus.
pub struct EnrichmentManager {
    bus_consumer: Receiver<Message>,
    bus_producer: Sender<Message>,
    resolver: EnrichmentResolver,
    enabled: bool,
    pending: Option<EnrichmentTicket>,
    shutdown_requested: bool,
}

impl EnrichmentManager {
    /// Creates a new manager bound to one bus receiver/sender pair.
    pub fn new(
        bus_consumer: Receiver<Message>,
        bus_producer: Sender<Message>,
        resolver: EnrichmentResolver,
        enabled: bool,
    ) -> Self {
        Self {
            bus_consumer,
            bus_producer,
            resolver,
            enabled,
            pending: None,
            shutdown_requested: false,
        }
    }

    fn handle_bus_message(&mut self, message: Message) {
        match message {
            Message::Enrichment(EnrichmentMessage::Resolve(ticket)) => {
                if let Some(superseded) = self.pending.replace(ticket) {
                    debug!(
                        "Enrichment request {} superseded before start",
                        superseded.request_id
                    );
                }
            }
            Message::Enrichment(EnrichmentMessage::Resolved { .. }) => {}
            Message::Shutdown => self.shutdown_requested = true,
        }
    }

    fn drain_bus_messages_nonblocking(&mut self) {
        loop {
            match self.bus_consumer.try_recv() {
                Ok(message) => self.handle_bus_message(message),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!(
                        "EnrichmentManager lagged on control bus, skipped {} message(s)",
                        skipped
                    );
                }
                Err(TryRecvError::Closed) => {
                    self.shutdown_requested = true;
                    break;
                }
            }
        }
    }

    fn handle_ticket(&mut self, ticket: EnrichmentTicket) {
        let EnrichmentTicket { request_id, record } = ticket;
        let result = if self.enabled {
            debug!(
                "Enrichment request {} processing for {} / {}",
                request_id, record.artist, record.title
            );
            self.resolver.resolve(&record)
        } else {
            EnrichmentResult::default()
        };
        let _ = self
            .bus_producer
            .send(Message::Enrichment(EnrichmentMessage::Resolved {
                request_id,
                record_id: record.id,
                result,
            }));
    }

    /// Starts the blocking event loop for enrichment requests.
    pub fn run(&mut self) {
        info!("EnrichmentManager started (online lookups enabled: {})", self.enabled);
        loop {
            if self.pending.is_none() && !self.shutdown_requested {
                match self.bus_consumer.blocking_recv() {
                    Ok(message) => self.handle_bus_message(message),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            "EnrichmentManager lagged on control bus, skipped {} message(s)",
                            skipped
                        );
                    }
                    Err(RecvError::Closed) => self.shutdown_requested = true,
                }
            }

            self.drain_bus_messages_nonblocking();

            if let Some(ticket) = self.pending.take() {
                self.handle_ticket(ticket);
                continue;
            }

            if self.shutdown_requested {
                break;
            }
        }
        info!("EnrichmentManager stopped");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::sync::broadcast;

    use super::EnrichmentManager;
    use crate::config::EnrichmentConfig;
    use crate::enrichment::enrichment_resolver::tests::{album, FakeTransport};
    use crate::enrichment::enrichment_resolver::EnrichmentResolver;
    use crate::protocol::{EnrichmentMessage, EnrichmentResult, EnrichmentTicket, Message};

    fn collect_results(
        receiver: &mut broadcast::Receiver<Message>,
    ) -> Vec<(u64, usize, EnrichmentResult)> {
        let mut results = Vec::new();
        while let Ok(message) = receiver.try_recv() {
            if let Message::Enrichment(EnrichmentMessage::Resolved {
                request_id,
                record_id,
                result,
            }) = message
            {
                results.push((request_id, record_id, result));
            }
        }
        results
    }

    fn ticket(request_id: u64, record_id: usize) -> Message {
        let mut record = album(Some("42"));
        record.id = record_id;
        Message::Enrichment(EnrichmentMessage::Resolve(EnrichmentTicket { request_id, record }))
    }

    #[test]
    fn test_queued_requests_collapse_to_newest() {
        let transport = FakeTransport::new(vec![
            (
                "/releases/42",
                Ok(json!({"images": [{"type": "primary", "uri": "https://discogs/42.jpg"}]})),
            ),
            ("list=search", Ok(json!({"query": {"search": []}}))),
        ]);
        let (bus_sender, manager_receiver) = broadcast::channel(16);
        let mut observer = bus_sender.subscribe();
        let resolver = EnrichmentResolver::new(transport.clone(), &EnrichmentConfig::default());
        let mut manager = EnrichmentManager::new(manager_receiver, bus_sender.clone(), resolver, true);

        bus_sender.send(ticket(1, 10)).unwrap();
        bus_sender.send(ticket(2, 11)).unwrap();
        bus_sender.send(Message::Shutdown).unwrap();
        manager.run();

        let results = collect_results(&mut observer);
        assert_eq!(results.len(), 1);
        let (request_id, record_id, result) = &results[0];
        assert_eq!(*request_id, 2);
        assert_eq!(*record_id, 11);
        assert_eq!(result.image_url.as_deref(), Some("https://discogs/42.jpg"));
        assert_eq!(transport.requests.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_disabled_manager_answers_without_lookups() {
        let transport = FakeTransport::new(vec![]);
        let (bus_sender, manager_receiver) = broadcast::channel(16);
        let mut observer = bus_sender.subscribe();
        let resolver = EnrichmentResolver::new(transport.clone(), &EnrichmentConfig::default());
        let mut manager =
            EnrichmentManager::new(manager_receiver, bus_sender.clone(), resolver, false);

        bus_sender.send(ticket(7, 3)).unwrap();
        bus_sender.send(Message::Shutdown).unwrap();
        manager.run();

        let results = collect_results(&mut observer);
        assert_eq!(results, vec![(7, 3, EnrichmentResult::default())]);
        assert!(transport.requests.lock().unwrap().is_empty());
    }
}
