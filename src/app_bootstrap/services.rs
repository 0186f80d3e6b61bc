use std::{any::Any, sync::Arc, thread};

use tokio::sync::broadcast;

use crate::{
    backends::http::HttpLookupTransport,
    config::EnrichmentConfig,
    enrichment::{enrichment_manager::EnrichmentManager, enrichment_resolver::EnrichmentResolver},
    protocol::Message,
};

pub struct BackgroundServicesConfig {
    pub bus_sender: broadcast::Sender<Message>,
    pub enrichment: EnrichmentConfig,
}

fn panic_payload_to_string(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        return (*s).to_string();
    }
    if let Some(s) = payload.downcast_ref::<String>() {
        return s.clone();
    }
    "non-string panic payload".to_string()
}

/// Spawns the enrichment service thread. The returned handle finishes after a
/// `Message::Shutdown` is published or the bus closes.
pub fn spawn_background_services(
    config: BackgroundServicesConfig,
) -> std::io::Result<thread::JoinHandle<()>> {
    let BackgroundServicesConfig {
        bus_sender,
        enrichment,
    } = config;

    let enrichment_manager_bus_receiver = bus_sender.subscribe();
    let enrichment_manager_bus_sender = bus_sender.clone();
    thread::Builder::new()
        .name("enrichment".to_string())
        .spawn(move || {
            let run_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                let transport = Arc::new(HttpLookupTransport::new(&enrichment.user_agent));
                let resolver = EnrichmentResolver::new(transport, &enrichment);
                let mut enrichment_manager = EnrichmentManager::new(
                    enrichment_manager_bus_receiver,
                    enrichment_manager_bus_sender,
                    resolver,
                    enrichment.enabled,
                );
                enrichment_manager.run();
            }));
            if let Err(payload) = run_result {
                log::error!(
                    "EnrichmentManager thread terminated due to panic: {}",
                    panic_payload_to_string(payload.as_ref())
                );
            }
        })
}
