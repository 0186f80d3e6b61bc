mod app_bootstrap;
mod backends;
mod browser;
mod collection;
mod config;
mod config_persistence;
mod console;
mod enrichment;
mod protocol;

use std::path::PathBuf;

use log::{error, info, warn};
use tokio::sync::broadcast;

use app_bootstrap::services::{spawn_background_services, BackgroundServicesConfig};
use collection::collection_store::CollectionStore;
use config::Config;
use console::ConsoleHost;
use protocol::Message;

const LOAD_FAILURE_NOTICE: &str =
    "Error loading vinyl collection data. Please check the console for details.";

fn load_config() -> Config {
    match config_persistence::default_config_path() {
        Some(path) => config_persistence::load_or_create_config(&path),
        None => {
            warn!("No platform config directory found; using default configuration");
            Config::default()
        }
    }
}

/// First CLI argument overrides the configured collection path.
fn collection_path(config: &Config) -> PathBuf {
    std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(&config.collection.path))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut clog = colog::default_builder();
    clog.filter(None, log::LevelFilter::Trace);
    clog.init();
    log::set_max_level(log::LevelFilter::Info);

    std::panic::set_hook(Box::new(|panic_info| {
        let current_thread = std::thread::current();
        let thread_name = current_thread.name().unwrap_or("unnamed");
        log::error!("panic in thread '{}': {}", thread_name, panic_info);
    }));

    let config = load_config();
    log::set_max_level(config.logging.level_filter());

    let path = collection_path(&config);
    let store = match CollectionStore::load_file(&path) {
        Ok(store) => store,
        Err(err) => {
            error!("Error loading data: {}", err);
            println!("{LOAD_FAILURE_NOTICE}");
            CollectionStore::default()
        }
    };

    // Bus for communication between components
    let (bus_sender, _) = broadcast::channel(1024);

    let services = spawn_background_services(BackgroundServicesConfig {
        bus_sender: bus_sender.clone(),
        enrichment: config.enrichment.clone(),
    })?;

    let mut host = ConsoleHost::new(&store, bus_sender.subscribe(), bus_sender.clone());
    let stdin = std::io::stdin();
    let console_result = host.run(stdin.lock(), std::io::stdout().lock());

    info!("Shutting down");
    let _ = bus_sender.send(Message::Shutdown);
    if services.join().is_err() {
        warn!("Enrichment thread did not shut down cleanly");
    }

    console_result?;
    Ok(())
}
