//! Binary entry point: resolve configuration, open the data directory, start
//! file logging, and drive the Ratatui event loop until the user exits.
use library_catalog_manager::{logging, run_app, App, Config, Store};
use tracing::info;

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    let store = Store::open(&config.data_dir)?;
    logging::init(&config)?;
    info!(data_dir = %store.data_dir().display(), "library system started");

    let mut app = App::new(store);
    run_app(&mut app)
}
