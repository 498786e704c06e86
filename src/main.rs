//! Binary entry point: resolve the data directory, read the optional config,
//! start logging, seed an in-memory binder, and run the Ratatui event loop
//! until the user exits. Files exported for viewing are removed on the way
//! out.
use trip_binder::{logging, run_app, App, BinderStore, Config, ContentRegistry, Paths};

fn main() -> anyhow::Result<()> {
    let paths = Paths::resolve()?;
    paths.ensure()?;
    paths.clear_viewing_dir()?;
    let config = Config::load(&paths.config_file)?;
    logging::init(&paths.log_file, &config.log_level)?;

    let registry = ContentRegistry::open_in_memory()?;
    let store = BinderStore::seeded(registry, config.starter_items())?;
    tracing::info!(items = store.len(), "starting trip binder");

    let mut app = App::new(store, config.subtitle, paths.viewing_dir.clone());
    let result = run_app(&mut app);
    if let Err(err) = paths.clear_viewing_dir() {
        tracing::warn!(error = %err, "could not clear viewing folder");
    }
    result
}
