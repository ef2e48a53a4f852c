pub mod calibration;
pub mod config;
pub mod controller;
pub mod mapping;
pub mod overlay;
pub mod persistence;
pub mod ui;
pub mod visualization;

use crate::config::OverlayConfig;
use crate::controller::{GilrsSource, SourceError};
use crate::mapping::MappingStore;
use crate::overlay::OverlayController;
use crate::persistence::{FileStore, KeyValueStore, MemoryStore};
use crate::ui::OverlayApp;
use color_eyre::{
    eyre::{eyre, Report},
    Result,
};
use eframe::egui;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

const RESET_ENV: &str = "BONGOCAT_RESET";
const RESET_FLAG: &str = "--reset";

fn main() -> Result<()> {
    let config_path = OverlayConfig::default_path();
    let config = OverlayConfig::load_or_create(&config_path);

    let level = config
        .as_ref()
        .map(|config| config.logging.max_level())
        .unwrap_or(Level::INFO);
    setup(level)?;

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default config: {}", e);
            OverlayConfig::default()
        }
    };

    let mut store = MappingStore::new(open_backend(&config));
    if reset_requested() {
        info!("Reset requested, clearing stored calibration and background colour");
        store
            .clear_all()
            .map_err(|e| eyre!("Failed to reset storage: {}", e))?;
    }

    let source = GilrsSource::create()
        .map_err(source_error_report)?
        .initialize();

    let controller = OverlayController::new(store, config.input.clone(), config.health.clone());

    info!("Starting overlay UI");
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = egui::ViewportBuilder::default()
        .with_title("Hitbox Bongo Cat")
        .with_inner_size([config.ui.window_width, config.ui.window_height]);

    eframe::run_native(
        "Hitbox Bongo Cat",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(OverlayApp::new(
                cc,
                controller,
                Box::new(source),
                &config.ui,
            )))
        }),
    )
    .map_err(|e| eyre!("UI terminated with error: {}", e))
}

fn setup(level: Level) -> Result<()> {
    if std::env::var("RUST_LIB_BACKTRACE").is_err() {
        std::env::set_var("RUST_LIB_BACKTRACE", "0")
    }
    color_eyre::install()?;
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    setup_logging_env(level);
    Ok(())
}

fn setup_logging_env(level: Level) {
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .pretty()
        .init();
}

/// File-backed storage, or an in-memory one if the file can't be used
fn open_backend(config: &OverlayConfig) -> Box<dyn KeyValueStore> {
    match FileStore::open(&config.storage.path) {
        Ok(store) => {
            info!("Storage at {}", store.path().display());
            Box::new(store)
        }
        Err(e) => {
            error!("Failed to open storage, calibration won't persist: {}", e);
            Box::new(MemoryStore::new())
        }
    }
}

fn source_error_report(e: SourceError) -> Report {
    match e {
        SourceError::Unsupported(reason) => {
            eyre!("Gamepad API unsupported on this platform: {}", reason)
        }
        other => eyre!("{}", other),
    }
}

fn reset_requested() -> bool {
    std::env::var(RESET_ENV).is_ok_and(|value| value == "1")
        || std::env::args().skip(1).any(|arg| arg == RESET_FLAG)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_gamepad_api_is_reported_as_such() {
        let report = source_error_report(SourceError::Unsupported("no backend".to_string()));
        assert_eq!(
            report.to_string(),
            "Gamepad API unsupported on this platform: no backend"
        );

        let report =
            source_error_report(SourceError::InitializationError("udev failed".to_string()));
        assert_eq!(
            report.to_string(),
            "Failed to initialize gamepad source: udev failed"
        );
    }
}
