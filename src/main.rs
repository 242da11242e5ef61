use eframe::egui;
use fee_calc::config;
use fee_calc::errors::Result;
use fee_calc::store::RecordStore;
use fee_calc::ui::{self, FeeCalcApp};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenvy::dotenv().ok();

    let config = config::load_app_configuration();

    let store = RecordStore::open(&config.database_path)
        .inspect(|_| info!("Record store ready at {:?}", config.database_path))
        .or_else(|e| {
            error!("Failed to open {:?}: {}; records will not persist", config.database_path, e);
            RecordStore::open_in_memory()
        })?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([860.0, 520.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Listing Fee Calculator",
        options,
        Box::new(|cc| {
            ui::set_custom_style(&cc.egui_ctx);
            Ok(Box::new(FeeCalcApp::new(config, store)))
        }),
    )?;

    Ok(())
}
