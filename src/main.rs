//! FileMitra - pick a file and deliver it to a Telegram chat
//!
//! Main entry point. It initializes:
//! - Configuration ([`ConfigManager`]) from `FileMitra Data/filemitra.yaml` and the environment
//! - Logging (file rotation + console output)
//! - A single-threaded tokio runtime; dialogs and the upload are await points on it
//! - The pipeline ([`UploadController`]) with native dialogs and the Bot API uploader
//! - The console view, which follows state changes until the session is over
//!
//! After each attempt a dialog offers another pick. Closing the picker
//! without choosing ends the session.
//!
//! # Configuration
//!
//! `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` must be set, either in the
//! environment or as `remote.auth_token` / `remote.target_chat_id` in the
//! config file. A template file is written on first run.

use anyhow::{Context, Result};
use filemitra::services::{FileSelector, NativePicker, PermissionGate, TelegramUploader, prompt_for};
use filemitra::ui::{ConsoleView, dialogs};
use filemitra::{
    APP_NAME, AttemptReport, ConfigManager, StateManager, TypeRegistry, UploadController, VERSION,
};
use std::process::ExitCode;
use std::sync::Arc;

const CONFIG_DIR: &str = "FileMitra Data";

fn main() -> Result<ExitCode> {
    let config_manager = ConfigManager::new(CONFIG_DIR)?;
    config_manager.write_template()?;
    let config = config_manager.load_config()?;

    let _guard = filemitra::logging::setup_logging(&config.logging)?;
    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    let reports = runtime.block_on(async move {
        let registry = Arc::new(TypeRegistry::default());
        let state_manager = Arc::new(StateManager::new());

        let view = ConsoleView::new(Arc::clone(&registry));
        print!("{}", view.banner());
        let view_task = tokio::spawn(view.run(state_manager.subscribe()));

        let uploader = TelegramUploader::new(
            Arc::new(config.remote.clone()),
            config.upload.request_timeout(),
        )
        .context("Failed to build HTTP client")?
        .with_chunk_size(config.upload.chunk_size_bytes);

        let controller = UploadController::new(
            Arc::clone(&state_manager),
            Arc::clone(&registry),
            PermissionGate::new(prompt_for(config.permission.mode)),
            FileSelector::new(Arc::new(NativePicker::new(Arc::clone(&registry)))),
            Arc::new(uploader),
            config.upload.max_size_bytes,
        );

        let reports = controller
            .run_attempts(|report| {
                let offer = dialogs::offers_another_pick(report);
                async move { offer && dialogs::ask_pick_another().await }
            })
            .await;

        // Dropping the last StateManager closes the channel and ends the view
        drop(controller);
        drop(state_manager);
        if let Err(e) = view_task.await {
            tracing::warn!("Console view task failed: {}", e);
        }

        anyhow::Ok(reports)
    })?;

    tracing::info!("Session finished: {:?}", reports);

    // The last attempt that got past the picker decides
    let last = reports
        .iter()
        .rev()
        .find(|r| !matches!(r, AttemptReport::Cancelled));

    Ok(match last {
        Some(AttemptReport::Failed(_) | AttemptReport::Busy) => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
