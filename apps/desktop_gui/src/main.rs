use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::{load_settings, HttpAnalysisBackend};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::ui::{DocChatApp, StartupConfig};

#[derive(Parser, Debug)]
#[command(name = "doc-chat-gui", about = "Chat with an analysis service about uploaded PDFs")]
struct Args {
    /// Base URL of the analysis service.
    #[arg(long)]
    server_url: Option<String>,
    /// Per-request timeout in seconds; 0 disables it.
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// Explicit settings file.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut settings =
        load_settings(args.config.as_deref()).context("failed to load doc chat settings")?;
    settings.apply_overrides(args.server_url, args.timeout_secs);
    let backend = HttpAnalysisBackend::from_settings(&settings)
        .context("failed to configure analysis backend client")?;
    let startup = StartupConfig {
        server_url: backend.base_url().to_string(),
    };
    tracing::info!(server_url = %startup.server_url, "starting desktop gui");

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(1024);
    backend_bridge::runtime::launch(Arc::new(backend), cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Document Chat")
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([720.0, 480.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Document Chat",
        options,
        Box::new(move |_cc| Ok(Box::new(DocChatApp::new(cmd_tx, ui_rx, startup)))),
    )
    .map_err(|err| anyhow!("desktop gui exited with error: {err}"))
}
