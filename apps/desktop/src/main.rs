use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    load_settings, AnalysisBackend, ConversationController, HttpAnalysisBackend, PdfCandidate,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{parse_line, render_message, ReplCommand, HELP_TEXT};

#[derive(Parser, Debug)]
#[command(
    name = "doc-chat",
    about = "Ask an assistant questions about uploaded PDF documents"
)]
struct Args {
    /// Base URL of the analysis service.
    #[arg(long)]
    server_url: Option<String>,
    /// Per-request timeout in seconds; 0 waits indefinitely.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    /// PDF files to upload before the prompt opens.
    files: Vec<PathBuf>,
}

struct Repl {
    controller: ConversationController<HttpAnalysisBackend>,
    shown: usize,
}

impl Repl {
    fn new(controller: ConversationController<HttpAnalysisBackend>) -> Self {
        Self {
            controller,
            shown: 0,
        }
    }

    /// Prints transcript entries appended since the last call, then any queued alerts.
    fn flush(&mut self) {
        let messages = self.controller.state().messages();
        for message in &messages[self.shown..] {
            println!("{}", render_message(message));
        }
        self.shown = messages.len();

        for alert in self.controller.state_mut().take_alerts() {
            eprintln!("! {}", alert.message);
        }
    }

    fn print_documents(&self) {
        let documents = self.controller.state().documents();
        if documents.is_empty() {
            println!("No document loaded.");
            return;
        }
        for (i, doc) in documents.iter().enumerate() {
            println!("  {}. {} ({} chars)", i + 1, doc.name, doc.text.len());
        }
    }

    async fn print_status(&self) {
        match self.controller.backend().health().await {
            Ok(health) if health.is_ok() => println!("Backend: ok {}", health.message),
            Ok(health) => println!("Backend: {} {}", health.status, health.message),
            Err(err) => println!("Backend: unreachable ({err})"),
        }
        if self.controller.state().combined_context().is_empty() {
            println!("Context: Waiting for file...");
        } else {
            println!(
                "Context: Linked ({} document(s))",
                self.controller.state().documents().len()
            );
        }
    }

    /// Returns `false` when the session should end.
    async fn handle(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::Empty => {}
            ReplCommand::Chat(text) => {
                self.controller.state_mut().set_input(text);
                if self.controller.state().can_submit() {
                    // The user line is already on screen as typed.
                    self.shown += 1;
                    println!("Thinking...");
                    self.controller.submit().await;
                }
            }
            ReplCommand::Upload(paths) => {
                let files = paths.into_iter().map(PdfCandidate::from_path);
                let summary = self.controller.upload_files(files).await;
                if summary.attempted == 0 {
                    println!("No PDF files to upload.");
                }
            }
            ReplCommand::UploadSingle(path) => {
                self.controller
                    .upload_file(PdfCandidate::from_path(path))
                    .await;
            }
            ReplCommand::Remove(n) => {
                if !self.controller.remove_document(n - 1) {
                    println!("No document number {n}.");
                }
                self.print_documents();
            }
            ReplCommand::Docs => self.print_documents(),
            ReplCommand::Status => self.print_status().await,
            ReplCommand::Help => println!("{HELP_TEXT}"),
            ReplCommand::Invalid(reason) => println!("{reason}"),
            ReplCommand::Quit => return false,
        }
        self.flush();
        true
    }
}

fn prompt() -> io::Result<()> {
    let mut stdout = io::stdout();
    write!(stdout, "> ")?;
    stdout.flush()
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();
    let args = Args::parse();

    let mut settings =
        load_settings(args.config.as_deref()).context("failed to load client settings")?;
    settings.apply_overrides(args.server_url, args.timeout_secs);
    let backend =
        HttpAnalysisBackend::from_settings(&settings).context("invalid client settings")?;
    info!(server_url = %backend.base_url(), "doc-chat ready");

    let mut repl = Repl::new(ConversationController::new(backend));
    println!("Upload a PDF, then ask me to summarize it or draft a reply. /help lists commands.");

    if !args.files.is_empty() {
        repl.handle(ReplCommand::Upload(args.files)).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if !repl.handle(parse_line(&line)).await {
            break;
        }
        prompt()?;
    }

    Ok(())
}
