//! Backend worker: owns the tokio runtime and executes queued commands strictly in order.

use std::{sync::Arc, thread};

use client_core::{upload_one, AnalysisBackend};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(
    backend: Arc<dyn AnalysisBackend>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let _ = ui_tx.send(UiEvent::Info("Backend worker ready".to_string()));
            while let Ok(cmd) = cmd_rx.recv() {
                if !run_command(backend.as_ref(), cmd, &ui_tx).await {
                    break;
                }
            }
            tracing::debug!("backend worker stopping");
        });
    });
}

/// Executes one command. Returns `false` once the UI side has gone away.
pub async fn run_command(
    backend: &dyn AnalysisBackend,
    cmd: BackendCommand,
    ui_tx: &Sender<UiEvent>,
) -> bool {
    let cmd_name = cmd.name();
    tracing::debug!(command = cmd_name, "running backend command");

    match cmd {
        BackendCommand::UploadBatch { batch } => {
            tracing::debug!(files = batch.files().len(), "uploading batch");
            for file in batch {
                let outcome = upload_one(backend, &file).await;
                let event = UiEvent::UploadResolved {
                    file_name: file.file_name,
                    outcome,
                };
                if ui_tx.send(event).is_err() {
                    return false;
                }
            }
            ui_tx.send(UiEvent::UploadBatchFinished).is_ok()
        }
        BackendCommand::Chat { request } => {
            let outcome = backend.chat(&request).await.map(|response| response.reply);
            ui_tx.send(UiEvent::ChatResolved(outcome)).is_ok()
        }
        BackendCommand::CheckHealth => {
            let event = match backend.health().await {
                Ok(health) => UiEvent::Health(health),
                Err(err) => UiEvent::Error(UiError::from_message(
                    UiErrorContext::Health,
                    err.to_string(),
                )),
            };
            ui_tx.send(event).is_ok()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use async_trait::async_trait;
    use client_core::{BackendError, PdfCandidate, SessionState};
    use crossbeam_channel::unbounded;
    use shared::protocol::{ChatRequest, ChatResponse, HealthResponse, UploadPdfResponse};

    /// Records upload order; uploads named `fail*.pdf` are rejected.
    #[derive(Default)]
    struct Recorder {
        uploads: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl AnalysisBackend for Recorder {
        async fn upload_pdf(
            &self,
            file_name: &str,
            _bytes: Vec<u8>,
        ) -> Result<UploadPdfResponse, BackendError> {
            self.uploads
                .lock()
                .expect("lock")
                .push(file_name.to_string());
            if file_name.starts_with("fail") {
                return Err(BackendError::Unavailable);
            }
            Ok(UploadPdfResponse {
                filename: file_name.to_string(),
                text: format!("text:{file_name}"),
                warning: None,
            })
        }

        async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, BackendError> {
            Ok(ChatResponse {
                reply: format!("{} turns", request.messages.len()),
            })
        }

        async fn health(&self) -> Result<HealthResponse, BackendError> {
            Err(BackendError::Unavailable)
        }
    }

    fn pdf(name: &str) -> PdfCandidate {
        PdfCandidate::from_bytes(name, Some("application/pdf".into()), b"%PDF".to_vec())
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .build()
            .expect("runtime")
    }

    #[test]
    fn upload_batch_reports_each_file_then_finishes() {
        let backend = Recorder::default();
        let mut session = SessionState::new();
        let batch = session
            .begin_upload_batch(vec![pdf("a.pdf"), pdf("fail.pdf"), pdf("c.pdf")])
            .expect("batch");
        let (ui_tx, ui_rx) = unbounded();

        assert!(runtime().block_on(run_command(
            &backend,
            BackendCommand::UploadBatch { batch },
            &ui_tx
        )));

        let events: Vec<_> = ui_rx.try_iter().collect();
        assert_eq!(events.len(), 4);
        let resolved: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                UiEvent::UploadResolved { file_name, outcome } => {
                    Some((file_name.as_str(), outcome.is_ok()))
                }
                _ => None,
            })
            .collect();
        assert_eq!(
            resolved,
            vec![("a.pdf", true), ("fail.pdf", false), ("c.pdf", true)]
        );
        assert!(matches!(events.last(), Some(UiEvent::UploadBatchFinished)));
        assert_eq!(
            *backend.uploads.lock().expect("lock"),
            vec!["a.pdf", "fail.pdf", "c.pdf"]
        );
    }

    #[test]
    fn chat_and_health_resolve_into_events() {
        let backend = Recorder::default();
        let mut session = SessionState::new();
        session.set_input("hello");
        let request = session.begin_chat().expect("turn");
        let (ui_tx, ui_rx) = unbounded();

        runtime().block_on(async {
            run_command(&backend, BackendCommand::Chat { request }, &ui_tx).await;
            run_command(&backend, BackendCommand::CheckHealth, &ui_tx).await;
        });

        let events: Vec<_> = ui_rx.try_iter().collect();
        assert!(matches!(&events[0], UiEvent::ChatResolved(Ok(reply)) if reply == "1 turns"));
        assert!(
            matches!(&events[1], UiEvent::Error(err) if err.context() == UiErrorContext::Health)
        );
    }

    #[test]
    fn stops_when_ui_receiver_is_gone() {
        let backend = Recorder::default();
        let (ui_tx, ui_rx) = unbounded();
        drop(ui_rx);

        assert!(!runtime().block_on(run_command(&backend, BackendCommand::CheckHealth, &ui_tx)));
    }
}
