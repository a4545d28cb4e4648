//! Command orchestration helpers from UI actions to backend command queue.

use client_core::{BackendError, SessionState};
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext};

/// Queues `cmd` for the backend worker. A command that cannot be queued is resolved
/// locally as failed, so the session never stays awaiting a reply that will not come.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    session: &mut SessionState,
    status: &mut String,
) {
    let cmd_name = cmd.name();

    let (undelivered, reason) = match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            return;
        }
        Err(TrySendError::Full(cmd)) => (cmd, "UI command queue is full; please retry"),
        Err(TrySendError::Disconnected(cmd)) => (
            cmd,
            "Backend command processor disconnected (possible startup/runtime failure); restart the app",
        ),
    };
    let err = UiError::from_message(UiErrorContext::CommandQueue, reason);
    tracing::warn!(command = cmd_name, category = ?err.category(), "failed to queue backend command");
    *status = err.status_text();

    match undelivered {
        BackendCommand::UploadBatch { batch } => {
            for file in batch {
                session.record_upload(&file.file_name, Err(BackendError::Unavailable));
            }
            session.finish_upload_batch();
        }
        BackendCommand::Chat { .. } => session.finish_chat(Err(BackendError::Unavailable)),
        BackendCommand::CheckHealth => {}
    }
}
