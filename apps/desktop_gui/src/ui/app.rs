use std::{collections::VecDeque, sync::Arc, time::Duration};

use client_core::{Alert, PdfCandidate, SessionState, UploadBatch};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use egui::RichText;
use shared::domain::{Message, Role};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::{apply_ui_event, BackendHealth, StatusState};

const EMPTY_TRANSCRIPT_HINT: &str =
    "Upload a PDF, then ask me to summarize it or draft a reply.";
const SYSTEM_TEXT: egui::Color32 = egui::Color32::from_rgb(140, 150, 170);
const LINKED_TEXT: egui::Color32 = egui::Color32::from_rgb(90, 170, 110);
const BUSY_STATUS: &str = "Still working on the previous request; try the upload again when it finishes.";
const ALERT_OPEN_STATUS: &str = "Dismiss the alert before dropping more files.";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub server_url: String,
}

pub struct DocChatApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    session: SessionState,
    status: StatusState,
    alerts: VecDeque<Alert>,
    startup: StartupConfig,
}

impl DocChatApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
    ) -> Self {
        let mut app = Self {
            cmd_tx,
            ui_rx,
            session: SessionState::new(),
            status: StatusState::default(),
            alerts: VecDeque::new(),
            startup,
        };
        app.dispatch(BackendCommand::CheckHealth);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(
            &self.cmd_tx,
            cmd,
            &mut self.session,
            &mut self.status.status,
        );
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            apply_ui_event(&mut self.session, &mut self.status, event);
        }
        self.alerts.extend(self.session.take_alerts());
    }

    fn try_send_current_input(&mut self) {
        if let Some(request) = self.session.begin_chat() {
            self.dispatch(BackendCommand::Chat { request });
        }
    }

    fn upload_single(&mut self, file: PdfCandidate) {
        let batch = self.session.begin_single_upload(file);
        self.dispatch_upload(batch);
    }

    fn upload_many(&mut self, files: Vec<PdfCandidate>) {
        let has_pdf = files.iter().any(PdfCandidate::is_pdf);
        if has_pdf && self.session.is_awaiting() {
            self.status.status = BUSY_STATUS.to_string();
            return;
        }
        let batch = self.session.begin_upload_batch(files);
        self.dispatch_upload(batch);
    }

    fn dispatch_upload(&mut self, batch: Option<UploadBatch>) {
        if let Some(batch) = batch {
            self.status.status = format!("Uploading {} file(s)...", batch.files().len());
            self.dispatch(BackendCommand::UploadBatch { batch });
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        self.accept_dropped(dropped);
    }

    fn accept_dropped(&mut self, dropped: Vec<egui::DroppedFile>) {
        if dropped.is_empty() {
            return;
        }
        tracing::debug!(files = dropped.len(), "files dropped on window");
        if !self.alerts.is_empty() {
            tracing::info!("ignoring drop while an alert is open");
            self.status.status = ALERT_OPEN_STATUS.to_string();
            return;
        }
        self.upload_many(dropped.into_iter().map(candidate_from_dropped).collect());
    }

    fn show_header(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("Document Chat");
            ui.label("Ask questions about uploaded PDF documents.");
            ui.label(
                RichText::new("Prototype. Do not upload sensitive real-world data.")
                    .small()
                    .weak(),
            );
            ui.add_space(6.0);
        });
    }

    fn show_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let service = match &self.status.health {
                    BackendHealth::Unknown => "Service: checking...".to_string(),
                    BackendHealth::Ready(message) if message.is_empty() => {
                        "Service: ready".to_string()
                    }
                    BackendHealth::Ready(message) => format!("Service: {message}"),
                    BackendHealth::Unreachable => "Service: unreachable".to_string(),
                };
                ui.label(RichText::new(service).small());
                ui.separator();
                ui.label(RichText::new(&self.startup.server_url).small().weak());
                if !self.status.status.is_empty() {
                    ui.separator();
                    ui.label(RichText::new(&self.status.status).small());
                }
            });
        });
    }

    fn show_context_panel(&mut self, ctx: &egui::Context, interactive: bool) {
        egui::SidePanel::left("context_panel")
            .resizable(true)
            .default_width(260.0)
            .show(ctx, |ui| {
                if !interactive {
                    ui.disable();
                }
                ui.add_space(6.0);
                ui.heading("Context");
                ui.add_space(4.0);

                let mut remove = None;
                if self.session.documents().is_empty() {
                    ui.label("No document loaded.");
                }
                for (index, doc) in self.session.documents().iter().enumerate() {
                    ui.horizontal(|ui| {
                        ui.label(RichText::new(&doc.name).strong());
                        ui.label(
                            RichText::new(format!("{} chars", doc.text.chars().count()))
                                .small()
                                .weak(),
                        );
                        if ui
                            .small_button("Remove")
                            .on_hover_text("Remove from context")
                            .clicked()
                        {
                            remove = Some(index);
                        }
                    });
                }
                if let Some(index) = remove {
                    self.session.remove_document(index);
                }

                ui.add_space(8.0);
                let idle = !self.session.is_awaiting();
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(idle, egui::Button::new("Upload PDF"))
                        .clicked()
                    {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("PDF", &["pdf"])
                            .pick_file()
                        {
                            self.upload_single(PdfCandidate::from_path(path));
                        }
                    }
                    if ui
                        .add_enabled(idle, egui::Button::new("Add PDFs..."))
                        .clicked()
                    {
                        if let Some(paths) = rfd::FileDialog::new()
                            .add_filter("PDF", &["pdf"])
                            .pick_files()
                        {
                            self.upload_many(
                                paths.into_iter().map(PdfCandidate::from_path).collect(),
                            );
                        }
                    }
                });
                ui.label(
                    RichText::new("or drop PDF files onto the window")
                        .small()
                        .weak(),
                );

                ui.add_space(12.0);
                let linked = context_is_linked(&self.session);
                let text = if linked {
                    "Backend Status: Linked"
                } else {
                    "Backend Status: Waiting for file..."
                };
                if linked {
                    ui.colored_label(LINKED_TEXT, text);
                } else {
                    ui.label(text);
                }
            });
    }

    fn show_composer(&mut self, ctx: &egui::Context, interactive: bool) {
        egui::TopBottomPanel::bottom("composer").show(ctx, |ui| {
            if !interactive {
                ui.disable();
            }
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                let awaiting = self.session.is_awaiting();
                let send_width = 72.0;
                let text_w =
                    (ui.available_width() - send_width - ui.spacing().item_spacing.x).max(64.0);

                let response = ui.add_enabled(
                    !awaiting,
                    egui::TextEdit::singleline(self.session.input_mut())
                        .id_salt("composer_text")
                        .hint_text("Ask about the document...")
                        .desired_width(text_w),
                );
                let enter_pressed =
                    response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

                let clicked_send = ui
                    .add_enabled(self.session.can_submit(), egui::Button::new("Send"))
                    .clicked();

                if enter_pressed || clicked_send {
                    self.try_send_current_input();
                    response.request_focus();
                }
            });
            ui.add_space(6.0);
        });
    }

    fn show_transcript(&self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    if self.session.messages().is_empty() {
                        ui.label(RichText::new(EMPTY_TRANSCRIPT_HINT).weak());
                    }
                    for message in self.session.messages() {
                        show_message(ui, message);
                        ui.add_space(6.0);
                    }
                    if self.session.is_awaiting() {
                        ui.horizontal(|ui| {
                            ui.spinner();
                            ui.label(RichText::new("Thinking...").italics().weak());
                        });
                    }
                });
        });
    }

    fn show_alert(&mut self, ctx: &egui::Context) {
        let Some(alert) = self.alerts.front() else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Alert")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(alert.message.as_str());
                ui.add_space(8.0);
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alerts.pop_front();
        }
    }
}

fn show_message(ui: &mut egui::Ui, message: &Message) {
    ui.horizontal_wrapped(|ui| match role_prefix(message.role) {
        Some(prefix) => {
            ui.label(RichText::new(prefix).strong());
            ui.label(message.content.as_str());
        }
        None => {
            ui.label(
                RichText::new(message.content.as_str())
                    .italics()
                    .color(SYSTEM_TEXT),
            );
        }
    });
}

fn role_prefix(role: Role) -> Option<&'static str> {
    match role {
        Role::Assistant => Some("AI:"),
        Role::User => Some("You:"),
        Role::System => None,
    }
}

fn context_is_linked(session: &SessionState) -> bool {
    !session.combined_context().is_empty()
}

/// Native drops carry a path; web-style drops carry bytes and a declared mime type.
pub fn candidate_from_dropped(file: egui::DroppedFile) -> PdfCandidate {
    if let Some(path) = file.path {
        return PdfCandidate::from_path(path);
    }
    let media_type = if file.mime.is_empty() {
        mime_guess::from_path(&file.name)
            .first_raw()
            .map(ToOwned::to_owned)
    } else {
        Some(file.mime)
    };
    let bytes = file
        .bytes
        .unwrap_or_else(|| Arc::from(Vec::<u8>::new()));
    PdfCandidate::from_bytes(file.name, media_type, bytes)
}

impl eframe::App for DocChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.handle_dropped_files(ctx);

        let interactive = self.alerts.is_empty();
        self.show_header(ctx);
        self.show_status_bar(ctx);
        self.show_composer(ctx, interactive);
        self.show_context_panel(ctx, interactive);
        self.show_transcript(ctx);
        self.show_alert(ctx);

        if self.session.is_awaiting() {
            ctx.request_repaint_after(Duration::from_millis(50));
        } else {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use client_core::AlertKind;
    use crossbeam_channel::bounded;

    use super::*;

    fn test_app() -> (DocChatApp, Receiver<BackendCommand>) {
        let (cmd_tx, cmd_rx) = bounded(8);
        let (_ui_tx, ui_rx) = bounded(8);
        let app = DocChatApp::new(
            cmd_tx,
            ui_rx,
            StartupConfig {
                server_url: "http://127.0.0.1:8000/".into(),
            },
        );
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::CheckHealth)));
        (app, cmd_rx)
    }

    fn dropped_pdf(name: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.into(),
            mime: "application/pdf".into(),
            bytes: Some(Arc::from(b"%PDF".to_vec())),
            ..Default::default()
        }
    }

    #[test]
    fn drop_queues_upload_batch() {
        let (mut app, cmd_rx) = test_app();

        app.accept_dropped(vec![dropped_pdf("a.pdf"), dropped_pdf("b.pdf")]);

        assert!(app.session.is_awaiting());
        assert_eq!(app.status.status, "Uploading 2 file(s)...");
        match cmd_rx.try_recv() {
            Ok(BackendCommand::UploadBatch { batch }) => assert_eq!(batch.files().len(), 2),
            _ => panic!("expected an upload batch"),
        }
    }

    #[test]
    fn drop_is_ignored_while_alert_is_open() {
        let (mut app, cmd_rx) = test_app();
        app.alerts.push_back(Alert {
            kind: AlertKind::UploadFailed,
            message: "Failed to upload \"x.pdf\".".into(),
        });

        app.accept_dropped(vec![dropped_pdf("a.pdf")]);

        assert!(!app.session.is_awaiting());
        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.status.status, ALERT_OPEN_STATUS);
    }

    #[test]
    fn drop_while_chat_in_flight_tells_the_user() {
        let (mut app, cmd_rx) = test_app();
        app.session.set_input("hello");
        let request = app.session.begin_chat().expect("turn");
        app.dispatch(BackendCommand::Chat { request });
        assert!(matches!(cmd_rx.try_recv(), Ok(BackendCommand::Chat { .. })));

        app.accept_dropped(vec![dropped_pdf("a.pdf")]);

        assert!(cmd_rx.try_recv().is_err());
        assert_eq!(app.status.status, BUSY_STATUS);
        assert!(app.session.documents().is_empty());
    }

    #[test]
    fn dropped_path_declares_type_from_extension() {
        let candidate = candidate_from_dropped(egui::DroppedFile {
            path: Some(PathBuf::from("/tmp/report.pdf")),
            ..Default::default()
        });
        assert_eq!(candidate.file_name, "report.pdf");
        assert!(candidate.is_pdf());
    }

    #[test]
    fn dropped_bytes_prefer_declared_mime() {
        let candidate = candidate_from_dropped(egui::DroppedFile {
            name: "renamed.pdf".into(),
            mime: "text/plain".into(),
            bytes: Some(Arc::from(b"hello".to_vec())),
            ..Default::default()
        });
        assert!(!candidate.is_pdf());

        let guessed = candidate_from_dropped(egui::DroppedFile {
            name: "scan.pdf".into(),
            bytes: Some(Arc::from(b"%PDF".to_vec())),
            ..Default::default()
        });
        assert!(guessed.is_pdf());
    }

    #[test]
    fn link_state_follows_combined_context() {
        let mut session = SessionState::new();
        assert!(!context_is_linked(&session));

        let batch = session
            .begin_upload_batch(vec![PdfCandidate::from_bytes(
                "a.pdf",
                Some("application/pdf".into()),
                b"%PDF".to_vec(),
            )])
            .expect("batch");
        for file in batch {
            session.record_upload(
                &file.file_name,
                Ok(shared::protocol::UploadPdfResponse {
                    filename: file.file_name.clone(),
                    text: "body".into(),
                    warning: None,
                }),
            );
        }
        session.finish_upload_batch();
        assert!(context_is_linked(&session));

        session.remove_document(0);
        assert!(!context_is_linked(&session));
    }

    #[test]
    fn only_user_and_assistant_lines_get_prefixes() {
        assert_eq!(role_prefix(Role::Assistant), Some("AI:"));
        assert_eq!(role_prefix(Role::User), Some("You:"));
        assert_eq!(role_prefix(Role::System), None);
    }
}
