use client_core::ViewState;
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::{ImageRef, StyleName};
use tokio::sync::watch;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{
    events::{UiError, UiEvent},
    orchestration::dispatch_backend_command,
};
use crate::media::{PreviewImage, PreviewSlot};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];
const PREVIEW_MAX_HEIGHT: f32 = 360.0;

/// Decoded preview plus its lazily uploaded texture.
struct LoadedPreview {
    image_ref: ImageRef,
    image: PreviewImage,
    texture: Option<egui::TextureHandle>,
}

fn show_preview(ui: &mut egui::Ui, slot: &mut Option<LoadedPreview>, shown: &ImageRef) {
    let Some(preview) = slot.as_mut().filter(|p| &p.image_ref == shown) else {
        return;
    };
    let texture = preview.texture.get_or_insert_with(|| {
        let color = egui::ColorImage::from_rgba_unmultiplied(
            [preview.image.width, preview.image.height],
            &preview.image.rgba,
        );
        ui.ctx().load_texture(
            format!("preview:{}", preview.image_ref),
            color,
            egui::TextureOptions::LINEAR,
        )
    });
    ui.add(
        egui::Image::new(&*texture)
            .max_width(ui.available_width())
            .max_height(PREVIEW_MAX_HEIGHT),
    );
}

pub struct ArtifyApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: Option<watch::Receiver<ViewState>>,
    authorize_url: Option<String>,
    token_draft: String,
    style_choice: StyleName,
    status: String,
    last_error: Option<UiError>,
    input_preview: Option<LoadedPreview>,
    output_preview: Option<LoadedPreview>,
}

impl ArtifyApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: None,
            authorize_url: None,
            token_draft: String::new(),
            style_choice: StyleName::default(),
            status: "Starting backend...".to_string(),
            last_error: None,
            input_preview: None,
            output_preview: None,
        }
    }

    fn preview_slot(&mut self, slot: PreviewSlot) -> &mut Option<LoadedPreview> {
        match slot {
            PreviewSlot::Input => &mut self.input_preview,
            PreviewSlot::Output => &mut self.output_preview,
        }
    }

    fn dispatch(&mut self, cmd: BackendCommand) {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.status);
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            match event {
                UiEvent::Attached {
                    view,
                    authorize_url,
                } => {
                    self.view = Some(view);
                    self.authorize_url = authorize_url;
                    if self.last_error.is_none() {
                        self.status = "Ready".to_string();
                    }
                }
                UiEvent::Info(message) => {
                    self.status = message;
                    self.last_error = None;
                }
                UiEvent::Error(err) => {
                    tracing::warn!(
                        category = ?err.category(),
                        context = ?err.context(),
                        "{}",
                        err.message()
                    );
                    self.status = err.status_line();
                    if err.requires_reauth() {
                        self.token_draft.clear();
                    }
                    self.last_error = Some(err);
                }
                UiEvent::PreviewLoaded {
                    slot,
                    image_ref,
                    preview,
                } => {
                    *self.preview_slot(slot) = Some(LoadedPreview {
                        image_ref,
                        image: preview,
                        texture: None,
                    });
                }
                UiEvent::PreviewFailed {
                    slot,
                    image_ref,
                    reason,
                } => {
                    let current = self.preview_slot(slot);
                    if current.as_ref().is_some_and(|p| p.image_ref == image_ref) {
                        *current = None;
                    }
                    self.status = format!("Preview unavailable: {reason}");
                }
            }
        }
    }

    fn current_view(&self) -> ViewState {
        self.view
            .as_ref()
            .map(|rx| rx.borrow().clone())
            .unwrap_or_default()
    }

    fn show_header(&mut self, ctx: &egui::Context, view: &ViewState) {
        egui::TopBottomPanel::top("artify_header").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(egui::RichText::new("Artify AI 🎨").strong().size(28.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    match &view.session {
                        Some(session) => {
                            if ui.button("Logout").clicked() {
                                self.dispatch(BackendCommand::SignOut);
                            }
                            ui.label(format!("Hi, {}", session.display_name));
                        }
                        None => {
                            let can_login = self.view.is_some() && self.authorize_url.is_some();
                            if ui
                                .add_enabled(can_login, egui::Button::new("Login with Google"))
                                .clicked()
                            {
                                let id_token = std::mem::take(&mut self.token_draft);
                                self.dispatch(BackendCommand::SignIn { id_token });
                            }
                            ui.add(
                                egui::TextEdit::singleline(&mut self.token_draft)
                                    .hint_text("Paste Google ID token")
                                    .password(true)
                                    .desired_width(220.0),
                            );
                            if let Some(url) = &self.authorize_url {
                                ui.hyperlink_to("Open sign-in page", url);
                            }
                        }
                    }
                });
            });
        });
    }

    fn show_upload_column(&mut self, ui: &mut egui::Ui, view: &ViewState) {
        ui.label(egui::RichText::new("Upload Your Image").strong().size(18.0));
        ui.add_space(6.0);
        if ui
            .add_enabled(self.view.is_some(), egui::Button::new("Choose image…"))
            .clicked()
        {
            if let Some(path) = rfd::FileDialog::new()
                .add_filter("image", IMAGE_EXTENSIONS)
                .pick_file()
            {
                self.dispatch(BackendCommand::SelectFile { path });
            }
        }
        if let Some(input) = &view.input_image {
            ui.add_space(6.0);
            show_preview(ui, &mut self.input_preview, input);
            ui.label(egui::RichText::new(input.as_str()).monospace().weak());
        }
    }

    fn show_style_column(&mut self, ui: &mut egui::Ui, view: &ViewState) {
        ui.label(egui::RichText::new("Choose Style").strong().size(18.0));
        ui.add_space(6.0);

        let before = self.style_choice;
        egui::ComboBox::from_id_salt("style_choice")
            .selected_text(self.style_choice.label())
            .show_ui(ui, |ui| {
                for style in StyleName::ALL {
                    ui.selectable_value(&mut self.style_choice, style, style.label());
                }
            });
        if self.style_choice != before {
            self.dispatch(BackendCommand::SelectStyle {
                style: self.style_choice,
            });
        }

        ui.add_space(8.0);
        let label = if view.is_generating {
            "Applying Style..."
        } else {
            "Generate Art"
        };
        if ui
            .add_enabled(view.can_generate(), egui::Button::new(label))
            .clicked()
        {
            self.dispatch(BackendCommand::Generate);
        }

        if let Some(output) = view.visible_output() {
            ui.add_space(12.0);
            ui.label(egui::RichText::new("Stylized Output").strong().size(16.0));
            show_preview(ui, &mut self.output_preview, output);
            ui.hyperlink(output.as_str());
        }
    }
}

impl eframe::App for ArtifyApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        let view = self.current_view();

        self.show_header(ctx, &view);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.small(egui::RichText::new(&self.status).weak());
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.columns(2, |columns| {
                self.show_upload_column(&mut columns[0], &view);
                self.show_style_column(&mut columns[1], &view);
            });
        });

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;

    fn app_with_events() -> (ArtifyApp, Sender<UiEvent>) {
        let (cmd_tx, _cmd_rx) = bounded(8);
        let (ui_tx, ui_rx) = bounded(8);
        (ArtifyApp::new(cmd_tx, ui_rx), ui_tx)
    }

    fn tiny_preview() -> PreviewImage {
        PreviewImage {
            width: 1,
            height: 1,
            rgba: vec![0, 0, 0, 255],
        }
    }

    #[test]
    fn loaded_previews_land_in_their_slot() {
        let (mut app, ui_tx) = app_with_events();
        let output = ImageRef::remote("https://cdn/out.png");
        ui_tx
            .send(UiEvent::PreviewLoaded {
                slot: PreviewSlot::Output,
                image_ref: output.clone(),
                preview: tiny_preview(),
            })
            .unwrap();

        app.process_ui_events();

        assert!(app.input_preview.is_none());
        let stored = app.output_preview.as_ref().expect("output preview");
        assert_eq!(stored.image_ref, output);
        assert!(stored.texture.is_none());
    }

    #[test]
    fn failed_preview_clears_only_a_matching_slot() {
        let (mut app, ui_tx) = app_with_events();
        let first = ImageRef("file:///tmp/first.png".into());
        let second = ImageRef("file:///tmp/second.png".into());
        ui_tx
            .send(UiEvent::PreviewLoaded {
                slot: PreviewSlot::Input,
                image_ref: first.clone(),
                preview: tiny_preview(),
            })
            .unwrap();
        ui_tx
            .send(UiEvent::PreviewFailed {
                slot: PreviewSlot::Input,
                image_ref: second,
                reason: "unsupported format".into(),
            })
            .unwrap();
        app.process_ui_events();
        assert_eq!(app.input_preview.as_ref().map(|p| &p.image_ref), Some(&first));
        assert_eq!(app.status, "Preview unavailable: unsupported format");

        ui_tx
            .send(UiEvent::PreviewFailed {
                slot: PreviewSlot::Input,
                image_ref: first,
                reason: "gone".into(),
            })
            .unwrap();
        app.process_ui_events();
        assert!(app.input_preview.is_none());
    }
}
