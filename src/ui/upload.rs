// Upload overlay - form state, AI enhance and file pickers
use eframe::egui;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::{overlay_frame, paint_texture, primary_button, BORDER, SURFACE_RAISED, TEXT, TEXT_FAINT, TEXT_MUTED};
use crate::ai::{apply_enhancement, Enhancement, Enricher};
use crate::cache::decode_image;
use crate::catalog::{UploadForm, UPLOAD_CATEGORY_CHOICES};
use crate::media::{encode_data_uri, MediaError, IMAGE_EXTENSIONS, VIDEO_EXTENSIONS};
use crate::task::{PendingTask, Spawner};

pub const TITLE_FIRST_NOTICE: &str = "Enter a title first";
pub const REQUIRED_NOTICE: &str = "Title and thumbnail are required!";

/// Thumbnail read from disk: its data URI and the decoded preview
type LoadedThumbnail = Result<(String, egui::ColorImage), MediaError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadAction {
    None,
    Close,
    Publish(UploadForm),
    /// Show a blocking notice and keep the form open
    Notice(String),
}

/// State of the open upload overlay
pub struct UploadView {
    form: UploadForm,
    enhance: Option<PendingTask<Option<Enhancement>>>,
    thumbnail_load: Option<PendingTask<LoadedThumbnail>>,
    video_load: Option<PendingTask<Result<String, MediaError>>>,
    preview: Option<egui::TextureHandle>,
    video_name: Option<String>,
    enricher: Arc<dyn Enricher>,
    spawner: Spawner,
}

impl UploadView {
    pub fn new(enricher: Arc<dyn Enricher>, spawner: Spawner) -> Self {
        Self {
            form: UploadForm::default(),
            enhance: None,
            thumbnail_load: None,
            video_load: None,
            preview: None,
            video_name: None,
            enricher,
            spawner,
        }
    }

    #[cfg(test)]
    fn form_mut(&mut self) -> &mut UploadForm {
        &mut self.form
    }

    pub fn is_enhancing(&self) -> bool {
        self.enhance.as_ref().is_some_and(PendingTask::is_pending)
    }

    /// Collect finished background work. Call once per frame.
    pub fn update(&mut self, ctx: &egui::Context) -> Option<UploadAction> {
        let mut action = None;

        if let Some(result) = self.enhance.as_mut().and_then(PendingTask::poll) {
            self.enhance = None;
            self.form.description = apply_enhancement(&self.form.description, result.as_ref());
        }

        if let Some(loaded) = self.thumbnail_load.as_mut().and_then(PendingTask::poll) {
            self.thumbnail_load = None;
            match loaded {
                Ok((uri, image)) => {
                    self.preview = Some(ctx.load_texture("upload_preview", image, egui::TextureOptions::LINEAR));
                    self.form.thumbnail = Some(uri);
                }
                Err(e) => {
                    warn!("Failed to load thumbnail: {}", e);
                    action = Some(UploadAction::Notice(format!("Could not read that image: {}", e)));
                }
            }
        }

        if let Some(loaded) = self.video_load.as_mut().and_then(PendingTask::poll) {
            self.video_load = None;
            match loaded {
                Ok(uri) => {
                    debug!("Video encoded ({} bytes)", uri.len());
                    self.form.video = Some(uri);
                }
                Err(e) => {
                    warn!("Failed to load video: {}", e);
                    self.video_name = None;
                    action = Some(UploadAction::Notice(format!("Could not read that video: {}", e)));
                }
            }
        }

        action
    }

    /// Ask the enricher for a better description. Needs a title.
    pub fn request_enhancement(&mut self) -> Result<(), &'static str> {
        if self.form.title.trim().is_empty() {
            return Err(TITLE_FIRST_NOTICE);
        }

        info!(title = %self.form.title, "Requesting AI enhancement");
        let enricher = Arc::clone(&self.enricher);
        let title = self.form.title.clone();
        let description = self.form.description.clone();
        self.enhance = Some(self.spawner.spawn(async move { enricher.enhance(&title, &description).await }));
        Ok(())
    }

    /// Read and preview a thumbnail on the blocking pool
    pub fn load_thumbnail(&mut self, path: PathBuf) {
        debug!("Loading thumbnail {}", path.display());
        self.thumbnail_load = Some(self.spawner.spawn_blocking(move || {
            let uri = encode_data_uri(&path)?;
            let image = decode_image(&uri)?;
            Ok((uri, image))
        }));
    }

    /// Read a video into a data URI on the blocking pool
    pub fn load_video(&mut self, path: PathBuf) {
        debug!("Loading video {}", path.display());
        self.video_name = Some(file_name(&path));
        self.form.video = None;
        self.video_load = Some(self.spawner.spawn_blocking(move || encode_data_uri(&path)));
    }

    pub fn clear_thumbnail(&mut self) {
        self.thumbnail_load = None;
        self.preview = None;
        self.form.thumbnail = None;
    }

    /// Validate and hand the form over for publishing
    pub fn publish(&self) -> UploadAction {
        match self.form.validate() {
            Ok(()) => UploadAction::Publish(self.form.clone()),
            Err(e) => {
                debug!("Upload rejected: {}", e);
                UploadAction::Notice(REQUIRED_NOTICE.to_string())
            }
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, interactive: bool) -> UploadAction {
        let mut action = UploadAction::None;

        egui::Window::new("upload")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .fixed_size([560.0, 0.0])
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(overlay_frame())
            .show(ctx, |ui| {
                ui.add_enabled_ui(interactive, |ui| {
                    egui::ScrollArea::vertical()
                        .max_height(ctx.screen_rect().height() - 120.0)
                        .show(ui, |ui| {
                            action = self.form_contents(ui);
                        });
                });
            });

        if interactive && action == UploadAction::None && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            action = UploadAction::Close;
        }

        action
    }

    fn form_contents(&mut self, ui: &mut egui::Ui) -> UploadAction {
        let mut action = UploadAction::None;

        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("Upload Content").size(22.0).strong().color(TEXT));
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✕").clicked() {
                    action = UploadAction::Close;
                }
            });
        });
        ui.add_space(16.0);

        // Title with AI enhance
        field_label(ui, "Title");
        ui.horizontal(|ui| {
            let enhancing = self.is_enhancing();
            ui.add(
                egui::TextEdit::singleline(&mut self.form.title)
                    .hint_text("Enter movie title")
                    .desired_width(ui.available_width() - 130.0),
            );
            let label = if enhancing { "⏳ Thinking..." } else { "✨ AI Enhance" };
            if ui.add_enabled(!enhancing, egui::Button::new(label)).clicked() {
                if let Err(notice) = self.request_enhancement() {
                    action = UploadAction::Notice(notice.to_string());
                }
            }
        });
        ui.add_space(12.0);

        field_label(ui, "Description");
        ui.add(
            egui::TextEdit::multiline(&mut self.form.description)
                .hint_text("What is this video about?")
                .desired_rows(4)
                .desired_width(f32::INFINITY),
        );
        ui.add_space(12.0);

        field_label(ui, "Category");
        egui::ComboBox::from_id_salt("upload-category")
            .selected_text(self.form.category.clone())
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for choice in UPLOAD_CATEGORY_CHOICES {
                    ui.selectable_value(&mut self.form.category, choice.to_string(), choice);
                }
            });
        ui.add_space(12.0);

        field_label(ui, "Video File");
        ui.horizontal(|ui| {
            if ui.button("🎞 Choose Video").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Video", VIDEO_EXTENSIONS)
                    .pick_file()
                {
                    self.load_video(path);
                }
            }
            let status = match (&self.video_name, self.video_load.is_some()) {
                (Some(name), true) => format!("Reading {}...", name),
                (Some(name), false) if self.form.video.is_some() => format!("✔ {}", name),
                _ => "No video selected".to_string(),
            };
            ui.label(egui::RichText::new(status).color(TEXT_MUTED));
        });
        ui.add_space(12.0);

        field_label(ui, "Thumbnail Image");
        self.thumbnail_picker(ui);
        ui.add_space(20.0);

        ui.separator();
        ui.add_space(8.0);
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.add(primary_button("Publish Video").min_size(egui::vec2(140.0, 36.0))).clicked() {
                action = self.publish();
            }
            if ui.add(egui::Button::new("Cancel").min_size(egui::vec2(90.0, 36.0))).clicked() {
                action = UploadAction::Close;
            }
        });

        action
    }

    fn thumbnail_picker(&mut self, ui: &mut egui::Ui) {
        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(egui::vec2(width, width * 0.5625), egui::Sense::click());

        match self.preview.clone() {
            Some(texture) => {
                paint_texture(ui, rect, &texture);
                let remove = egui::Rect::from_min_size(rect.right_top() + egui::vec2(-36.0, 8.0), egui::vec2(28.0, 28.0));
                let clicked = ui
                    .put(remove, egui::Button::new("🗑").fill(egui::Color32::from_rgba_unmultiplied(0, 0, 0, 180)))
                    .on_hover_text("Remove thumbnail")
                    .clicked();
                if clicked {
                    self.clear_thumbnail();
                }
            }
            None => {
                let hovered = response.hovered();
                ui.painter().rect(
                    rect,
                    8.0,
                    if hovered { SURFACE_RAISED } else { egui::Color32::TRANSPARENT },
                    egui::Stroke::new(1.5, if hovered { TEXT_MUTED } else { BORDER }),
                );
                let text = if self.thumbnail_load.is_some() {
                    "Loading preview..."
                } else {
                    "🖼  Click to select a thumbnail"
                };
                ui.painter().text(
                    rect.center(),
                    egui::Align2::CENTER_CENTER,
                    text,
                    egui::FontId::proportional(14.0),
                    TEXT_FAINT,
                );

                if response.on_hover_cursor(egui::CursorIcon::PointingHand).clicked() {
                    if let Some(path) = rfd::FileDialog::new()
                        .add_filter("Image", IMAGE_EXTENSIONS)
                        .pick_file()
                    {
                        self.load_thumbnail(path);
                    }
                }
            }
        }
    }
}

fn field_label(ui: &mut egui::Ui, text: &str) {
    ui.label(egui::RichText::new(text).small().strong().color(TEXT_MUTED));
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    /// Enricher with a canned enhancement
    struct CannedEnricher(Option<Enhancement>);

    #[async_trait]
    impl Enricher for CannedEnricher {
        async fn enhance(&self, _title: &str, _description: &str) -> Option<Enhancement> {
            self.0.clone()
        }

        async fn opinion(&self, _title: &str) -> String {
            String::new()
        }
    }

    fn view(runtime: &tokio::runtime::Runtime, enhancement: Option<Enhancement>) -> UploadView {
        let spawner = Spawner::new(runtime.handle().clone(), Arc::new(|| {}));
        UploadView::new(Arc::new(CannedEnricher(enhancement)), spawner)
    }

    fn settle(view: &mut UploadView, ctx: &egui::Context) -> Vec<UploadAction> {
        let mut actions = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(action) = view.update(ctx) {
                actions.push(action);
            }
            if view.enhance.is_none() && view.thumbnail_load.is_none() && view.video_load.is_none() {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        actions
    }

    fn write_png(dir: &Path) -> PathBuf {
        let path = dir.join("poster.png");
        image::RgbaImage::from_pixel(4, 3, image::Rgba([200, 30, 30, 255]))
            .save(&path)
            .unwrap();
        path
    }

    #[test]
    fn enhancement_needs_a_title() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut view = view(&runtime, None);
        view.form_mut().title = "   ".to_string();

        assert_eq!(view.request_enhancement(), Err(TITLE_FIRST_NOTICE));
        assert!(!view.is_enhancing());
    }

    #[test]
    fn enhancement_rewrites_description() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut view = view(
            &runtime,
            Some(Enhancement {
                synopsis: Some("A heist across the rings of Saturn.".to_string()),
                tagline: Some("Steal the sky.".to_string()),
            }),
        );
        view.form_mut().title = "Ring Job".to_string();
        view.form_mut().description = "space heist".to_string();

        view.request_enhancement().unwrap();
        settle(&mut view, &ctx);

        assert_eq!(
            view.form.description,
            "A heist across the rings of Saturn.\n\nTagline: Steal the sky."
        );
    }

    #[test]
    fn failed_enhancement_keeps_description() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut view = view(&runtime, None);
        view.form_mut().title = "Ring Job".to_string();
        view.form_mut().description = "space heist".to_string();

        view.request_enhancement().unwrap();
        settle(&mut view, &ctx);

        assert_eq!(view.form.description, "space heist");
    }

    #[test]
    fn publish_requires_title_and_thumbnail() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let mut view = view(&runtime, None);
        view.form_mut().title = "Ring Job".to_string();

        assert_eq!(view.publish(), UploadAction::Notice(REQUIRED_NOTICE.to_string()));

        view.form_mut().thumbnail = Some("data:image/png;base64,AAAA".to_string());
        match view.publish() {
            UploadAction::Publish(form) => assert_eq!(form.title, "Ring Job"),
            other => panic!("expected publish, got {:?}", other),
        }
    }

    #[test]
    fn picked_thumbnail_becomes_data_uri_with_preview() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        let mut view = view(&runtime, None);

        view.load_thumbnail(write_png(dir.path()));
        let actions = settle(&mut view, &ctx);

        assert!(actions.is_empty());
        assert!(view.preview.is_some());
        assert!(view
            .form
            .thumbnail
            .as_deref()
            .is_some_and(|uri| uri.starts_with("data:image/png;base64,")));

        view.clear_thumbnail();
        assert!(view.preview.is_none());
        assert!(view.form.thumbnail.is_none());
    }

    #[test]
    fn unreadable_thumbnail_raises_notice() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        let mut view = view(&runtime, None);

        view.load_thumbnail(dir.path().join("missing.png"));
        let actions = settle(&mut view, &ctx);

        assert!(matches!(actions.as_slice(), [UploadAction::Notice(_)]));
        assert!(view.form.thumbnail.is_none());
    }

    #[test]
    fn picked_video_becomes_data_uri() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"not really a movie").unwrap();
        let mut view = view(&runtime, None);

        view.load_video(path);
        settle(&mut view, &ctx);

        assert_eq!(view.video_name.as_deref(), Some("clip.mp4"));
        assert!(view
            .form
            .video
            .as_deref()
            .is_some_and(|uri| uri.starts_with("data:video/mp4;base64,")));
    }
}
