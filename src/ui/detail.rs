// Detail overlay - player or placeholder, metadata and the AI curator insight
use eframe::egui;
use std::sync::Arc;
use tracing::{info, warn};

use super::{
    overlay_frame, paint_texture, paint_thumbnail, rating_badge, MATCH_GREEN, SURFACE_RAISED, TEXT, TEXT_FAINT,
    TEXT_MUTED,
};
use crate::ai::{Enricher, OPINION_PLACEHOLDER};
use crate::cache::ThumbnailCache;
use crate::catalog::CatalogEntry;
use crate::media::MediaSpool;
use crate::task::{PendingTask, Spawner};
use crate::video::VideoPlayer;

/// What the video area currently shows
enum Playback {
    /// Entry has no video reference
    Placeholder,
    Preparing(PendingTask<anyhow::Result<VideoPlayer>>),
    Ready {
        player: VideoPlayer,
        texture: Option<egui::TextureHandle>,
    },
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailAction {
    None,
    Close,
}

/// State of an open detail overlay.
///
/// The opinion request and player setup are owned here, so closing the
/// overlay (dropping this value) discards whatever they would have delivered.
pub struct DetailView {
    entry: CatalogEntry,
    opinion: String,
    opinion_task: PendingTask<String>,
    playback: Playback,
}

impl DetailView {
    pub fn open(entry: CatalogEntry, enricher: Arc<dyn Enricher>, spool: &MediaSpool, spawner: &Spawner) -> Self {
        info!(id = %entry.id, title = %entry.title, "Opening detail view");

        let title = entry.title.clone();
        let opinion_task = spawner.spawn(async move { enricher.opinion(&title).await });

        let playback = match entry.video_url.clone().filter(|url| !url.is_empty()) {
            Some(reference) => {
                let spool = spool.clone();
                Playback::Preparing(spawner.spawn_blocking(move || {
                    let source = spool.materialize(&reference)?;
                    VideoPlayer::open(&source)
                }))
            }
            None => Playback::Placeholder,
        };

        Self {
            entry,
            opinion: OPINION_PLACEHOLDER.to_string(),
            opinion_task,
            playback,
        }
    }

    /// Whether frames are being decoded and the UI should keep repainting
    pub fn is_playing(&self) -> bool {
        matches!(&self.playback, Playback::Ready { player, .. } if player.is_playing())
    }

    /// Collect finished background work. Call once per frame.
    pub fn update(&mut self, ctx: &egui::Context) {
        if let Some(opinion) = self.opinion_task.poll() {
            self.opinion = opinion;
        }

        if let Playback::Preparing(task) = &mut self.playback {
            match task.poll() {
                Some(Ok(mut player)) => {
                    player.play();
                    self.playback = Playback::Ready { player, texture: None };
                }
                Some(Err(e)) => {
                    warn!("Cannot play {}: {}", self.entry.title, e);
                    self.playback = Playback::Failed(e.to_string());
                }
                None => {}
            }
        }

        if let Playback::Ready { player, texture } = &mut self.playback {
            if let Some(frame) = player.latest_frame() {
                let image = egui::ColorImage::from_rgba_unmultiplied(
                    [frame.width as usize, frame.height as usize],
                    &frame.rgba,
                );
                match texture {
                    Some(handle) => handle.set(image, egui::TextureOptions::LINEAR),
                    None => *texture = Some(ctx.load_texture("player_frame", image, egui::TextureOptions::LINEAR)),
                }
            }
        }
    }

    pub fn show(&mut self, ctx: &egui::Context, cache: &mut ThumbnailCache, interactive: bool) -> DetailAction {
        let mut action = DetailAction::None;
        let width = (ctx.screen_rect().width() - 96.0).clamp(480.0, 1100.0);

        egui::Window::new("detail")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .fixed_size([width, 0.0])
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(overlay_frame())
            .show(ctx, |ui| {
                ui.add_enabled_ui(interactive, |ui| {
                    egui::ScrollArea::vertical()
                        .max_height(ctx.screen_rect().height() - 120.0)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                                    if ui.button("✕ Close").clicked() {
                                        action = DetailAction::Close;
                                    }
                                });
                            });
                            ui.add_space(8.0);

                            self.video_area(ui, cache);
                            ui.add_space(20.0);
                            self.info_section(ui);
                        });
                });
            });

        if interactive && ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            action = DetailAction::Close;
        }

        action
    }

    fn video_area(&mut self, ui: &mut egui::Ui, cache: &mut ThumbnailCache) {
        let width = ui.available_width();
        let (rect, _) = ui.allocate_exact_size(egui::vec2(width, width * 0.5625), egui::Sense::hover());
        ui.painter().rect_filled(rect, 4.0, egui::Color32::BLACK);

        if matches!(self.playback, Playback::Placeholder) {
            self.streaming_placeholder(ui, rect, cache);
            return;
        }

        match &mut self.playback {
            Playback::Ready { player, texture } => {
                match texture {
                    Some(texture) => paint_texture(ui, rect, texture),
                    None => centered_note(ui, rect, "Loading..."),
                }

                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    let label = if player.is_playing() { "⏸ Pause" } else { "▶ Play" };
                    if ui.button(label).clicked() {
                        player.toggle_playback();
                    }

                    let mut progress = player.progress() as f32;
                    let slider = egui::Slider::new(&mut progress, 0.0..=1.0)
                        .show_value(false)
                        .trailing_fill(true);
                    if ui.add_sized([ui.available_width() - 110.0, 20.0], slider).changed() {
                        player.seek(progress as f64);
                    }

                    ui.label(
                        egui::RichText::new(format!(
                            "{} / {}",
                            format_duration(player.position()),
                            format_duration(player.duration())
                        ))
                        .color(TEXT_MUTED),
                    );
                });
            }
            Playback::Preparing(_) => centered_note(ui, rect, "Loading..."),
            Playback::Failed(reason) => {
                centered_note(ui, rect, &format!("This video can't be played here.\n{}", reason));
            }
            Playback::Placeholder => {}
        }
    }

    /// Shown for entries without a video reference
    fn streaming_placeholder(&self, ui: &egui::Ui, rect: egui::Rect, cache: &mut ThumbnailCache) {
        ui.painter().rect_filled(rect, 4.0, SURFACE_RAISED);
        paint_thumbnail(
            ui,
            rect,
            &self.entry.id,
            &self.entry.thumbnail,
            cache,
            egui::Color32::from_rgba_unmultiplied(255, 255, 255, 77),
        );

        let painter = ui.painter();
        let center = rect.center();
        painter.text(
            center - egui::vec2(0.0, 60.0),
            egui::Align2::CENTER_CENTER,
            "🎬",
            egui::FontId::proportional(56.0),
            super::ACCENT,
        );
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            format!("Streaming {}", self.entry.title),
            egui::FontId::proportional(28.0),
            TEXT,
        );
        painter.text(
            center + egui::vec2(0.0, 36.0),
            egui::Align2::CENTER_CENTER,
            "Loading digital licenses for 4K streaming...",
            egui::FontId::proportional(14.0),
            TEXT_MUTED,
        );

        // Bouncing dots
        let time = ui.input(|i| i.time) as f32;
        for i in 0..3 {
            let phase = time * 4.0 - i as f32 * 0.8;
            let lift = phase.sin().max(0.0) * 6.0;
            let dot = center + egui::vec2((i as f32 - 1.0) * 14.0, 72.0 - lift);
            painter.circle_filled(dot, 4.0, super::ACCENT);
        }
        ui.ctx().request_repaint_after(std::time::Duration::from_millis(33));
    }

    fn info_section(&self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new("98% Match").strong().color(MATCH_GREEN));
            ui.add_space(8.0);
            ui.label(egui::RichText::new(&self.entry.year).strong().color(TEXT_MUTED));
            ui.add_space(8.0);
            let (rect, _) = ui.allocate_exact_size(egui::vec2(48.0, 18.0), egui::Sense::hover());
            rating_badge(ui.painter(), rect.left_top(), &self.entry.rating, 11.0);
            ui.add_space(8.0);
            ui.label(egui::RichText::new("4K Ultra HD").strong().color(TEXT_MUTED));
        });

        ui.add_space(12.0);
        ui.label(egui::RichText::new(self.entry.title.to_uppercase()).size(34.0).strong().color(TEXT));
        ui.add_space(8.0);
        ui.label(egui::RichText::new(&self.entry.description).size(16.0).color(egui::Color32::from_gray(209)));
        ui.add_space(16.0);

        egui::Frame::none()
            .fill(egui::Color32::from_rgba_unmultiplied(255, 255, 255, 12))
            .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 25)))
            .rounding(8.0)
            .inner_margin(egui::Margin::same(14.0))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.horizontal(|ui| {
                    ui.label(egui::RichText::new("🤖").size(22.0));
                    ui.add_space(8.0);
                    ui.vertical(|ui| {
                        ui.label(egui::RichText::new("AI CURATOR INSIGHT").small().strong().color(TEXT_FAINT));
                        ui.label(egui::RichText::new(format!("\"{}\"", self.opinion)).italics().color(TEXT));
                    });
                });
            });

        ui.add_space(16.0);
        if ui.button("🔗 Share").on_hover_text("Copy title to clipboard").clicked() {
            copy_to_clipboard(&self.entry.title);
        }
    }
}

fn centered_note(ui: &egui::Ui, rect: egui::Rect, text: &str) {
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        text,
        egui::FontId::proportional(14.0),
        TEXT_MUTED,
    );
}

/// Format seconds as MM:SS or HH:MM:SS
fn format_duration(seconds: f64) -> String {
    let total_secs = seconds.max(0.0) as u64;
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

fn copy_to_clipboard(text: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => match clipboard.set_text(text.to_string()) {
            Ok(()) => info!("Copied {:?} to clipboard", text),
            Err(e) => warn!("Failed to set clipboard text: {}", e),
        },
        Err(e) => warn!("Failed to open clipboard: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{Enhancement, OPINION_FALLBACK};
    use crate::catalog::hero_entry;
    use async_trait::async_trait;
    use std::time::{Duration, Instant};

    /// Enricher whose opinion arrives after a delay
    struct SlowCritic {
        delay: Duration,
    }

    #[async_trait]
    impl Enricher for SlowCritic {
        async fn enhance(&self, _title: &str, _description: &str) -> Option<Enhancement> {
            None
        }

        async fn opinion(&self, title: &str) -> String {
            tokio::time::sleep(self.delay).await;
            format!("{} is sharp.", title)
        }
    }

    fn spawner(runtime: &tokio::runtime::Runtime) -> Spawner {
        Spawner::new(runtime.handle().clone(), Arc::new(|| {}))
    }

    #[test]
    fn entry_without_video_shows_placeholder() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let view = DetailView::open(
            hero_entry(),
            Arc::new(SlowCritic { delay: Duration::ZERO }),
            &MediaSpool::new(std::env::temp_dir()),
            &spawner(&runtime),
        );

        assert!(matches!(view.playback, Playback::Placeholder));
        assert_eq!(view.opinion, OPINION_PLACEHOLDER);
        assert!(!view.is_playing());
    }

    #[test]
    fn opinion_replaces_placeholder_when_it_arrives() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let mut view = DetailView::open(
            hero_entry(),
            Arc::new(SlowCritic { delay: Duration::ZERO }),
            &MediaSpool::new(std::env::temp_dir()),
            &spawner(&runtime),
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while view.opinion == OPINION_PLACEHOLDER && Instant::now() < deadline {
            view.update(&ctx);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(view.opinion, "Interstellar Voyager is sharp.");
        assert_ne!(view.opinion, OPINION_FALLBACK);
    }

    #[test]
    fn unplayable_video_reference_fails_without_panicking() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let ctx = egui::Context::default();
        let dir = tempfile::tempdir().unwrap();

        let mut entry = hero_entry();
        entry.video_url = Some("data:video/mp4;base64,aGk=".to_string());
        let mut view = DetailView::open(
            entry,
            Arc::new(SlowCritic { delay: Duration::from_secs(60) }),
            &MediaSpool::new(dir.path().to_path_buf()),
            &spawner(&runtime),
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while matches!(view.playback, Playback::Preparing(_)) && Instant::now() < deadline {
            view.update(&ctx);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(view.playback, Playback::Failed(_)));
    }

    #[test]
    fn formats_durations() {
        assert_eq!(format_duration(75.0), "1:15");
        assert_eq!(format_duration(3725.0), "1:02:05");
    }
}
