use eframe::egui;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::ai::{Enricher, GeminiClient};
use crate::cache::ThumbnailCache;
use crate::catalog::{hero_entry, search, CatalogEntry, CatalogError, CatalogStore, EntryComposer, SearchOutcome, UploadForm};
use crate::config::AppConfig;
use crate::media::MediaSpool;
use crate::storage::{KeyValueStore, MemoryStore, SqliteStore};
use crate::task::Spawner;
use crate::ui::detail::{DetailAction, DetailView};
use crate::ui::upload::{UploadAction, UploadView, REQUIRED_NOTICE};
use crate::ui::{self, browse};

/// Embedded thumbnails kept on the GPU at once
const THUMBNAIL_CACHE_SIZE: usize = 200;

/// Main application state
pub struct View4kApp {
    catalog: CatalogStore,
    composer: EntryComposer,
    enricher: Arc<dyn Enricher>,

    /// Runs AI requests and file work; dropped with the app
    _runtime: tokio::runtime::Runtime,
    spawner: Spawner,
    spool: MediaSpool,

    thumbnails: ThumbnailCache,
    search_query: String,
    hero: CatalogEntry,

    // --- Overlays ---
    detail: Option<DetailView>,
    upload: Option<UploadView>,

    /// Blocking message shown over everything else
    notice: Option<String>,
}

impl View4kApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> anyhow::Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("view4k-worker")
            .build()?;

        let repaint_ctx = cc.egui_ctx.clone();
        let spawner = Spawner::new(runtime.handle().clone(), Arc::new(move || repaint_ctx.request_repaint()));

        let storage: Box<dyn KeyValueStore> = match SqliteStore::open(&config.catalog_path()) {
            Ok(store) => Box::new(store),
            Err(e) => {
                warn!("Catalog database unavailable, changes will not be kept: {}", e);
                Box::new(MemoryStore::new())
            }
        };

        let mut catalog = CatalogStore::open(storage);
        info!("Data directory: {}", config.data_dir.display());
        let repaint_ctx = cc.egui_ctx.clone();
        catalog.subscribe(move |entries| {
            debug!("Catalog changed, {} entries", entries.len());
            repaint_ctx.request_repaint();
        });

        if config.ai.api_key.is_none() {
            warn!("No GEMINI_API_KEY or API_KEY set; AI features will use fallbacks");
        }
        let enricher: Arc<dyn Enricher> = Arc::new(GeminiClient::new(config.ai.clone()));

        Ok(Self {
            catalog,
            composer: EntryComposer::new(),
            enricher,
            _runtime: runtime,
            spawner,
            spool: MediaSpool::new(config.media_dir()),
            thumbnails: ThumbnailCache::new(THUMBNAIL_CACHE_SIZE),
            search_query: String::new(),
            hero: hero_entry(),
            detail: None,
            upload: None,
            notice: None,
        })
    }

    fn open_detail(&mut self, entry: CatalogEntry) {
        self.detail = Some(DetailView::open(
            entry,
            Arc::clone(&self.enricher),
            &self.spool,
            &self.spawner,
        ));
    }

    fn close_detail(&mut self) {
        debug!("Closing detail view");
        self.detail = None;
    }

    fn open_upload(&mut self) {
        debug!("Opening upload form");
        self.upload = Some(UploadView::new(Arc::clone(&self.enricher), self.spawner.clone()));
    }

    /// Compose the form into an entry and prepend it to the catalog
    fn publish(&mut self, form: UploadForm) {
        let entry = match self.composer.compose(&form) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Upload rejected: {}", e);
                self.notice = Some(REQUIRED_NOTICE.to_string());
                return;
            }
        };

        let title = entry.title.clone();
        match self.catalog.append(entry) {
            Ok(()) => info!("Published {:?}, catalog has {} entries", title, self.catalog.len()),
            Err(CatalogError::DuplicateId(id)) => {
                error!("Refusing duplicate entry id {}", id);
                self.notice = Some("That video is already in the catalog.".to_string());
                return;
            }
            // The entry is kept for this session even though it was not written out
            Err(e) => error!("Failed to save catalog: {}", e),
        }

        self.upload = None;
    }

    fn handle_upload_action(&mut self, action: UploadAction) {
        match action {
            UploadAction::None => {}
            UploadAction::Close => {
                debug!("Closing upload form");
                self.upload = None;
            }
            UploadAction::Publish(form) => self.publish(form),
            UploadAction::Notice(message) => self.notice = Some(message),
        }
    }

    /// Poll background work owned by the open overlays
    fn poll_overlays(&mut self, ctx: &egui::Context) {
        if let Some(detail) = &mut self.detail {
            detail.update(ctx);
        }

        let upload_action = self.upload.as_mut().and_then(|upload| upload.update(ctx));
        if let Some(action) = upload_action {
            self.handle_upload_action(action);
        }
    }

    fn show_navbar(&mut self, ctx: &egui::Context, enabled: bool) {
        egui::TopBottomPanel::top("navbar")
            .frame(
                egui::Frame::none()
                    .fill(ui::BG)
                    .stroke(egui::Stroke::new(1.0, ui::SURFACE_RAISED))
                    .inner_margin(egui::Margin::symmetric(48.0, 12.0)),
            )
            .show(ctx, |ui| {
                ui.add_enabled_ui(enabled, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new("VIEW 4K").size(26.0).strong().color(ui::ACCENT));
                        ui.add_space(24.0);
                        ui.label(egui::RichText::new("Home").color(ui::TEXT));
                        ui.label(egui::RichText::new("Movies").color(ui::TEXT_MUTED));
                        ui.label(egui::RichText::new("New & Popular").color(ui::TEXT_MUTED));

                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            if ui.add(ui::primary_button("⬆ Upload")).clicked() {
                                self.open_upload();
                            }
                            ui.add_space(12.0);
                            ui.add(
                                egui::TextEdit::singleline(&mut self.search_query)
                                    .hint_text("🔍 Titles, people, genres")
                                    .desired_width(260.0),
                            );
                        });
                    });
                });
            });
    }

    /// Hero and category rows, or search results. Returns the clicked entry.
    fn show_catalog(&mut self, ui: &mut egui::Ui) -> Option<CatalogEntry> {
        let entries = self.catalog.entries();
        let thumbnails = &mut self.thumbnails;

        egui::ScrollArea::vertical()
            .id_salt("catalog")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                let selected = match search(entries, &self.search_query) {
                    SearchOutcome::Inactive => {
                        let featured = browse::hero(ui, &self.hero, thumbnails);
                        let picked = browse::category_rows(ui, entries, thumbnails);
                        featured.or(picked)
                    }
                    outcome => browse::search_results(ui, &self.search_query, &outcome, thumbnails),
                };

                ui.add_space(48.0);
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new("© View in 4K").small().color(ui::TEXT_FAINT));
                });
                ui.add_space(24.0);

                selected
            })
            .inner
    }

    fn show_notice(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.notice else {
            return;
        };

        let mut dismissed = false;
        egui::Area::new(egui::Id::new("notice-backdrop"))
            .order(egui::Order::Foreground)
            .fixed_pos(egui::Pos2::ZERO)
            .show(ctx, |ui| {
                let screen = ctx.screen_rect();
                ui.allocate_rect(screen, egui::Sense::click());
                ui.painter()
                    .rect_filled(screen, 0.0, egui::Color32::from_rgba_unmultiplied(0, 0, 0, 120));
            });

        egui::Window::new("notice")
            .title_bar(false)
            .collapsible(false)
            .resizable(false)
            .order(egui::Order::Tooltip)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .frame(ui::overlay_frame())
            .show(ctx, |ui| {
                ui.set_min_width(320.0);
                ui.label(egui::RichText::new("View 4K says").strong().color(ui::TEXT_MUTED));
                ui.add_space(12.0);
                ui.label(egui::RichText::new(message).size(16.0).color(ui::TEXT));
                ui.add_space(20.0);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.add(ui::primary_button("OK").min_size(egui::vec2(80.0, 32.0))).clicked() {
                        dismissed = true;
                    }
                });
            });

        if ctx.input(|i| i.key_pressed(egui::Key::Enter) || i.key_pressed(egui::Key::Escape)) {
            dismissed = true;
        }
        if dismissed {
            self.notice = None;
        }
    }
}

impl eframe::App for View4kApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_overlays(ctx);

        // Keep decoding frames flowing to the screen (~30 FPS)
        if self.detail.as_ref().is_some_and(DetailView::is_playing) {
            ctx.request_repaint_after(Duration::from_millis(33));
        }

        let overlay_open = self.detail.is_some() || self.upload.is_some();
        let notice_open = self.notice.is_some();
        let browsing = !overlay_open && !notice_open;

        self.show_navbar(ctx, browsing);

        let mut selected = None;
        egui::CentralPanel::default()
            .frame(egui::Frame::none().fill(ui::BG))
            .show(ctx, |ui| {
                let picked = ui.add_enabled_ui(browsing, |ui| self.show_catalog(ui)).inner;
                if browsing {
                    selected = picked;
                }
                if overlay_open {
                    ui::dim_background(ui);
                }
            });

        if let Some(entry) = selected {
            self.open_detail(entry);
        }

        // Overlays, frozen while a notice is up
        let thumbnails = &mut self.thumbnails;
        let detail_action = self.detail.as_mut().map(|detail| detail.show(ctx, thumbnails, !notice_open));
        if detail_action == Some(DetailAction::Close) {
            self.close_detail();
        }

        let upload_action = self.upload.as_mut().map(|upload| upload.show(ctx, !notice_open));
        if let Some(action) = upload_action {
            self.handle_upload_action(action);
        }

        self.show_notice(ctx);
    }
}
