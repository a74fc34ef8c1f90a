// Browse screen - hero banner, category rows and search results
use eframe::egui;

use super::{
    paint_thumbnail, rating_badge, CARD_ROUNDING, SURFACE, SURFACE_RAISED, TEXT, TEXT_FAINT, TEXT_MUTED,
};
use crate::cache::ThumbnailCache;
use crate::catalog::{partition, row_title, CatalogEntry, SearchOutcome, CATEGORIES};

const ROW_CARD_WIDTH: f32 = 280.0;
const GRID_SPACING: f32 = 16.0;
const GRID_MIN_CARD_WIDTH: f32 = 220.0;

/// Hero banner for the featured entry. Returns the entry when Play or More Info is clicked.
pub fn hero(ui: &mut egui::Ui, entry: &CatalogEntry, cache: &mut ThumbnailCache) -> Option<CatalogEntry> {
    let width = ui.available_width();
    let height = (width * 0.5625).min(ui.ctx().screen_rect().height() * 0.7);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, height), egui::Sense::hover());

    // Darkened backdrop
    paint_thumbnail(ui, rect, &entry.id, &entry.thumbnail, cache, egui::Color32::from_gray(150));
    let fade = egui::Rect::from_min_max(egui::pos2(rect.left(), rect.bottom() - height * 0.35), rect.max);
    ui.painter().rect_filled(fade, 0.0, egui::Color32::from_rgba_unmultiplied(0, 0, 0, 140));

    let text_rect = egui::Rect::from_min_size(
        egui::pos2(rect.left() + 48.0, rect.top() + height * 0.35),
        egui::vec2((width * 0.45).max(320.0), height * 0.55),
    );

    let mut clicked = false;
    ui.allocate_new_ui(egui::UiBuilder::new().max_rect(text_rect), |ui| {
        ui.label(egui::RichText::new(&entry.title).size(48.0).strong().color(TEXT));
        ui.add_space(12.0);
        ui.label(egui::RichText::new(&entry.description).size(16.0).color(egui::Color32::from_gray(220)));
        ui.add_space(20.0);
        ui.horizontal(|ui| {
            let play = egui::Button::new(egui::RichText::new("▶  Play").strong().size(16.0).color(egui::Color32::BLACK))
                .fill(egui::Color32::WHITE)
                .rounding(4.0)
                .min_size(egui::vec2(110.0, 40.0));
            if ui.add(play).clicked() {
                clicked = true;
            }
            ui.add_space(8.0);
            let info = egui::Button::new(egui::RichText::new("ⓘ  More Info").strong().size(16.0).color(TEXT))
                .fill(egui::Color32::from_rgba_unmultiplied(107, 114, 128, 128))
                .rounding(4.0)
                .min_size(egui::vec2(140.0, 40.0));
            if ui.add(info).clicked() {
                clicked = true;
            }
        });
    });

    clicked.then(|| entry.clone())
}

/// Every non-empty category row. Returns the entry whose card was clicked.
pub fn category_rows(
    ui: &mut egui::Ui,
    catalog: &[CatalogEntry],
    cache: &mut ThumbnailCache,
) -> Option<CatalogEntry> {
    let mut selected = None;
    for category in CATEGORIES {
        let entries = partition(catalog, category);
        if entries.is_empty() {
            continue;
        }
        if let Some(entry) = category_row(ui, category, &entries, cache) {
            selected = Some(entry);
        }
    }
    selected
}

fn category_row(
    ui: &mut egui::Ui,
    category: &str,
    entries: &[&CatalogEntry],
    cache: &mut ThumbnailCache,
) -> Option<CatalogEntry> {
    let mut selected = None;

    ui.add_space(24.0);
    ui.horizontal(|ui| {
        ui.add_space(48.0);
        ui.label(egui::RichText::new(row_title(category)).size(22.0).strong().color(TEXT));
    });
    ui.add_space(12.0);

    egui::ScrollArea::horizontal()
        .id_salt(("category-row", category))
        .scroll_bar_visibility(egui::scroll_area::ScrollBarVisibility::VisibleWhenNeeded)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.add_space(48.0);
                ui.spacing_mut().item_spacing.x = 8.0;
                let size = egui::vec2(ROW_CARD_WIDTH, ROW_CARD_WIDTH * 0.5625);
                for entry in entries {
                    if entry_card(ui, size, entry, cache).clicked() {
                        selected = Some((*entry).clone());
                    }
                }
                ui.add_space(48.0);
            });
        });

    selected
}

/// Results for a non-empty query, or the no-matches state
pub fn search_results(
    ui: &mut egui::Ui,
    query: &str,
    outcome: &SearchOutcome<'_>,
    cache: &mut ThumbnailCache,
) -> Option<CatalogEntry> {
    let mut selected = None;

    ui.add_space(32.0);
    ui.horizontal(|ui| {
        ui.add_space(48.0);
        ui.label(egui::RichText::new("Showing results for:").size(22.0).strong().color(TEXT_MUTED));
        ui.label(egui::RichText::new(format!("\"{}\"", query)).size(22.0).italics().color(TEXT));
    });
    ui.add_space(24.0);

    match outcome {
        SearchOutcome::Matches(hits) => {
            let usable = ui.available_width() - 96.0;
            let columns = ((usable + GRID_SPACING) / (GRID_MIN_CARD_WIDTH + GRID_SPACING)).floor().max(2.0);
            let card_width = (usable - GRID_SPACING * (columns - 1.0)) / columns;
            let size = egui::vec2(card_width, card_width * 0.5625);

            for chunk in hits.chunks(columns as usize) {
                ui.horizontal(|ui| {
                    ui.add_space(48.0);
                    ui.spacing_mut().item_spacing.x = GRID_SPACING;
                    for entry in chunk {
                        if entry_card(ui, size, entry, cache).clicked() {
                            selected = Some((*entry).clone());
                        }
                    }
                });
                ui.add_space(GRID_SPACING);
            }
        }
        SearchOutcome::NoMatches => {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.label(egui::RichText::new("🔍").size(64.0).color(SURFACE_RAISED));
                ui.add_space(16.0);
                ui.label(egui::RichText::new("Your search did not have any matches.").color(TEXT_FAINT));
            });
        }
        SearchOutcome::Inactive => {}
    }

    selected
}

/// Draw one catalog card and return its click response
fn entry_card(
    ui: &mut egui::Ui,
    size: egui::Vec2,
    entry: &CatalogEntry,
    cache: &mut ThumbnailCache,
) -> egui::Response {
    let (rect, response) = ui.allocate_exact_size(size, egui::Sense::click());
    if !ui.is_rect_visible(rect) {
        return response;
    }

    let hovered = response.hovered();
    let tint = if hovered {
        egui::Color32::from_gray(128)
    } else {
        egui::Color32::WHITE
    };

    ui.painter().rect_filled(rect, CARD_ROUNDING, SURFACE);
    paint_thumbnail(ui, rect, &entry.id, &entry.thumbnail, cache, tint);

    let painter = ui.painter();

    // Title and metadata on hover
    if hovered {
        let info_rect = egui::Rect::from_min_max(egui::pos2(rect.left(), rect.bottom() - 52.0), rect.max);
        painter.rect_filled(
            info_rect,
            egui::Rounding { nw: 0.0, ne: 0.0, sw: CARD_ROUNDING, se: CARD_ROUNDING },
            egui::Color32::from_rgba_unmultiplied(0, 0, 0, 170),
        );

        let title = painter.layout(
            entry.title.clone(),
            egui::FontId::proportional(14.0),
            TEXT,
            info_rect.width() - 16.0,
        );
        painter.galley(info_rect.left_top() + egui::vec2(8.0, 6.0), title, TEXT);

        let badge = rating_badge(painter, info_rect.left_top() + egui::vec2(8.0, 28.0), &entry.rating, 10.0);
        painter.text(
            egui::pos2(badge.right() + 8.0, badge.center().y),
            egui::Align2::LEFT_CENTER,
            &entry.year,
            egui::FontId::proportional(10.0),
            TEXT_MUTED,
        );
    }

    // Upload marker
    if entry.is_user_uploaded {
        let galley = painter.layout_no_wrap(
            "USER CONTENT".to_string(),
            egui::FontId::proportional(10.0),
            TEXT,
        );
        let badge = egui::Rect::from_min_size(
            egui::pos2(rect.right() - galley.size().x - 20.0, rect.top() + 8.0),
            galley.size() + egui::vec2(12.0, 4.0),
        );
        painter.rect_filled(badge, 3.0, super::ACCENT);
        painter.galley(badge.left_top() + egui::vec2(6.0, 2.0), galley, TEXT);
    }

    response.on_hover_cursor(egui::CursorIcon::PointingHand)
}
