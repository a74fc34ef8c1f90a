// View layer - browse screen, detail overlay and upload form
pub mod browse;
pub mod detail;
pub mod upload;

use eframe::egui;

use crate::cache::ThumbnailCache;
use crate::media::is_data_uri;

/// Palette - black background with a red accent
pub const BG: egui::Color32 = egui::Color32::from_rgb(0, 0, 0);
pub const SURFACE: egui::Color32 = egui::Color32::from_rgb(24, 24, 27);
pub const SURFACE_RAISED: egui::Color32 = egui::Color32::from_rgb(39, 39, 42);
pub const BORDER: egui::Color32 = egui::Color32::from_rgb(63, 63, 70);
pub const TEXT: egui::Color32 = egui::Color32::from_rgb(245, 245, 245);
pub const TEXT_MUTED: egui::Color32 = egui::Color32::from_rgb(161, 161, 170);
pub const TEXT_FAINT: egui::Color32 = egui::Color32::from_rgb(113, 113, 122);
pub const ACCENT: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);
pub const ACCENT_HOVER: egui::Color32 = egui::Color32::from_rgb(185, 28, 28);
pub const MATCH_GREEN: egui::Color32 = egui::Color32::from_rgb(34, 197, 94);

pub const CARD_ROUNDING: f32 = 6.0;

const FULL_UV: egui::Rect = egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0));

/// Paint an entry's thumbnail into `rect`.
///
/// Embedded thumbnails come from the texture cache; remote ones are fetched by
/// egui's image loaders. Anything unusable gets a plain placeholder.
pub fn paint_thumbnail(
    ui: &egui::Ui,
    rect: egui::Rect,
    key: &str,
    uri: &str,
    cache: &mut ThumbnailCache,
    tint: egui::Color32,
) {
    if is_data_uri(uri) {
        if let Some(texture) = cache.get_or_decode(ui.ctx(), key, uri) {
            ui.painter().image(texture.id(), rect, FULL_UV, tint);
            return;
        }
    } else if !uri.is_empty() {
        egui::Image::new(uri)
            .tint(tint)
            .rounding(CARD_ROUNDING)
            .paint_at(ui, rect);
        return;
    }

    ui.painter().rect_filled(rect, CARD_ROUNDING, SURFACE);
    ui.painter().text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "🎬",
        egui::FontId::proportional(rect.height().min(48.0) * 0.5),
        TEXT_FAINT,
    );
}

/// Paint a texture stretched over `rect`
pub fn paint_texture(ui: &egui::Ui, rect: egui::Rect, texture: &egui::TextureHandle) {
    ui.painter().image(texture.id(), rect, FULL_UV, egui::Color32::WHITE);
}

/// Small outlined label, used for ratings
pub fn rating_badge(painter: &egui::Painter, pos: egui::Pos2, rating: &str, size: f32) -> egui::Rect {
    let galley = painter.layout_no_wrap(
        rating.to_uppercase(),
        egui::FontId::proportional(size),
        TEXT,
    );
    let rect = egui::Rect::from_min_size(pos, galley.size() + egui::vec2(8.0, 4.0));
    painter.rect_stroke(rect, 2.0, egui::Stroke::new(1.0, TEXT_MUTED));
    painter.galley(pos + egui::vec2(4.0, 2.0), galley, TEXT);
    rect
}

/// Filled red call-to-action button
pub fn primary_button(text: &str) -> egui::Button<'static> {
    egui::Button::new(egui::RichText::new(text.to_string()).strong().color(TEXT))
        .fill(ACCENT)
        .rounding(6.0)
}

/// Dim everything already painted in this ui, behind an open overlay
pub fn dim_background(ui: &egui::Ui) {
    ui.painter().rect_filled(
        ui.max_rect(),
        0.0,
        egui::Color32::from_rgba_unmultiplied(0, 0, 0, 200),
    );
}

/// Frame shared by the overlay windows
pub fn overlay_frame() -> egui::Frame {
    egui::Frame::none()
        .fill(SURFACE)
        .rounding(12.0)
        .stroke(egui::Stroke::new(1.0, egui::Color32::from_rgba_unmultiplied(255, 255, 255, 20)))
        .shadow(egui::Shadow {
            offset: egui::vec2(0.0, 8.0),
            blur: 24.0,
            spread: 0.0,
            color: egui::Color32::from_rgba_unmultiplied(0, 0, 0, 160),
        })
        .inner_margin(egui::Margin::same(24.0))
}
