#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod ai;
mod app;
mod cache;
mod catalog;
mod config;
mod media;
mod storage;
mod task;
mod ui;
mod video;

use app::View4kApp;
use config::AppConfig;
use eframe::egui;
use tracing::info;

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    info!(model = %config.ai.model, data_dir = %config.data_dir.display(), "Starting View in 4K");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 600.0])
            .with_title("View in 4K"),
        ..Default::default()
    };

    eframe::run_native(
        "View in 4K",
        options,
        Box::new(move |cc| {
            setup_custom_style(&cc.egui_ctx);

            // Remote thumbnails are fetched by egui's http loader
            egui_extras::install_image_loaders(&cc.egui_ctx);

            Ok(Box::new(View4kApp::new(cc, config)?))
        }),
    )
}

fn setup_custom_style(ctx: &egui::Context) {
    let mut style = (*ctx.style()).clone();

    // Black background, zinc surfaces, red accent
    let bg_dark = ui::BG;
    let bg_card = ui::SURFACE;
    let bg_card_hover = ui::SURFACE_RAISED;
    let border = ui::BORDER;
    let text = ui::TEXT;
    let text_muted = ui::TEXT_MUTED;
    let accent = ui::ACCENT;

    // Apply colors to visuals
    style.visuals.dark_mode = true;
    style.visuals.panel_fill = bg_dark;
    style.visuals.window_fill = bg_card;
    style.visuals.extreme_bg_color = bg_dark;
    style.visuals.faint_bg_color = bg_card;

    style.visuals.widgets.noninteractive.bg_fill = bg_card;
    style.visuals.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, text);
    style.visuals.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, border);
    style.visuals.widgets.noninteractive.rounding = egui::Rounding::same(6.0);

    style.visuals.widgets.inactive.bg_fill = bg_card_hover;
    style.visuals.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, text_muted);
    style.visuals.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, border);
    style.visuals.widgets.inactive.rounding = egui::Rounding::same(6.0);

    style.visuals.widgets.hovered.bg_fill = bg_card_hover;
    style.visuals.widgets.hovered.fg_stroke = egui::Stroke::new(1.0, text);
    style.visuals.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, accent);
    style.visuals.widgets.hovered.rounding = egui::Rounding::same(6.0);

    style.visuals.widgets.active.bg_fill = ui::ACCENT_HOVER;
    style.visuals.widgets.active.fg_stroke = egui::Stroke::new(1.0, text);
    style.visuals.widgets.active.bg_stroke = egui::Stroke::new(1.0, accent);
    style.visuals.widgets.active.rounding = egui::Rounding::same(6.0);

    style.visuals.selection.bg_fill = accent.linear_multiply(0.4);
    style.visuals.selection.stroke = egui::Stroke::new(1.0, accent);

    // Clean rounded corners
    style.visuals.window_rounding = egui::Rounding::same(12.0);
    style.visuals.menu_rounding = egui::Rounding::same(6.0);

    // Subtle window shadow
    style.visuals.window_shadow = egui::Shadow {
        offset: egui::vec2(0.0, 4.0),
        blur: 16.0,
        spread: 0.0,
        color: egui::Color32::from_rgba_unmultiplied(0, 0, 0, 140),
    };

    // Popup shadow
    style.visuals.popup_shadow = egui::Shadow {
        offset: egui::vec2(0.0, 2.0),
        blur: 12.0,
        spread: 0.0,
        color: egui::Color32::from_rgba_unmultiplied(0, 0, 0, 60),
    };

    // Spacing
    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.window_margin = egui::Margin::same(16.0);
    style.spacing.button_padding = egui::vec2(16.0, 8.0);
    style.spacing.interact_size.y = 28.0;

    ctx.set_style(style);
}
