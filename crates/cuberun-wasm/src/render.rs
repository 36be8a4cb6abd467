//! Canvas rendering for the game-over overlay

use crate::theme::Theme;
use cuberun_core::OverlayView;
use web_sys::CanvasRenderingContext2d;

/// Axis-aligned rectangle in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
    }
}

/// Where each part of the overlay goes for a given canvas size
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayLayout {
    pub center_x: f64,
    pub title_y: f64,
    pub columns_y: f64,
    /// Horizontal center of the SCORE and HIGH SCORES columns
    pub score_x: f64,
    pub table_x: f64,
    pub row_height: f64,
    pub font_size: f64,
    pub restart: Rect,
}

impl OverlayLayout {
    pub fn new(width: u32, height: u32, font_size: f64) -> Self {
        let w = width as f64;
        let h = height as f64;
        let button_w = font_size * 8.0;
        let button_h = font_size * 2.0;

        Self {
            center_x: w / 2.0,
            title_y: h * 0.25,
            columns_y: h * 0.42,
            score_x: w * 0.35,
            table_x: w * 0.65,
            row_height: font_size * 1.5,
            font_size,
            restart: Rect {
                x: (w - button_w) / 2.0,
                y: h * 0.75,
                w: button_w,
                h: button_h,
            },
        }
    }
}

/// Render the overlay on top of whatever the game drew
pub fn render_overlay(
    ctx: &CanvasRenderingContext2d,
    view: &OverlayView,
    theme: &Theme,
    layout: &OverlayLayout,
    width: u32,
    height: u32,
) {
    ctx.set_fill_style_str(&theme.background.as_css_alpha(view.background_alpha));
    ctx.fill_rect(0.0, 0.0, width as f64, height as f64);

    let font = layout.font_size;
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");

    // Title
    ctx.set_fill_style_str(&theme.title.as_css());
    ctx.set_font(&format!("bold {}px 'JetBrains Mono', monospace", font * 2.2));
    let _ = ctx.fill_text(view.title, layout.center_x, layout.title_y);

    // Column headings
    ctx.set_fill_style_str(&theme.heading.as_css());
    ctx.set_font(&format!("{}px 'JetBrains Mono', monospace", font * 0.8));
    let _ = ctx.fill_text("SCORE", layout.score_x, layout.columns_y);
    let _ = ctx.fill_text("HIGH SCORES", layout.table_x, layout.columns_y);

    // Final score
    ctx.set_fill_style_str(&theme.value.as_css());
    ctx.set_font(&format!("bold {}px 'JetBrains Mono', monospace", font * 1.6));
    let _ = ctx.fill_text(
        &view.score_label,
        layout.score_x,
        layout.columns_y + layout.row_height * 1.5,
    );

    render_table(ctx, view, theme, layout);
    render_restart_button(ctx, view, theme, layout);
}

fn render_table(
    ctx: &CanvasRenderingContext2d,
    view: &OverlayView,
    theme: &Theme,
    layout: &OverlayLayout,
) {
    let font = layout.font_size;
    ctx.set_font(&format!("{}px 'JetBrains Mono', monospace", font));

    for (i, slot) in view.slots.iter().enumerate() {
        let y = layout.columns_y + layout.row_height * (i as f64 + 1.0);

        ctx.set_text_align("right");
        ctx.set_fill_style_str(&theme.rank.as_css());
        let _ = ctx.fill_text(&format!("{}.", slot.rank), layout.table_x - font, y);

        ctx.set_text_align("left");
        ctx.set_fill_style_str(&theme.value.as_css());
        let _ = ctx.fill_text(&slot.label, layout.table_x - font * 0.5, y);

        if slot.underlined {
            let text_w = ctx
                .measure_text(&slot.label)
                .map(|m| m.width())
                .unwrap_or(font * slot.label.len() as f64 * 0.6);
            ctx.fill_rect(layout.table_x - font * 0.5, y + font * 0.6, text_w, 2.0);
        }
    }
}

fn render_restart_button(
    ctx: &CanvasRenderingContext2d,
    view: &OverlayView,
    theme: &Theme,
    layout: &OverlayLayout,
) {
    let r = layout.restart;
    ctx.set_fill_style_str(&theme.button_bg.as_css());
    ctx.fill_rect(r.x, r.y, r.w, r.h);

    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.set_fill_style_str(&theme.button_text.as_css());
    ctx.set_font(&format!("bold {}px 'JetBrains Mono', monospace", layout.font_size));
    let _ = ctx.fill_text(view.restart_label, r.x + r.w / 2.0, r.y + r.h / 2.0);
}
