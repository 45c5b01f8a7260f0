use eframe::egui::{Color32, Pos2, Rect, Vec2, vec2};

use crate::notes::Category;

pub(super) const EDGE_COLOR: Color32 = Color32::from_rgb(0xcb, 0xd5, 0xe1);
pub(super) const HOVER_BORDER: Color32 = Color32::from_rgb(0x1e, 0x29, 0x3b);
pub(super) const HOVER_BORDER_WIDTH: f32 = 3.0;
pub(super) const NODE_CORNER_RADIUS: f32 = 8.0;
pub(super) const SUMMARY_MAX_ROWS: usize = 3;
pub(super) const CANVAS_BACKGROUND: Color32 = Color32::from_rgb(0xf8, 0xfa, 0xfc);
pub(super) const TEXT_COLOR: Color32 = Color32::from_rgb(0x33, 0x41, 0x55);
pub(super) const SEARCH_MATCH_BORDER: Color32 = Color32::from_rgb(0x25, 0x63, 0xeb);

/// Below this on-screen size the summary is unreadable and skipped.
pub(super) const MIN_READABLE_FONT: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) struct NodeStyle {
    pub(super) fill: Color32,
    pub(super) border: Color32,
}

pub(super) fn category_style(category: Category) -> NodeStyle {
    let (fill, border) = match category {
        Category::AppIdea => (0xdbeafe, 0x93c5fd),
        Category::Philosophy => (0xf3e8ff, 0xd8b4fe),
        Category::Parenting => (0xdcfce7, 0x86efac),
        Category::Venting => (0xfef2f2, 0xfca5a5),
        Category::Technical => (0xf1f5f9, 0xcbd5e1),
        Category::Networking => (0xffedd5, 0xfdba74),
        Category::Absurd => (0xfef9c3, 0xfde047),
        Category::Other => (0xf3f4f6, 0xd1d5db),
    };
    NodeStyle {
        fill: hex_color(fill),
        border: hex_color(border),
    }
}

fn hex_color(rgb: u32) -> Color32 {
    let [_, r, g, b] = rgb.to_be_bytes();
    Color32::from_rgb(r, g, b)
}

pub(super) fn border_width(significance: u8) -> f32 {
    if significance > 7 { 2.0 } else { 1.0 }
}

/// Unscaled summary font size for a node of `width`.
pub(super) fn summary_font_size(width: f32) -> f32 {
    (width / 12.0).clamp(10.0, 13.0)
}

pub(super) fn edge_width(strength: u8, scale: f32) -> f32 {
    f32::from(strength) * scale
}

pub(super) fn blend_color(base: Color32, overlay: Color32, amount: f32) -> Color32 {
    let amount = amount.clamp(0.0, 1.0);
    let inverse = 1.0 - amount;

    Color32::from_rgba_unmultiplied(
        ((base.r() as f32 * inverse) + (overlay.r() as f32 * amount)) as u8,
        ((base.g() as f32 * inverse) + (overlay.g() as f32 * amount)) as u8,
        ((base.b() as f32 * inverse) + (overlay.b() as f32 * amount)) as u8,
        ((base.a() as f32 * inverse) + (overlay.a() as f32 * amount)) as u8,
    )
}

/// Fades `color` towards the canvas so search matches stand out.
pub(super) fn dim_color(color: Color32) -> Color32 {
    blend_color(color, CANVAS_BACKGROUND, 0.7)
}

/// Point where the ray from `rect`'s centre towards `toward` leaves the
/// rectangle. Returns the centre when `toward` coincides with it.
pub(super) fn rect_anchor(rect: Rect, toward: Pos2) -> Pos2 {
    let center = rect.center();
    let direction = toward - center;
    let half = rect.size() * 0.5;
    if direction.x.abs() <= f32::EPSILON && direction.y.abs() <= f32::EPSILON {
        return center;
    }

    let scale_x = if direction.x.abs() > f32::EPSILON {
        half.x / direction.x.abs()
    } else {
        f32::INFINITY
    };
    let scale_y = if direction.y.abs() > f32::EPSILON {
        half.y / direction.y.abs()
    } else {
        f32::INFINITY
    };
    center + direction * scale_x.min(scale_y)
}

/// Triangle for an arrowhead whose tip sits at `tip`, pointing along `direction`.
pub(super) fn arrowhead(tip: Pos2, direction: Vec2, size: f32) -> [Pos2; 3] {
    let direction = direction.normalized();
    let normal = vec2(-direction.y, direction.x);
    let base = tip - direction * size;
    [tip, base + normal * (size * 0.5), base - normal * (size * 0.5)]
}
