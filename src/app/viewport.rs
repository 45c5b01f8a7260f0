use eframe::egui::{Pos2, Rect, Vec2, vec2};

use super::{Camera, Layout, MindGraph};

const FIT_PADDING: f32 = 60.0;
const FIT_MIN_SCALE: f32 = 0.2;
const FIT_MAX_SCALE: f32 = 1.5;

impl Layout {
    /// Bounding box of every node rectangle in world space.
    pub(super) fn extents(&self, graph: &MindGraph) -> Option<Rect> {
        self.positions
            .iter()
            .zip(&graph.nodes)
            .map(|(position, node)| Rect::from_center_size(*position, node.size))
            .reduce(|bounds, rect| bounds.union(rect))
    }
}

/// Camera that frames `bounds` inside a drawing area of `area` with a fixed
/// margin. Scale is clamped, so very large or very small maps are not fully
/// padded.
pub(super) fn fit_viewport(bounds: Option<Rect>, area: Vec2) -> Camera {
    let Some(bounds) = bounds else {
        return Camera::IDENTITY;
    };

    let available = area - Vec2::splat(FIT_PADDING * 2.0);
    let scale = (available.x / bounds.width().max(1.0))
        .min(available.y / bounds.height().max(1.0))
        .clamp(FIT_MIN_SCALE, FIT_MAX_SCALE);

    Camera {
        scale,
        translate: area * 0.5 - bounds.center().to_vec2() * scale,
    }
}

impl Camera {
    pub(super) const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::ZERO,
    };
    pub(super) const MIN_ZOOM: f32 = 0.1;
    pub(super) const MAX_ZOOM: f32 = 4.0;

    pub(super) fn world_to_screen(self, origin: Pos2, world: Pos2) -> Pos2 {
        origin + self.translate + world.to_vec2() * self.scale
    }

    pub(super) fn screen_to_world(self, origin: Pos2, screen: Pos2) -> Pos2 {
        ((screen - origin - self.translate) / self.scale).to_pos2()
    }

    pub(super) fn world_size(self, size: Vec2) -> Vec2 {
        size * self.scale
    }

    /// Scales by `factor` while the world point under `pointer` stays put.
    pub(super) fn zoom_about(&mut self, origin: Pos2, pointer: Pos2, factor: f32) {
        let anchor = self.screen_to_world(origin, pointer);
        self.scale = (self.scale * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.translate = pointer - origin - anchor.to_vec2() * self.scale;
    }

    pub(super) fn pan_by(&mut self, delta: Vec2) {
        self.translate += delta;
    }
}
