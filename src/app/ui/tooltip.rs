use eframe::egui::{self, Align2, Context, Id, Order, Pos2, RichText, vec2};

use super::super::render_utils::category_style;
use super::super::{HoverDetail, HoverSink};

const TOOLTIP_MAX_WIDTH: f32 = 260.0;
const POINTER_GAP: f32 = 14.0;

/// Floating card that follows the hovered node.
#[derive(Debug, Default)]
pub(in crate::app) struct TooltipOverlay {
    current: Option<(HoverDetail, Pos2)>,
}

impl HoverSink for TooltipOverlay {
    fn hover(&mut self, detail: HoverDetail, pointer: Pos2) {
        self.current = Some((detail, pointer));
    }

    fn leave(&mut self) {
        self.current = None;
    }
}

impl TooltipOverlay {
    pub(in crate::app) fn significance_text(significance: u8) -> String {
        format!("Significance: {significance}/10")
    }

    pub(in crate::app) fn draw(&self, ctx: &Context) {
        let Some((detail, pointer)) = &self.current else {
            return;
        };

        egui::Area::new(Id::new(("mind_map_tooltip", detail.id.as_str())))
            .order(Order::Tooltip)
            .pivot(Align2::CENTER_BOTTOM)
            .fixed_pos(*pointer - vec2(0.0, POINTER_GAP))
            .interactable(false)
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(TOOLTIP_MAX_WIDTH);
                    ui.horizontal(|ui| {
                        ui.label(
                            RichText::new(detail.category.label())
                                .strong()
                                .color(category_style(detail.category).border),
                        );
                        ui.label(
                            RichText::new(Self::significance_text(detail.significance)).small(),
                        );
                    });
                    ui.separator();
                    ui.label(detail.text.as_str());
                });
            });
    }
}
