use eframe::egui::{self, Align, Context, Layout};

use crate::notes::Workspace;

use super::super::{Camera, HoverState, LayoutConfig, ViewModel, ViewportMode};
use super::TooltipOverlay;

impl ViewModel {
    pub(in crate::app) fn new(
        workspace: Workspace,
        layout_config: LayoutConfig,
        seed: Option<u64>,
    ) -> Self {
        Self {
            workspace,
            layout_config,
            seed,
            generation: 0,
            search: String::new(),
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            camera: Camera::IDENTITY,
            viewport_mode: ViewportMode::Fitted,
            hover: HoverState::Idle,
            tooltip: TooltipOverlay::default(),
        }
    }

    fn link_count(&self) -> usize {
        self.graph_cache
            .as_ref()
            .map_or(0, |cache| cache.graph.edges.len())
    }

    /// Requests a fresh layout with a new random start.
    pub(in crate::app) fn regenerate(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.graph_dirty = true;
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source_label: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("Mind map");
                    ui.separator();
                    ui.label(format!("source: {source_label}"));
                    ui.label(format!("notes: {}", self.workspace.notes.len()));
                    ui.label(format!("links: {}", self.link_count()));

                    let can_layout = self.workspace.notes.len() >= 2;
                    if ui
                        .add_enabled(can_layout, egui::Button::new("Regenerate"))
                        .clicked()
                    {
                        self.regenerate();
                    }
                    if ui
                        .add_enabled(
                            self.viewport_mode == ViewportMode::UserAdjusted,
                            egui::Button::new("Fit to view"),
                        )
                        .clicked()
                    {
                        self.reset_viewport();
                    }
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload notes"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.add(
                            egui::TextEdit::singleline(&mut self.search)
                                .hint_text("Find")
                                .desired_width(200.0),
                        );
                        if let Some(matches) = self.cached_search_matches() {
                            ui.label(format!("{} match(es)", matches.len()));
                        }
                    });
                });
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                if is_loading {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Reloading notes...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                } else {
                    self.draw_graph(ui);
                }
            });
    }
}
