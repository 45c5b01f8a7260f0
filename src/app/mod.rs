use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{error, info};

use crate::notes::{Category, NoteSource, Workspace, load_workspace};

mod graph;
mod physics;
mod render_utils;
mod ui;
mod viewport;

use ui::TooltipOverlay;

pub struct MindMapApp {
    source: NoteSource,
    layout_config: LayoutConfig,
    seed: Option<u64>,
    state: AppState,
    reload_rx: Option<Receiver<Result<Workspace, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Workspace, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    workspace: Workspace,
    layout_config: LayoutConfig,
    seed: Option<u64>,
    generation: u64,
    search: String,
    graph_dirty: bool,
    render_graph_revision: u64,
    graph_cache: Option<RenderGraph>,
    search_match_cache: Option<SearchMatchCache>,
    camera: Camera,
    viewport_mode: ViewportMode,
    hover: HoverState,
    tooltip: TooltipOverlay,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
}

/// Output of one rebuild: the graph, its frozen layout and the camera that
/// frames it.
struct RenderGraph {
    graph: MindGraph,
    layout: Layout,
    fitted: Camera,
}

#[derive(Debug, Default)]
struct MindGraph {
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

#[derive(Clone, Debug)]
struct GraphNode {
    id: String,
    text: String,
    summary: String,
    category: Category,
    significance: u8,
    size: Vec2,
}

#[derive(Clone, Debug)]
struct GraphEdge {
    source: usize,
    target: usize,
    strength: u8,
    bidirectional: bool,
    label: String,
}

/// Solved node centres, indexed like `MindGraph::nodes`. Read-only once the
/// solver returns it.
#[derive(Clone, Debug, Default)]
struct Layout {
    positions: Vec<Pos2>,
}

/// Maps world coordinates into the drawing area: `local = world * scale + translate`.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Camera {
    scale: f32,
    translate: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewportMode {
    Fitted,
    UserAdjusted,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
enum HoverState {
    #[default]
    Idle,
    Hovering {
        index: usize,
        pointer: Pos2,
    },
}

#[derive(Clone, Debug, PartialEq)]
struct HoverDetail {
    id: String,
    text: String,
    category: Category,
    significance: u8,
}

/// Receives hover observations from the canvas so an overlay can be drawn.
trait HoverSink {
    fn hover(&mut self, detail: HoverDetail, pointer: Pos2);
    fn leave(&mut self);
}

#[derive(Clone, Copy, Debug)]
pub struct LayoutConfig {
    pub iterations: usize,
    pub link_distance: f32,
    pub charge_strength: f32,
    pub theta: f32,
    pub collision_radius_factor: f32,
    pub collision_passes: usize,
    pub alpha_min: f32,
    pub velocity_decay: f32,
    pub initial_jitter: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 300,
            link_distance: 180.0,
            charge_strength: -800.0,
            theta: 0.9,
            collision_radius_factor: 0.7,
            collision_passes: 3,
            alpha_min: 0.001,
            velocity_decay: 0.4,
            initial_jitter: 50.0,
        }
    }
}

impl MindMapApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: NoteSource,
        layout_config: LayoutConfig,
        seed: Option<u64>,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            layout_config,
            seed,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: NoteSource) -> Receiver<Result<Workspace, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = load_workspace(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: NoteSource) -> AppState {
        info!(source = %source.describe(), "loading notes");
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn ready_or_error(&self, result: Result<Workspace, String>) -> AppState {
        match result {
            Ok(workspace) => AppState::Ready(Box::new(ViewModel::new(
                workspace,
                self.layout_config,
                self.seed,
            ))),
            Err(message) => {
                error!("failed to load notes: {message}");
                AppState::Error(message)
            }
        }
    }
}

impl eframe::App for MindMapApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut retry = false;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => transition = Some(result),
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading notes...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load notes");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    retry = ui.button("Retry").clicked();
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.source.describe(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => transition = Some(result),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                            ctx.request_repaint();
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition =
                                Some(Err("Background load worker disconnected".to_owned()));
                        }
                    }
                }
            }
        }

        if retry {
            self.state = Self::start_load(self.source.clone());
            return;
        }

        if let Some(result) = transition {
            self.reload_rx = None;
            self.state = self.ready_or_error(result);
        }
    }
}
