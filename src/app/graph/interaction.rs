use eframe::egui::{self, Pos2, Rect, Ui};

use super::super::{
    Camera, HoverDetail, HoverSink, HoverState, Layout, MindGraph, ViewModel, ViewportMode,
};

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        let pinch = ui.input(|input| input.zoom_delta());
        let zoom_factor = if (pinch - 1.0).abs() > f32::EPSILON {
            pinch
        } else if scroll.abs() > f32::EPSILON {
            (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
        } else {
            return;
        };

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        self.camera.zoom_about(rect.min, pointer, zoom_factor);
        self.viewport_mode = ViewportMode::UserAdjusted;
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let delta = response.drag_delta();
        if response.dragged() && delta != egui::Vec2::ZERO {
            self.camera.pan_by(delta);
            self.viewport_mode = ViewportMode::UserAdjusted;
        }
    }

    pub(in crate::app) fn reset_viewport(&mut self) {
        if let Some(cache) = &self.graph_cache {
            self.camera = cache.fitted;
        }
        self.viewport_mode = ViewportMode::Fitted;
    }
}

/// Index of the node whose on-screen rectangle contains `pointer`. Later
/// nodes are drawn on top, so they win.
pub(in crate::app) fn node_at(
    graph: &MindGraph,
    layout: &Layout,
    camera: Camera,
    origin: Pos2,
    pointer: Pos2,
) -> Option<usize> {
    graph
        .nodes
        .iter()
        .zip(&layout.positions)
        .enumerate()
        .rev()
        .find(|(_, (node, position))| {
            Rect::from_center_size(
                camera.world_to_screen(origin, **position),
                camera.world_size(node.size),
            )
            .contains(pointer)
        })
        .map(|(index, _)| index)
}

fn hover_detail(graph: &MindGraph, index: usize) -> Option<HoverDetail> {
    graph.nodes.get(index).map(|node| HoverDetail {
        id: node.id.clone(),
        text: node.text.clone(),
        category: node.category,
        significance: node.significance,
    })
}

impl HoverState {
    pub(in crate::app) fn hovered_index(self) -> Option<usize> {
        match self {
            Self::Idle => None,
            Self::Hovering { index, .. } => Some(index),
        }
    }

    /// Advances the hover machine and tells `sink` about changes only.
    pub(in crate::app) fn update(
        &mut self,
        hit: Option<(usize, Pos2)>,
        graph: &MindGraph,
        sink: &mut impl HoverSink,
    ) {
        let next = match hit {
            Some((index, pointer)) => Self::Hovering { index, pointer },
            None => Self::Idle,
        };
        if next == *self {
            return;
        }

        match next {
            Self::Hovering { index, pointer } => match hover_detail(graph, index) {
                Some(detail) => sink.hover(detail, pointer),
                None => {
                    if !matches!(self, Self::Idle) {
                        sink.leave();
                    }
                    *self = Self::Idle;
                    return;
                }
            },
            Self::Idle => sink.leave(),
        }
        *self = next;
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::app::graph::build_graph;
    use crate::notes::{Category, Note};

    fn graph() -> MindGraph {
        let notes = ["a", "b", "c"]
            .iter()
            .map(|id| Note {
                id: (*id).to_owned(),
                text: format!("raw {id}"),
                category: Category::Venting,
                summary: String::new(),
            })
            .collect::<Vec<_>>();
        build_graph(&notes, None)
    }

    fn layout() -> Layout {
        Layout {
            positions: vec![
                Pos2::new(100.0, 100.0),
                Pos2::new(400.0, 100.0),
                Pos2::new(430.0, 110.0),
            ],
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        hovers: Vec<(String, Pos2)>,
        leaves: usize,
    }

    impl HoverSink for RecordingSink {
        fn hover(&mut self, detail: HoverDetail, pointer: Pos2) {
            self.hovers.push((detail.id, pointer));
        }

        fn leave(&mut self) {
            self.leaves += 1;
        }
    }

    #[test]
    fn pointer_inside_rectangle_hits_node() {
        let origin = Pos2::new(10.0, 20.0);
        let hit = node_at(&graph(), &layout(), Camera::IDENTITY, origin, Pos2::new(175.0, 150.0));
        assert_eq!(hit, Some(0));

        let miss = node_at(&graph(), &layout(), Camera::IDENTITY, origin, Pos2::new(250.0, 300.0));
        assert_eq!(miss, None);
    }

    #[test]
    fn hit_test_respects_camera_scale() {
        let camera = Camera {
            scale: 0.5,
            translate: vec2(0.0, 0.0),
        };
        // Node 0 spans 140 x 70 in world space, 70 x 35 on screen around (50, 50).
        let graph = graph();
        let layout = layout();
        assert_eq!(node_at(&graph, &layout, camera, Pos2::ZERO, Pos2::new(84.0, 66.0)), Some(0));
        assert_eq!(node_at(&graph, &layout, camera, Pos2::ZERO, Pos2::new(90.0, 50.0)), None);
    }

    #[test]
    fn topmost_node_wins_on_overlap() {
        let hit = node_at(
            &graph(),
            &layout(),
            Camera::IDENTITY,
            Pos2::ZERO,
            Pos2::new(415.0, 105.0),
        );
        assert_eq!(hit, Some(2));
    }

    #[test]
    fn hover_reports_changes_and_leaves_once() {
        let graph = graph();
        let mut state = HoverState::default();
        let mut sink = RecordingSink::default();

        state.update(Some((1, Pos2::new(5.0, 5.0))), &graph, &mut sink);
        state.update(Some((1, Pos2::new(5.0, 5.0))), &graph, &mut sink);
        state.update(Some((1, Pos2::new(6.0, 5.0))), &graph, &mut sink);
        state.update(Some((0, Pos2::new(6.0, 5.0))), &graph, &mut sink);
        state.update(None, &graph, &mut sink);
        state.update(None, &graph, &mut sink);

        assert_eq!(
            sink.hovers,
            vec![
                ("b".to_owned(), Pos2::new(5.0, 5.0)),
                ("b".to_owned(), Pos2::new(6.0, 5.0)),
                ("a".to_owned(), Pos2::new(6.0, 5.0)),
            ]
        );
        assert_eq!(sink.leaves, 1);
        assert_eq!(state, HoverState::Idle);
    }

    #[test]
    fn stale_index_falls_back_to_idle() {
        let graph = graph();
        let mut state = HoverState::Hovering {
            index: 0,
            pointer: Pos2::ZERO,
        };
        let mut sink = RecordingSink::default();

        state.update(Some((99, Pos2::ZERO)), &graph, &mut sink);

        assert_eq!(state, HoverState::Idle);
        assert_eq!(sink.leaves, 1);
        assert!(sink.hovers.is_empty());
        assert_eq!(state.hovered_index(), None);
    }
}
