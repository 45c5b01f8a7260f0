use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::text::LayoutJob;
use eframe::egui::{
    self, Align, Align2, Color32, FontId, Painter, Rect, Sense, Shape, Stroke, StrokeKind, Ui,
    Vec2, vec2,
};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use super::super::physics::solve;
use super::super::render_utils::{
    CANVAS_BACKGROUND, EDGE_COLOR, HOVER_BORDER, HOVER_BORDER_WIDTH, MIN_READABLE_FONT,
    NODE_CORNER_RADIUS, SEARCH_MATCH_BORDER, SUMMARY_MAX_ROWS, TEXT_COLOR, arrowhead,
    border_width, category_style, dim_color, edge_width, rect_anchor, summary_font_size,
};
use super::super::viewport::fit_viewport;
use super::super::{
    Camera, GraphNode, HoverSink, HoverState, MindGraph, RenderGraph, SearchMatchCache, ViewModel,
    ViewportMode,
};
use super::{build_graph, node_at};

const PLACEHOLDER_TEXT: &str = "Record at least two thoughts to generate a connected map.";
const LEGEND_TEXT: &str = "Rect size: significance / Links: semantic relation";
const EDGE_LABEL_MIN_SCALE: f32 = 0.8;
const ARROW_SIZE: f32 = 9.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

fn node_matches(matcher: &SkimMatcherV2, node: &GraphNode, query: &str) -> bool {
    fuzzy_match_score(matcher, &node.summary, query).is_some()
        || fuzzy_match_score(matcher, &node.text, query).is_some()
}

/// Search state for one frame: `None` when no query is active.
struct SearchView(Option<Arc<HashSet<usize>>>);

impl SearchView {
    fn is_match(&self, index: usize) -> bool {
        self.0.as_ref().is_some_and(|matches| matches.contains(&index))
    }

    fn is_dimmed(&self, index: usize) -> bool {
        self.0.as_ref().is_some_and(|matches| !matches.contains(&index))
    }
}

impl ViewModel {
    fn layout_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.generation)),
            None => StdRng::from_entropy(),
        }
    }

    /// Rebuilds the graph from the current notes, runs the solver to
    /// completion for a drawing area of `area` and fits the camera to it.
    pub(in crate::app) fn rebuild_mind_map(&mut self, area: Vec2) {
        let graph = build_graph(&self.workspace.notes, self.workspace.metadata.as_ref());
        let mut rng = self.layout_rng();
        let layout = solve(&graph, area, &self.layout_config, &mut rng);
        let fitted = fit_viewport(layout.extents(&graph), area);

        info!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            generation = self.generation,
            scale = fitted.scale,
            "laid out mind map"
        );

        self.camera = fitted;
        self.viewport_mode = ViewportMode::Fitted;
        self.graph_cache = Some(RenderGraph {
            graph,
            layout,
            fitted,
        });
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.clear_hover();
        self.graph_dirty = false;
    }

    fn clear_hover(&mut self) {
        if self.hover != HoverState::Idle {
            self.hover = HoverState::Idle;
            self.tooltip.leave();
        }
    }

    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let search_query = self.search.trim();
        if search_query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == search_query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(index, node)| node_matches(&matcher, node, search_query).then_some(index))
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: search_query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });

        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, CANVAS_BACKGROUND);

        if self.workspace.notes.len() < 2 {
            self.clear_hover();
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                PLACEHOLDER_TEXT,
                FontId::proportional(15.0),
                Color32::from_rgb(0x64, 0x74, 0x8b),
            );
            return;
        }

        if self.graph_dirty || self.graph_cache.is_none() {
            self.rebuild_mind_map(rect.size());
        }

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search = SearchView(self.cached_search_matches());
        let camera = self.camera;
        let Some(cache) = self.graph_cache.as_ref() else {
            return;
        };

        let hit = response.hover_pos().and_then(|pointer| {
            node_at(&cache.graph, &cache.layout, camera, rect.min, pointer)
                .map(|index| (index, pointer))
        });
        self.hover.update(hit, &cache.graph, &mut self.tooltip);
        if hit.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let screen_rects = cache
            .graph
            .nodes
            .iter()
            .zip(&cache.layout.positions)
            .map(|(node, position)| {
                Rect::from_center_size(
                    camera.world_to_screen(rect.min, *position),
                    camera.world_size(node.size),
                )
            })
            .collect::<Vec<_>>();

        draw_edges(&painter, &cache.graph, &screen_rects, camera, &search);
        draw_nodes(
            &painter,
            &cache.graph,
            &screen_rects,
            camera,
            &search,
            self.hover.hovered_index(),
        );

        painter.text(
            rect.left_bottom() + vec2(12.0, -10.0),
            Align2::LEFT_BOTTOM,
            LEGEND_TEXT,
            FontId::proportional(12.0),
            Color32::from_rgb(0x64, 0x74, 0x8b),
        );

        self.tooltip.draw(ui.ctx());
    }
}

fn draw_edges(
    painter: &Painter,
    graph: &MindGraph,
    screen_rects: &[Rect],
    camera: Camera,
    search: &SearchView,
) {
    for edge in &graph.edges {
        let source_rect = screen_rects[edge.source];
        let target_rect = screen_rects[edge.target];
        let color = if search.is_dimmed(edge.source) && search.is_dimmed(edge.target) {
            dim_color(EDGE_COLOR)
        } else {
            EDGE_COLOR
        };

        // Self-loops and fully overlapping nodes have no visible segment.
        let direction = target_rect.center() - source_rect.center();
        if direction.length_sq() <= f32::EPSILON {
            continue;
        }

        let start = rect_anchor(source_rect, target_rect.center());
        let end = rect_anchor(target_rect, source_rect.center());
        painter.line_segment(
            [start, end],
            Stroke::new(edge_width(edge.strength, camera.scale), color),
        );

        let arrow_size = ARROW_SIZE * camera.scale;
        painter.add(Shape::convex_polygon(
            arrowhead(end, direction, arrow_size).to_vec(),
            color,
            Stroke::NONE,
        ));
        if edge.bidirectional {
            painter.add(Shape::convex_polygon(
                arrowhead(start, -direction, arrow_size).to_vec(),
                color,
                Stroke::NONE,
            ));
        }

        if camera.scale >= EDGE_LABEL_MIN_SCALE && !edge.label.is_empty() {
            painter.text(
                start + (end - start) * 0.5,
                Align2::CENTER_CENTER,
                edge.label.as_str(),
                FontId::proportional(10.0 * camera.scale),
                Color32::from_rgb(0x94, 0xa3, 0xb8),
            );
        }
    }
}

fn draw_nodes(
    painter: &Painter,
    graph: &MindGraph,
    screen_rects: &[Rect],
    camera: Camera,
    search: &SearchView,
    hovered: Option<usize>,
) {
    for (index, (node, screen_rect)) in graph.nodes.iter().zip(screen_rects).enumerate() {
        let style = category_style(node.category);
        let dimmed = search.is_dimmed(index);

        let (border_color, border) = if hovered == Some(index) {
            (HOVER_BORDER, HOVER_BORDER_WIDTH)
        } else if search.is_match(index) {
            (SEARCH_MATCH_BORDER, 2.0)
        } else {
            (style.border, border_width(node.significance))
        };
        let (fill, border_color, text_color) = if dimmed {
            (dim_color(style.fill), dim_color(border_color), dim_color(TEXT_COLOR))
        } else {
            (style.fill, border_color, TEXT_COLOR)
        };

        painter.rect(
            *screen_rect,
            NODE_CORNER_RADIUS * camera.scale,
            fill,
            Stroke::new(border * camera.scale, border_color),
            StrokeKind::Inside,
        );

        let font_size = summary_font_size(node.size.x) * camera.scale;
        if font_size < MIN_READABLE_FONT {
            continue;
        }

        let text = if node.summary.trim().is_empty() {
            node.text.as_str()
        } else {
            node.summary.as_str()
        };
        let padding = 8.0 * camera.scale;
        let mut job = LayoutJob::simple(
            text.to_owned(),
            FontId::proportional(font_size),
            text_color,
            (screen_rect.width() - padding * 2.0).max(1.0),
        );
        job.wrap.max_rows = SUMMARY_MAX_ROWS;
        job.halign = Align::Center;
        let galley = painter.layout_job(job);
        let position = screen_rect.center() - galley.rect.center().to_vec2();
        painter.galley(position, galley, text_color);
    }
}
