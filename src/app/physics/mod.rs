mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};
use rand::Rng;
use tracing::debug;

use super::{Layout, LayoutConfig, MindGraph};
use forces::{
    ChargeParams, accumulate_charge, apply_springs, recenter, resolve_collisions, springs_for,
};
use quadtree::QuadNode;

/// Working buffers owned by one `solve` call.
struct Particles {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
}

impl Particles {
    fn scatter<R: Rng + ?Sized>(
        graph: &MindGraph,
        center: Vec2,
        config: &LayoutConfig,
        rng: &mut R,
    ) -> Self {
        let half_jitter = config.initial_jitter * 0.5;
        let positions = graph
            .nodes
            .iter()
            .map(|_| {
                center
                    + vec2(
                        rng.gen_range(-half_jitter..=half_jitter),
                        rng.gen_range(-half_jitter..=half_jitter),
                    )
            })
            .collect::<Vec<_>>();
        let radii = graph
            .nodes
            .iter()
            .map(|node| node.size.max_elem() * config.collision_radius_factor)
            .collect();

        Self {
            velocities: vec![Vec2::ZERO; positions.len()],
            positions,
            radii,
        }
    }
}

/// Runs the fixed-length simulation for `graph` inside a drawing area of
/// `area` and returns the frozen node centres.
pub(super) fn solve<R: Rng + ?Sized>(
    graph: &MindGraph,
    area: Vec2,
    config: &LayoutConfig,
    rng: &mut R,
) -> Layout {
    let center = area * 0.5;
    let mut particles = Particles::scatter(graph, center, config, rng);
    if graph.nodes.len() < 2 {
        return Layout {
            positions: particles.positions.into_iter().map(Vec2::to_pos2).collect(),
        };
    }

    let springs = springs_for(graph);
    let iterations = config.iterations.max(1);
    let alpha_decay = 1.0 - config.alpha_min.powf(1.0 / iterations as f32);
    let velocity_retention = 1.0 - config.velocity_decay;
    let mut alpha = 1.0_f32;

    for _ in 0..iterations {
        alpha -= alpha * alpha_decay;
        step(&mut particles, &springs, center, alpha, config, rng);
        for (position, velocity) in particles
            .positions
            .iter_mut()
            .zip(particles.velocities.iter_mut())
        {
            *velocity *= velocity_retention;
            *position += *velocity;
        }
    }

    debug!(
        nodes = graph.nodes.len(),
        edges = graph.edges.len(),
        iterations,
        final_alpha = alpha,
        "solved layout"
    );

    Layout {
        positions: particles.positions.into_iter().map(Vec2::to_pos2).collect(),
    }
}

fn step<R: Rng + ?Sized>(
    particles: &mut Particles,
    springs: &[forces::Spring],
    center: Vec2,
    alpha: f32,
    config: &LayoutConfig,
    rng: &mut R,
) {
    apply_springs(
        springs,
        config.link_distance,
        alpha,
        &particles.positions,
        &mut particles.velocities,
        rng,
    );

    if let Some(tree) = QuadNode::build(&particles.positions, config.charge_strength) {
        let params = ChargeParams {
            strength: config.charge_strength,
            theta_sq: config.theta * config.theta,
            alpha,
        };
        for index in 0..particles.positions.len() {
            accumulate_charge(
                &tree,
                index,
                &particles.positions,
                &params,
                &mut particles.velocities[index],
                rng,
            );
        }
    }

    recenter(&mut particles.positions, center);

    for _ in 0..config.collision_passes {
        resolve_collisions(
            &particles.positions,
            &particles.radii,
            &mut particles.velocities,
            rng,
        );
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{Pos2, Rect};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::app::graph::build_graph;
    use crate::notes::{MapMetadata, Note};

    const AREA: Vec2 = vec2(800.0, 600.0);

    fn notes(count: usize) -> Vec<Note> {
        (0..count)
            .map(|index| Note {
                id: format!("n{index}"),
                text: String::new(),
                category: Default::default(),
                summary: String::new(),
            })
            .collect()
    }

    fn node_rect(graph: &MindGraph, layout: &Layout, index: usize) -> Rect {
        Rect::from_center_size(layout.positions[index], graph.nodes[index].size)
    }

    #[test]
    fn unlinked_nodes_do_not_overlap() {
        let meta: MapMetadata = serde_json::from_str(
            r#"{"nodes": [
                {"id": "n0", "significance": 10},
                {"id": "n1", "significance": 1},
                {"id": "n2", "significance": 7},
                {"id": "n3", "significance": 3},
                {"id": "n4", "significance": 9}
            ]}"#,
        )
        .unwrap();
        let graph = build_graph(&notes(8), Some(&meta));
        let mut rng = StdRng::seed_from_u64(7);

        let layout = solve(&graph, AREA, &LayoutConfig::default(), &mut rng);

        for i in 0..graph.nodes.len() {
            for j in (i + 1)..graph.nodes.len() {
                let overlap = node_rect(&graph, &layout, i)
                    .shrink(0.5)
                    .intersects(node_rect(&graph, &layout, j).shrink(0.5));
                assert!(!overlap, "nodes {i} and {j} overlap");
            }
        }
    }

    #[test]
    fn two_nodes_separate_by_repulsion_alone() {
        let graph = build_graph(&notes(2), None);
        let mut rng = StdRng::seed_from_u64(11);

        let layout = solve(&graph, AREA, &LayoutConfig::default(), &mut rng);

        let distance = layout.positions[0].distance(layout.positions[1]);
        assert!(distance > 2.0 * 0.7 * 140.0, "distance {distance}");
    }

    #[test]
    fn layout_stays_near_area_center() {
        let graph = build_graph(&notes(6), None);
        let mut rng = StdRng::seed_from_u64(3);

        let layout = solve(&graph, AREA, &LayoutConfig::default(), &mut rng);

        let centroid = layout
            .positions
            .iter()
            .fold(Vec2::ZERO, |sum, position| sum + position.to_vec2())
            / layout.positions.len() as f32;
        assert!((centroid - AREA * 0.5).length() < 25.0, "centroid {centroid:?}");
    }

    #[test]
    fn linked_pair_sits_closer_than_a_stranger() {
        let meta: MapMetadata = serde_json::from_str(
            r#"{"links": [{"source": "n0", "target": "n1", "strength": 1}]}"#,
        )
        .unwrap();
        let graph = build_graph(&notes(3), Some(&meta));
        let mut rng = StdRng::seed_from_u64(19);

        let layout = solve(&graph, AREA, &LayoutConfig::default(), &mut rng);

        let linked = layout.positions[0].distance(layout.positions[1]);
        let stranger = layout.positions[0]
            .distance(layout.positions[2])
            .min(layout.positions[1].distance(layout.positions[2]));
        assert!(linked < stranger, "linked {linked}, stranger {stranger}");
    }

    #[test]
    fn same_seed_gives_same_layout() {
        let meta: MapMetadata = serde_json::from_str(
            r#"{"links": [
                {"source": "n0", "target": "n1"},
                {"source": "n1", "target": "n2"},
                {"source": "n2", "target": "n0"}
            ]}"#,
        )
        .unwrap();
        let graph = build_graph(&notes(5), Some(&meta));

        let first = solve(&graph, AREA, &LayoutConfig::default(), &mut StdRng::seed_from_u64(5));
        let second = solve(&graph, AREA, &LayoutConfig::default(), &mut StdRng::seed_from_u64(5));
        assert_eq!(first.positions, second.positions);
    }

    #[test]
    fn degenerate_links_keep_positions_finite() {
        let meta: MapMetadata = serde_json::from_str(
            r#"{"links": [
                {"source": "n0", "target": "n0"},
                {"source": "n0", "target": "n1"},
                {"source": "n0", "target": "n1"},
                {"source": "n1", "target": "n0", "bidirectional": true}
            ]}"#,
        )
        .unwrap();
        let graph = build_graph(&notes(3), Some(&meta));
        let mut rng = StdRng::seed_from_u64(23);

        let layout = solve(&graph, AREA, &LayoutConfig::default(), &mut rng);

        assert_eq!(layout.positions.len(), 3);
        assert!(
            layout
                .positions
                .iter()
                .all(|position| position.x.is_finite() && position.y.is_finite())
        );
    }

    #[test]
    fn single_node_stays_near_center() {
        let graph = build_graph(&notes(1), None);
        let mut rng = StdRng::seed_from_u64(1);

        let layout = solve(&graph, AREA, &LayoutConfig::default(), &mut rng);

        assert_eq!(layout.positions.len(), 1);
        assert!(layout.positions[0].distance(Pos2::new(400.0, 300.0)) <= 25.0 * 2f32.sqrt());
    }
}
