use eframe::egui::Vec2;
use rand::Rng;

use super::super::MindGraph;
use super::quadtree::QuadNode;

/// Below this squared distance, charge falls off as `1 / sqrt(l * MIN_DISTANCE_SQ)`
/// instead of blowing up.
const MIN_DISTANCE_SQ: f32 = 1.0;

/// Tiny random offset used when two bodies sit exactly on top of each other.
pub(super) fn jiggle<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    rng.gen_range(-0.5_f32..0.5) * 1e-6
}

fn separate_coincident<R: Rng + ?Sized>(delta: &mut Vec2, distance_sq: &mut f32, rng: &mut R) {
    if delta.x == 0.0 {
        delta.x = jiggle(rng);
        *distance_sq += delta.x * delta.x;
    }
    if delta.y == 0.0 {
        delta.y = jiggle(rng);
        *distance_sq += delta.y * delta.y;
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) struct Spring {
    source: usize,
    target: usize,
    stiffness: f32,
    /// Share of the correction carried by the target.
    bias: f32,
}

/// One spring per edge. Stiffness depends on endpoint degree only, never on
/// the edge's visual strength.
pub(super) fn springs_for(graph: &MindGraph) -> Vec<Spring> {
    let mut degree = vec![0u32; graph.nodes.len()];
    for edge in &graph.edges {
        degree[edge.source] += 1;
        degree[edge.target] += 1;
    }

    graph
        .edges
        .iter()
        .map(|edge| {
            let source_degree = degree[edge.source] as f32;
            let target_degree = degree[edge.target] as f32;
            Spring {
                source: edge.source,
                target: edge.target,
                stiffness: 1.0 / source_degree.min(target_degree),
                bias: source_degree / (source_degree + target_degree),
            }
        })
        .collect()
}

pub(super) fn apply_springs<R: Rng + ?Sized>(
    springs: &[Spring],
    rest_length: f32,
    alpha: f32,
    positions: &[Vec2],
    velocities: &mut [Vec2],
    rng: &mut R,
) {
    for spring in springs {
        let mut delta = (positions[spring.target] + velocities[spring.target])
            - (positions[spring.source] + velocities[spring.source]);
        let mut distance_sq = delta.length_sq();
        separate_coincident(&mut delta, &mut distance_sq, rng);

        let distance = distance_sq.sqrt();
        let correction = delta * ((distance - rest_length) / distance * alpha * spring.stiffness);
        velocities[spring.target] -= correction * spring.bias;
        velocities[spring.source] += correction * (1.0 - spring.bias);
    }
}

pub(super) struct ChargeParams {
    pub(super) strength: f32,
    pub(super) theta_sq: f32,
    pub(super) alpha: f32,
}

/// Barnes–Hut accumulation of the charge felt by body `index`.
pub(super) fn accumulate_charge<R: Rng + ?Sized>(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    params: &ChargeParams,
    velocity: &mut Vec2,
    rng: &mut R,
) {
    if cell.charge == 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == index {
                continue;
            }
            let mut delta = positions[other] - point;
            let mut distance_sq = delta.length_sq();
            separate_coincident(&mut delta, &mut distance_sq, rng);
            if distance_sq < MIN_DISTANCE_SQ {
                distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
            }
            *velocity += delta * (params.strength * params.alpha / distance_sq);
        }
        return;
    }

    let mut delta = cell.center_of_charge - point;
    let mut distance_sq = delta.length_sq();
    let side = cell.bounds.side_length();
    let far_enough = !cell.bounds.contains(point) && side * side / params.theta_sq < distance_sq;

    if far_enough {
        separate_coincident(&mut delta, &mut distance_sq, rng);
        if distance_sq < MIN_DISTANCE_SQ {
            distance_sq = (MIN_DISTANCE_SQ * distance_sq).sqrt();
        }
        *velocity += delta * (cell.charge * params.alpha / distance_sq);
        return;
    }

    for child in cell.children() {
        accumulate_charge(child, index, positions, params, velocity, rng);
    }
}

/// Shifts every body so the centroid lands on `center`.
pub(super) fn recenter(positions: &mut [Vec2], center: Vec2) {
    if positions.is_empty() {
        return;
    }

    let centroid = positions.iter().fold(Vec2::ZERO, |sum, position| sum + *position)
        / positions.len() as f32;
    let shift = centroid - center;
    for position in positions.iter_mut() {
        *position -= shift;
    }
}

/// One relaxation pass over every overlapping pair. Larger circles move less.
pub(super) fn resolve_collisions<R: Rng + ?Sized>(
    positions: &[Vec2],
    radii: &[f32],
    velocities: &mut [Vec2],
    rng: &mut R,
) {
    let count = positions.len();
    for i in 0..count {
        let radius_i = radii[i];
        let radius_i_sq = radius_i * radius_i;
        let predicted_i = positions[i] + velocities[i];

        for j in (i + 1)..count {
            let radius_j = radii[j];
            let reach = radius_i + radius_j;
            let mut delta = predicted_i - positions[j] - velocities[j];
            let mut distance_sq = delta.length_sq();
            if distance_sq >= reach * reach {
                continue;
            }

            separate_coincident(&mut delta, &mut distance_sq, rng);
            let distance = distance_sq.sqrt();
            let push = delta * ((reach - distance) / distance);
            let radius_j_sq = radius_j * radius_j;
            let share_i = radius_j_sq / (radius_i_sq + radius_j_sq);
            velocities[i] += push * share_i;
            velocities[j] -= push * (1.0 - share_i);
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::app::graph::build_graph;
    use crate::notes::{MapMetadata, Note};

    fn notes(ids: &[&str]) -> Vec<Note> {
        ids.iter()
            .map(|id| Note {
                id: (*id).to_owned(),
                text: String::new(),
                category: Default::default(),
                summary: String::new(),
            })
            .collect()
    }

    #[test]
    fn spring_stiffness_ignores_visual_strength() {
        let weak: MapMetadata = serde_json::from_str(
            r#"{"links": [{"source": "a", "target": "b", "strength": 1}]}"#,
        )
        .unwrap();
        let strong: MapMetadata = serde_json::from_str(
            r#"{"links": [{"source": "a", "target": "b", "strength": 5}]}"#,
        )
        .unwrap();
        let ids = notes(&["a", "b"]);

        let weak = springs_for(&build_graph(&ids, Some(&weak)));
        let strong = springs_for(&build_graph(&ids, Some(&strong)));
        assert_eq!(weak[0].stiffness, strong[0].stiffness);
        assert_eq!(weak[0].bias, 0.5);
    }

    #[test]
    fn stretched_spring_pulls_endpoints_together() {
        let meta: MapMetadata =
            serde_json::from_str(r#"{"links": [{"source": "a", "target": "b"}]}"#).unwrap();
        let springs = springs_for(&build_graph(&notes(&["a", "b"]), Some(&meta)));
        let positions = [vec2(0.0, 0.0), vec2(400.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let mut rng = StdRng::seed_from_u64(1);

        apply_springs(&springs, 180.0, 1.0, &positions, &mut velocities, &mut rng);

        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
        assert!((velocities[0].x + velocities[1].x).abs() < 1e-4);
    }

    #[test]
    fn self_loop_spring_is_neutral() {
        let meta: MapMetadata =
            serde_json::from_str(r#"{"links": [{"source": "a", "target": "a"}]}"#).unwrap();
        let springs = springs_for(&build_graph(&notes(&["a", "b"]), Some(&meta)));
        let positions = [vec2(10.0, 10.0), vec2(50.0, 50.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let mut rng = StdRng::seed_from_u64(2);

        apply_springs(&springs, 180.0, 1.0, &positions, &mut velocities, &mut rng);

        assert!(velocities[0].length() < 1e-3);
        assert_eq!(velocities[1], Vec2::ZERO);
    }

    #[test]
    fn charge_pushes_bodies_apart() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0)];
        let tree = QuadNode::build(&positions, -800.0).unwrap();
        let params = ChargeParams {
            strength: -800.0,
            theta_sq: 0.81,
            alpha: 1.0,
        };
        let mut rng = StdRng::seed_from_u64(3);

        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;
        accumulate_charge(&tree, 0, &positions, &params, &mut left, &mut rng);
        accumulate_charge(&tree, 1, &positions, &params, &mut right, &mut rng);

        assert!((left.x + 8.0).abs() < 1e-4);
        assert!((right.x - 8.0).abs() < 1e-4);
    }

    #[test]
    fn recenter_moves_centroid() {
        let mut positions = vec![vec2(0.0, 0.0), vec2(10.0, 20.0)];
        recenter(&mut positions, vec2(400.0, 300.0));
        assert_eq!(positions[0], vec2(395.0, 290.0));
        assert_eq!(positions[1], vec2(405.0, 310.0));
    }

    #[test]
    fn overlapping_circles_are_pushed_apart() {
        let positions = [vec2(0.0, 0.0), vec2(50.0, 0.0)];
        let radii = [40.0, 40.0];
        let mut velocities = [Vec2::ZERO; 2];
        let mut rng = StdRng::seed_from_u64(4);

        resolve_collisions(&positions, &radii, &mut velocities, &mut rng);

        assert!((velocities[0].x + 15.0).abs() < 1e-4);
        assert!((velocities[1].x - 15.0).abs() < 1e-4);
        assert!(velocities[0].y.abs() < 1e-5);
    }

    #[test]
    fn heavier_circle_moves_less() {
        let positions = [vec2(0.0, 0.0), vec2(50.0, 0.0)];
        let radii = [60.0, 20.0];
        let mut velocities = [Vec2::ZERO; 2];
        let mut rng = StdRng::seed_from_u64(5);

        resolve_collisions(&positions, &radii, &mut velocities, &mut rng);

        assert!(velocities[0].x.abs() < velocities[1].x.abs());
    }
}
