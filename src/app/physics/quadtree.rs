use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);
        for point in points {
            min = min.min(*point);
            max = max.max(*point);
        }

        if !(min.is_finite() && max.is_finite()) {
            return None;
        }

        let span = (max - min).max_elem().max(1.0);
        Some(Self {
            center: (min + max) * 0.5,
            half_extent: span * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = (point - self.center).abs();
        offset.x <= self.half_extent && offset.y <= self.half_extent
    }

    pub(super) fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    fn quadrant_of(self, point: Vec2) -> usize {
        usize::from(point.x >= self.center.x) | (usize::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign_x = if quadrant & 1 == 0 { -1.0 } else { 1.0 };
        let sign_y = if quadrant & 2 == 0 { -1.0 } else { 1.0 };
        Self {
            center: self.center + vec2(sign_x * quarter, sign_y * quarter),
            half_extent: quarter,
        }
    }
}

/// Barnes–Hut cell. `charge` is the summed charge of every body below this
/// cell and `center_of_charge` their mean position.
pub(super) struct QuadNode {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_charge: Vec2,
    pub(super) charge: f32,
    pub(super) indices: Vec<usize>,
    pub(super) children: [Option<Box<QuadNode>>; 4],
}

impl QuadNode {
    pub(super) fn build(positions: &[Vec2], charge_per_body: f32) -> Option<Self> {
        let bounds = QuadBounds::enclosing(positions)?;
        let indices = (0..positions.len()).collect::<Vec<_>>();
        Some(Self::build_cell(bounds, indices, positions, charge_per_body, 0))
    }

    fn build_cell(
        bounds: QuadBounds,
        indices: Vec<usize>,
        positions: &[Vec2],
        charge_per_body: f32,
        depth: usize,
    ) -> Self {
        let mut center_of_charge = Vec2::ZERO;
        for &index in &indices {
            center_of_charge += positions[index];
        }
        if !indices.is_empty() {
            center_of_charge /= indices.len() as f32;
        }

        let mut cell = Self {
            bounds,
            center_of_charge,
            charge: charge_per_body * indices.len() as f32,
            indices,
            children: std::array::from_fn(|_| None),
        };

        if depth >= MAX_DEPTH || cell.indices.len() <= LEAF_CAPACITY {
            return cell;
        }

        let mut buckets = std::array::from_fn::<_, 4, _>(|_| Vec::new());
        for &index in &cell.indices {
            buckets[bounds.quadrant_of(positions[index])].push(index);
        }

        // Coincident bodies would split forever; keep them in one leaf.
        if buckets.iter().filter(|bucket| !bucket.is_empty()).count() <= 1 {
            return cell;
        }

        for (quadrant, bucket) in buckets.into_iter().enumerate() {
            if bucket.is_empty() {
                continue;
            }
            cell.children[quadrant] = Some(Box::new(Self::build_cell(
                bounds.quadrant(quadrant),
                bucket,
                positions,
                charge_per_body,
                depth + 1,
            )));
        }
        cell.indices.clear();
        cell
    }

    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }

    pub(super) fn children(&self) -> impl Iterator<Item = &QuadNode> {
        self.children.iter().filter_map(|child| child.as_deref())
    }
}
