use std::ops::Range;

use eframe::egui::{Vec2, vec2};

const LEAF_CAPACITY: usize = 8;
const MAX_DEPTH: usize = 12;

/// Axis-aligned square cell.
#[derive(Clone, Copy, Debug)]
pub(super) struct QuadBounds {
    pub(super) center: Vec2,
    pub(super) half_extent: f32,
}

impl QuadBounds {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        if !points.iter().all(|point| point.is_finite()) {
            return None;
        }
        let (first, rest) = points.split_first()?;
        let (min, max) = rest
            .iter()
            .fold((*first, *first), |(min, max), point| (min.min(*point), max.max(*point)));

        Some(Self {
            center: (min + max) * 0.5,
            half_extent: (max - min).max_elem().max(1.0) * 0.5 + 1.0,
        })
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let offset = point - self.center;
        offset.x.abs() <= self.half_extent && offset.y.abs() <= self.half_extent
    }

    pub(super) fn width(self) -> f32 {
        self.half_extent * 2.0
    }

    /// Bit 0 is "east of center", bit 1 is "south of center".
    fn quadrant_for(self, point: Vec2) -> u8 {
        u8::from(point.x >= self.center.x) | (u8::from(point.y >= self.center.y) << 1)
    }

    fn quadrant(self, quadrant: u8) -> Self {
        let quarter = self.half_extent * 0.5;
        let sign = |bit: u8| if quadrant & bit == 0 { -quarter } else { quarter };
        Self {
            center: self.center + vec2(sign(1), sign(2)),
            half_extent: quarter,
        }
    }
}

/// Barnes-Hut cell stored in a [`QuadTree`]. `members` indexes the
/// tree's permuted node order; `children` indexes sibling cells and is
/// empty for leaves.
pub(super) struct QuadCell {
    pub(super) bounds: QuadBounds,
    pub(super) center_of_mass: Vec2,
    pub(super) mass: f32,
    members: Range<usize>,
    children: Range<usize>,
}

impl QuadCell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Flat quadtree over a position slice. Node indices are reordered so every
/// cell's members form one contiguous run, and the non-empty children of a
/// cell sit next to each other in `cells`.
pub(super) struct QuadTree {
    cells: Vec<QuadCell>,
    order: Vec<usize>,
}

impl QuadTree {
    /// `None` for an empty slice or when any position is not finite.
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let bounds = QuadBounds::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::new(),
            order: (0..positions.len()).collect(),
        };
        tree.push_cell(bounds, 0..positions.len(), positions);

        let mut pending = vec![(0usize, 0usize)];
        while let Some((cell, depth)) = pending.pop() {
            let members = tree.cells[cell].members.clone();
            if depth >= MAX_DEPTH || members.len() <= LEAF_CAPACITY {
                continue;
            }

            let bounds = tree.cells[cell].bounds;
            tree.order[members.clone()]
                .sort_unstable_by_key(|&index| bounds.quadrant_for(positions[index]));

            let mut runs = Vec::with_capacity(4);
            let mut start = members.start;
            for quadrant in 0..4u8 {
                let end = start
                    + tree.order[start..members.end]
                        .iter()
                        .take_while(|&&index| bounds.quadrant_for(positions[index]) == quadrant)
                        .count();
                if end > start {
                    runs.push((quadrant, start..end));
                }
                start = end;
            }

            // Coincident points cannot be separated by subdividing.
            if runs.len() <= 1 {
                continue;
            }

            let first_child = tree.cells.len();
            for (quadrant, run) in runs {
                let child = tree.push_cell(bounds.quadrant(quadrant), run, positions);
                pending.push((child, depth + 1));
            }
            tree.cells[cell].children = first_child..tree.cells.len();
        }

        Some(tree)
    }

    pub(super) fn root(&self) -> &QuadCell {
        &self.cells[0]
    }

    pub(super) fn children(&self, cell: &QuadCell) -> &[QuadCell] {
        &self.cells[cell.children.clone()]
    }

    /// Node indices inside `cell`, at any depth.
    pub(super) fn members(&self, cell: &QuadCell) -> &[usize] {
        &self.order[cell.members.clone()]
    }

    fn push_cell(&mut self, bounds: QuadBounds, members: Range<usize>, positions: &[Vec2]) -> usize {
        let mass = members.len() as f32;
        let sum = self.order[members.clone()]
            .iter()
            .fold(Vec2::ZERO, |sum, &index| sum + positions[index]);
        self.cells.push(QuadCell {
            bounds,
            center_of_mass: if mass > 0.0 { sum / mass } else { bounds.center },
            mass,
            members,
            children: 0..0,
        });
        self.cells.len() - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(count: usize) -> Vec<Vec2> {
        (0..count)
            .map(|index| vec2((index % 7) as f32 * 13.0, (index / 7) as f32 * 11.0))
            .collect()
    }

    fn leaves<'a>(tree: &'a QuadTree, cell: &'a QuadCell, out: &mut Vec<&'a QuadCell>) {
        if cell.is_leaf() {
            out.push(cell);
        }
        for child in tree.children(cell) {
            leaves(tree, child, out);
        }
    }

    #[test]
    fn mass_is_conserved_across_subdivision() {
        let tree = QuadTree::build(&grid(50)).expect("finite positions");

        let root = tree.root();
        assert_eq!(root.mass, 50.0);
        assert!(!root.is_leaf());
        let child_mass = tree.children(root).iter().map(|child| child.mass).sum::<f32>();
        assert_eq!(child_mass, 50.0);
    }

    #[test]
    fn every_node_lands_in_exactly_one_leaf() {
        let positions = grid(50);
        let tree = QuadTree::build(&positions).expect("finite positions");

        let mut found = Vec::new();
        leaves(&tree, tree.root(), &mut found);
        let mut seen = found
            .iter()
            .flat_map(|leaf| tree.members(leaf).iter().copied())
            .collect::<Vec<_>>();
        seen.sort_unstable();

        assert_eq!(seen, (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn coincident_points_stay_in_one_leaf() {
        let positions = vec![vec2(5.0, 5.0); 20];

        let tree = QuadTree::build(&positions).expect("finite positions");

        assert!(tree.root().is_leaf());
        assert_eq!(tree.members(tree.root()).len(), 20);
    }

    #[test]
    fn non_finite_positions_build_nothing() {
        assert!(QuadTree::build(&[vec2(f32::NAN, 0.0)]).is_none());
        assert!(QuadTree::build(&[vec2(1.0, 2.0), vec2(3.0, f32::INFINITY)]).is_none());
        assert!(QuadTree::build(&[]).is_none());
    }
}
