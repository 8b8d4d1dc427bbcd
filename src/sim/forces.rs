use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use crate::topology::Link;
use crate::util::finite_or_zero;

use super::quadtree::{QuadCell, QuadTree};

/// Distances below this are clamped before dividing.
pub(super) const MIN_DISTANCE: f32 = 1.0;

#[derive(Clone, Copy, Debug)]
pub(super) struct LinkParams {
    pub(super) distance: f32,
    pub(super) strength: f32,
}

/// Unit direction used when two nodes coincide. Antisymmetric in its
/// arguments so both members of a pair are pushed apart.
fn separation_direction(from: usize, to: usize) -> Vec2 {
    let (low, high) = if from < to { (from, to) } else { (to, from) };
    let angle = ((low as f32) * 0.618_034 + (high as f32) * 0.414_214) * TAU;
    let direction = vec2(angle.cos(), angle.sin());
    if from < to { direction } else { -direction }
}

/// `delta * strength / distance^2`, with the distance clamped to
/// [`MIN_DISTANCE`]. Positive strength repels.
fn repulsion_between(delta: Vec2, fallback: Vec2, strength: f32) -> Vec2 {
    let length = delta.length();
    let (direction, distance) = if length > f32::EPSILON {
        (delta / length, length.max(MIN_DISTANCE))
    } else {
        (fallback, MIN_DISTANCE)
    };
    finite_or_zero(direction * (strength / distance))
}

pub(super) fn accumulate_repulsion_pairwise(positions: &[Vec2], strength: f32, forces: &mut [Vec2]) {
    for i in 0..positions.len() {
        for j in (i + 1)..positions.len() {
            let force = repulsion_between(
                positions[i] - positions[j],
                separation_direction(i, j),
                strength,
            );
            forces[i] += force;
            forces[j] -= force;
        }
    }
}

pub(super) fn accumulate_repulsion_for_node(
    tree: &QuadTree,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    force: &mut Vec2,
) {
    accumulate_from_cell(tree, tree.root(), index, positions, strength, theta, force);
}

fn accumulate_from_cell(
    tree: &QuadTree,
    cell: &QuadCell,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
    force: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in tree.members(cell) {
            if other == index {
                continue;
            }
            *force += repulsion_between(
                point - positions[other],
                separation_direction(index, other),
                strength,
            );
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance = delta.length().max(MIN_DISTANCE);
    let far_enough = !cell.bounds.contains(point) && (cell.bounds.width() / distance) < theta;
    if far_enough {
        *force += finite_or_zero(delta / distance * (strength * cell.mass / distance));
        return;
    }

    for child in tree.children(cell) {
        accumulate_from_cell(tree, child, index, positions, strength, theta, force);
    }
}

/// Pulls (or pushes) each linked pair toward `params.distance`, splitting the
/// correction evenly between both endpoints. Self-loops are skipped.
pub(super) fn accumulate_links(
    links: &[Link],
    positions: &[Vec2],
    params: LinkParams,
    alpha: f32,
    forces: &mut [Vec2],
) {
    for link in links {
        let (source, target) = link.endpoints();
        if source == target || source >= positions.len() || target >= positions.len() {
            continue;
        }

        let delta = positions[target] - positions[source];
        let length = delta.length();
        if length <= f32::EPSILON {
            continue;
        }

        let distance = length.max(MIN_DISTANCE);
        // Clamped once at load.
        let weight = link.weight.unwrap_or(1.0);
        let stretch = (distance - params.distance) / distance;
        let correction =
            finite_or_zero(delta * (stretch * params.strength * weight * alpha * 0.5));

        forces[source] += correction;
        forces[target] -= correction;
    }
}

pub(super) fn accumulate_centering(positions: &[Vec2], center: Vec2, strength: f32, forces: &mut [Vec2]) {
    for (position, force) in positions.iter().zip(forces.iter_mut()) {
        *force -= finite_or_zero((*position - center) * strength);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{RawLink, RawNode, load};

    #[test]
    fn repulsion_pushes_pairs_apart_symmetrically() {
        let positions = [vec2(0.0, 0.0), vec2(10.0, 0.0)];
        let mut forces = [Vec2::ZERO; 2];

        accumulate_repulsion_pairwise(&positions, 300.0, &mut forces);

        assert!(forces[0].x < 0.0);
        assert!(forces[1].x > 0.0);
        assert_eq!(forces[0], -forces[1]);
        assert!((forces[1].x - 30.0).abs() < 1e-4);
    }

    #[test]
    fn coincident_nodes_get_finite_separation() {
        let positions = [vec2(3.0, 3.0), vec2(3.0, 3.0)];
        let mut forces = [Vec2::ZERO; 2];

        accumulate_repulsion_pairwise(&positions, 300.0, &mut forces);

        assert!(forces[0].is_finite() && forces[1].is_finite());
        assert!(forces[0].length() > 0.0);
        assert_eq!(forces[0], -forces[1]);
    }

    #[test]
    fn quadtree_repulsion_approximates_pairwise_sum() {
        let positions = (0..120)
            .map(|index| {
                let angle = index as f32 * 2.399_963;
                vec2(angle.cos(), angle.sin()) * (10.0 * (index as f32 + 0.5).sqrt())
            })
            .collect::<Vec<_>>();
        let mut exact = vec![Vec2::ZERO; positions.len()];
        accumulate_repulsion_pairwise(&positions, 300.0, &mut exact);

        let tolerance = exact.iter().map(|force| force.length()).fold(0.0, f32::max) * 0.1;

        let tree = QuadTree::build(&positions).expect("finite positions");
        for (index, expected) in exact.iter().enumerate() {
            let mut approx = Vec2::ZERO;
            accumulate_repulsion_for_node(&tree, index, &positions, 300.0, 0.5, &mut approx);
            let error = (approx - *expected).length();
            assert!(error <= tolerance, "node {index}: {error} > {tolerance}");
        }
    }

    #[test]
    fn stretched_links_pull_endpoints_together() {
        let nodes = ["a", "b"].map(|id| RawNode {
            id: id.to_owned(),
            ..Default::default()
        });
        let links = [RawLink {
            source: "a".to_owned(),
            target: "b".to_owned(),
            ..Default::default()
        }];
        let (graph, _) = load(&nodes, &links);
        let positions = [vec2(0.0, 0.0), vec2(200.0, 0.0)];
        let mut forces = [Vec2::ZERO; 2];

        accumulate_links(
            graph.links(),
            &positions,
            LinkParams {
                distance: 100.0,
                strength: 1.0,
            },
            1.0,
            &mut forces,
        );

        assert!(forces[0].x > 0.0);
        assert!(forces[1].x < 0.0);
        assert_eq!(forces[0].x, 50.0);
    }

    #[test]
    fn link_weight_scales_the_spring_as_given() {
        let nodes = ["a", "b"].map(|id| RawNode {
            id: id.to_owned(),
            ..Default::default()
        });
        let links = [RawLink {
            source: "a".to_owned(),
            target: "b".to_owned(),
            value: Some(40.0),
            ..Default::default()
        }];
        let (graph, _) = load(&nodes, &links);
        assert_eq!(graph.links()[0].weight, Some(10.0));

        let mut heavy = graph.links()[0].clone();
        heavy.weight = Some(20.0);
        let positions = [vec2(0.0, 0.0), vec2(200.0, 0.0)];
        let params = LinkParams {
            distance: 100.0,
            strength: 1.0,
        };

        let mut loaded = [Vec2::ZERO; 2];
        accumulate_links(graph.links(), &positions, params, 1.0, &mut loaded);
        let mut unclamped = [Vec2::ZERO; 2];
        accumulate_links(&[heavy], &positions, params, 1.0, &mut unclamped);

        assert_eq!(loaded[0].x, 500.0);
        assert_eq!(unclamped[0].x, 1000.0);
    }

    #[test]
    fn centering_pulls_toward_center() {
        let positions = [vec2(50.0, -20.0)];
        let mut forces = [Vec2::ZERO];

        accumulate_centering(&positions, Vec2::ZERO, 0.1, &mut forces);

        assert_eq!(forces[0], vec2(-5.0, 2.0));
    }
}
