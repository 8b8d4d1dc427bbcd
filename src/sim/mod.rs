mod config;
mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::topology::Graph;
use crate::util::{finite_or_zero, stable_pair};

pub use config::SimulationConfig;
use forces::{
    LinkParams, accumulate_centering, accumulate_links, accumulate_repulsion_for_node,
    accumulate_repulsion_pairwise,
};
use quadtree::QuadTree;

/// Alpha used by [`ForceSimulator::reheat`] callers that have no stronger
/// opinion (drag start, filter change).
pub const DEFAULT_REHEAT_ALPHA: f32 = 0.5;

const INITIAL_RADIUS: f32 = 10.0;
const INITIAL_JITTER: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationState {
    pub alpha: f32,
    pub running: bool,
}

impl SimulationState {
    fn hot() -> Self {
        Self {
            alpha: 1.0,
            running: true,
        }
    }
}

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    forces: Vec<Vec2>,
}

/// Frame-driven force layout. The host calls [`ForceSimulator::tick`] once
/// per frame; nothing here runs on its own clock.
pub struct ForceSimulator {
    graph: Graph,
    config: SimulationConfig,
    state: SimulationState,
    scratch: Scratch,
}

impl ForceSimulator {
    pub fn start(graph: Graph, config: SimulationConfig) -> Self {
        let mut simulator = Self {
            graph,
            config: config.validated(),
            state: SimulationState::hot(),
            scratch: Scratch::default(),
        };
        simulator.place_unplaced_nodes();
        simulator
    }

    /// Swaps in a new snapshot. Nodes whose id survives keep their last
    /// position unless the snapshot seeds one; velocities and pins reset.
    pub fn replace_graph(&mut self, graph: Graph) {
        let previous = std::mem::replace(&mut self.graph, graph);
        let carried = previous
            .nodes
            .into_iter()
            .filter(|node| node.placed)
            .map(|node| (node.id, node.position))
            .collect::<HashMap<_, _>>();

        for node in &mut self.graph.nodes {
            if node.placed {
                continue;
            }
            if let Some(&position) = carried.get(&node.id) {
                node.position = position;
                node.placed = true;
            }
        }

        self.place_unplaced_nodes();
        self.state = SimulationState::hot();
        tracing::debug!(
            nodes = self.graph.node_count(),
            carried = carried.len(),
            "simulation restarted with new graph"
        );
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        self.config = config.validated();
        self.reheat(self.state.alpha.max(DEFAULT_REHEAT_ALPHA));
    }

    pub fn state(&self) -> SimulationState {
        self.state
    }

    pub fn alpha(&self) -> f32 {
        self.state.alpha
    }

    pub fn is_running(&self) -> bool {
        self.state.running
    }

    pub fn reheat(&mut self, alpha: f32) {
        self.state.alpha = if alpha.is_finite() { alpha.max(0.0) } else { 1.0 };
        self.state.running = true;
        tracing::debug!(alpha = self.state.alpha, "simulation reheated");
    }

    /// Fixes a node at `(x, y)` and reheats so neighbours react. Returns
    /// `false` when the id is unknown or the position is not finite.
    pub fn pin(&mut self, node_id: &str, x: f32, y: f32) -> bool {
        let target = vec2(x, y);
        if !target.is_finite() {
            return false;
        }
        let Some(node) = self.graph.get_mut(node_id) else {
            tracing::debug!(node_id, "pin ignored for unknown node");
            return false;
        };

        node.fixed = Some(target);
        node.position = target;
        node.velocity = Vec2::ZERO;
        node.placed = true;

        // Pinning never cools an already hotter layout.
        self.reheat(self.state.alpha.max(DEFAULT_REHEAT_ALPHA));
        true
    }

    /// Releases a pinned node. Alpha keeps decaying from where it is.
    pub fn unpin(&mut self, node_id: &str) -> bool {
        let Some(node) = self.graph.get_mut(node_id) else {
            tracing::debug!(node_id, "unpin ignored for unknown node");
            return false;
        };
        node.fixed.take().is_some()
    }

    /// Advances the layout by one step of `dt` (1.0 = one nominal frame).
    /// Does nothing once the simulation has cooled below `alpha_min`.
    pub fn tick(&mut self, dt: f32) {
        if !self.state.running || !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let node_count = self.graph.nodes.len();
        let alpha = self.state.alpha;
        let config = self.config;

        let Scratch { positions, forces } = &mut self.scratch;
        positions.clear();
        positions.extend(self.graph.nodes.iter().map(|node| node.position));
        forces.clear();
        forces.resize(node_count, Vec2::ZERO);

        let repulsion = -config.charge_strength * alpha;
        if node_count > config.barnes_hut_threshold {
            if let Some(tree) = QuadTree::build(positions) {
                for (index, force) in forces.iter_mut().enumerate() {
                    accumulate_repulsion_for_node(
                        &tree,
                        index,
                        positions,
                        repulsion,
                        config.theta,
                        force,
                    );
                }
            }
        } else {
            accumulate_repulsion_pairwise(positions, repulsion, forces);
        }

        accumulate_links(
            &self.graph.links,
            positions,
            LinkParams {
                distance: config.link_distance,
                strength: config.link_strength,
            },
            alpha,
            forces,
        );
        accumulate_centering(
            positions,
            config.center(),
            config.center_strength * alpha,
            forces,
        );

        for (node, force) in self.graph.nodes.iter_mut().zip(forces.iter()) {
            if let Some(fixed) = node.fixed {
                node.position = fixed;
                node.velocity = Vec2::ZERO;
                continue;
            }

            let velocity = (node.velocity + finite_or_zero(*force) * dt) * config.velocity_decay;
            let position = node.position + velocity * dt;
            if velocity.is_finite() && position.is_finite() {
                node.velocity = velocity;
                node.position = position;
            } else {
                node.velocity = Vec2::ZERO;
            }
        }

        self.state.alpha *= 1.0 - config.alpha_decay;
        if self.state.alpha < config.alpha_min {
            self.state.running = false;
            tracing::debug!(alpha = self.state.alpha, "layout settled");
        }
    }

    /// Phyllotaxis placement around the configured center with a small
    /// per-id jitter, so the same snapshot always starts the same way.
    fn place_unplaced_nodes(&mut self) {
        let center = self.config.center();
        let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());
        for (index, node) in self.graph.nodes.iter_mut().enumerate() {
            node.velocity = Vec2::ZERO;
            node.fixed = None;
            if node.placed {
                continue;
            }

            let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
            let angle = index as f32 * golden_angle;
            let (jx, jy) = stable_pair(&node.id);
            node.position =
                center + vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy) * INITIAL_JITTER;
            node.placed = true;
        }
    }
}
