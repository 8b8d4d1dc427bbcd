use eframe::egui::Vec2;

use crate::frame::{Frame, RenderAdapter};
use crate::interaction::{Command, InteractionController, ViewConfig, ViewTransform};
use crate::sim::{DEFAULT_REHEAT_ALPHA, ForceSimulator, SimulationConfig};
use crate::topology::{Graph, LoadIssue};
use crate::visibility::{FilterState, HighlightState, Visibility, resolve_visibility};

/// Owns every piece of mutable topology-view state and is its only writer.
/// Input becomes [`Command`]s; new snapshots wait in a single pending slot
/// and are swapped in at the start of the next [`TopologySession::advance`].
pub struct TopologySession {
    simulator: ForceSimulator,
    controller: InteractionController,
    filters: FilterState,
    highlight: HighlightState,
    transform: ViewTransform,
    visibility: Visibility,
    visibility_dirty: bool,
    pending: Option<(Graph, Vec<LoadIssue>)>,
    issues: Vec<LoadIssue>,
    revision: u64,
}

impl TopologySession {
    pub fn new(config: SimulationConfig, view: ViewConfig) -> Self {
        Self {
            simulator: ForceSimulator::start(Graph::default(), config),
            controller: InteractionController::new(view),
            filters: FilterState::default(),
            highlight: HighlightState::default(),
            transform: ViewTransform::IDENTITY,
            visibility: Visibility::default(),
            visibility_dirty: true,
            pending: None,
            issues: Vec::new(),
            revision: 0,
        }
    }

    /// Queues a freshly loaded graph. A graph still waiting here is
    /// discarded whole in favour of the newer one.
    pub fn offer(&mut self, graph: Graph, issues: Vec<LoadIssue>) {
        if let Some((superseded, _)) = self.pending.replace((graph, issues)) {
            tracing::debug!(
                nodes = superseded.node_count(),
                "discarding superseded topology snapshot"
            );
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Swaps in the pending graph (if any), steps the layout once and
    /// refreshes opacities when their inputs changed.
    pub fn advance(&mut self, dt: f32) {
        self.apply_pending();
        self.simulator.tick(dt);
        self.refresh_visibility();
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame::build(self.simulator.graph(), &self.visibility)
    }

    pub fn render_with(&mut self, dt: f32, adapter: &mut impl RenderAdapter) {
        self.advance(dt);
        adapter.render(&self.frame(), &self.transform);
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::Pin { node_id, x, y } => {
                self.simulator.pin(&node_id, x, y);
            }
            Command::Unpin { node_id } => {
                self.simulator.unpin(&node_id);
            }
            Command::Reheat { alpha } => self.simulator.reheat(alpha),
            Command::SetFilter(filters) => {
                if filters != self.filters {
                    self.filters = filters;
                    self.visibility_dirty = true;
                    self.simulator
                        .reheat(self.simulator.alpha().max(DEFAULT_REHEAT_ALPHA));
                }
            }
            Command::SetHighlight(active_node_id) => {
                if active_node_id != self.highlight.active_node_id {
                    self.highlight.active_node_id = active_node_id;
                    self.visibility_dirty = true;
                }
            }
            Command::SetTransform(transform) => {
                if transform.scale.is_finite() && transform.translate.is_finite() {
                    self.transform = ViewTransform {
                        scale: self.controller.config().clamp_scale(transform.scale),
                        translate: transform.translate,
                    };
                }
            }
        }
    }

    pub fn apply_all(&mut self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.apply(command);
        }
    }

    pub fn pointer_down(&mut self, hit: Option<&str>, pointer: Vec2) {
        let commands = self.controller.pointer_down(hit, pointer, &self.transform);
        self.apply_all(commands);
    }

    pub fn pointer_move(&mut self, pointer: Vec2) {
        let commands = self.controller.pointer_move(pointer, &self.transform);
        self.apply_all(commands);
    }

    pub fn pointer_up(&mut self) {
        let commands = self.controller.pointer_up();
        self.apply_all(commands);
    }

    /// Wheel or pinch input, consumed as a multiplicative scale delta.
    /// With an anchor the point under it stays put.
    pub fn wheel(&mut self, delta_scale: f32, anchor: Option<Vec2>) {
        let command = match anchor {
            Some(anchor) => self.controller.zoom_at(delta_scale, anchor, &self.transform),
            None => self.controller.zoom_by(delta_scale, &self.transform),
        };
        self.apply(command);
    }

    pub fn zoom_by(&mut self, factor: f32) {
        self.wheel(factor, None);
    }

    pub fn reset_zoom(&mut self) {
        let command = self.controller.reset_zoom();
        self.apply(command);
    }

    pub fn hover(&mut self, node_id: Option<&str>) {
        if let Some(command) = self.controller.hover(node_id) {
            self.apply(command);
        }
    }

    pub fn set_filter(&mut self, filters: FilterState) {
        self.apply(Command::SetFilter(filters));
    }

    pub fn set_config(&mut self, config: SimulationConfig) {
        self.simulator.set_config(config);
    }

    pub fn graph(&self) -> &Graph {
        self.simulator.graph()
    }

    pub fn simulator(&self) -> &ForceSimulator {
        &self.simulator
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn transform(&self) -> &ViewTransform {
        &self.transform
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    /// Issues reported while loading the graph currently on screen.
    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    /// Bumped each time a new graph is swapped in.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_animating(&self) -> bool {
        self.simulator.is_running() || self.controller.is_interacting()
    }

    fn apply_pending(&mut self) {
        let Some((graph, issues)) = self.pending.take() else {
            return;
        };

        tracing::info!(
            nodes = graph.node_count(),
            links = graph.link_count(),
            issues = issues.len(),
            "applying topology snapshot"
        );

        // A drag on a surviving node keeps its pin across the swap.
        let mut carried_pin = None;
        if let Some(node_id) = self.controller.dragged_node().map(str::to_owned) {
            if graph.get(&node_id).is_none() {
                self.controller.cancel_drag();
            } else {
                carried_pin = self
                    .simulator
                    .graph()
                    .get(&node_id)
                    .and_then(|node| node.fixed)
                    .map(|fixed| (node_id, fixed));
            }
        }

        let highlight_gone = self
            .highlight
            .active_node_id
            .as_deref()
            .is_some_and(|id| graph.get(id).is_none());

        self.simulator.replace_graph(graph);
        if let Some((node_id, fixed)) = carried_pin {
            self.simulator.pin(&node_id, fixed.x, fixed.y);
        }
        self.issues = issues;
        self.revision = self.revision.wrapping_add(1);
        self.visibility_dirty = true;

        if highlight_gone {
            self.hover(None);
            self.highlight.active_node_id = None;
        }
    }

    fn refresh_visibility(&mut self) {
        if !self.visibility_dirty {
            return;
        }
        self.visibility = resolve_visibility(self.simulator.graph(), &self.filters, &self.highlight);
        self.visibility_dirty = false;
    }
}
