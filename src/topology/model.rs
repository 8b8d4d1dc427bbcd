use std::collections::{BTreeSet, HashMap};

use eframe::egui::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub id: String,
    pub entity_type: String,
    pub status: String,
    pub name: String,
    pub ip: Option<String>,
    pub position: Vec2,
    pub velocity: Vec2,
    /// Pinned position. While set, the simulator copies it into `position`
    /// instead of integrating.
    pub fixed: Option<Vec2>,
    pub radius: f32,
    pub(crate) placed: bool,
}

impl Node {
    /// Name for display; unnamed nodes show their id.
    pub fn label(&self) -> &str {
        if self.name.is_empty() { &self.id } else { &self.name }
    }

    pub fn is_pinned(&self) -> bool {
        self.fixed.is_some()
    }

    /// Whether the node already has a position, either seeded by the
    /// snapshot or assigned by a previous layout.
    pub fn is_placed(&self) -> bool {
        self.placed
    }
}

/// Links refer to nodes by id; `source`/`target` are the resolved arena
/// indices of those ids in the owning [`Graph`].
#[derive(Clone, Debug, PartialEq)]
pub struct Link {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    pub weight: Option<f32>,
    pub(crate) source: usize,
    pub(crate) target: usize,
}

impl Link {
    pub fn endpoints(&self) -> (usize, usize) {
        (self.source, self.target)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }

    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }
}

/// Referentially consistent node/link set. Nodes live in an arena addressed
/// through `index_by_id`; every link endpoint is guaranteed to exist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) index_by_id: HashMap<String, usize>,
    pub(crate) links: Vec<Link>,
}

impl Graph {
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Node> {
        let index = self.index_of(id)?;
        self.nodes.get_mut(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn entity_types(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| node.entity_type.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn statuses(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| node.status.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn degree(&self, id: &str) -> usize {
        self.links.iter().filter(|link| link.touches(id)).count()
    }
}
