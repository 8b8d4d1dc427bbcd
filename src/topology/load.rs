use std::collections::HashMap;

use anyhow::{Context, Result};
use eframe::egui::{Vec2, vec2};
use serde::Deserialize;

use super::model::{Graph, Link, Node};

const MIN_NODE_RADIUS: f32 = 5.0;
const NODE_RADIUS_RANGE: f32 = 13.0;
const MIN_LINK_WEIGHT: f32 = 0.1;
const MAX_LINK_WEIGHT: f32 = 10.0;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub radius: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawLink {
    #[serde(default)]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(default)]
    pub value: Option<f32>,
}

/// Snapshot as delivered by a topology provider.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawTopology {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default, alias = "edges")]
    pub links: Vec<RawLink>,
}

/// Recoverable problem found while loading a snapshot. Loading always
/// continues with the valid subset.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum LoadIssue {
    #[error("duplicate node id `{id}` at position {index}; the first occurrence was kept")]
    DuplicateNode { id: String, index: usize },
    #[error("link `{link_id}` ({from} -> {to}) references missing node `{missing}`")]
    DanglingLink {
        link_id: String,
        from: String,
        to: String,
        missing: String,
    },
}

pub fn parse_topology(raw: &str) -> Result<RawTopology> {
    let parsed: serde_json::Value = serde_json::from_str(raw).context("invalid topology JSON")?;

    // Some backends wrap the snapshot in a `data` envelope.
    let body = match parsed.get("data") {
        Some(data) if data.get("nodes").is_some() => data.clone(),
        _ => parsed,
    };

    RawTopology::deserialize(body).context("topology JSON does not match the node/link contract")
}

/// Builds a [`Graph`] from raw provider input. Never fails: duplicate node
/// ids and links with missing endpoints are dropped and reported.
pub fn load(raw_nodes: &[RawNode], raw_links: &[RawLink]) -> (Graph, Vec<LoadIssue>) {
    let mut issues = Vec::new();
    let mut nodes = Vec::with_capacity(raw_nodes.len());
    let mut explicit_radii = Vec::with_capacity(raw_nodes.len());
    let mut index_by_id = HashMap::with_capacity(raw_nodes.len());

    for (position, raw) in raw_nodes.iter().enumerate() {
        if index_by_id.contains_key(&raw.id) {
            tracing::warn!(id = %raw.id, position, "dropping duplicate node");
            issues.push(LoadIssue::DuplicateNode {
                id: raw.id.clone(),
                index: position,
            });
            continue;
        }

        index_by_id.insert(raw.id.clone(), nodes.len());
        nodes.push(make_node(raw));
        explicit_radii.push(raw.radius.filter(|radius| radius.is_finite() && *radius > 0.0));
    }

    let mut links = Vec::with_capacity(raw_links.len());
    let mut id_uses: HashMap<String, usize> = HashMap::new();
    for raw in raw_links {
        let link_id = unique_link_id(raw, &mut id_uses);

        let source = index_by_id.get(&raw.source).copied();
        let target = index_by_id.get(&raw.target).copied();
        let (Some(source), Some(target)) = (source, target) else {
            let missing = if source.is_none() {
                raw.source.clone()
            } else {
                raw.target.clone()
            };
            tracing::warn!(link = %link_id, %missing, "dropping dangling link");
            issues.push(LoadIssue::DanglingLink {
                link_id,
                from: raw.source.clone(),
                to: raw.target.clone(),
                missing,
            });
            continue;
        };

        let weight = raw
            .value
            .filter(|value| value.is_finite())
            .map(|value| value.clamp(MIN_LINK_WEIGHT, MAX_LINK_WEIGHT));

        links.push(Link {
            id: link_id,
            source_id: raw.source.clone(),
            target_id: raw.target.clone(),
            weight,
            source,
            target,
        });
    }

    assign_degree_radii(&explicit_radii, &mut nodes, &links);

    (
        Graph {
            nodes,
            index_by_id,
            links,
        },
        issues,
    )
}

fn make_node(raw: &RawNode) -> Node {
    let seed = match (raw.x, raw.y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(vec2(x, y)),
        _ => None,
    };

    Node {
        id: raw.id.clone(),
        entity_type: raw.entity_type.clone(),
        status: raw.status.clone(),
        name: raw.name.clone(),
        ip: raw.ip.clone().filter(|ip| !ip.trim().is_empty()),
        position: seed.unwrap_or(Vec2::ZERO),
        velocity: Vec2::ZERO,
        fixed: None,
        radius: MIN_NODE_RADIUS,
        placed: seed.is_some(),
    }
}

fn unique_link_id(raw: &RawLink, id_uses: &mut HashMap<String, usize>) -> String {
    let base = raw
        .id
        .clone()
        .filter(|id| !id.is_empty())
        .unwrap_or_else(|| format!("{}->{}", raw.source, raw.target));

    let uses = id_uses.entry(base.clone()).or_insert(0);
    *uses += 1;
    if *uses == 1 {
        base
    } else {
        format!("{base}#{}", *uses - 1)
    }
}

fn assign_degree_radii(explicit: &[Option<f32>], nodes: &mut [Node], links: &[Link]) {
    let mut degrees = vec![0usize; nodes.len()];
    for link in links {
        degrees[link.source] += 1;
        if !link.is_self_loop() {
            degrees[link.target] += 1;
        }
    }
    let max_degree = degrees.iter().copied().max().unwrap_or(0);

    for (index, node) in nodes.iter_mut().enumerate() {
        node.radius = explicit
            .get(index)
            .copied()
            .flatten()
            .unwrap_or_else(|| degree_radius(degrees[index], max_degree));
    }
}

fn degree_radius(degree: usize, max_degree: usize) -> f32 {
    let max = ((max_degree + 1) as f32).ln();
    if max <= f32::EPSILON {
        return MIN_NODE_RADIUS;
    }
    MIN_NODE_RADIUS + (((degree + 1) as f32).ln() / max).clamp(0.0, 1.0) * NODE_RADIUS_RANGE
}
