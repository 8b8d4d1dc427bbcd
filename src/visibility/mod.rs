//! Per-node and per-link opacity from filter criteria and hover highlight.
//!
//! A node's opacity is the minimum of its filter opacity and its highlight
//! opacity; a link takes the minimum of its two endpoints.

mod neighbors;

use std::collections::{BTreeSet, HashMap};

use crate::topology::{Graph, Node};
use crate::util::contains_ignore_case;

use neighbors::one_hop_neighbors;

pub const FULL_OPACITY: f32 = 1.0;
pub const DIMMED_OPACITY: f32 = 0.2;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FilterState {
    /// Empty means every type passes.
    pub entity_types: BTreeSet<String>,
    /// Empty means every status passes.
    pub statuses: BTreeSet<String>,
    /// Case-insensitive substring over name and ip, used as typed. Empty
    /// means no search.
    pub search: String,
}

impl FilterState {
    pub fn is_active(&self) -> bool {
        !self.entity_types.is_empty() || !self.statuses.is_empty() || !self.search.is_empty()
    }

    pub fn matches(&self, node: &Node) -> bool {
        if !self.entity_types.is_empty() && !self.entity_types.contains(&node.entity_type) {
            return false;
        }
        if !self.statuses.is_empty() && !self.statuses.contains(&node.status) {
            return false;
        }

        if self.search.is_empty() {
            return true;
        }
        let query = self.search.to_lowercase();
        contains_ignore_case(&node.name, &query)
            || node
                .ip
                .as_deref()
                .is_some_and(|ip| contains_ignore_case(ip, &query))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HighlightState {
    pub active_node_id: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Visibility {
    pub node_opacity: HashMap<String, f32>,
    pub link_opacity: HashMap<String, f32>,
}

impl Visibility {
    pub fn node(&self, id: &str) -> f32 {
        self.node_opacity.get(id).copied().unwrap_or(FULL_OPACITY)
    }

    pub fn link(&self, id: &str) -> f32 {
        self.link_opacity.get(id).copied().unwrap_or(FULL_OPACITY)
    }
}

/// Pure and order independent: identical inputs give identical maps. A
/// highlight naming a node that is not in the graph is treated as no
/// highlight.
pub fn resolve_visibility(
    graph: &Graph,
    filters: &FilterState,
    highlight: &HighlightState,
) -> Visibility {
    let related = highlight
        .active_node_id
        .as_deref()
        .and_then(|id| graph.index_of(id))
        .map(|index| one_hop_neighbors(graph, index));

    let by_index = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| {
            let filter_opacity = if filters.matches(node) {
                FULL_OPACITY
            } else {
                DIMMED_OPACITY
            };
            let highlight_opacity = match &related {
                Some(related) if !related.contains(&index) => DIMMED_OPACITY,
                _ => FULL_OPACITY,
            };
            filter_opacity.min(highlight_opacity)
        })
        .collect::<Vec<_>>();

    let link_opacity = graph
        .links()
        .iter()
        .map(|link| {
            let (source, target) = link.endpoints();
            (link.id.clone(), by_index[source].min(by_index[target]))
        })
        .collect();

    let node_opacity = graph
        .nodes()
        .iter()
        .zip(by_index)
        .map(|(node, opacity)| (node.id.clone(), opacity))
        .collect();

    Visibility {
        node_opacity,
        link_opacity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{RawLink, RawNode, load};

    fn raw_node(id: &str, entity_type: &str, status: &str, ip: Option<&str>) -> RawNode {
        RawNode {
            id: id.to_owned(),
            name: format!("{id}-host"),
            entity_type: entity_type.to_owned(),
            status: status.to_owned(),
            ip: ip.map(str::to_owned),
            ..Default::default()
        }
    }

    fn raw_link(source: &str, target: &str) -> RawLink {
        RawLink {
            source: source.to_owned(),
            target: target.to_owned(),
            ..Default::default()
        }
    }

    fn chain() -> Graph {
        let nodes = [
            raw_node("A", "server", "online", Some("10.0.0.5")),
            raw_node("B", "router", "online", None),
            raw_node("C", "switch", "degraded", Some("10.0.1.9")),
        ];
        load(&nodes, &[raw_link("A", "B"), raw_link("B", "C")]).0
    }

    fn types(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|value| (*value).to_owned()).collect()
    }

    #[test]
    fn type_filter_dims_other_types() {
        let graph = chain();
        let filters = FilterState {
            entity_types: types(&["server"]),
            ..Default::default()
        };

        let visibility = resolve_visibility(&graph, &filters, &HighlightState::default());

        assert_eq!(visibility.node("A"), 1.0);
        assert_eq!(visibility.node("B"), 0.2);
        assert_eq!(visibility.node("C"), 0.2);
    }

    #[test]
    fn highlight_does_not_brighten_filtered_nodes() {
        let graph = chain();
        let filters = FilterState {
            entity_types: types(&["server"]),
            ..Default::default()
        };
        let highlight = HighlightState {
            active_node_id: Some("B".to_owned()),
        };

        let visibility = resolve_visibility(&graph, &filters, &highlight);

        assert_eq!(visibility.node("A"), 1.0);
        assert_eq!(visibility.node("B"), 0.2);
        assert_eq!(visibility.node("C"), 0.2);
    }

    #[test]
    fn highlight_dims_nodes_outside_one_hop() {
        let graph = chain();
        let highlight = HighlightState {
            active_node_id: Some("A".to_owned()),
        };

        let visibility = resolve_visibility(&graph, &FilterState::default(), &highlight);

        assert_eq!(visibility.node("A"), 1.0);
        assert_eq!(visibility.node("B"), 1.0);
        assert_eq!(visibility.node("C"), 0.2);
        assert_eq!(visibility.link("A->B"), 1.0);
        assert_eq!(visibility.link("B->C"), 0.2);
    }

    #[test]
    fn unknown_highlight_is_ignored() {
        let graph = chain();
        let highlight = HighlightState {
            active_node_id: Some("gone".to_owned()),
        };

        let visibility = resolve_visibility(&graph, &FilterState::default(), &highlight);

        assert!(visibility.node_opacity.values().all(|opacity| *opacity == 1.0));
    }

    #[test]
    fn search_matches_name_or_ip_case_insensitively() {
        let graph = chain();
        let by_ip = FilterState {
            search: "10.0.1".to_owned(),
            ..Default::default()
        };
        let by_name = FilterState {
            search: "a-HOST".to_owned(),
            ..Default::default()
        };

        let ip_visibility = resolve_visibility(&graph, &by_ip, &HighlightState::default());
        let name_visibility = resolve_visibility(&graph, &by_name, &HighlightState::default());

        assert_eq!(ip_visibility.node("C"), 1.0);
        assert_eq!(ip_visibility.node("A"), 0.2);
        assert_eq!(name_visibility.node("A"), 1.0);
        assert_eq!(name_visibility.node("B"), 0.2);
    }

    #[test]
    fn adding_constraints_never_raises_opacity() {
        let graph = chain();
        let baseline = resolve_visibility(&graph, &FilterState::default(), &HighlightState::default());
        let constrained = [
            FilterState {
                entity_types: types(&["router", "switch"]),
                ..Default::default()
            },
            FilterState {
                statuses: types(&["degraded"]),
                ..Default::default()
            },
            FilterState {
                search: "b-".to_owned(),
                ..Default::default()
            },
            FilterState {
                entity_types: types(&["switch"]),
                statuses: types(&["online"]),
                search: "10.".to_owned(),
            },
        ];

        for filters in &constrained {
            let visibility = resolve_visibility(&graph, filters, &HighlightState::default());
            for node in graph.nodes() {
                assert!(visibility.node(&node.id) <= baseline.node(&node.id));
            }
        }
    }

    #[test]
    fn links_take_the_dimmer_endpoint() {
        let graph = chain();
        let filters = FilterState {
            statuses: types(&["online"]),
            ..Default::default()
        };

        let visibility = resolve_visibility(&graph, &filters, &HighlightState::default());

        assert_eq!(visibility.link("A->B"), 1.0);
        assert_eq!(visibility.link("B->C"), 0.2);
    }

    #[test]
    fn resolving_twice_gives_identical_maps() {
        let graph = chain();
        let filters = FilterState {
            search: "host".to_owned(),
            statuses: types(&["online"]),
            ..Default::default()
        };
        let highlight = HighlightState {
            active_node_id: Some("C".to_owned()),
        };

        let first = resolve_visibility(&graph, &filters, &highlight);
        let second = resolve_visibility(&graph, &filters, &highlight);

        assert_eq!(first, second);
        for (id, opacity) in &first.node_opacity {
            assert_eq!(opacity.to_bits(), second.node_opacity[id].to_bits());
        }
    }

    #[test]
    fn whitespace_search_is_still_a_substring_filter() {
        let mut nodes = vec![
            raw_node("A", "server", "online", Some("10.0.0.5")),
            raw_node("B", "router", "online", None),
        ];
        nodes[1].name = "edge router".to_owned();
        let graph = load(&nodes, &[]).0;
        let filters = FilterState {
            search: " ".to_owned(),
            ..Default::default()
        };

        let visibility = resolve_visibility(&graph, &filters, &HighlightState::default());

        assert!(filters.is_active());
        assert_eq!(visibility.node("A"), DIMMED_OPACITY);
        assert_eq!(visibility.node("B"), FULL_OPACITY);
    }

    #[test]
    fn search_ignores_the_id_of_unnamed_nodes() {
        let graph = load(
            &[RawNode {
                id: "db-primary".to_owned(),
                ..Default::default()
            }],
            &[],
        )
        .0;
        let filters = FilterState {
            search: "primary".to_owned(),
            ..Default::default()
        };

        let visibility = resolve_visibility(&graph, &filters, &HighlightState::default());

        assert_eq!(visibility.node("db-primary"), DIMMED_OPACITY);
    }
}
