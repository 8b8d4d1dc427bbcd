use crate::interaction::ViewTransform;
use crate::topology::Graph;
use crate::visibility::Visibility;

/// Node draw instruction in simulation coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeDraw<'a> {
    pub node_id: &'a str,
    pub x: f32,
    pub y: f32,
    pub opacity: f32,
    pub radius: f32,
    /// Display label: the name, or the id for unnamed nodes.
    pub name: &'a str,
    pub entity_type: &'a str,
    pub status: &'a str,
    pub pinned: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LinkDraw<'a> {
    pub link_id: &'a str,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub opacity: f32,
}

/// Everything a renderer needs for one tick, in graph order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame<'a> {
    pub nodes: Vec<NodeDraw<'a>>,
    pub links: Vec<LinkDraw<'a>>,
}

impl<'a> Frame<'a> {
    pub fn build(graph: &'a Graph, visibility: &Visibility) -> Self {
        let nodes = graph
            .nodes()
            .iter()
            .map(|node| NodeDraw {
                node_id: &node.id,
                x: node.position.x,
                y: node.position.y,
                opacity: visibility.node(&node.id),
                radius: node.radius,
                name: node.label(),
                entity_type: &node.entity_type,
                status: &node.status,
                pinned: node.is_pinned(),
            })
            .collect();

        let links = graph
            .links()
            .iter()
            .map(|link| {
                let (source, target) = link.endpoints();
                let from = graph.nodes()[source].position;
                let to = graph.nodes()[target].position;
                LinkDraw {
                    link_id: &link.id,
                    x1: from.x,
                    y1: from.y,
                    x2: to.x,
                    y2: to.y,
                    opacity: visibility.link(&link.id),
                }
            })
            .collect();

        Self { nodes, links }
    }
}

/// Consumer of per-tick draw output. Applies `transform` to map simulation
/// coordinates onto its drawing surface.
pub trait RenderAdapter {
    fn render(&mut self, frame: &Frame<'_>, transform: &ViewTransform);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{RawLink, RawNode, load};
    use crate::visibility::{FilterState, HighlightState, resolve_visibility};

    #[test]
    fn frame_follows_graph_order_and_positions() {
        let nodes = ["a", "b", "c"].map(|id| RawNode {
            id: id.to_owned(),
            x: Some(id.len() as f32),
            y: Some(2.0),
            ..Default::default()
        });
        let links = [RawLink {
            source: "c".to_owned(),
            target: "a".to_owned(),
            ..Default::default()
        }];
        let (graph, _) = load(&nodes, &links);
        let visibility = resolve_visibility(
            &graph,
            &FilterState::default(),
            &HighlightState {
                active_node_id: Some("b".to_owned()),
            },
        );

        let frame = Frame::build(&graph, &visibility);

        let ids = frame.nodes.iter().map(|node| node.node_id).collect::<Vec<_>>();
        assert_eq!(ids, vec!["a", "b", "c"]);
        assert_eq!(frame.nodes[0].opacity, 0.2);
        assert_eq!(frame.nodes[1].opacity, 1.0);
        assert_eq!(frame.links[0].link_id, "c->a");
        assert_eq!((frame.links[0].x1, frame.links[0].y2), (1.0, 2.0));
        assert_eq!(frame.links[0].opacity, 0.2);
    }
}
