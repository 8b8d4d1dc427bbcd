use std::collections::HashSet;

use crate::topology::Graph;

/// The active node plus every node sharing a link with it. One pass over
/// the links; no transitive expansion.
pub(super) fn one_hop_neighbors(graph: &Graph, active_index: usize) -> HashSet<usize> {
    let mut related = HashSet::from([active_index]);

    for link in graph.links() {
        let (source, target) = link.endpoints();
        if source == active_index {
            related.insert(target);
        } else if target == active_index {
            related.insert(source);
        }
    }

    related
}
