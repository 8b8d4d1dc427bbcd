mod load;
mod model;
mod provider;

pub use load::{LoadIssue, RawLink, RawNode, RawTopology, load, parse_topology};
pub use model::{Graph, Link, Node};
pub use provider::{FeedEvent, FileTopologyProvider, Snapshot, SnapshotFeed, TopologyProvider};
