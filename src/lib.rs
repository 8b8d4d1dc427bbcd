//! Force-directed layout core for the network topology view: graph model,
//! physics integration, pointer/zoom interaction and opacity resolution.

pub mod frame;
pub mod interaction;
pub mod session;
pub mod sim;
pub mod topology;
pub mod util;
pub mod visibility;

pub use frame::{Frame, LinkDraw, NodeDraw, RenderAdapter};
pub use interaction::{Command, DragState, InteractionController, ViewConfig, ViewTransform};
pub use session::TopologySession;
pub use sim::{DEFAULT_REHEAT_ALPHA, ForceSimulator, SimulationConfig, SimulationState};
pub use topology::{Graph, Link, LoadIssue, Node, load};
pub use visibility::{
    DIMMED_OPACITY, FULL_OPACITY, FilterState, HighlightState, Visibility, resolve_visibility,
};
