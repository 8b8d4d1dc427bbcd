use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::vec2;
use soc_topology::topology::{FeedEvent, FileTopologyProvider, SnapshotFeed, parse_topology};
use soc_topology::{
    DIMMED_OPACITY, FULL_OPACITY, FilterState, LoadIssue, SimulationConfig, TopologySession,
    ViewConfig, load,
};

const SNAPSHOT: &str = r#"{
  "data": {
    "nodes": [
      { "id": "fw-1", "name": "Edge firewall", "type": "firewall", "status": "online", "ip": "10.0.0.1" },
      { "id": "srv-1", "name": "Mail server", "type": "server", "status": "compromised", "ip": "10.0.1.5" },
      { "id": "srv-2", "name": "File server", "type": "server", "status": "online" },
      { "id": "ws-1", "name": "Analyst workstation", "type": "workstation", "status": "offline" },
      { "id": "srv-1", "name": "Duplicate", "type": "server", "status": "online" }
    ],
    "edges": [
      { "source": "fw-1", "target": "srv-1", "value": 3 },
      { "source": "fw-1", "target": "srv-2" },
      { "source": "srv-2", "target": "ws-1" },
      { "source": "ws-1", "target": "printer-9" }
    ]
  }
}"#;

fn temp_topology_file(contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("soc-topology-{}.json", std::process::id()));
    std::fs::write(&path, contents).expect("write temp topology");
    path
}

fn session_from(raw: &str) -> TopologySession {
    let topology = parse_topology(raw).expect("snapshot parses");
    let (graph, issues) = load(&topology.nodes, &topology.links);
    let mut session = TopologySession::new(SimulationConfig::default(), ViewConfig::default());
    session.offer(graph, issues);
    session.advance(1.0);
    session
}

#[test]
fn enveloped_snapshot_loads_with_issues_reported() {
    let session = session_from(SNAPSHOT);

    assert_eq!(session.graph().node_count(), 4);
    assert_eq!(session.graph().link_count(), 3);
    assert_eq!(session.graph().get("srv-1").map(|node| node.name.as_str()), Some("Mail server"));

    let issues = session.issues();
    assert_eq!(issues.len(), 2);
    assert!(matches!(&issues[0], LoadIssue::DuplicateNode { id, index: 4 } if id == "srv-1"));
    assert!(matches!(
        &issues[1],
        LoadIssue::DanglingLink { missing, .. } if missing == "printer-9"
    ));
}

#[test]
fn layout_cools_down_and_stays_finite() {
    let mut session = session_from(SNAPSHOT);

    for _ in 0..400 {
        session.advance(1.0);
    }

    assert!(!session.simulator().is_running());
    let positions = session
        .frame()
        .nodes
        .iter()
        .map(|node| vec2(node.x, node.y))
        .collect::<Vec<_>>();
    assert!(positions.iter().all(|position| position.is_finite()));

    let min_x = positions.iter().map(|p| p.x).fold(f32::INFINITY, f32::min);
    let max_x = positions.iter().map(|p| p.x).fold(f32::NEG_INFINITY, f32::max);
    let min_y = positions.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
    let max_y = positions.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
    assert!((max_x - min_x).max(max_y - min_y) > 10.0);
}

#[test]
fn status_filter_dims_everything_else() {
    let mut session = session_from(SNAPSHOT);

    session.set_filter(FilterState {
        statuses: BTreeSet::from(["compromised".to_owned()]),
        ..Default::default()
    });
    session.advance(1.0);

    let frame = session.frame();
    for node in &frame.nodes {
        let expected = if node.node_id == "srv-1" {
            FULL_OPACITY
        } else {
            DIMMED_OPACITY
        };
        assert_eq!(node.opacity, expected, "opacity of {}", node.node_id);
    }
    assert!(session.simulator().is_running());
}

#[test]
fn wheel_zoom_is_clamped_and_keeps_the_anchor_in_place() {
    let mut session = session_from(SNAPSHOT);
    let anchor = vec2(120.0, -40.0);
    let before = session.transform().to_simulation(anchor);

    session.wheel(1.5, Some(anchor));
    let after = session.transform().to_simulation(anchor);
    assert!((before - after).length() < 1e-3);
    assert_eq!(session.transform().scale, 1.5);

    for _ in 0..40 {
        session.wheel(0.5, Some(anchor));
    }
    assert_eq!(session.transform().scale, 0.1);

    for _ in 0..40 {
        session.wheel(2.0, None);
    }
    assert_eq!(session.transform().scale, 4.0);
}

#[test]
fn file_feed_delivers_a_loaded_snapshot() {
    let path = temp_topology_file(SNAPSHOT);
    let mut feed = SnapshotFeed::new(Arc::new(FileTopologyProvider::new(path.clone())));
    feed.request();

    let deadline = Instant::now() + Duration::from_secs(5);
    let mut delivered = None;
    while delivered.is_none() && Instant::now() < deadline {
        delivered = feed.poll_latest();
        std::thread::sleep(Duration::from_millis(5));
    }
    let _ = std::fs::remove_file(&path);

    let Some(FeedEvent::Loaded(snapshot)) = delivered else {
        panic!("expected a loaded snapshot");
    };
    assert_eq!(snapshot.graph.node_count(), 4);
    assert_eq!(snapshot.issues.len(), 2);
    assert!(!feed.is_loading());
}
