use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Context, Result};

use super::load::{LoadIssue, RawTopology, load, parse_topology};
use super::model::Graph;

/// Source of full topology snapshots. Implementations may block; they are
/// always called from a worker thread.
pub trait TopologyProvider: Send + Sync {
    fn fetch(&self) -> Result<RawTopology>;

    fn describe(&self) -> String;
}

pub struct FileTopologyProvider {
    path: PathBuf,
}

impl FileTopologyProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TopologyProvider for FileTopologyProvider {
    fn fetch(&self) -> Result<RawTopology> {
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read topology file {}", self.path.display()))?;
        parse_topology(&raw)
            .with_context(|| format!("failed to parse topology file {}", self.path.display()))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// A loaded snapshot, ready to hand to the session.
#[derive(Debug)]
pub struct Snapshot {
    pub sequence: u64,
    pub graph: Graph,
    pub issues: Vec<LoadIssue>,
}

pub enum FeedEvent {
    Loaded(Snapshot),
    Failed { sequence: u64, error: String },
}

/// Runs provider fetches on worker threads and hands back whole graphs.
/// Draining keeps only the most recently completed result.
pub struct SnapshotFeed {
    provider: Arc<dyn TopologyProvider>,
    tx: Sender<FeedEvent>,
    rx: Receiver<FeedEvent>,
    next_sequence: u64,
    in_flight: usize,
}

impl SnapshotFeed {
    pub fn new(provider: Arc<dyn TopologyProvider>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            provider,
            tx,
            rx,
            next_sequence: 0,
            in_flight: 0,
        }
    }

    pub fn describe(&self) -> String {
        self.provider.describe()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn request(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.in_flight += 1;

        let provider = Arc::clone(&self.provider);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let event = match provider.fetch() {
                Ok(raw) => {
                    let (graph, issues) = load(&raw.nodes, &raw.links);
                    FeedEvent::Loaded(Snapshot {
                        sequence,
                        graph,
                        issues,
                    })
                }
                Err(error) => FeedEvent::Failed {
                    sequence,
                    error: format!("{error:#}"),
                },
            };
            let _ = tx.send(event);
        });

        tracing::debug!(sequence, source = %self.provider.describe(), "topology fetch requested");
        sequence
    }

    /// Returns the event that completed last since the previous poll.
    /// Results that completed before it are discarded whole, whatever order
    /// they were requested in.
    pub fn poll_latest(&mut self) -> Option<FeedEvent> {
        let mut latest: Option<FeedEvent> = None;
        while let Ok(event) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            if let Some(superseded) = latest.replace(event) {
                tracing::debug!(
                    sequence = event_sequence(&superseded),
                    "discarding superseded topology result"
                );
            }
        }
        latest
    }
}

fn event_sequence(event: &FeedEvent) -> u64 {
    match event {
        FeedEvent::Loaded(snapshot) => snapshot.sequence,
        FeedEvent::Failed { sequence, .. } => *sequence,
    }
}
