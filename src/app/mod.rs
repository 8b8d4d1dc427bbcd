use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui::{self, Context};
use soc_topology::topology::{FeedEvent, SnapshotFeed, TopologyProvider};
use soc_topology::{SimulationConfig, TopologySession, ViewConfig};

mod graph;
mod render_utils;
mod ui;

pub struct TopologyViewerApp {
    feed: SnapshotFeed,
    state: AppState,
    config: SimulationConfig,
    view: ViewConfig,
    watch_interval: Option<Duration>,
    last_request: Instant,
}

enum AppState {
    Loading,
    Ready(Box<ViewModel>),
    Error(String),
}

/// Everything behind the panels once a first snapshot has arrived.
struct ViewModel {
    session: TopologySession,
    selected: Option<String>,
    search_suggestions: Vec<String>,
    suggestions_for: Option<(String, u64)>,
    last_error: Option<String>,
    visible_node_count: usize,
    visible_link_count: usize,
}

impl TopologyViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        provider: Arc<dyn TopologyProvider>,
        config: SimulationConfig,
        view: ViewConfig,
        watch_interval: Option<Duration>,
    ) -> Self {
        let mut feed = SnapshotFeed::new(provider);
        feed.request();
        Self {
            feed,
            state: AppState::Loading,
            config,
            view,
            watch_interval,
            last_request: Instant::now(),
        }
    }

    fn request_reload(&mut self) {
        if !self.feed.is_loading() {
            self.feed.request();
            self.last_request = Instant::now();
        }
    }

    fn receive_snapshots(&mut self) {
        let Some(event) = self.feed.poll_latest() else {
            return;
        };

        match event {
            FeedEvent::Loaded(snapshot) => {
                if let AppState::Ready(model) = &mut self.state {
                    model.last_error = None;
                    model.session.offer(snapshot.graph, snapshot.issues);
                } else {
                    let mut session = TopologySession::new(self.config, self.view);
                    session.offer(snapshot.graph, snapshot.issues);
                    self.state = AppState::Ready(Box::new(ViewModel::new(session)));
                }
            }
            FeedEvent::Failed { error, .. } => {
                if let AppState::Ready(model) = &mut self.state {
                    tracing::error!(%error, "topology refresh failed; keeping the current graph");
                    model.last_error = Some(error);
                } else {
                    tracing::error!(%error, "topology load failed");
                    self.state = AppState::Error(error);
                }
            }
        }
    }
}

impl eframe::App for TopologyViewerApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.receive_snapshots();

        if let Some(interval) = self.watch_interval {
            if self.last_request.elapsed() >= interval {
                self.request_reload();
            }
            ctx.request_repaint_after(interval);
        }

        let mut reload_requested = false;
        let is_loading = self.feed.is_loading();
        let source = self.feed.describe();

        match &mut self.state {
            AppState::Loading => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading network topology...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load network topology");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        reload_requested = true;
                    }
                });
            }
            AppState::Ready(model) => {
                model.show(ctx, &source, &mut reload_requested, is_loading);
            }
        }

        if reload_requested {
            if matches!(self.state, AppState::Error(_)) {
                self.state = AppState::Loading;
            }
            self.request_reload();
        }

        if is_loading {
            ctx.request_repaint();
        }
    }
}
