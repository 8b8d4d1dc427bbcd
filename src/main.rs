mod app;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use soc_topology::topology::FileTopologyProvider;
use soc_topology::{SimulationConfig, ViewConfig};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON snapshot with `nodes` and `links` (or `edges`) arrays.
    #[arg(long)]
    topology: PathBuf,

    /// JSON file with simulation parameters; flags below take precedence.
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, allow_hyphen_values = true)]
    charge_strength: Option<f32>,
    #[arg(long)]
    link_distance: Option<f32>,
    #[arg(long)]
    link_strength: Option<f32>,
    #[arg(long)]
    center_strength: Option<f32>,
    #[arg(long)]
    velocity_decay: Option<f32>,
    #[arg(long)]
    alpha_decay: Option<f32>,
    #[arg(long)]
    alpha_min: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    center_x: Option<f32>,
    #[arg(long, allow_hyphen_values = true)]
    center_y: Option<f32>,
    #[arg(long)]
    theta: Option<f32>,
    #[arg(long)]
    barnes_hut_threshold: Option<usize>,

    #[arg(long)]
    min_scale: Option<f32>,
    #[arg(long)]
    max_scale: Option<f32>,

    /// Re-read the topology every N seconds.
    #[arg(long)]
    watch_secs: Option<u64>,
}

impl Args {
    fn simulation_config(&self) -> Result<SimulationConfig> {
        let mut config = match &self.config {
            Some(path) => SimulationConfig::from_json_file(path)?,
            None => SimulationConfig::default(),
        };

        let overrides = [
            (&mut config.charge_strength, self.charge_strength),
            (&mut config.link_distance, self.link_distance),
            (&mut config.link_strength, self.link_strength),
            (&mut config.center_strength, self.center_strength),
            (&mut config.velocity_decay, self.velocity_decay),
            (&mut config.alpha_decay, self.alpha_decay),
            (&mut config.alpha_min, self.alpha_min),
            (&mut config.center_x, self.center_x),
            (&mut config.center_y, self.center_y),
            (&mut config.theta, self.theta),
        ];
        for (field, value) in overrides {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(threshold) = self.barnes_hut_threshold {
            config.barnes_hut_threshold = threshold;
        }

        Ok(config.validated())
    }

    fn view_config(&self) -> ViewConfig {
        let defaults = ViewConfig::default();
        ViewConfig {
            min_scale: self.min_scale.unwrap_or(defaults.min_scale),
            max_scale: self.max_scale.unwrap_or(defaults.max_scale),
        }
        .validated()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("soc_topology=info")),
        )
        .init();

    let args = Args::parse();
    let config = args.simulation_config()?;
    let view = args.view_config();
    let watch_interval = args
        .watch_secs
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs);
    let provider = Arc::new(FileTopologyProvider::new(args.topology.clone()));

    tracing::info!(
        topology = %args.topology.display(),
        ?config,
        ?view,
        "starting topology viewer"
    );

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "soc-topology",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::TopologyViewerApp::new(
                cc,
                provider,
                config,
                view,
                watch_interval,
            )))
        }),
    )
    .map_err(|error| anyhow::anyhow!(error.to_string()))
}
