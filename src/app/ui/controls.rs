use std::collections::BTreeSet;

use eframe::egui::{self, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use soc_topology::{Command, Graph, SimulationConfig, ViewTransform};

use super::super::ViewModel;

const SUGGESTION_LIMIT: usize = 8;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

/// Node ids ranked by the best fuzzy score over name, ip and id.
fn rank_suggestions(graph: &Graph, query: &str) -> Vec<String> {
    let matcher = SkimMatcherV2::default();
    let mut scored = graph
        .nodes()
        .iter()
        .filter_map(|node| {
            [Some(node.name.as_str()), node.ip.as_deref(), Some(node.id.as_str())]
                .into_iter()
                .flatten()
                .filter_map(|text| fuzzy_match_score(&matcher, text, query))
                .max()
                .map(|score| (score, node.id.clone()))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    scored.truncate(SUGGESTION_LIMIT);
    scored.into_iter().map(|(_, id)| id).collect()
}

/// Checkbox per value; an empty selection means "all values pass".
fn toggle_set(ui: &mut Ui, values: &[String], selected: &mut BTreeSet<String>) {
    ui.horizontal_wrapped(|ui| {
        for value in values {
            let mut checked = selected.contains(value);
            let label = if value.is_empty() { "(none)" } else { value };
            if ui.checkbox(&mut checked, label).changed() {
                if checked {
                    selected.insert(value.clone());
                } else {
                    selected.remove(value);
                }
            }
        }
    });
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Topology Controls");
        ui.separator();
        ui.add_space(4.0);

        let mut filters = self.session.filters().clone();

        ui.label("Search (name or IP)")
            .on_hover_text("Nodes that do not match are dimmed, never removed.");
        ui.text_edit_singleline(&mut filters.search);

        self.refresh_suggestions(&filters.search);
        let mut focus_request = None;
        for node_id in &self.search_suggestions {
            let Some(node) = self.session.graph().get(node_id) else {
                continue;
            };
            let label = match &node.ip {
                Some(ip) => format!("{}  ({ip})", node.label()),
                None => node.label().to_owned(),
            };
            if ui
                .selectable_label(self.selected.as_deref() == Some(node_id), label)
                .on_hover_text(node_id.as_str())
                .clicked()
            {
                focus_request = Some(node_id.clone());
            }
        }

        ui.separator();

        let graph = self.session.graph();
        let entity_types = graph.entity_types();
        let statuses = graph.statuses();

        ui.label(RichText::new("Entity types").strong());
        toggle_set(ui, &entity_types, &mut filters.entity_types);
        ui.add_space(4.0);
        ui.label(RichText::new("Statuses").strong());
        toggle_set(ui, &statuses, &mut filters.statuses);

        if ui
            .add_enabled(filters.is_active(), egui::Button::new("Clear filters"))
            .clicked()
        {
            filters = Default::default();
        }

        if &filters != self.session.filters() {
            self.session.set_filter(filters);
        }

        ui.separator();
        self.draw_physics_controls(ui);

        ui.separator();
        ui.horizontal_wrapped(|ui| {
            if ui.button("Zoom in").clicked() {
                self.session.zoom_by(1.25);
            }
            if ui.button("Zoom out").clicked() {
                self.session.zoom_by(0.8);
            }
            if ui.button("Reset view").clicked() {
                self.session.reset_zoom();
            }
        });
        ui.label(format!("scale: {:.2}", self.session.transform().scale));

        if let Some(node_id) = focus_request {
            self.focus_node(&node_id);
        }
    }

    fn draw_physics_controls(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Layout forces").strong());

        let mut config = *self.session.simulator().config();
        let mut changed = false;
        changed |= ui
            .add(egui::Slider::new(&mut config.charge_strength, -1200.0..=0.0).text("Charge"))
            .on_hover_text("Node repulsion; more negative spreads the graph.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.link_distance, 10.0..=400.0).text("Link distance"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.link_strength, 0.0..=2.0).text("Link strength"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.center_strength, 0.0..=1.0).text("Centering"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.velocity_decay, 0.05..=0.95).text("Velocity kept"))
            .on_hover_text("Fraction of velocity retained per step.")
            .changed();
        changed |= ui
            .add(egui::Slider::new(&mut config.theta, 0.3..=1.5).text("Barnes-Hut theta"))
            .changed();

        ui.horizontal(|ui| {
            if ui.button("Reheat layout").clicked() {
                self.session.apply(Command::Reheat { alpha: 1.0 });
            }
            if ui.button("Default forces").clicked() {
                config = SimulationConfig {
                    center_x: config.center_x,
                    center_y: config.center_y,
                    barnes_hut_threshold: config.barnes_hut_threshold,
                    ..SimulationConfig::default()
                };
                changed = true;
            }
        });

        if changed {
            self.session.set_config(config.validated());
        }
    }

    fn refresh_suggestions(&mut self, query: &str) {
        let query = query.trim();
        let revision = self.session.revision();
        if let Some((cached, cached_revision)) = &self.suggestions_for
            && cached == query
            && *cached_revision == revision
        {
            return;
        }

        self.search_suggestions = if query.is_empty() {
            Vec::new()
        } else {
            rank_suggestions(self.session.graph(), query)
        };
        self.suggestions_for = Some((query.to_owned(), revision));
    }

    /// Selects `node_id` and recenters the view on it at the current scale.
    pub(in crate::app) fn focus_node(&mut self, node_id: &str) {
        let Some(position) = self.session.graph().get(node_id).map(|node| node.position) else {
            return;
        };
        let scale = self.session.transform().scale;
        self.session.apply(Command::SetTransform(ViewTransform {
            scale,
            translate: -position * scale,
        }));
        self.set_selected(Some(node_id.to_owned()));
    }
}
