use eframe::egui::{self, Align, Color32, Context, Layout, RichText};
use soc_topology::TopologySession;

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(session: TopologySession) -> Self {
        Self {
            session,
            selected: None,
            search_suggestions: Vec::new(),
            suggestions_for: None,
            last_error: None,
            visible_node_count: 0,
            visible_link_count: 0,
        }
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("soc-topology");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("nodes: {}", self.session.graph().node_count()));
                    ui.label(format!("links: {}", self.session.graph().link_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload topology"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    if let Some(error) = &self.last_error {
                        ui.label(RichText::new(error).color(Color32::from_rgb(226, 84, 84)))
                            .on_hover_text("The last refresh failed; showing the previous graph.");
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.layout_status_text());
                        ui.label(format!(
                            "visible: {} nodes / {} links",
                            self.visible_node_count, self.visible_link_count
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        tracing::debug!(node = ?selected, "selection changed");
        self.selected = selected;
    }

    fn layout_status_text(&self) -> String {
        let simulator = self.session.simulator();
        if simulator.is_running() {
            format!("alpha {:.3}", simulator.alpha())
        } else {
            "layout settled".to_owned()
        }
    }
}
