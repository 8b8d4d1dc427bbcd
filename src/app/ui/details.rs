use eframe::egui::{self, Color32, RichText, Ui};

use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Node Details");
        ui.add_space(6.0);

        let focused = self
            .selected
            .clone()
            .or_else(|| self.session.highlight().active_node_id.clone());

        let mut focus_request = None;
        match focused.as_deref().and_then(|id| self.session.graph().get(id)) {
            None if self.selected.is_some() => {
                ui.label("The selected node is not part of the current snapshot.");
            }
            None => {
                ui.label("Hover or click a node to inspect it.");
            }
            Some(node) => {
                let graph = self.session.graph();
                ui.label(RichText::new(node.label()).strong());
                ui.small(node.id.as_str());
                ui.add_space(6.0);

                ui.label(format!("Type: {}", node.entity_type));
                ui.label(format!("Status: {}", node.status));
                if let Some(ip) = &node.ip {
                    ui.label(format!("IP: {ip}"));
                }
                ui.label(format!("Connections: {}", graph.degree(&node.id)));
                ui.label(format!(
                    "Position: ({:.1}, {:.1})",
                    node.position.x, node.position.y
                ));
                if node.is_pinned() {
                    ui.label("Pinned while dragged");
                }

                ui.separator();
                ui.label(RichText::new("Neighbors").strong());
                egui::ScrollArea::vertical()
                    .id_salt("neighbors_scroll")
                    .max_height(260.0)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        for link in graph.links().iter().filter(|link| link.touches(&node.id)) {
                            let other = if link.source_id == node.id {
                                &link.target_id
                            } else {
                                &link.source_id
                            };
                            let label = graph
                                .get(other)
                                .map_or(other.as_str(), |neighbor| neighbor.label());
                            if ui.link(label).on_hover_text(other.as_str()).clicked() {
                                focus_request = Some(other.clone());
                            }
                        }
                    });

                if self.selected.is_some() && ui.button("Clear selection").clicked() {
                    focus_request = None;
                    self.selected = None;
                }
            }
        }

        if let Some(node_id) = focus_request {
            self.focus_node(&node_id);
        }

        ui.separator();
        self.draw_load_issues(ui);
    }

    fn draw_load_issues(&self, ui: &mut Ui) {
        let issues = self.session.issues();
        ui.label(RichText::new(format!("Load issues ({})", issues.len())).strong());
        if issues.is_empty() {
            ui.label("The current snapshot loaded cleanly.");
            return;
        }

        egui::ScrollArea::vertical()
            .id_salt("load_issues_scroll")
            .max_height(220.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for issue in issues {
                    ui.label(
                        RichText::new(issue.to_string())
                            .small()
                            .color(Color32::from_rgb(232, 176, 72)),
                    );
                }
            });
    }
}
