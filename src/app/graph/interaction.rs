use eframe::egui::{self, Pos2, Rect, Ui};
use soc_topology::TopologySession;

use super::super::ViewModel;
use super::super::render_utils::{screen_radius, screen_to_view, simulation_to_screen};

impl ViewModel {
    /// Node whose drawn disc contains `pointer`, nearest center first.
    pub(in crate::app) fn node_at(
        session: &TopologySession,
        rect: Rect,
        pointer: Pos2,
    ) -> Option<String> {
        let transform = session.transform();
        session
            .graph()
            .nodes()
            .iter()
            .filter_map(|node| {
                let position = simulation_to_screen(rect, transform, node.position);
                let distance = position.distance(pointer);
                (distance <= screen_radius(node.radius, transform.scale)).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.clone())
    }

    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
        let mut factor = pinch;
        if scroll.abs() > f32::EPSILON {
            factor *= (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        }
        if (factor - 1.0).abs() <= f32::EPSILON {
            return;
        }

        let anchor = ui
            .input(|input| input.pointer.hover_pos())
            .map(|pointer| screen_to_view(rect, pointer));
        self.session.wheel(factor, anchor);
    }

    /// Primary drags grab the node under the press point (or pan when there
    /// is none); secondary and middle drags always pan.
    pub(in crate::app) fn handle_graph_pointer(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        let pointer = ui.input(|input| input.pointer.interact_pos());

        if response.drag_started() {
            let origin = ui.input(|input| input.pointer.press_origin()).or(pointer);
            if let Some(origin) = origin {
                let hit = if response.drag_started_by(egui::PointerButton::Primary) {
                    Self::node_at(&self.session, rect, origin)
                } else {
                    None
                };
                self.session
                    .pointer_down(hit.as_deref(), screen_to_view(rect, origin));
            }
        }

        if response.dragged()
            && let Some(pointer) = pointer
        {
            self.session.pointer_move(screen_to_view(rect, pointer));
        }

        if response.drag_stopped() {
            self.session.pointer_up();
        }

        let hovered = if self.session.controller().is_interacting() {
            self.session.controller().dragged_node().map(str::to_owned)
        } else {
            response
                .hover_pos()
                .and_then(|pointer| Self::node_at(&self.session, rect, pointer))
        };

        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            self.set_selected(hovered.clone());
        }

        self.apply_hover(hovered.as_deref());
    }

    /// Only the pointer drives the highlight; the selection has its own ring.
    fn apply_hover(&mut self, hovered: Option<&str>) {
        self.session.hover(hovered);
    }
}
