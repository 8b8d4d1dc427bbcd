use eframe::egui::{Align2, Color32, FontId, Painter, Rect, Sense, Stroke, Ui, vec2};
use soc_topology::{Frame, RenderAdapter, ViewTransform};

use super::super::ViewModel;
use super::super::render_utils::{
    circle_visible, draw_background, screen_radius, segment_near_rect, simulation_to_screen,
    status_color, type_ring_color, with_opacity,
};

/// Paints one [`Frame`] into an egui canvas.
struct EguiRenderer<'a> {
    painter: &'a Painter,
    rect: Rect,
    focused: Option<&'a str>,
    selected: Option<&'a str>,
    drawn_nodes: usize,
    drawn_links: usize,
}

impl<'a> EguiRenderer<'a> {
    fn new(
        painter: &'a Painter,
        rect: Rect,
        focused: Option<&'a str>,
        selected: Option<&'a str>,
    ) -> Self {
        Self {
            painter,
            rect,
            focused,
            selected,
            drawn_nodes: 0,
            drawn_links: 0,
        }
    }
}

impl RenderAdapter for EguiRenderer<'_> {
    fn render(&mut self, frame: &Frame<'_>, transform: &ViewTransform) {
        draw_background(self.painter, self.rect, transform);

        let zoom_sqrt = transform.scale.sqrt();
        let line_width = (1.2 * zoom_sqrt).clamp(0.6, 3.2);
        self.drawn_links = 0;
        for link in &frame.links {
            let start = simulation_to_screen(self.rect, transform, vec2(link.x1, link.y1));
            let end = simulation_to_screen(self.rect, transform, vec2(link.x2, link.y2));
            if !segment_near_rect(self.rect, start, end, 2.5) {
                continue;
            }

            let color = with_opacity(Color32::from_rgb(118, 128, 144), link.opacity);
            self.painter
                .line_segment([start, end], Stroke::new(line_width, color));
            self.drawn_links += 1;
        }

        // Dimmed nodes first so emphasized ones stay on top.
        let mut order = (0..frame.nodes.len()).collect::<Vec<_>>();
        order.sort_by(|a, b| frame.nodes[*a].opacity.total_cmp(&frame.nodes[*b].opacity));

        self.drawn_nodes = 0;
        for index in order {
            let node = &frame.nodes[index];
            let position = simulation_to_screen(self.rect, transform, vec2(node.x, node.y));
            let radius = screen_radius(node.radius, transform.scale);
            if !circle_visible(self.rect, position, radius) {
                continue;
            }

            let is_selected = self.selected == Some(node.node_id);
            let is_focused = self.focused == Some(node.node_id);

            self.painter.circle_filled(
                position,
                radius,
                with_opacity(status_color(node.status), node.opacity),
            );
            self.painter.circle_stroke(
                position,
                radius,
                Stroke::new(
                    (radius * 0.18).clamp(1.0, 3.0),
                    with_opacity(type_ring_color(node.entity_type), node.opacity),
                ),
            );

            if node.pinned {
                self.painter.circle_filled(
                    position,
                    (radius * 0.28).max(1.5),
                    with_opacity(Color32::from_gray(240), node.opacity),
                );
            }

            if is_selected {
                self.painter.circle_stroke(
                    position,
                    radius + 4.0,
                    Stroke::new(1.6, Color32::from_rgb(245, 206, 93)),
                );
            }

            let should_draw_label = is_selected
                || is_focused
                || (node.opacity >= 1.0 && (radius > 17.0 || transform.scale > 1.35));
            if should_draw_label {
                self.painter.text(
                    position + vec2(radius + 5.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.name,
                    FontId::proportional(12.0),
                    with_opacity(Color32::from_gray(238), node.opacity.max(0.5)),
                );
            }

            self.drawn_nodes += 1;
        }

        if let Some(focused) = self.focused
            && let Some(node) = frame.nodes.iter().find(|node| node.node_id == focused)
        {
            let panel_text = format!("{}  |  {}  |  {}", node.name, node.entity_type, node.status);
            self.painter.text(
                self.rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                panel_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pointer(ui, rect, &response);

        // One nominal tick per 60 Hz frame.
        let dt = (ui.ctx().input(|input| input.stable_dt) * 60.0).clamp(0.25, 3.0);
        let focused = self.session.highlight().active_node_id.clone();
        let mut renderer =
            EguiRenderer::new(&painter, rect, focused.as_deref(), self.selected.as_deref());
        self.session.render_with(dt, &mut renderer);
        self.visible_node_count = renderer.drawn_nodes;
        self.visible_link_count = renderer.drawn_links;

        if self.session.graph().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The topology snapshot has no nodes.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
        }

        if self.session.is_animating() || self.session.has_pending() {
            ui.ctx().request_repaint();
        }
    }
}
