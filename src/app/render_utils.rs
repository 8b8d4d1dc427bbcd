use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

use soc_topology::ViewTransform;
use soc_topology::util::stable_hue;

pub(super) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    color.gamma_multiply(opacity.clamp(0.0, 1.0))
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, transform: &ViewTransform) {
    painter.rect_filled(rect, 0.0, Color32::from_rgb(17, 21, 28));

    let step = (64.0 * transform.scale.clamp(0.5, 2.0)).max(24.0);
    let origin = rect.center() + transform.translate;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(58, 68, 82, 64));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

pub(super) fn segment_near_rect(rect: Rect, start: Pos2, end: Pos2, padding: f32) -> bool {
    let min_x = start.x.min(end.x) - padding;
    let max_x = start.x.max(end.x) + padding;
    let min_y = start.y.min(end.y) - padding;
    let max_y = start.y.max(end.y) + padding;
    !(max_x < rect.left() || min_x > rect.right() || max_y < rect.top() || min_y > rect.bottom())
}

/// Simulation coordinates to screen; the view origin sits at the canvas
/// center.
pub(super) fn simulation_to_screen(rect: Rect, transform: &ViewTransform, point: Vec2) -> Pos2 {
    rect.center() + transform.to_view(point)
}

pub(super) fn screen_to_view(rect: Rect, screen: Pos2) -> Vec2 {
    screen - rect.center()
}

pub(super) fn screen_radius(radius: f32, scale: f32) -> f32 {
    (radius * scale.powf(0.6)).clamp(2.5, 40.0)
}

pub(super) fn status_color(status: &str) -> Color32 {
    match status.to_ascii_lowercase().as_str() {
        "online" | "active" | "up" | "healthy" | "ok" => Color32::from_rgb(86, 186, 120),
        "degraded" | "warning" | "suspicious" | "pending" => Color32::from_rgb(232, 176, 72),
        "compromised" | "critical" | "alert" | "blocked" | "error" => {
            Color32::from_rgb(226, 84, 84)
        }
        "offline" | "down" | "inactive" | "unknown" | "" => Color32::from_rgb(128, 134, 142),
        _ => Color32::from_rgb(94, 156, 222),
    }
}

pub(super) fn type_ring_color(entity_type: &str) -> Color32 {
    let hue = stable_hue(entity_type);
    let (r, g, b) = hsv_to_rgb(hue, 0.45, 0.95);
    Color32::from_rgb(r, g, b)
}

fn hsv_to_rgb(hue: f32, saturation: f32, value: f32) -> (u8, u8, u8) {
    let chroma = value * saturation;
    let sector = (hue.rem_euclid(1.0)) * 6.0;
    let secondary = chroma * (1.0 - ((sector % 2.0) - 1.0).abs());
    let (r, g, b) = match sector as u32 {
        0 => (chroma, secondary, 0.0),
        1 => (secondary, chroma, 0.0),
        2 => (0.0, chroma, secondary),
        3 => (0.0, secondary, chroma),
        4 => (secondary, 0.0, chroma),
        _ => (chroma, 0.0, secondary),
    };
    let offset = value - chroma;
    let to_byte = |channel: f32| ((channel + offset) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r), to_byte(g), to_byte(b))
}
