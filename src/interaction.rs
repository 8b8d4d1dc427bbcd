//! Pointer, wheel and hover handling.
//!
//! The controller never touches simulation or visibility state directly: it
//! turns raw input into [`Command`]s that the owning session applies between
//! ticks. Hit testing is the caller's job; pointer positions arrive in view
//! space (drawing-surface coordinates relative to the view origin).

use eframe::egui::Vec2;
use serde::Deserialize;

use crate::visibility::FilterState;

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewConfig {
    pub min_scale: f32,
    pub max_scale: f32,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            min_scale: 0.1,
            max_scale: 4.0,
        }
    }
}

impl ViewConfig {
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let min_scale = if self.min_scale.is_finite() && self.min_scale > 0.0 {
            self.min_scale
        } else {
            defaults.min_scale
        };
        let max_scale = if self.max_scale.is_finite() {
            self.max_scale.max(min_scale)
        } else {
            defaults.max_scale.max(min_scale)
        };
        Self {
            min_scale,
            max_scale,
        }
    }

    pub fn clamp_scale(&self, scale: f32) -> f32 {
        if scale.is_nan() {
            return 1.0_f32.clamp(self.min_scale, self.max_scale);
        }
        scale.clamp(self.min_scale, self.max_scale)
    }
}

/// Scale and translation applied at draw time only. Simulation coordinates
/// are never rewritten by zoom or pan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub scale: f32,
    pub translate: Vec2,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        scale: 1.0,
        translate: Vec2::ZERO,
    };

    pub fn to_view(&self, simulation: Vec2) -> Vec2 {
        simulation * self.scale + self.translate
    }

    pub fn to_simulation(&self, view: Vec2) -> Vec2 {
        (view - self.translate) / self.scale
    }

    pub fn zoomed(&self, factor: f32, config: &ViewConfig) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return *self;
        }
        Self {
            scale: config.clamp_scale(self.scale * factor),
            translate: self.translate,
        }
    }

    /// Zooms while keeping the simulation point under `anchor` in place.
    pub fn zoomed_at(&self, factor: f32, anchor: Vec2, config: &ViewConfig) -> Self {
        let zoomed = self.zoomed(factor, config);
        let pinned = self.to_simulation(anchor);
        Self {
            scale: zoomed.scale,
            translate: anchor - pinned * zoomed.scale,
        }
    }
}

/// Mutation requests produced by the controller (or the host UI) and applied
/// by the single owner of the affected state.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Pin { node_id: String, x: f32, y: f32 },
    Unpin { node_id: String },
    Reheat { alpha: f32 },
    SetFilter(FilterState),
    SetHighlight(Option<String>),
    SetTransform(ViewTransform),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        node_id: String,
    },
    Panning {
        last: Vec2,
    },
}

#[derive(Debug, Default)]
pub struct InteractionController {
    config: ViewConfig,
    drag: DragState,
    hovered: Option<String>,
}

impl InteractionController {
    pub fn new(config: ViewConfig) -> Self {
        Self {
            config: config.validated(),
            drag: DragState::Idle,
            hovered: None,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn dragged_node(&self) -> Option<&str> {
        match &self.drag {
            DragState::Dragging { node_id } => Some(node_id),
            _ => None,
        }
    }

    pub fn is_interacting(&self) -> bool {
        !matches!(self.drag, DragState::Idle)
    }

    /// `hit` is the node under the pointer as resolved by the caller. A hit
    /// starts a drag; empty space starts a pan.
    pub fn pointer_down(
        &mut self,
        hit: Option<&str>,
        pointer: Vec2,
        transform: &ViewTransform,
    ) -> Vec<Command> {
        // A missed pointer-up must not leave the previous node pinned.
        let mut commands = self.release();

        match hit {
            Some(node_id) => {
                let at = transform.to_simulation(pointer);
                self.drag = DragState::Dragging {
                    node_id: node_id.to_owned(),
                };
                commands.push(Command::Pin {
                    node_id: node_id.to_owned(),
                    x: at.x,
                    y: at.y,
                });
            }
            None => {
                self.drag = DragState::Panning { last: pointer };
            }
        }
        commands
    }

    pub fn pointer_move(&mut self, pointer: Vec2, transform: &ViewTransform) -> Vec<Command> {
        match &mut self.drag {
            DragState::Idle => Vec::new(),
            DragState::Dragging { node_id } => {
                let at = transform.to_simulation(pointer);
                vec![Command::Pin {
                    node_id: node_id.clone(),
                    x: at.x,
                    y: at.y,
                }]
            }
            DragState::Panning { last } => {
                let delta = pointer - *last;
                *last = pointer;
                if delta == Vec2::ZERO || !delta.is_finite() {
                    return Vec::new();
                }
                vec![Command::SetTransform(ViewTransform {
                    scale: transform.scale,
                    translate: transform.translate + delta,
                })]
            }
        }
    }

    /// Ends any drag or pan. The released node is unpinned; alpha is left to
    /// keep decaying.
    pub fn pointer_up(&mut self) -> Vec<Command> {
        self.release()
    }

    /// Drops a drag whose node no longer exists, without emitting commands.
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    pub fn zoom_by(&self, factor: f32, transform: &ViewTransform) -> Command {
        Command::SetTransform(transform.zoomed(factor, &self.config))
    }

    pub fn zoom_at(&self, factor: f32, anchor: Vec2, transform: &ViewTransform) -> Command {
        Command::SetTransform(transform.zoomed_at(factor, anchor, &self.config))
    }

    pub fn reset_zoom(&self) -> Command {
        Command::SetTransform(ViewTransform::IDENTITY)
    }

    /// Emits a highlight change only when the hovered node actually changes.
    pub fn hover(&mut self, node_id: Option<&str>) -> Option<Command> {
        if self.hovered.as_deref() == node_id {
            return None;
        }
        self.hovered = node_id.map(str::to_owned);
        Some(Command::SetHighlight(self.hovered.clone()))
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    fn release(&mut self) -> Vec<Command> {
        match std::mem::take(&mut self.drag) {
            DragState::Dragging { node_id } => vec![Command::Unpin { node_id }],
            DragState::Idle | DragState::Panning { .. } => Vec::new(),
        }
    }
}
