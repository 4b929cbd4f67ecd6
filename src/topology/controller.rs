//! Pointer state machine for the map canvas.
//!
//! ```text
//! Idle --down on empty canvas--> PanningCanvas --up--> Idle
//! Idle --down on a node------->  DraggingDevice --up/leave--> Idle
//! ```
//!
//! A down/up pair without a move in between is a click: on a node it toggles
//! the selection, on empty canvas it clears it. Every drag move writes the
//! new anchor straight to the store.

use std::collections::BTreeSet;

use tracing::{trace, warn};

use crate::graph::model::{DeviceType, Position};
use crate::graph::store::EntityStore;
use crate::topology::scene::{HitBox, Scene, SceneInput};
use crate::topology::viewport::{CanvasSize, Point, Viewport};

/// A node glyph plus its label row in the terminal is roughly this big.
pub const NODE_HIT_BOX: HitBox = HitBox {
    half_width: 2.0,
    half_height: 1.0,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Leave,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    PanningCanvas {
        last: Point,
        moved: bool,
    },
    DraggingDevice {
        device_id: String,
        /// Profile that was active at pointer-down; writes go only there.
        profile_id: String,
        /// Pointer anchor minus node anchor at pointer-down, in percent.
        grab_offset: (f64, f64),
        last: Point,
        moved: bool,
    },
}

#[derive(Debug, Clone)]
pub struct Controller {
    state: InteractionState,
    viewport: Viewport,
    selection: Option<String>,
    hidden_types: BTreeSet<DeviceType>,
    canvas: CanvasSize,
    zoom_step: f64,
    hit_box: HitBox,
}

impl Controller {
    pub fn new(canvas: CanvasSize, zoom_step: f64) -> Self {
        Self {
            state: InteractionState::Idle,
            viewport: Viewport::default(),
            selection: None,
            hidden_types: BTreeSet::new(),
            canvas,
            zoom_step,
            hit_box: NODE_HIT_BOX,
        }
    }

    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection.as_deref()
    }

    pub fn hidden_types(&self) -> &BTreeSet<DeviceType> {
        &self.hidden_types
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.canvas = canvas;
    }

    pub fn scene(&self, store: &EntityStore) -> Scene {
        Scene::build(&SceneInput {
            store,
            selection: self.selection.as_deref(),
            viewport: self.viewport,
            canvas: self.canvas,
            hidden_types: &self.hidden_types,
        })
    }

    pub fn handle(&mut self, store: &mut EntityStore, event: PointerEvent) {
        match event {
            PointerEvent::Down(at) => self.pointer_down(store, at),
            PointerEvent::Move(at) => self.pointer_move(store, at),
            PointerEvent::Up(_) => self.pointer_up(),
            PointerEvent::Leave => self.pointer_leave(),
        }
    }

    fn pointer_down(&mut self, store: &EntityStore, at: Point) {
        // A down without a matching up means the up was lost; start over.
        self.state = InteractionState::Idle;

        let scene = self.scene(store);
        self.state = match scene.hit_test(at, self.hit_box) {
            Some(node) => {
                let pointer = self.viewport.to_anchor(at, self.canvas);
                InteractionState::DraggingDevice {
                    device_id: node.device_id.clone(),
                    profile_id: store.active_profile_id().to_string(),
                    grab_offset: (pointer.x - node.anchor.x, pointer.y - node.anchor.y),
                    last: at,
                    moved: false,
                }
            }
            None => InteractionState::PanningCanvas {
                last: at,
                moved: false,
            },
        };
        trace!(state = ?self.state, "pointer down");
    }

    fn pointer_move(&mut self, store: &mut EntityStore, at: Point) {
        match &mut self.state {
            InteractionState::Idle => {}
            InteractionState::PanningCanvas { last, moved } => {
                if at != *last {
                    self.viewport.pan_by(at.x - last.x, at.y - last.y);
                    *last = at;
                    *moved = true;
                }
            }
            InteractionState::DraggingDevice {
                device_id,
                profile_id,
                grab_offset,
                last,
                moved,
            } => {
                if store.active_profile_id() != profile_id.as_str() {
                    trace!(device = %device_id, profile = %profile_id, "profile changed mid-drag");
                    self.state = InteractionState::Idle;
                    return;
                }
                if at == *last {
                    return;
                }
                let pointer = self.viewport.to_anchor(at, self.canvas);
                let target =
                    Position::new(pointer.x - grab_offset.0, pointer.y - grab_offset.1).clamped();
                *last = at;
                *moved = true;
                if let Err(err) =
                    store.set_device_position(device_id, profile_id, target.x, target.y)
                {
                    warn!(device = %device_id, %err, "drag target vanished");
                    self.state = InteractionState::Idle;
                }
            }
        }
    }

    fn pointer_up(&mut self) {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::PanningCanvas { moved: false, .. } => {
                self.selection = None;
            }
            InteractionState::DraggingDevice {
                device_id,
                moved: false,
                ..
            } => {
                if self.selection.as_deref() == Some(device_id.as_str()) {
                    self.selection = None;
                } else {
                    self.selection = Some(device_id);
                }
            }
            _ => {}
        }
        trace!(selection = ?self.selection, "pointer up");
    }

    fn pointer_leave(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// Drop any gesture in progress without touching the selection.
    pub fn cancel_gesture(&mut self) {
        self.state = InteractionState::Idle;
    }

    // -----------------------------------------------------------------------
    // Commands
    // -----------------------------------------------------------------------

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_by(self.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_by(1.0 / self.zoom_step);
    }

    /// Zoom back to 1 and drop the pan offset.
    pub fn reset(&mut self) {
        self.viewport.reset();
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn toggle_device_type(&mut self, device_type: DeviceType) {
        if !self.hidden_types.remove(&device_type) {
            self.hidden_types.insert(device_type);
        }
    }

    pub fn select(&mut self, device_id: Option<String>) {
        self.selection = device_id;
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }
}
