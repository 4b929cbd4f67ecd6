//! One interactive map session: the store it edits plus the pointer and
//! viewport state layered on top.

use tracing::debug;

use crate::graph::error::StoreResult;
use crate::graph::model::{Device, DeviceType};
use crate::graph::store::EntityStore;
use crate::topology::controller::{Controller, PointerEvent};
use crate::topology::scene::Scene;
use crate::topology::viewport::CanvasSize;

/// What a host UI may call on the map from outside the pointer loop.
pub trait MapCommands {
    fn zoom_in(&mut self);
    fn zoom_out(&mut self);
    fn reset(&mut self);
    fn toggle_device_type(&mut self, device_type: DeviceType);
    fn devices_in_profile(&self, profile_id: &str) -> Vec<&Device>;
    fn profiles_of_device(&self, device_id: &str) -> Vec<&str>;
}

#[derive(Debug, Clone)]
pub struct MapSession {
    store: EntityStore,
    controller: Controller,
}

impl MapSession {
    pub fn open(store: EntityStore, canvas: CanvasSize, zoom_step: f64) -> Self {
        debug!(profile = store.active_profile_id(), "map session opened");
        Self {
            store,
            controller: Controller::new(canvas, zoom_step),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn set_canvas(&mut self, canvas: CanvasSize) {
        self.controller.set_canvas(canvas);
    }

    pub fn pointer(&mut self, event: PointerEvent) {
        self.controller.handle(&mut self.store, event);
    }

    pub fn scene(&self) -> Scene {
        self.controller.scene(&self.store)
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.controller.pan_by(dx, dy);
    }

    pub fn clear_selection(&mut self) {
        self.controller.clear_selection();
    }

    /// Move the selection through visible devices in scene order, wrapping.
    pub fn cycle_selection(&mut self, delta: isize) {
        let scene = self.scene();
        if scene.nodes.is_empty() {
            self.controller.clear_selection();
            return;
        }
        let len = scene.nodes.len() as isize;
        let current = self
            .controller
            .selection()
            .and_then(|id| scene.nodes.iter().position(|n| n.device_id == id));
        let next = match current {
            Some(pos) => (pos as isize + delta).rem_euclid(len),
            None if delta >= 0 => 0,
            None => len - 1,
        } as usize;
        self.controller
            .select(Some(scene.nodes[next].device_id.clone()));
    }

    pub fn selected_device(&self) -> Option<&Device> {
        self.controller
            .selection()
            .and_then(|id| self.store.device(id))
    }

    /// Switch which coordinate overlay is shown. Stored positions are untouched.
    pub fn set_active_profile(&mut self, profile_id: &str) -> StoreResult<()> {
        self.store.set_active_profile(profile_id)?;
        self.controller.cancel_gesture();
        self.controller.clear_selection();
        Ok(())
    }

    /// Step through profiles in store order, wrapping at either end.
    pub fn cycle_profile(&mut self, delta: isize) -> StoreResult<()> {
        let profiles = self.store.profiles();
        let pos = profiles
            .iter()
            .position(|p| p.id == self.store.active_profile_id())
            .unwrap_or(0);
        let next = (pos as isize + delta).rem_euclid(profiles.len() as isize) as usize;
        let id = profiles[next].id.clone();
        self.set_active_profile(&id)
    }
}

impl MapCommands for MapSession {
    fn zoom_in(&mut self) {
        self.controller.zoom_in();
    }

    fn zoom_out(&mut self) {
        self.controller.zoom_out();
    }

    fn reset(&mut self) {
        self.controller.reset();
    }

    fn toggle_device_type(&mut self, device_type: DeviceType) {
        self.controller.toggle_device_type(device_type);
    }

    fn devices_in_profile(&self, profile_id: &str) -> Vec<&Device> {
        self.store.membership().devices_in_profile(profile_id).to_vec()
    }

    fn profiles_of_device(&self, device_id: &str) -> Vec<&str> {
        self.store.membership().profiles_of_device(device_id).to_vec()
    }
}
