//! The single owner of devices and profiles.
//!
//! Every mutation validates its input in full before touching any state, so a
//! returned error always leaves the store exactly as it was.

use std::net::Ipv4Addr;

use tracing::debug;

use crate::graph::error::{EntityKind, StoreError, StoreResult};
use crate::graph::membership::MembershipIndex;
use crate::graph::model::{
    DEFAULT_PROFILE_ID, Device, DevicePatch, Position, Profile, ProfilePatch,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EntityStore {
    devices: Vec<Device>,
    profiles: Vec<Profile>,
    active_profile: String,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// An empty inventory holding only the default profile, which is active.
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            profiles: vec![Profile::new(DEFAULT_PROFILE_ID, "Default View")],
            active_profile: DEFAULT_PROFILE_ID.to_string(),
        }
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn profiles(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn device(&self, id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn active_profile_id(&self) -> &str {
        &self.active_profile
    }

    pub fn active_profile(&self) -> &Profile {
        // The active id always names a live profile; the default is never removed.
        self.profile(&self.active_profile)
            .or_else(|| self.profiles.first())
            .unwrap_or_else(|| unreachable!("default profile is never deleted"))
    }

    pub fn membership(&self) -> MembershipIndex<'_> {
        MembershipIndex::build(self)
    }

    // -----------------------------------------------------------------------
    // Active profile
    // -----------------------------------------------------------------------

    pub fn set_active_profile(&mut self, id: &str) -> StoreResult<()> {
        self.require_profile(id)?;
        self.active_profile = id.to_string();
        debug!(profile = id, "active profile changed");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Profiles
    // -----------------------------------------------------------------------

    pub fn add_profile(&mut self, profile: Profile) -> StoreResult<()> {
        validate_id(&profile.id)?;
        if self.profile(&profile.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Profile,
                id: profile.id,
            });
        }
        validate_name(&profile.name)?;
        for device_id in &profile.device_ids {
            self.require_device(device_id)?;
        }

        for device in &mut self.devices {
            if profile.device_ids.contains(&device.id) {
                device.profiles.insert(profile.id.clone());
            }
        }
        debug!(profile = %profile.id, members = profile.device_ids.len(), "profile added");
        self.profiles.push(profile);
        Ok(())
    }

    pub fn update_profile(&mut self, id: &str, patch: ProfilePatch) -> StoreResult<()> {
        let idx = self.profile_index(id)?;
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }

        let profile = &mut self.profiles[idx];
        if let Some(name) = patch.name {
            profile.name = name;
        }
        if let Some(description) = patch.description {
            profile.description = description;
        }
        if let Some(background) = patch.background {
            profile.background = background;
        }
        if let Some(config) = patch.config {
            profile.config = config;
        }
        debug!(profile = id, "profile updated");
        Ok(())
    }

    /// Remove a profile and every reference to it. Positions recorded for
    /// other profiles are left alone.
    pub fn delete_profile(&mut self, id: &str) -> StoreResult<()> {
        let idx = self.profile_index(id)?;
        if self.profiles[idx].is_default() {
            return Err(StoreError::Validation(
                "the default profile cannot be deleted".to_string(),
            ));
        }

        self.profiles.remove(idx);
        for device in &mut self.devices {
            device.profiles.remove(id);
            device.positions.remove(id);
        }
        if self.active_profile == id {
            self.active_profile = DEFAULT_PROFILE_ID.to_string();
        }
        debug!(profile = id, "profile deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Devices
    // -----------------------------------------------------------------------

    pub fn add_device(&mut self, mut device: Device) -> StoreResult<()> {
        validate_id(&device.id)?;
        if self.device(&device.id).is_some() {
            return Err(StoreError::DuplicateId {
                kind: EntityKind::Device,
                id: device.id,
            });
        }
        validate_name(&device.name)?;
        validate_ip(&device.ip)?;
        if let Some(mac) = &device.mac {
            validate_mac(mac)?;
        }
        for profile_id in device.profiles.iter().chain(device.positions.keys()) {
            self.require_profile(profile_id)?;
        }
        for target in &device.connections {
            self.validate_link(&device.id, target)?;
        }
        for position in device.positions.values_mut() {
            *position = checked_position(position.x, position.y)?;
        }

        for profile in &mut self.profiles {
            if device.profiles.contains(&profile.id) {
                profile.device_ids.insert(device.id.clone());
            }
        }
        debug!(device = %device.id, kind = %device.device_type, "device added");
        self.devices.push(device);
        Ok(())
    }

    pub fn update_device(&mut self, id: &str, patch: DevicePatch) -> StoreResult<()> {
        let idx = self.device_index(id)?;
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        if let Some(ip) = &patch.ip {
            validate_ip(ip)?;
        }
        if let Some(Some(mac)) = &patch.mac {
            validate_mac(mac)?;
        }
        if let Some(connections) = &patch.connections {
            for target in connections {
                self.validate_link(id, target)?;
            }
        }

        let device = &mut self.devices[idx];
        if let Some(name) = patch.name {
            device.name = name;
        }
        if let Some(device_type) = patch.device_type {
            device.device_type = device_type;
        }
        if let Some(status) = patch.status {
            device.status = status;
        }
        if let Some(ip) = patch.ip {
            device.ip = ip;
        }
        if let Some(mac) = patch.mac {
            device.mac = mac;
        }
        if let Some(location) = patch.location {
            device.location = location;
        }
        if let Some(last_seen) = patch.last_seen {
            device.last_seen = last_seen;
        }
        if let Some(connections) = patch.connections {
            device.connections = connections;
        }
        debug!(device = id, "device updated");
        Ok(())
    }

    /// Remove a device from the inventory, every profile and every adjacency.
    pub fn delete_device(&mut self, id: &str) -> StoreResult<()> {
        let idx = self.device_index(id)?;
        self.devices.remove(idx);
        for profile in &mut self.profiles {
            profile.device_ids.remove(id);
        }
        for device in &mut self.devices {
            device.connections.remove(id);
        }
        debug!(device = id, "device deleted");
        Ok(())
    }

    /// Record `target` in `source`'s adjacency. The reverse entry is not added.
    pub fn connect_devices(&mut self, source: &str, target: &str) -> StoreResult<()> {
        let idx = self.device_index(source)?;
        self.validate_link(source, target)?;
        self.devices[idx].connections.insert(target.to_string());
        debug!(source, target, "devices connected");
        Ok(())
    }

    /// Drop the link between two devices, whichever side recorded it.
    pub fn disconnect_devices(&mut self, a: &str, b: &str) -> StoreResult<()> {
        let a_idx = self.device_index(a)?;
        let b_idx = self.device_index(b)?;
        self.devices[a_idx].connections.remove(b);
        self.devices[b_idx].connections.remove(a);
        debug!(a, b, "devices disconnected");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Membership and placement
    // -----------------------------------------------------------------------

    /// Idempotent: both sides are written together, or neither.
    pub fn assign_device_to_profile(&mut self, device_id: &str, profile_id: &str) -> StoreResult<()> {
        let d = self.device_index(device_id)?;
        let p = self.profile_index(profile_id)?;
        self.devices[d].profiles.insert(profile_id.to_string());
        self.profiles[p].device_ids.insert(device_id.to_string());
        debug!(device = device_id, profile = profile_id, "device assigned");
        Ok(())
    }

    /// Idempotent. The remembered position for the profile is kept, so a
    /// device assigned again later reappears where it was.
    pub fn remove_device_from_profile(
        &mut self,
        device_id: &str,
        profile_id: &str,
    ) -> StoreResult<()> {
        let d = self.device_index(device_id)?;
        let p = self.profile_index(profile_id)?;
        self.devices[d].profiles.remove(profile_id);
        self.profiles[p].device_ids.remove(device_id);
        debug!(device = device_id, profile = profile_id, "device unassigned");
        Ok(())
    }

    /// Store a clamped anchor for the (device, profile) pair and return it.
    pub fn set_device_position(
        &mut self,
        device_id: &str,
        profile_id: &str,
        x: f64,
        y: f64,
    ) -> StoreResult<Position> {
        let d = self.device_index(device_id)?;
        self.require_profile(profile_id)?;
        let position = checked_position(x, y)?;
        self.devices[d]
            .positions
            .insert(profile_id.to_string(), position);
        debug!(
            device = device_id,
            profile = profile_id,
            x = position.x,
            y = position.y,
            "device position set"
        );
        Ok(position)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn device_index(&self, id: &str) -> StoreResult<usize> {
        self.devices
            .iter()
            .position(|d| d.id == id)
            .ok_or_else(|| StoreError::device_not_found(id))
    }

    fn profile_index(&self, id: &str) -> StoreResult<usize> {
        self.profiles
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::profile_not_found(id))
    }

    fn require_device(&self, id: &str) -> StoreResult<()> {
        self.device_index(id).map(|_| ())
    }

    fn require_profile(&self, id: &str) -> StoreResult<()> {
        self.profile_index(id).map(|_| ())
    }

    fn validate_link(&self, source: &str, target: &str) -> StoreResult<()> {
        if source == target {
            return Err(StoreError::Validation(format!(
                "device `{source}` cannot connect to itself"
            )));
        }
        self.require_device(target)
    }
}

fn checked_position(x: f64, y: f64) -> StoreResult<Position> {
    if !x.is_finite() || !y.is_finite() {
        return Err(StoreError::Validation(format!(
            "position ({x}, {y}) is not a finite coordinate pair"
        )));
    }
    Ok(Position::new(x, y).clamped())
}

fn validate_id(id: &str) -> StoreResult<()> {
    if id.trim().is_empty() {
        return Err(StoreError::Validation("id must not be empty".to_string()));
    }
    Ok(())
}

fn validate_name(name: &str) -> StoreResult<()> {
    if name.trim().chars().count() < 2 {
        return Err(StoreError::Validation(format!(
            "name `{name}` must be at least 2 characters"
        )));
    }
    Ok(())
}

fn validate_ip(ip: &str) -> StoreResult<()> {
    ip.parse::<Ipv4Addr>()
        .map(|_| ())
        .map_err(|_| StoreError::Validation(format!("`{ip}` is not an IPv4 address")))
}

/// Six hex octets separated by `:` or `-`.
fn validate_mac(mac: &str) -> StoreResult<()> {
    let octets: Vec<&str> = mac.split([':', '-']).collect();
    let well_formed = octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
    if !well_formed {
        return Err(StoreError::Validation(format!(
            "`{mac}` is not a MAC address"
        )));
    }
    Ok(())
}
