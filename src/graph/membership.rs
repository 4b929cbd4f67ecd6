//! Read-only view of the device/profile relation.
//!
//! The index borrows the store, so the borrow checker guarantees it can never
//! outlive a mutation: every read after a write builds a fresh, consistent view.

use std::collections::BTreeMap;

use crate::graph::model::Device;
use crate::graph::store::EntityStore;

#[derive(Debug)]
pub struct MembershipIndex<'a> {
    devices_by_profile: BTreeMap<&'a str, Vec<&'a Device>>,
    profiles_by_device: BTreeMap<&'a str, Vec<&'a str>>,
}

impl<'a> MembershipIndex<'a> {
    /// Derive the index from device memberships, in store order.
    pub fn build(store: &'a EntityStore) -> Self {
        let mut devices_by_profile: BTreeMap<&str, Vec<&Device>> = store
            .profiles()
            .iter()
            .map(|p| (p.id.as_str(), Vec::new()))
            .collect();
        let mut profiles_by_device = BTreeMap::new();

        for device in store.devices() {
            let mut memberships = Vec::with_capacity(device.profiles.len());
            for profile_id in &device.profiles {
                if let Some(members) = devices_by_profile.get_mut(profile_id.as_str()) {
                    members.push(device);
                    memberships.push(profile_id.as_str());
                }
            }
            profiles_by_device.insert(device.id.as_str(), memberships);
        }

        Self {
            devices_by_profile,
            profiles_by_device,
        }
    }

    /// Devices whose memberships contain `profile_id`. Empty for unknown ids.
    pub fn devices_in_profile(&self, profile_id: &str) -> &[&'a Device] {
        self.devices_by_profile
            .get(profile_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Profile ids containing `device_id`. Empty for unknown ids.
    pub fn profiles_of_device(&self, device_id: &str) -> &[&'a str] {
        self.profiles_by_device
            .get(device_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
