//! JSON snapshot of the inventory, the format handed to and from storage.
//!
//! Loading never trusts the file: the store is rebuilt through its public
//! operations, so one-sided memberships come back symmetric and references to
//! missing ids are dropped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::graph::model::{DEFAULT_PROFILE_ID, Device, Profile, ProfilePatch};
use crate::graph::store::EntityStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_active")]
    pub active_profile: String,
    #[serde(default)]
    pub profiles: Vec<Profile>,
    #[serde(default)]
    pub devices: Vec<Device>,
}

fn default_active() -> String {
    DEFAULT_PROFILE_ID.to_string()
}

impl Snapshot {
    pub fn capture(store: &EntityStore) -> Self {
        Self {
            active_profile: store.active_profile_id().to_string(),
            profiles: store.profiles().to_vec(),
            devices: store.devices().to_vec(),
        }
    }

    pub fn restore(self) -> Result<EntityStore> {
        let mut store = EntityStore::new();

        let mut memberships = Vec::new();
        for mut profile in self.profiles {
            memberships.extend(
                profile
                    .device_ids
                    .iter()
                    .map(|d| (d.clone(), profile.id.clone())),
            );
            profile.device_ids.clear();
            if profile.is_default() {
                store.update_profile(
                    DEFAULT_PROFILE_ID,
                    ProfilePatch {
                        name: Some(profile.name),
                        description: Some(profile.description),
                        background: Some(profile.background),
                        config: Some(profile.config),
                    },
                )?;
            } else {
                let id = profile.id.clone();
                store
                    .add_profile(profile)
                    .with_context(|| format!("invalid profile `{id}`"))?;
            }
        }

        let mut connections = Vec::new();
        for mut device in self.devices {
            memberships.extend(
                device
                    .profiles
                    .iter()
                    .map(|p| (device.id.clone(), p.clone())),
            );
            connections.extend(
                device
                    .connections
                    .iter()
                    .map(|t| (device.id.clone(), t.clone())),
            );
            device.profiles.clear();
            device.connections.clear();
            device.positions.retain(|profile_id, _| {
                let known = store.profile(profile_id).is_some();
                if !known {
                    warn!(device = %device.id, profile = %profile_id, "dropping position for unknown profile");
                }
                known
            });
            let id = device.id.clone();
            store
                .add_device(device)
                .with_context(|| format!("invalid device `{id}`"))?;
        }

        for (device_id, profile_id) in memberships {
            if store.assign_device_to_profile(&device_id, &profile_id).is_err() {
                warn!(device = %device_id, profile = %profile_id, "dropping dangling membership");
            }
        }
        for (source, target) in connections {
            if store.connect_devices(&source, &target).is_err() {
                warn!(%source, %target, "dropping dangling connection");
            }
        }
        if store.set_active_profile(&self.active_profile).is_err() {
            warn!(profile = %self.active_profile, "active profile missing, using default");
        }
        Ok(store)
    }
}

pub fn parse(input: &str) -> Result<Snapshot> {
    serde_json::from_str(input).context("inventory is not valid JSON")
}

pub fn serialize(snapshot: &Snapshot) -> Result<String> {
    let mut out = serde_json::to_string_pretty(snapshot)?;
    out.push('\n');
    Ok(out)
}

/// Where the inventory comes from and goes back to.
pub trait Persistence {
    fn load(&self) -> Result<EntityStore>;
    fn save(&self, store: &EntityStore) -> Result<()>;
}

/// An inventory kept in a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Persistence for JsonFile {
    fn load(&self) -> Result<EntityStore> {
        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let store = parse(&text)
            .and_then(Snapshot::restore)
            .with_context(|| format!("failed to load {}", self.path.display()))?;
        debug!(path = %self.path.display(), devices = store.devices().len(), "inventory loaded");
        Ok(store)
    }

    /// Written to a sibling temp file first, then renamed into place.
    fn save(&self, store: &EntityStore) -> Result<()> {
        let text = serialize(&Snapshot::capture(store))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).with_context(|| format!("failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;
        debug!(path = %self.path.display(), "inventory saved");
        Ok(())
    }
}
