//! `netmap device ...`: manage devices, their links and placements.

use std::path::Path;

use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::style::Stylize;

use crate::commands::edit_store;
use crate::graph::model::{Device, DevicePatch, DeviceType, Status};

/// Fields accepted by `netmap device add`.
#[derive(Debug, Clone)]
pub struct NewDevice {
    pub id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub ip: String,
    pub mac: Option<String>,
    pub location: Option<String>,
    pub status: Status,
}

/// `lastSeen` for a freshly added device is its creation time.
fn seen_at(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

impl NewDevice {
    fn into_device(self, created: DateTime<Utc>) -> Device {
        let mut device = Device::new(self.id, self.name, self.device_type, self.ip);
        device.mac = self.mac;
        device.location = self.location;
        device.status = self.status;
        device.last_seen = seen_at(created);
        device
    }
}

/// Fields accepted by `netmap device update`; unset fields stay as they are.
#[derive(Debug, Clone, Default)]
pub struct DeviceChanges {
    pub name: Option<String>,
    pub device_type: Option<DeviceType>,
    pub status: Option<Status>,
    pub ip: Option<String>,
    pub mac: Option<String>,
    pub clear_mac: bool,
    pub location: Option<String>,
    pub clear_location: bool,
    pub last_seen: Option<String>,
}

impl DeviceChanges {
    fn into_patch(self) -> DevicePatch {
        DevicePatch {
            name: self.name,
            device_type: self.device_type,
            status: self.status,
            ip: self.ip,
            mac: if self.clear_mac { Some(None) } else { self.mac.map(Some) },
            location: if self.clear_location {
                Some(None)
            } else {
                self.location.map(Some)
            },
            last_seen: self.last_seen,
            connections: None,
        }
    }
}

pub fn add(root: &Path, new: NewDevice) -> Result<()> {
    let id = new.id.clone();
    edit_store(root, |store| store.add_device(new.into_device(Utc::now())))?;
    println!("  {} device `{}`", "Added".green().bold(), id);
    Ok(())
}

pub fn update(root: &Path, id: &str, changes: DeviceChanges) -> Result<()> {
    edit_store(root, |store| store.update_device(id, changes.into_patch()))?;
    println!("  {} device `{}`", "Updated".green().bold(), id);
    Ok(())
}

pub fn delete(root: &Path, id: &str) -> Result<()> {
    edit_store(root, |store| store.delete_device(id))?;
    println!("  {} device `{}`", "Deleted".green().bold(), id);
    Ok(())
}

pub fn connect(root: &Path, source: &str, target: &str) -> Result<()> {
    edit_store(root, |store| store.connect_devices(source, target))?;
    println!(
        "  {} {} {} {}",
        "Connected".green().bold(),
        source,
        "->".dark_grey(),
        target
    );
    Ok(())
}

pub fn disconnect(root: &Path, a: &str, b: &str) -> Result<()> {
    edit_store(root, |store| store.disconnect_devices(a, b))?;
    println!(
        "  {} {} {} {}",
        "Disconnected".green().bold(),
        a,
        "--".dark_grey(),
        b
    );
    Ok(())
}

/// Store a position for `id` on `profile_id`; out-of-range values are clamped
/// and the stored result is echoed.
pub fn place(root: &Path, id: &str, profile_id: &str, x: f64, y: f64) -> Result<()> {
    let at = edit_store(root, |store| store.set_device_position(id, profile_id, x, y))?;
    println!(
        "  {} `{}` on `{}` at ({:.1}, {:.1})",
        "Placed".green().bold(),
        id,
        profile_id,
        at.x,
        at.y
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{init, load_store};
    use crate::graph::model::{DEFAULT_PROFILE_ID, Position};
    use tempfile::TempDir;

    fn sample_root() -> TempDir {
        let dir = TempDir::new().unwrap();
        init::run_in(dir.path(), true).unwrap();
        dir
    }

    fn printer() -> NewDevice {
        NewDevice {
            id: "dpo-1".to_string(),
            name: "DPO-01".to_string(),
            device_type: DeviceType::Dpo,
            ip: "192.168.1.40".to_string(),
            mac: None,
            location: Some("Lobby".to_string()),
            status: Status::Online,
        }
    }

    #[test]
    fn add_persists_all_fields() {
        let dir = sample_root();
        add(dir.path(), printer()).unwrap();
        let store = load_store(dir.path()).unwrap();
        let dpo = store.device("dpo-1").unwrap();
        assert_eq!(dpo.device_type, DeviceType::Dpo);
        assert_eq!(dpo.status, Status::Online);
        assert_eq!(dpo.location.as_deref(), Some("Lobby"));
        assert!(dpo.profiles.is_empty());
    }

    #[test]
    fn new_device_is_stamped_with_its_creation_time() {
        let created = DateTime::parse_from_rfc3339("2024-03-05T14:07:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let device = printer().into_device(created);
        assert_eq!(device.last_seen, "2024-03-05 14:07 UTC");
    }

    #[test]
    fn add_records_last_seen() {
        let dir = sample_root();
        add(dir.path(), printer()).unwrap();
        let store = load_store(dir.path()).unwrap();
        let stamp = &store.device("dpo-1").unwrap().last_seen;
        assert!(stamp.ends_with(" UTC"), "unexpected stamp {stamp:?}");
    }

    #[test]
    fn add_rejects_invalid_ip_without_writing() {
        let dir = sample_root();
        let mut bad = printer();
        bad.ip = "192.168.1".to_string();
        assert!(add(dir.path(), bad).is_err());
        assert!(load_store(dir.path()).unwrap().device("dpo-1").is_none());
    }

    #[test]
    fn update_patches_only_given_fields() {
        let dir = sample_root();
        update(
            dir.path(),
            "laptop-1",
            DeviceChanges {
                status: Some(Status::Online),
                clear_location: true,
                last_seen: Some("just now".to_string()),
                ..DeviceChanges::default()
            },
        )
        .unwrap();
        let store = load_store(dir.path()).unwrap();
        let laptop = store.device("laptop-1").unwrap();
        assert_eq!(laptop.status, Status::Online);
        assert_eq!(laptop.location, None);
        assert_eq!(laptop.last_seen, "just now");
        assert_eq!(laptop.name, "LT-01");
        assert_eq!(laptop.mac.as_deref(), Some("00:1B:44:11:3A:B9"));
    }

    #[test]
    fn update_with_short_name_is_rejected() {
        let dir = sample_root();
        let changes = DeviceChanges {
            name: Some(" x ".to_string()),
            ..DeviceChanges::default()
        };
        assert!(update(dir.path(), "wap-1", changes).is_err());
        assert_eq!(load_store(dir.path()).unwrap().device("wap-1").unwrap().name, "WAP-01");
    }

    #[test]
    fn delete_cleans_up_links() {
        let dir = sample_root();
        delete(dir.path(), "server-1").unwrap();
        let store = load_store(dir.path()).unwrap();
        assert!(store.device("server-1").is_none());
        assert!(
            store.devices().iter().all(|d| !d.connections.contains("server-1")),
            "no device should still link to a deleted one"
        );
    }

    #[test]
    fn connect_then_disconnect_round_trips() {
        let dir = sample_root();
        add(dir.path(), printer()).unwrap();
        connect(dir.path(), "dpo-1", "server-1").unwrap();
        assert!(
            load_store(dir.path()).unwrap().device("dpo-1").unwrap().connections.contains("server-1")
        );
        disconnect(dir.path(), "server-1", "dpo-1").unwrap();
        let store = load_store(dir.path()).unwrap();
        assert!(store.device("dpo-1").unwrap().connections.is_empty());
        assert!(!store.device("server-1").unwrap().connections.contains("dpo-1"));
    }

    #[test]
    fn place_clamps_into_range() {
        let dir = sample_root();
        place(dir.path(), "laptop-1", DEFAULT_PROFILE_ID, 140.0, -3.0).unwrap();
        let store = load_store(dir.path()).unwrap();
        assert_eq!(
            store.device("laptop-1").unwrap().positions[DEFAULT_PROFILE_ID],
            Position::new(100.0, 0.0)
        );
    }
}
