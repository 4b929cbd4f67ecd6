//! The built-in sample network used by `view --demo` and `init --sample`.

use crate::graph::error::StoreResult;
use crate::graph::model::{DEFAULT_PROFILE_ID, Device, DeviceType, Profile, Status};
use crate::graph::store::EntityStore;

struct Seed {
    id: &'static str,
    name: &'static str,
    device_type: DeviceType,
    status: Status,
    ip: &'static str,
    mac: &'static str,
    location: &'static str,
    last_seen: &'static str,
    placements: &'static [(&'static str, f64, f64)],
    connections: &'static [&'static str],
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: "wap-1",
        name: "WAP-01",
        device_type: DeviceType::Wap,
        status: Status::Online,
        ip: "192.168.1.10",
        mac: "00:1B:44:11:3A:B7",
        location: "Floor 1",
        last_seen: "2 mins ago",
        placements: &[(DEFAULT_PROFILE_ID, 25.0, 30.0), ("floor-1", 35.0, 40.0)],
        connections: &["laptop-1", "server-1"],
    },
    Seed {
        id: "server-1",
        name: "SERVER-01",
        device_type: DeviceType::Server,
        status: Status::Online,
        ip: "192.168.1.20",
        mac: "00:1B:44:11:3A:B8",
        location: "Server Room",
        last_seen: "1 min ago",
        placements: &[(DEFAULT_PROFILE_ID, 50.0, 50.0), ("server-room", 60.0, 45.0)],
        connections: &["wap-1", "laptop-1"],
    },
    Seed {
        id: "laptop-1",
        name: "LT-01",
        device_type: DeviceType::Laptop,
        status: Status::Offline,
        ip: "192.168.1.30",
        mac: "00:1B:44:11:3A:B9",
        location: "Floor 2",
        last_seen: "15 mins ago",
        placements: &[(DEFAULT_PROFILE_ID, 75.0, 30.0)],
        connections: &["wap-1", "server-1"],
    },
];

pub fn demo_store() -> StoreResult<EntityStore> {
    let mut store = EntityStore::new();
    for (id, name, description) in [
        ("floor-1", "Floor 1", "First floor network layout"),
        ("server-room", "Server Room", "Server room layout"),
    ] {
        let mut profile = Profile::new(id, name);
        profile.description = Some(description.to_string());
        store.add_profile(profile)?;
    }

    for seed in &SEEDS {
        let mut device = Device::new(seed.id, seed.name, seed.device_type, seed.ip);
        device.status = seed.status;
        device.mac = Some(seed.mac.to_string());
        device.location = Some(seed.location.to_string());
        device.last_seen = seed.last_seen.to_string();
        store.add_device(device)?;
        for &(profile_id, x, y) in seed.placements {
            store.assign_device_to_profile(seed.id, profile_id)?;
            store.set_device_position(seed.id, profile_id, x, y)?;
        }
    }
    for seed in &SEEDS {
        for target in seed.connections {
            store.connect_devices(seed.id, target)?;
        }
    }
    Ok(store)
}
