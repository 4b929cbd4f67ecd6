//! `netmap list`: print devices, optionally filtered.

use anyhow::Result;

use crate::commands::load_store;
use crate::graph::error::StoreError;
use crate::graph::model::{Device, DeviceType, Status};
use crate::graph::store::EntityStore;
use crate::workspace;

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub profile: Option<String>,
    pub device_type: Option<DeviceType>,
    pub status: Option<Status>,
    /// Case-insensitive substring of name, ip, mac or location.
    pub search: Option<String>,
}

impl ListFilter {
    fn matches(&self, device: &Device) -> bool {
        if self.device_type.is_some_and(|t| t != device.device_type) {
            return false;
        }
        if self.status.is_some_and(|s| s != device.status) {
            return false;
        }
        let Some(query) = &self.search else {
            return true;
        };
        let query = query.to_lowercase();
        [
            Some(device.name.as_str()),
            Some(device.ip.as_str()),
            device.mac.as_deref(),
            device.location.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&query))
    }
}

pub fn run(filter: &ListFilter) -> Result<()> {
    let root = workspace::find_root()?;
    let store = load_store(&root)?;

    let lines = list_devices(&store, filter)?;
    if lines.is_empty() {
        println!("  No devices.");
    } else {
        for line in lines {
            println!("  {}", line);
        }
    }
    Ok(())
}

fn list_devices(store: &EntityStore, filter: &ListFilter) -> Result<Vec<String>, StoreError> {
    let membership = store.membership();
    let candidates: Vec<&Device> = match &filter.profile {
        Some(id) => {
            if store.profile(id).is_none() {
                return Err(StoreError::profile_not_found(id));
            }
            membership.devices_in_profile(id).to_vec()
        }
        None => store.devices().iter().collect(),
    };
    Ok(candidates
        .into_iter()
        .filter(|device| filter.matches(device))
        .map(|device| {
            format!(
                "{:<12} {:<7} {:<8} {:<15} {}",
                device.id, device.device_type, device.status, device.ip, device.name
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::demo::demo_store;
    use pretty_assertions::assert_eq;

    fn ids(lines: &[String]) -> Vec<&str> {
        lines
            .iter()
            .filter_map(|line| line.split_whitespace().next())
            .collect()
    }

    #[test]
    fn lists_every_device_in_store_order() {
        let store = demo_store().unwrap();
        let lines = list_devices(&store, &ListFilter::default()).unwrap();
        assert_eq!(ids(&lines), vec!["wap-1", "server-1", "laptop-1"]);
        assert_eq!(
            lines[0],
            "wap-1        WAP     Online   192.168.1.10    WAP-01"
        );
    }

    #[test]
    fn profile_filter_uses_membership() {
        let store = demo_store().unwrap();
        let filter = ListFilter {
            profile: Some("server-room".to_string()),
            ..ListFilter::default()
        };
        assert_eq!(ids(&list_devices(&store, &filter).unwrap()), vec!["server-1"]);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let store = demo_store().unwrap();
        let filter = ListFilter {
            profile: Some("roof".to_string()),
            ..ListFilter::default()
        };
        assert_eq!(
            list_devices(&store, &filter).unwrap_err(),
            StoreError::profile_not_found("roof")
        );
    }

    #[test]
    fn type_status_and_search_combine() {
        let store = demo_store().unwrap();
        let offline = ListFilter {
            status: Some(Status::Offline),
            ..ListFilter::default()
        };
        assert_eq!(ids(&list_devices(&store, &offline).unwrap()), vec!["laptop-1"]);

        let servers = ListFilter {
            device_type: Some(DeviceType::Server),
            ..ListFilter::default()
        };
        assert_eq!(ids(&list_devices(&store, &servers).unwrap()), vec!["server-1"]);

        let by_location = ListFilter {
            search: Some("FLOOR".to_string()),
            ..ListFilter::default()
        };
        assert_eq!(
            ids(&list_devices(&store, &by_location).unwrap()),
            vec!["wap-1", "laptop-1"]
        );

        let by_mac = ListFilter {
            search: Some("3a:b8".to_string()),
            ..ListFilter::default()
        };
        assert_eq!(ids(&list_devices(&store, &by_mac).unwrap()), vec!["server-1"]);
    }
}
