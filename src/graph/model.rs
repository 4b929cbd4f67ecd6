use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Id of the profile that always exists and cannot be deleted.
pub const DEFAULT_PROFILE_ID: &str = "default";

/// Closed set of device kinds shown on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "WAP")]
    Wap,
    Server,
    Laptop,
    #[serde(rename = "DPO")]
    Dpo,
}

impl DeviceType {
    pub const ALL: [DeviceType; 4] = [Self::Wap, Self::Server, Self::Laptop, Self::Dpo];

    pub fn label(self) -> &'static str {
        match self {
            Self::Wap => "WAP",
            Self::Server => "Server",
            Self::Laptop => "Laptop",
            Self::Dpo => "DPO",
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

impl FromStr for DeviceType {
    type Err = String;

    /// Case-insensitive, so `wap`, `WAP` and `Wap` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown device type `{s}` (expected WAP, Server, Laptop or DPO)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Status {
    Online,
    #[default]
    Offline,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Online => "Online",
            Self::Offline => "Offline",
        })
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("unknown status `{s}` (expected Online or Offline)")),
        }
    }
}

/// A point in percentage-of-viewport coordinates, 0–100 on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Where a device without a recorded position is drawn.
    pub const CENTER: Position = Position { x: 50.0, y: 50.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Clamp both axes independently into `[0, 100]`.
    pub fn clamped(self) -> Self {
        Self {
            x: self.x.clamp(0.0, 100.0),
            y: self.y.clamp(0.0, 100.0),
        }
    }
}

/// A networked device.
///
/// `profiles` and the matching `Profile::device_ids` are kept in lockstep by
/// the store; never edit either side directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub status: Status,
    pub ip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub last_seen: String,
    #[serde(default)]
    pub profiles: BTreeSet<String>,
    /// Per-profile anchor, keyed by profile id.
    #[serde(default)]
    pub positions: BTreeMap<String, Position>,
    /// Adjacency as recorded on this device; the reverse entry may be absent.
    #[serde(default)]
    pub connections: BTreeSet<String>,
}

impl Device {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        device_type: DeviceType,
        ip: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            device_type,
            status: Status::default(),
            ip: ip.into(),
            mac: None,
            location: None,
            last_seen: String::new(),
            profiles: BTreeSet::new(),
            positions: BTreeMap::new(),
            connections: BTreeSet::new(),
        }
    }

    /// The anchor for `profile_id`, falling back to the canvas centre.
    pub fn anchor(&self, profile_id: &str) -> Position {
        self.positions
            .get(profile_id)
            .copied()
            .unwrap_or(Position::CENTER)
    }

    /// True when either side lists the other.
    pub fn is_linked_to(&self, other: &Device) -> bool {
        self.connections.contains(&other.id) || other.connections.contains(&self.id)
    }
}

/// Advisory arrangement hint; the map never moves devices on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Hierarchical,
    Circular,
    Grid,
}

impl Layout {
    pub fn next(self) -> Self {
        match self {
            Self::Hierarchical => Self::Circular,
            Self::Circular => Self::Grid,
            Self::Grid => Self::Hierarchical,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Circular => "circular",
            Self::Grid => "grid",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    System,
    Light,
    Dark,
}

impl Theme {
    pub fn next(self) -> Self {
        match self {
            Self::System => Self::Light,
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileConfig {
    #[serde(default)]
    pub layout: Layout,
    #[serde(default = "default_true")]
    pub auto_arrange: bool,
    #[serde(default = "default_true")]
    pub show_labels: bool,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            auto_arrange: true,
            show_labels: true,
            theme: Theme::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// A named view over a subset of devices, usually one floor plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Opaque image reference (URL or path), only ever displayed.
    #[serde(default, rename = "mapImage", skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default, rename = "devices")]
    pub device_ids: BTreeSet<String>,
    #[serde(default)]
    pub config: ProfileConfig,
}

impl Profile {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            background: None,
            device_ids: BTreeSet::new(),
            config: ProfileConfig::default(),
        }
    }

    pub fn is_default(&self) -> bool {
        self.id == DEFAULT_PROFILE_ID
    }
}

/// Field-wise update for a device. `None` leaves a field untouched; for the
/// optional fields `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DevicePatch {
    pub name: Option<String>,
    pub device_type: Option<DeviceType>,
    pub status: Option<Status>,
    pub ip: Option<String>,
    pub mac: Option<Option<String>>,
    pub location: Option<Option<String>>,
    pub last_seen: Option<String>,
    pub connections: Option<BTreeSet<String>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub background: Option<Option<String>>,
    pub config: Option<ProfileConfig>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_parses_case_insensitively() {
        assert_eq!("wap".parse::<DeviceType>(), Ok(DeviceType::Wap));
        assert_eq!("SERVER".parse::<DeviceType>(), Ok(DeviceType::Server));
        assert!("router".parse::<DeviceType>().is_err());
    }

    #[test]
    fn anchor_defaults_to_center_when_profile_has_no_position() {
        let mut device = Device::new("wap-1", "WAP-01", DeviceType::Wap, "10.0.0.1");
        device
            .positions
            .insert("floor-1".to_string(), Position::new(10.0, 20.0));
        assert_eq!(device.anchor("floor-1"), Position::new(10.0, 20.0));
        assert_eq!(device.anchor(DEFAULT_PROFILE_ID), Position::CENTER);
    }

    #[test]
    fn position_clamps_each_axis_independently() {
        assert_eq!(
            Position::new(-5.0, 140.0).clamped(),
            Position::new(0.0, 100.0)
        );
        assert_eq!(Position::new(37.0, 64.0).clamped(), Position::new(37.0, 64.0));
    }

    #[test]
    fn link_check_accepts_either_direction() {
        let mut a = Device::new("a", "A-1", DeviceType::Server, "10.0.0.1");
        let b = Device::new("b", "B-1", DeviceType::Laptop, "10.0.0.2");
        assert!(!a.is_linked_to(&b));
        a.connections.insert("b".to_string());
        assert!(a.is_linked_to(&b));
        assert!(b.is_linked_to(&a));
    }

    #[test]
    fn device_serializes_with_wire_field_names() {
        let mut device = Device::new("wap-1", "WAP-01", DeviceType::Wap, "10.0.0.1");
        device.last_seen = "2 mins ago".to_string();
        let json = serde_json::to_value(&device).unwrap();
        assert_eq!(json["type"], "WAP");
        assert_eq!(json["lastSeen"], "2 mins ago");
        assert!(json.get("mac").is_none(), "absent mac should be omitted");
    }
}
