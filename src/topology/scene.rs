//! Derives what to draw for the active profile.
//!
//! `Scene::build` is a pure function of the store and the interaction state.
//! It never fails: ids that do not resolve simply produce no element.

use std::collections::{BTreeSet, HashSet};

use crate::graph::model::{Device, DeviceType, Position, Status};
use crate::graph::store::EntityStore;
use crate::topology::viewport::{CanvasSize, Point, Viewport};

pub const DIMMED_NODE_OPACITY: f64 = 0.3;
pub const DIMMED_CURVE_OPACITY: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Full,
    Dimmed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodePlacement {
    pub device_id: String,
    pub name: String,
    pub device_type: DeviceType,
    pub status: Status,
    pub anchor: Position,
    pub screen: Point,
    pub selected: bool,
    pub emphasis: Emphasis,
}

impl NodePlacement {
    pub fn opacity(&self) -> f64 {
        match self.emphasis {
            Emphasis::Full => 1.0,
            Emphasis::Dimmed => DIMMED_NODE_OPACITY,
        }
    }
}

/// Quadratic Bézier between two node anchors.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionCurve {
    pub source: String,
    pub target: String,
    pub start: Point,
    pub control: Point,
    pub end: Point,
    pub emphasis: Emphasis,
}

impl ConnectionCurve {
    pub fn opacity(&self) -> f64 {
        match self.emphasis {
            Emphasis::Full => 1.0,
            Emphasis::Dimmed => DIMMED_CURVE_OPACITY,
        }
    }

    pub fn touches(&self, device_id: &str) -> bool {
        self.source == device_id || self.target == device_id
    }

    pub fn point_at(&self, t: f64) -> Point {
        let u = 1.0 - t;
        Point::new(
            u * u * self.start.x + 2.0 * u * t * self.control.x + t * t * self.end.x,
            u * u * self.start.y + 2.0 * u * t * self.control.y + t * t * self.end.y,
        )
    }

    /// `steps + 1` evenly spaced points from start to end.
    pub fn sample(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        (0..=steps)
            .map(|i| self.point_at(i as f64 / steps as f64))
            .collect()
    }
}

/// Half extents of the clickable area around a node, in screen units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitBox {
    pub half_width: f64,
    pub half_height: f64,
}

#[derive(Debug, Clone)]
pub struct SceneInput<'a> {
    pub store: &'a EntityStore,
    pub selection: Option<&'a str>,
    pub viewport: Viewport,
    pub canvas: CanvasSize,
    pub hidden_types: &'a BTreeSet<DeviceType>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub background: Option<String>,
    pub show_labels: bool,
    pub nodes: Vec<NodePlacement>,
    pub curves: Vec<ConnectionCurve>,
}

impl Scene {
    pub fn build(input: &SceneInput<'_>) -> Self {
        let profile = input.store.active_profile();
        let index = input.store.membership();
        let visible: Vec<&Device> = index
            .devices_in_profile(&profile.id)
            .iter()
            .copied()
            .filter(|d| !input.hidden_types.contains(&d.device_type))
            .collect();
        let visible_ids: HashSet<&str> = visible.iter().map(|d| d.id.as_str()).collect();

        // A selection that is not on screen highlights nothing.
        let selected = input
            .selection
            .and_then(|id| visible.iter().copied().find(|d| d.id == id));

        let nodes = visible
            .iter()
            .map(|device| {
                let anchor = device.anchor(&profile.id);
                let emphasis = match selected {
                    Some(sel) if sel.id != device.id && !sel.is_linked_to(device) => {
                        Emphasis::Dimmed
                    }
                    _ => Emphasis::Full,
                };
                NodePlacement {
                    device_id: device.id.clone(),
                    name: device.name.clone(),
                    device_type: device.device_type,
                    status: device.status,
                    anchor,
                    screen: input.viewport.to_screen(anchor, input.canvas),
                    selected: selected.is_some_and(|sel| sel.id == device.id),
                    emphasis,
                }
            })
            .collect::<Vec<_>>();

        let mut drawn: HashSet<(&str, &str)> = HashSet::new();
        let mut curves = Vec::new();
        for device in &visible {
            for target_id in &device.connections {
                if !visible_ids.contains(target_id.as_str()) {
                    continue;
                }
                let Some(target) = visible.iter().find(|d| d.id == *target_id) else {
                    continue;
                };
                let key = unordered(&device.id, &target.id);
                if !drawn.insert(key) {
                    continue;
                }
                let start = input
                    .viewport
                    .to_screen(device.anchor(&profile.id), input.canvas);
                let end = input
                    .viewport
                    .to_screen(target.anchor(&profile.id), input.canvas);
                let emphasis = match selected {
                    Some(sel) if sel.id != device.id && sel.id != target.id => Emphasis::Dimmed,
                    _ => Emphasis::Full,
                };
                curves.push(ConnectionCurve {
                    source: device.id.clone(),
                    target: target.id.clone(),
                    start,
                    control: start.midpoint(end),
                    end,
                    emphasis,
                });
            }
        }

        Self {
            background: profile.background.clone(),
            show_labels: profile.config.show_labels,
            nodes,
            curves,
        }
    }

    pub fn node(&self, device_id: &str) -> Option<&NodePlacement> {
        self.nodes.iter().find(|n| n.device_id == device_id)
    }

    /// The topmost node whose hit box contains `point`. Later nodes are drawn
    /// over earlier ones, so the search runs back to front.
    pub fn hit_test(&self, point: Point, hit: HitBox) -> Option<&NodePlacement> {
        self.nodes.iter().rev().find(|n| {
            (n.screen.x - point.x).abs() <= hit.half_width
                && (n.screen.y - point.y).abs() <= hit.half_height
        })
    }
}

fn unordered<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if a <= b { (a, b) } else { (b, a) }
}
