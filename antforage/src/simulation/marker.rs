use macroquad::prelude::{Color, Vec2};
use std::collections::HashMap;

use super::ant::AntKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerPurpose {
    Food,
    Danger,
}

/// A scent point dropped by an agent.
#[derive(Debug, Clone)]
pub struct Marker {
    pub pos: Vec2,
    pub colony_id: u32,
    pub purpose: MarkerPurpose,
    /// Heading of the trail at the drop site. Only food markers carry one.
    pub heading: Option<f32>,
    pub color: Color,
    /// Ticks left before the marker is purged.
    pub lifetime: u32,
    pub dropped_by: Option<AntKey>,
}

impl Marker {
    pub fn food(pos: Vec2, colony_id: u32, heading: f32, color: Color, lifetime: u32) -> Self {
        Self {
            pos,
            colony_id,
            purpose: MarkerPurpose::Food,
            heading: Some(heading),
            color,
            lifetime,
            dropped_by: None,
        }
    }

    pub fn danger(pos: Vec2, colony_id: u32, color: Color, lifetime: u32) -> Self {
        Self {
            pos,
            colony_id,
            purpose: MarkerPurpose::Danger,
            heading: None,
            color,
            lifetime,
            dropped_by: None,
        }
    }

    pub fn dropped_by(mut self, key: AntKey) -> Self {
        self.dropped_by = Some(key);
        self
    }
}

/// Markers belonging to one colony.
#[derive(Debug, Clone, Default)]
pub struct MarkerStore {
    markers: Vec<Marker>,
    live_by_agent: HashMap<AntKey, u32>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lay(&mut self, marker: Marker) {
        if marker.lifetime == 0 {
            return;
        }
        if let Some(key) = marker.dropped_by {
            *self.live_by_agent.entry(key).or_insert(0) += 1;
        }
        self.markers.push(marker);
    }

    /// Ages every marker by one tick and purges the expired ones.
    /// Returns how many markers were purged.
    pub fn decay(&mut self) -> usize {
        let before = self.markers.len();
        let live_by_agent = &mut self.live_by_agent;
        self.markers.retain_mut(|marker| {
            marker.lifetime = marker.lifetime.saturating_sub(1);
            if marker.lifetime > 0 {
                return true;
            }
            if let Some(key) = marker.dropped_by {
                if let Some(count) = live_by_agent.get_mut(&key) {
                    *count -= 1;
                    if *count == 0 {
                        live_by_agent.remove(&key);
                    }
                }
            }
            false
        });
        before - self.markers.len()
    }

    /// Number of live markers dropped by `key`.
    pub fn live_count(&self, key: AntKey) -> u32 {
        self.live_by_agent.get(&key).copied().unwrap_or(0)
    }

    /// Nearest marker with `purpose` strictly closer than `within`.
    /// Equidistant markers resolve to the oldest one.
    pub fn nearest(&self, pos: Vec2, purpose: MarkerPurpose, within: f32) -> Option<&Marker> {
        let mut best: Option<(&Marker, f32)> = None;
        for marker in self.markers.iter().filter(|m| m.purpose == purpose) {
            let dist = pos.distance(marker.pos);
            if dist >= within {
                continue;
            }
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((marker, dist));
            }
        }
        best.map(|(marker, _)| marker)
    }

    pub fn count(&self, purpose: MarkerPurpose) -> usize {
        self.markers.iter().filter(|m| m.purpose == purpose).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}
