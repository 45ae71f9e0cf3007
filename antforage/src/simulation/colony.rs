use super::ant::{Ant, AntKey};
use super::{ColonyColors, MarkerPurpose, MarkerStore, WorldMap};
use crate::config::SimulationConfig;
use macroquad::math::Vec2;
use rand::Rng;
use shared::ColonyStats;
use slotmap::SlotMap;

// Tries at finding an in-bounds spawn point before falling back to the nest center
const SPAWN_ATTEMPTS: u32 = 16;

#[derive(Debug)]
pub struct Colony {
    pub colony_id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub colors: ColonyColors,
    /// Probability that an ant of this colony acts on what it senses.
    pub epsilon: f32,
    pub ants: SlotMap<AntKey, Ant>,
    pub markers: MarkerStore,
    pub food_collected: u32,
}

impl Colony {
    pub fn new(colony_id: u32, pos: Vec2, radius: f32, colors: ColonyColors, epsilon: f32) -> Self {
        Self {
            colony_id,
            pos,
            radius,
            colors,
            epsilon,
            ants: SlotMap::with_key(),
            markers: MarkerStore::new(),
            food_collected: 0,
        }
    }

    /// Adds an ant to the roster and stamps it with its key.
    pub fn spawn_ant(&mut self, mut ant: Ant) -> AntKey {
        ant.ant_ref.colony_id = self.colony_id;
        self.ants.insert_with_key(|k| {
            ant.ant_ref.key = k;
            ant
        })
    }

    pub fn spawn_foragers<R: Rng + ?Sized>(
        &mut self,
        count: u32,
        config: &SimulationConfig,
        map: &WorldMap,
        rng: &mut R,
    ) -> Vec<AntKey> {
        (0..count)
            .map(|_| {
                let pos = self.random_spawn_point(map, rng);
                let heading = shared::random_heading(rng);
                self.spawn_ant(Ant::forager(
                    pos,
                    heading,
                    self.colony_id,
                    self.epsilon,
                    &config.ant,
                    self.colors.ant,
                ))
            })
            .collect()
    }

    pub fn spawn_warriors<R: Rng + ?Sized>(
        &mut self,
        count: u32,
        config: &SimulationConfig,
        map: &WorldMap,
        rng: &mut R,
    ) -> Vec<AntKey> {
        (0..count)
            .map(|_| {
                let pos = self.random_spawn_point(map, rng);
                let heading = shared::random_heading(rng);
                self.spawn_ant(Ant::warrior(
                    pos,
                    heading,
                    self.colony_id,
                    &config.warrior,
                    self.colors.ant,
                ))
            })
            .collect()
    }

    /// Uniform point inside the nest disk that lies within the arena.
    fn random_spawn_point<R: Rng + ?Sized>(&self, map: &WorldMap, rng: &mut R) -> Vec2 {
        for _ in 0..SPAWN_ATTEMPTS {
            let r = self.radius * rng.random::<f32>().sqrt();
            let angle = shared::random_heading(rng);
            let (x, y) = shared::move_by(self.pos.x, self.pos.y, r, angle);
            let candidate = Vec2::new(x, y);
            if !map.is_out_of_bounds(candidate) {
                return candidate;
            }
        }
        self.pos
    }

    pub fn despawn_ant(&mut self, key: AntKey) -> Option<Ant> {
        let removed = self.ants.remove(key);
        match &removed {
            Some(ant) if ant.carrying_food => {
                tracing::debug!(
                    colony = self.colony_id,
                    x = ant.pos.x,
                    y = ant.pos.y,
                    "Ant removed while carrying food; the food is lost"
                );
            }
            Some(_) => {}
            None => {
                tracing::warn!(
                    colony = self.colony_id,
                    ?key,
                    "AntKey not found in colony during despawn attempt"
                );
            }
        }
        removed
    }

    pub fn warrior_count(&self) -> usize {
        self.ants.values().filter(|a| a.is_warrior()).count()
    }

    pub fn stats(&self) -> ColonyStats {
        ColonyStats {
            colony_id: self.colony_id,
            food_picked: self.food_collected,
            population: self.ants.len(),
            warriors: self.warrior_count(),
            food_markers: self.markers.count(MarkerPurpose::Food),
            danger_markers: self.markers.count(MarkerPurpose::Danger),
        }
    }
}
