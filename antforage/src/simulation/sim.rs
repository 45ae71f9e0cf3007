use macroquad::math::Vec2;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use shared::TickStats;
use std::collections::BTreeMap;

use crate::config::{ColonySpec, ConfigError, SimulationConfig};

use super::ant::{Ant, AntRef, AntSnapshot, Home, StepContext, TickEffects};
use super::avoidance::AvoidanceOutcome;
use super::colony::Colony;
use super::map::{FoodKey, WorldMap};
use super::portrayal::{Entity, Portrayal};
use super::{ColonyColors, DEFAULT_SEED, MAX_COLONIES};

pub struct Simulation {
    pub tick: u64,
    pub config: SimulationConfig,
    pub map: WorldMap,
    pub colonies: BTreeMap<u32, Colony>,
    /// Activation order of every live ant.
    schedule: Vec<AntRef>,
    rng: SmallRng,
    running: bool,
    /// Ants that found no free heading on any avoidance level, summed over the run.
    pub avoidance_exhausted: u64,
    pub kills: u64,
}

impl Simulation {
    /// Builds the world described by the config's scenario.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let scenario = config.scenario.clone();
        let mut sim = Self::empty(config);

        for spec in &scenario.colonies {
            sim.add_colony(spec)?;
        }
        for food in &scenario.foods {
            let pos = Vec2::new(food.position[0], food.position[1]);
            let radius = food.radius.unwrap_or(sim.config.food_radius);
            sim.map.place_food_at(pos, radius, food.stock);
        }
        for obstacle in &scenario.obstacles {
            let pos = Vec2::new(obstacle.position[0], obstacle.position[1]);
            sim.map.place_obstacle_at(pos, obstacle.radius);
        }

        tracing::info!(
            colonies = sim.colonies.len(),
            ants = sim.schedule.len(),
            foods = sim.map.foods.len(),
            obstacles = sim.map.obstacles.len(),
            "Simulation ready"
        );
        Ok(sim)
    }

    /// A world with the configured arena and nothing in it.
    pub fn empty(config: SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or(DEFAULT_SEED);
        tracing::debug!(seed, "Seeding simulation");
        Self {
            tick: 0,
            map: WorldMap::new(config.arena_width, config.arena_height),
            colonies: BTreeMap::new(),
            schedule: Vec::new(),
            rng: SmallRng::seed_from_u64(seed),
            running: true,
            avoidance_exhausted: 0,
            kills: 0,
            config,
        }
    }

    /// Founds a colony and spawns its initial population. Returns the new colony id.
    pub fn add_colony(&mut self, spec: &ColonySpec) -> Result<u32, ConfigError> {
        let free_id = (0..MAX_COLONIES as u32).find(|id| !self.colonies.contains_key(id));
        let Some(colony_id) = free_id else {
            return Err(ConfigError::TooManyColonies {
                count: self.colonies.len() + 1,
                max: MAX_COLONIES,
            });
        };

        let pos = Vec2::new(spec.position[0], spec.position[1]);
        let radius = spec
            .radius
            .unwrap_or_else(|| self.config.colony_radius(spec.ants + spec.warriors));
        let colors = ColonyColors::pick(
            colony_id as usize,
            spec.color,
            spec.ant_color,
            spec.marker_color,
        );
        let mut colony = Colony::new(colony_id, pos, radius, colors, spec.epsilon);

        let foragers = colony.spawn_foragers(spec.ants, &self.config, &self.map, &mut self.rng);
        let warriors = colony.spawn_warriors(spec.warriors, &self.config, &self.map, &mut self.rng);
        self.schedule.extend(
            foragers
                .into_iter()
                .chain(warriors)
                .map(|key| AntRef { key, colony_id }),
        );

        tracing::info!(
            colony = colony_id,
            x = pos.x,
            y = pos.y,
            radius,
            ants = spec.ants,
            warriors = spec.warriors,
            "Spawned colony"
        );
        self.colonies.insert(colony_id, colony);
        Ok(colony_id)
    }

    /// Adds a prepared ant to an existing colony and schedules it.
    pub fn spawn_ant(&mut self, colony_id: u32, ant: Ant) -> Option<AntRef> {
        let colony = self.colonies.get_mut(&colony_id)?;
        let key = colony.spawn_ant(ant);
        let ant_ref = AntRef { key, colony_id };
        self.schedule.push(ant_ref);
        Some(ant_ref)
    }

    pub fn place_food(&mut self, pos: Vec2, stock: u32) -> Option<FoodKey> {
        self.map.place_food_at(pos, self.config.food_radius, stock)
    }

    pub fn place_obstacle(&mut self, pos: Vec2, radius: f32) {
        self.map.place_obstacle_at(pos, radius);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advances every live ant once, then ages the world.
    pub fn step(&mut self) {
        if !self.running {
            return;
        }

        if self.config.shuffle_activation {
            self.schedule.shuffle(&mut self.rng);
        }

        let snapshot = self.snapshot();
        let mut effects = TickEffects::default();

        for i in 0..self.schedule.len() {
            let ant_ref = self.schedule[i];
            // Killed earlier this tick
            if effects.is_removed(&ant_ref) {
                continue;
            }
            let Some(colony) = self.colonies.get_mut(&ant_ref.colony_id) else {
                continue;
            };
            let Colony {
                colony_id,
                pos,
                radius,
                colors,
                ants,
                markers,
                food_collected,
                ..
            } = colony;
            let Some(ant) = ants.get_mut(ant_ref.key) else {
                continue;
            };

            let mut ctx = StepContext {
                config: &self.config,
                map: &mut self.map,
                home: Home {
                    colony_id: *colony_id,
                    pos: *pos,
                    radius: *radius,
                    marker_color: colors.marker,
                    markers,
                    food_collected,
                },
                peers: &snapshot,
                effects: &mut effects,
            };
            let report = ant.step(&mut ctx, &mut self.rng);

            if report.avoidance == AvoidanceOutcome::Exhausted {
                self.avoidance_exhausted += 1;
                tracing::debug!(
                    tick = self.tick,
                    colony = ant_ref.colony_id,
                    x = ant.pos.x,
                    y = ant.pos.y,
                    "No free heading found, keeping current one"
                );
            }
            if let Some(victim) = report.kill {
                tracing::debug!(
                    tick = self.tick,
                    hunter = ant_ref.colony_id,
                    victim = victim.colony_id,
                    "Warrior made a kill"
                );
            }
        }

        self.apply_effects(effects);

        for colony in self.colonies.values_mut() {
            let purged = colony.markers.decay();
            if purged > 0 {
                tracing::trace!(colony = colony.colony_id, purged, "Markers expired");
            }
        }

        let depleted = self.map.remove_depleted_food();
        if depleted > 0 {
            tracing::debug!(tick = self.tick, depleted, "Food piles exhausted");
        }

        self.tick += 1;

        if !self.map.has_food() {
            tracing::info!(tick = self.tick, "No food left, stopping");
            self.running = false;
        } else if self.config.max_ticks.is_some_and(|max| self.tick >= max) {
            tracing::info!(tick = self.tick, "Tick limit reached, stopping");
            self.running = false;
        }
    }

    /// Start-of-tick positions of every live ant, in roster order.
    fn snapshot(&self) -> Vec<AntSnapshot> {
        self.colonies
            .values()
            .flat_map(|colony| colony.ants.values())
            .map(|ant| AntSnapshot {
                ant_ref: ant.ant_ref,
                pos: ant.pos,
                speed: ant.speed,
            })
            .collect()
    }

    fn apply_effects(&mut self, effects: TickEffects) {
        self.kills += effects.kills as u64;
        for ant_ref in &effects.removed {
            if let Some(colony) = self.colonies.get_mut(&ant_ref.colony_id) {
                colony.despawn_ant(ant_ref.key);
            }
        }
        if !effects.removed.is_empty() {
            self.schedule.retain(|r| !effects.removed.contains(r));
        }

        for marker in effects.danger_markers {
            match self.colonies.get_mut(&marker.colony_id) {
                Some(colony) => colony.markers.lay(marker),
                None => tracing::warn!(
                    colony = marker.colony_id,
                    "Danger marker for unknown colony dropped"
                ),
            }
        }
    }

    pub fn get_ant(&self, ant_ref: &AntRef) -> Option<&Ant> {
        self.colonies
            .get(&ant_ref.colony_id)
            .and_then(|colony| colony.ants.get(ant_ref.key))
    }

    /// Current activation order.
    pub fn schedule(&self) -> &[AntRef] {
        &self.schedule
    }

    /// Returns the total number of ants across all colonies
    pub fn total_ant_count(&self) -> usize {
        self.colonies.values().map(|colony| colony.ants.len()).sum()
    }

    pub fn stats(&self) -> TickStats {
        let colonies: Vec<_> = self.colonies.values().map(Colony::stats).collect();
        TickStats {
            tick: self.tick,
            running: self.running,
            food_items: self.map.foods.len(),
            food_stock: self.map.total_food_stock(),
            food_markers: colonies.iter().map(|c| c.food_markers).sum(),
            danger_markers: colonies.iter().map(|c| c.danger_markers).sum(),
            avoidance_exhausted: self.avoidance_exhausted,
            kills: self.kills,
            colonies,
        }
    }

    /// Every entity in the arena.
    pub fn entities(&self) -> impl Iterator<Item = Entity<'_>> {
        let colonies = self.colonies.values();
        colonies
            .clone()
            .map(Entity::Colony)
            .chain(self.map.obstacles.iter().map(Entity::Obstacle))
            .chain(self.map.foods.values().map(Entity::Food))
            .chain(
                colonies
                    .clone()
                    .flat_map(|c| c.markers.iter())
                    .map(Entity::Marker),
            )
            .chain(colonies.flat_map(|c| c.ants.values()).map(Entity::Ant))
    }

    /// Portrayals of every entity, ordered bottom layer first.
    pub fn portrayals(&self) -> Vec<Portrayal> {
        let mut portrayals: Vec<_> = self.entities().map(|e| e.portrayal()).collect();
        portrayals.sort_by_key(|p| p.layer);
        portrayals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScenarioConfig;

    fn bare_config() -> SimulationConfig {
        SimulationConfig {
            seed: Some(7),
            arena_width: 100.0,
            arena_height: 100.0,
            scenario: ScenarioConfig::default(),
            ..SimulationConfig::default()
        }
    }

    fn colony_spec(x: f32, y: f32, ants: u32) -> ColonySpec {
        ColonySpec {
            position: [x, y],
            ants,
            warriors: 0,
            epsilon: 1.0,
            radius: None,
            color: None,
            ant_color: None,
            marker_color: None,
        }
    }

    #[test]
    fn test_default_scenario_builds() {
        let sim = Simulation::new(SimulationConfig::default()).expect("default scenario builds");
        assert_eq!(sim.colonies.len(), 2);
        assert_eq!(sim.total_ant_count(), 22);
        assert_eq!(sim.schedule().len(), 22);
        assert_eq!(sim.map.foods.len(), 3);
        assert_eq!(sim.map.obstacles.len(), 5);
        assert!(sim.is_running());
    }

    #[test]
    fn test_colony_limit() {
        let mut sim = Simulation::empty(bare_config());
        for _ in 0..MAX_COLONIES {
            sim.add_colony(&colony_spec(50.0, 50.0, 1)).unwrap();
        }
        assert!(matches!(
            sim.add_colony(&colony_spec(50.0, 50.0, 1)),
            Err(ConfigError::TooManyColonies { .. })
        ));
    }

    #[test]
    fn test_no_food_stops_after_one_tick() {
        let mut sim = Simulation::empty(bare_config());
        sim.add_colony(&colony_spec(50.0, 50.0, 3)).unwrap();
        sim.step();
        assert_eq!(sim.tick, 1);
        assert!(!sim.is_running());

        // Further steps are no-ops
        sim.step();
        assert_eq!(sim.tick, 1);
    }

    #[test]
    fn test_max_ticks_stops_run() {
        let mut config = bare_config();
        config.max_ticks = Some(3);
        let mut sim = Simulation::empty(config);
        sim.add_colony(&colony_spec(20.0, 20.0, 2)).unwrap();
        sim.place_food(Vec2::new(90.0, 90.0), 5);

        while sim.is_running() {
            sim.step();
        }
        assert_eq!(sim.tick, 3);
        assert_eq!(sim.stats().food_stock, 5);
    }

    #[test]
    fn test_stats_and_portrayals_cover_world() {
        let mut sim = Simulation::empty(bare_config());
        sim.add_colony(&colony_spec(20.0, 20.0, 4)).unwrap();
        sim.place_food(Vec2::new(80.0, 80.0), 6);
        sim.place_obstacle(Vec2::new(50.0, 50.0), 5.0);

        let stats = sim.stats();
        assert_eq!(stats.population(), 4);
        assert_eq!(stats.food_items, 1);
        assert_eq!(stats.food_stock, 6);
        assert_eq!(stats.colonies[0].food_picked, 0);

        let portrayals = sim.portrayals();
        // colony + obstacle + food + 4 ants
        assert_eq!(portrayals.len(), 7);
        assert!(portrayals.windows(2).all(|w| w[0].layer <= w[1].layer));
    }
}
