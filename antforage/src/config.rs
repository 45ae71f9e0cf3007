use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::simulation::MAX_COLONIES;

// Arena defaults
pub const DEFAULT_ARENA_WIDTH: f32 = 600.0;
pub const DEFAULT_ARENA_HEIGHT: f32 = 600.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: String, reason: String },
    #[error("too many colonies: {count} (max is {max})")]
    TooManyColonies { count: usize, max: usize },
}

impl ConfigError {
    fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Movement and perception parameters shared by every agent of a caste.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AgentParams {
    pub speed: f32,
    pub sight_radius: f32,
    /// Chance per exploring tick of drawing a fresh random heading.
    pub angle_change_probability: f32,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            speed: 5.0,
            sight_radius: 10.0,
            angle_change_probability: 0.03,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WarriorParams {
    pub speed: f32,
    pub sight_radius: f32,
    pub angle_change_probability: f32,
    /// Kills a warrior can make before it retires.
    pub lifespan: u32,
}

impl Default for WarriorParams {
    fn default() -> Self {
        Self {
            speed: 6.0,
            sight_radius: 30.0,
            angle_change_probability: 0.05,
            lifespan: 5,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct MarkerParams {
    /// Ticks a marker survives after being dropped.
    pub lifetime: u32,
    /// Maximum number of live markers a single agent may own.
    pub cap_per_agent: u32,
    /// Ticks an agent ignores markers after dropping one.
    pub ignore_cooldown: u32,
    pub danger_color: u32,
    /// Exploring foragers turn around when one of their colony's danger markers is in sight.
    pub flee_danger: bool,
}

impl Default for MarkerParams {
    fn default() -> Self {
        Self {
            lifetime: 60,
            cap_per_agent: 20,
            ignore_cooldown: 5,
            danger_color: 0xE63946,
            flee_danger: false,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AvoidanceParams {
    /// Headings tried per search level before giving up.
    pub budget: u32,
    /// Upper bound of the angular increment, in radians.
    pub step: f32,
}

impl Default for AvoidanceParams {
    fn default() -> Self {
        Self {
            budget: 2000,
            step: 0.02,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ColonySpec {
    pub position: [f32; 2],
    #[serde(default)]
    pub ants: u32,
    #[serde(default)]
    pub warriors: u32,
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,
    /// Overrides the radius derived from the initial population.
    #[serde(default)]
    pub radius: Option<f32>,
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub ant_color: Option<u32>,
    #[serde(default)]
    pub marker_color: Option<u32>,
}

fn default_epsilon() -> f32 {
    0.9
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct FoodSpec {
    pub position: [f32; 2],
    pub stock: u32,
    #[serde(default)]
    pub radius: Option<f32>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct ObstacleSpec {
    pub position: [f32; 2],
    pub radius: f32,
}

/// Explicit world layout. Every entity is placed where it is listed.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct ScenarioConfig {
    pub colonies: Vec<ColonySpec>,
    pub foods: Vec<FoodSpec>,
    pub obstacles: Vec<ObstacleSpec>,
}

impl ScenarioConfig {
    /// Two rival colonies, three food piles and five rocks.
    pub fn two_colonies() -> Self {
        Self {
            colonies: vec![
                ColonySpec {
                    position: [120.0, 120.0],
                    ants: 10,
                    warriors: 1,
                    epsilon: 0.9,
                    radius: None,
                    color: Some(0x00C8FF),
                    ant_color: Some(0x0000A6),
                    marker_color: None,
                },
                ColonySpec {
                    position: [480.0, 480.0],
                    ants: 10,
                    warriors: 1,
                    epsilon: 0.6,
                    radius: None,
                    color: Some(0x52FF2B),
                    ant_color: Some(0x008300),
                    marker_color: None,
                },
            ],
            foods: vec![
                FoodSpec {
                    position: [300.0, 150.0],
                    stock: 20,
                    radius: None,
                },
                FoodSpec {
                    position: [150.0, 420.0],
                    stock: 20,
                    radius: None,
                },
                FoodSpec {
                    position: [440.0, 260.0],
                    stock: 20,
                    radius: None,
                },
            ],
            obstacles: vec![
                ObstacleSpec {
                    position: [300.0, 300.0],
                    radius: 25.0,
                },
                ObstacleSpec {
                    position: [200.0, 250.0],
                    radius: 15.0,
                },
                ObstacleSpec {
                    position: [380.0, 180.0],
                    radius: 12.0,
                },
                ObstacleSpec {
                    position: [260.0, 470.0],
                    radius: 20.0,
                },
                ObstacleSpec {
                    position: [500.0, 350.0],
                    radius: 10.0,
                },
            ],
        }
    }
}

/// Immutable simulation parameters, built once before the world.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub seed: Option<u64>,
    pub arena_width: f32,
    pub arena_height: f32,
    /// Stop after this many ticks even if food remains.
    pub max_ticks: Option<u64>,
    /// Shuffle the activation order every tick.
    pub shuffle_activation: bool,
    pub ant: AgentParams,
    pub warrior: WarriorParams,
    pub markers: MarkerParams,
    pub avoidance: AvoidanceParams,
    pub food_radius: f32,
    pub colony_min_radius: f32,
    /// Colony radius grows with the square root of its initial population.
    pub colony_radius_scale: f32,
    pub scenario: ScenarioConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            arena_width: DEFAULT_ARENA_WIDTH,
            arena_height: DEFAULT_ARENA_HEIGHT,
            max_ticks: None,
            shuffle_activation: true,
            ant: AgentParams::default(),
            warrior: WarriorParams::default(),
            markers: MarkerParams::default(),
            avoidance: AvoidanceParams::default(),
            food_radius: 4.0,
            colony_min_radius: 5.0,
            colony_radius_scale: 2.5,
            scenario: ScenarioConfig::two_colonies(),
        }
    }
}

impl SimulationConfig {
    /// Loads and validates a configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SimulationConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Radius of a colony founded with `population` agents.
    pub fn colony_radius(&self, population: u32) -> f32 {
        (self.colony_radius_scale * (population as f32).sqrt()).max(self.colony_min_radius)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena_width", self.arena_width)?;
        positive("arena_height", self.arena_height)?;
        positive("ant.speed", self.ant.speed)?;
        positive("ant.sight_radius", self.ant.sight_radius)?;
        probability("ant.angle_change_probability", self.ant.angle_change_probability)?;
        positive("warrior.speed", self.warrior.speed)?;
        positive("warrior.sight_radius", self.warrior.sight_radius)?;
        probability(
            "warrior.angle_change_probability",
            self.warrior.angle_change_probability,
        )?;
        if self.warrior.lifespan == 0 {
            return Err(ConfigError::invalid("warrior.lifespan", "must be at least 1"));
        }
        if self.markers.lifetime == 0 {
            return Err(ConfigError::invalid("markers.lifetime", "must be at least 1"));
        }
        if self.avoidance.budget == 0 {
            return Err(ConfigError::invalid("avoidance.budget", "must be at least 1"));
        }
        positive("avoidance.step", self.avoidance.step)?;
        non_negative("food_radius", self.food_radius)?;
        non_negative("colony_min_radius", self.colony_min_radius)?;
        non_negative("colony_radius_scale", self.colony_radius_scale)?;

        let scenario = &self.scenario;
        if scenario.colonies.len() > MAX_COLONIES {
            return Err(ConfigError::TooManyColonies {
                count: scenario.colonies.len(),
                max: MAX_COLONIES,
            });
        }
        for (i, colony) in scenario.colonies.iter().enumerate() {
            self.in_arena(&format!("scenario.colonies[{}].position", i), colony.position)?;
            probability(&format!("scenario.colonies[{}].epsilon", i), colony.epsilon)?;
            if let Some(radius) = colony.radius {
                non_negative(&format!("scenario.colonies[{}].radius", i), radius)?;
            }
        }
        for (i, food) in scenario.foods.iter().enumerate() {
            self.in_arena(&format!("scenario.foods[{}].position", i), food.position)?;
            if let Some(radius) = food.radius {
                non_negative(&format!("scenario.foods[{}].radius", i), radius)?;
            }
        }
        for (i, obstacle) in scenario.obstacles.iter().enumerate() {
            positive(&format!("scenario.obstacles[{}].radius", i), obstacle.radius)?;
        }
        Ok(())
    }

    fn in_arena(&self, field: &str, position: [f32; 2]) -> Result<(), ConfigError> {
        if shared::is_out_of_bounds(
            position[0],
            position[1],
            self.arena_width,
            self.arena_height,
        ) {
            return Err(ConfigError::invalid(
                field,
                format!(
                    "({}, {}) lies outside the {}x{} arena",
                    position[0], position[1], self.arena_width, self.arena_height
                ),
            ));
        }
        Ok(())
    }
}

fn positive(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be > 0", value)))
    }
}

fn non_negative(field: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{} must be >= 0", value)))
    }
}

fn probability(field: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("{} is not a probability in [0, 1]", value),
        ))
    }
}
