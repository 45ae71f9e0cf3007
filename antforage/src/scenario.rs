use bincode::{decode_from_slice, encode_to_vec};
use bincode_derive::{Decode, Encode};
use macroquad::prelude::Color;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::{ColonySpec, ConfigError, FoodSpec, ObstacleSpec, ScenarioConfig, SimulationConfig};
use crate::simulation::Simulation;

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to access scenario file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode scenario: {0}")]
    Encode(#[from] bincode::error::EncodeError),
    #[error("failed to decode scenario: {0}")]
    Decode(#[from] bincode::error::DecodeError),
    #[error("scenario describes an invalid world: {0}")]
    Invalid(#[from] ConfigError),
}

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct SerializedColony {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub ants: u32,
    pub warriors: u32,
    pub epsilon: f32,
    pub color: u32,
    pub ant_color: u32,
    pub marker_color: u32,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct SerializedFood {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub stock: u32,
}

#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct SerializedObstacle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

/// Static layout of a world: arena, colonies with their head counts, remaining food and rocks.
#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub struct SerializedScenario {
    pub arena_width: f32,
    pub arena_height: f32,
    pub colonies: Vec<SerializedColony>,
    pub foods: Vec<SerializedFood>,
    pub obstacles: Vec<SerializedObstacle>,
}

impl From<&Simulation> for SerializedScenario {
    fn from(sim: &Simulation) -> Self {
        let colonies = sim
            .colonies
            .values()
            .map(|colony| {
                let warriors = colony.warrior_count() as u32;
                SerializedColony {
                    x: colony.pos.x,
                    y: colony.pos.y,
                    radius: colony.radius,
                    ants: colony.ants.len() as u32 - warriors,
                    warriors,
                    epsilon: colony.epsilon,
                    color: to_hex(colony.colors.colony),
                    ant_color: to_hex(colony.colors.ant),
                    marker_color: to_hex(colony.colors.marker),
                }
            })
            .collect();
        let foods = sim
            .map
            .foods
            .values()
            .filter(|food| !food.is_depleted())
            .map(|food| SerializedFood {
                x: food.pos.x,
                y: food.pos.y,
                radius: food.radius,
                stock: food.stock,
            })
            .collect();
        let obstacles = sim
            .map
            .obstacles
            .iter()
            .map(|o| SerializedObstacle {
                x: o.pos.x,
                y: o.pos.y,
                radius: o.radius,
            })
            .collect();

        Self {
            arena_width: sim.map.width,
            arena_height: sim.map.height,
            colonies,
            foods,
            obstacles,
        }
    }
}

impl SerializedScenario {
    pub fn save(&self, path: &Path) -> Result<(), ScenarioError> {
        let data = encode_to_vec(self, bincode::config::standard())?;
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| ScenarioError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, data).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "Saved scenario");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let data = fs::read(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let (scenario, _len): (SerializedScenario, _) =
            decode_from_slice(&data, bincode::config::standard())?;
        tracing::info!(path = %path.display(), "Loaded scenario");
        Ok(scenario)
    }

    /// Replaces the arena and scenario of `base` with this layout.
    pub fn into_config(self, base: SimulationConfig) -> Result<SimulationConfig, ScenarioError> {
        let config = SimulationConfig {
            arena_width: self.arena_width,
            arena_height: self.arena_height,
            scenario: ScenarioConfig {
                colonies: self
                    .colonies
                    .into_iter()
                    .map(|c| ColonySpec {
                        position: [c.x, c.y],
                        ants: c.ants,
                        warriors: c.warriors,
                        epsilon: c.epsilon,
                        radius: Some(c.radius),
                        color: Some(c.color),
                        ant_color: Some(c.ant_color),
                        marker_color: Some(c.marker_color),
                    })
                    .collect(),
                foods: self
                    .foods
                    .into_iter()
                    .map(|f| FoodSpec {
                        position: [f.x, f.y],
                        stock: f.stock,
                        radius: Some(f.radius),
                    })
                    .collect(),
                obstacles: self
                    .obstacles
                    .into_iter()
                    .map(|o| ObstacleSpec {
                        position: [o.x, o.y],
                        radius: o.radius,
                    })
                    .collect(),
            },
            ..base
        };
        config.validate()?;
        Ok(config)
    }
}

/// Packs the RGB channels of a color as `0xRRGGBB`. Alpha is dropped.
fn to_hex(color: Color) -> u32 {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
    (channel(color.r) << 16) | (channel(color.g) << 8) | channel(color.b)
}
