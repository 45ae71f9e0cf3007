pub mod ant;
pub mod avoidance;
mod colony;
mod map;
mod marker;
mod palette;
mod portrayal;
mod sim;
mod timer;

// Re-export key types for easier imports
pub use ant::{
    Ant, AntKey, AntKind, AntRef, AntSnapshot, AntState, GoTo, Home, StepContext, StepReport,
    TickEffects,
};
pub use avoidance::{AvoidanceOutcome, Surroundings};
pub use colony::Colony;
pub use map::{Food, FoodKey, Obstacle, WorldMap};
pub use marker::{Marker, MarkerPurpose, MarkerStore};
pub use palette::{ColonyColors, PREDEFINED_COLONY_COLORS};
pub use portrayal::{Entity, Portrayal, Shape};
pub use sim::Simulation;
pub use timer::Cooldown;

// Simulation constants
pub const MAX_COLONIES: usize = 5;
pub const FOOD_COLOR: u32 = 0x808000;
pub const OBSTACLE_COLOR: u32 = 0x000000;
pub const MARKER_PORTRAYAL_RADIUS: f32 = 2.0;

// Fallback seed when the config does not pin one
pub const DEFAULT_SEED: u64 = 0xFACA_DEAF_0123_4567;
