pub mod api;
pub mod util;

pub use api::{ColonyStats, TickStats};
pub use util::{bearing_to, distance, is_out_of_bounds, move_by, random_heading, wrap_angle};
