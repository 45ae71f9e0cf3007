use serde::{Deserialize, Serialize};

/// Per-colony aggregates exposed to charting hosts.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ColonyStats {
    pub colony_id: u32,
    pub food_picked: u32,
    pub population: usize,
    pub warriors: usize,
    pub food_markers: usize,
    pub danger_markers: usize,
}

/// Read-only world aggregates sampled after a tick.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TickStats {
    pub tick: u64,
    pub running: bool,
    pub food_items: usize,
    pub food_stock: u64,
    pub food_markers: usize,
    pub danger_markers: usize,
    pub avoidance_exhausted: u64,
    /// Ants killed by warriors so far.
    pub kills: u64,
    pub colonies: Vec<ColonyStats>,
}

impl TickStats {
    /// Total number of agents still alive across all colonies.
    pub fn population(&self) -> usize {
        self.colonies.iter().map(|c| c.population).sum()
    }

    /// Total food delivered to colonies so far.
    pub fn food_picked(&self) -> u64 {
        self.colonies.iter().map(|c| c.food_picked as u64).sum()
    }
}
