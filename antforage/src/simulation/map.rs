use macroquad::math::Vec2;
use slotmap::{SlotMap, new_key_type};

new_key_type! {
    /// Key for food slotmap.
    pub struct FoodKey;
}

/// A depletable food pile.
#[derive(Debug, Clone, PartialEq)]
pub struct Food {
    pub pos: Vec2,
    pub radius: f32,
    pub stock: u32,
}

impl Food {
    pub fn is_depleted(&self) -> bool {
        self.stock == 0
    }
}

/// An impassable disc.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obstacle {
    pub pos: Vec2,
    pub radius: f32,
}

/// Static geometry and food of the arena.
pub struct WorldMap {
    pub width: f32,
    pub height: f32,
    pub foods: SlotMap<FoodKey, Food>,
    pub obstacles: Vec<Obstacle>,
}

impl WorldMap {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            foods: SlotMap::with_key(),
            obstacles: Vec::new(),
        }
    }

    #[inline(always)]
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        shared::is_out_of_bounds(pos.x, pos.y, self.width, self.height)
    }

    pub fn place_food_at(&mut self, pos: Vec2, radius: f32, stock: u32) -> Option<FoodKey> {
        if self.is_out_of_bounds(pos) || stock == 0 {
            tracing::warn!(x = pos.x, y = pos.y, stock, "Refusing to place food");
            return None;
        }
        Some(self.foods.insert(Food { pos, radius, stock }))
    }

    pub fn place_obstacle_at(&mut self, pos: Vec2, radius: f32) {
        self.obstacles.push(Obstacle { pos, radius });
    }

    /// Takes one piece from a food pile. Returns false if there was nothing left to take.
    pub fn take_food(&mut self, key: FoodKey) -> bool {
        match self.foods.get_mut(key) {
            Some(food) if food.stock > 0 => {
                food.stock -= 1;
                true
            }
            _ => false,
        }
    }

    /// Nearest non-depleted food pile strictly closer than `within`.
    /// Equidistant piles resolve to the first in slot order.
    pub fn nearest_food(&self, pos: Vec2, within: f32) -> Option<(FoodKey, &Food)> {
        let mut best: Option<(FoodKey, &Food, f32)> = None;
        for (key, food) in self.foods.iter() {
            if food.is_depleted() {
                continue;
            }
            let dist = pos.distance(food.pos);
            if dist >= within {
                continue;
            }
            if best.map_or(true, |(_, _, best_dist)| dist < best_dist) {
                best = Some((key, food, dist));
            }
        }
        best.map(|(key, food, _)| (key, food))
    }

    /// Obstacles whose edge lies within `within` of `pos`.
    pub fn obstacles_near(&self, pos: Vec2, within: f32) -> impl Iterator<Item = &Obstacle> {
        self.obstacles
            .iter()
            .filter(move |o| pos.distance(o.pos) - o.radius < within)
    }

    /// Drops depleted food piles. Returns how many were removed.
    pub fn remove_depleted_food(&mut self) -> usize {
        let before = self.foods.len();
        self.foods.retain(|_, food| !food.is_depleted());
        before - self.foods.len()
    }

    pub fn has_food(&self) -> bool {
        !self.foods.is_empty()
    }

    pub fn total_food_stock(&self) -> u64 {
        self.foods.values().map(|f| f.stock as u64).sum()
    }
}
