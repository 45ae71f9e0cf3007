use super::{Ant, Colony, FOOD_COLOR, Food, MARKER_PORTRAYAL_RADIUS, Marker, OBSTACLE_COLOR, Obstacle};
use macroquad::prelude::{Color, Vec2};

// Draw layers, bottom to top
pub const COLONY_LAYER: u8 = 0;
pub const TERRAIN_LAYER: u8 = 1;
pub const MARKER_LAYER: u8 = 2;
pub const ANT_LAYER: u8 = 3;

const WARRIOR_SCALE: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    ArrowHead { heading: f32, scale: f32 },
    Circle { radius: f32, filled: bool },
}

/// How a host should draw one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Portrayal {
    pub pos: Vec2,
    pub shape: Shape,
    pub color: Color,
    pub layer: u8,
}

/// Anything that shows up in the arena.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'a> {
    Ant(&'a Ant),
    Food(&'a Food),
    Obstacle(&'a Obstacle),
    Marker(&'a Marker),
    Colony(&'a Colony),
}

impl Entity<'_> {
    pub fn pos(&self) -> Vec2 {
        match self {
            Entity::Ant(ant) => ant.pos,
            Entity::Food(food) => food.pos,
            Entity::Obstacle(obstacle) => obstacle.pos,
            Entity::Marker(marker) => marker.pos,
            Entity::Colony(colony) => colony.pos,
        }
    }

    pub fn portrayal(&self) -> Portrayal {
        let pos = self.pos();
        match self {
            Entity::Ant(ant) => Portrayal {
                pos,
                shape: Shape::ArrowHead {
                    heading: ant.heading,
                    scale: if ant.is_warrior() { WARRIOR_SCALE } else { 1.0 },
                },
                color: ant.color,
                layer: ANT_LAYER,
            },
            Entity::Food(food) => Portrayal {
                pos,
                shape: Shape::Circle {
                    radius: food.radius,
                    filled: true,
                },
                color: Color::from_hex(FOOD_COLOR),
                layer: TERRAIN_LAYER,
            },
            Entity::Obstacle(obstacle) => Portrayal {
                pos,
                shape: Shape::Circle {
                    radius: obstacle.radius,
                    filled: true,
                },
                color: Color::from_hex(OBSTACLE_COLOR),
                layer: TERRAIN_LAYER,
            },
            Entity::Marker(marker) => Portrayal {
                pos,
                shape: Shape::Circle {
                    radius: MARKER_PORTRAYAL_RADIUS,
                    filled: true,
                },
                color: marker.color,
                layer: MARKER_LAYER,
            },
            Entity::Colony(colony) => Portrayal {
                pos,
                shape: Shape::Circle {
                    radius: colony.radius,
                    filled: false,
                },
                color: colony.colors.colony,
                layer: COLONY_LAYER,
            },
        }
    }
}
