use macroquad::prelude::Color;

pub const PREDEFINED_COLONY_COLORS: [Color; 5] = [
    Color::new(0.902, 0.224, 0.275, 1.0), // Red
    Color::new(0.169, 0.635, 0.929, 1.0), // Blue
    Color::new(0.149, 0.878, 0.184, 1.0), // Green
    Color::new(0.957, 0.820, 0.204, 1.0), // Yellow
    Color::new(0.616, 0.306, 0.867, 1.0), // Purple
];

/// Colors a colony paints itself, its ants and its food trail with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColonyColors {
    pub colony: Color,
    pub ant: Color,
    pub marker: Color,
}

impl ColonyColors {
    /// Palette color for the `index`-th colony, overridden by any explicit hex value.
    pub fn pick(
        index: usize,
        colony: Option<u32>,
        ant: Option<u32>,
        marker: Option<u32>,
    ) -> Self {
        let base = PREDEFINED_COLONY_COLORS[index % PREDEFINED_COLONY_COLORS.len()];
        let colony = colony.map(Color::from_hex).unwrap_or(base);
        Self {
            colony,
            ant: ant.map(Color::from_hex).unwrap_or_else(|| darken(colony, 0.6)),
            marker: marker.map(Color::from_hex).unwrap_or_else(|| with_alpha(colony, 0.5)),
        }
    }
}

fn darken(color: Color, factor: f32) -> Color {
    Color::new(color.r * factor, color.g * factor, color.b * factor, color.a)
}

fn with_alpha(color: Color, alpha: f32) -> Color {
    Color::new(color.r, color.g, color.b, alpha)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pick_wraps_palette() {
        let first = ColonyColors::pick(0, None, None, None);
        let wrapped = ColonyColors::pick(PREDEFINED_COLONY_COLORS.len(), None, None, None);
        assert_eq!(first, wrapped);
        assert_eq!(first.colony, PREDEFINED_COLONY_COLORS[0]);
        assert_eq!(first.marker.a, 0.5);
    }

    #[test]
    fn test_pick_honours_hex_override() {
        let colors = ColonyColors::pick(1, Some(0x00C8FF), Some(0x0000A6), None);
        assert_eq!(colors.colony, Color::from_hex(0x00C8FF));
        assert_eq!(colors.ant, Color::from_hex(0x0000A6));
    }
}
