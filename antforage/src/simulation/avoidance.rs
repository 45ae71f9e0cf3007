use macroquad::math::Vec2;
use rand::Rng;

use crate::config::AvoidanceParams;

/// How a heading was settled before moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvoidanceOutcome {
    /// The current heading was already free.
    Clear,
    /// A free heading was found avoiding peers and obstacles.
    Adjusted,
    /// Only a heading that may overlap a peer was found.
    PeersIgnored,
    /// Nothing worked; the original heading is kept.
    Exhausted,
}

/// Everything an agent has to steer around this tick.
/// Circles are `(center, effective radius)`.
#[derive(Debug, Clone, Default)]
pub struct Surroundings {
    pub width: f32,
    pub height: f32,
    pub obstacles: Vec<(Vec2, f32)>,
    pub peers: Vec<(Vec2, f32)>,
}

/// Whether moving `speed` along `heading` from `pos` passes within `radius` of `center`.
pub fn will_crash(pos: Vec2, speed: f32, heading: f32, center: Vec2, radius: f32) -> bool {
    let (end_x, end_y) = shared::move_by(pos.x, pos.y, speed, heading);
    let end = Vec2::new(end_x, end_y);
    let travel = end - pos;
    let to_center = center - pos;
    let travel_len = travel.length();

    if travel_len == 0.0 {
        return to_center.length() <= radius;
    }

    let dot = travel.dot(to_center);
    if dot < 0.0 {
        // Behind us
        return false;
    }

    let projection = dot / travel_len;
    let dist = if projection > travel_len {
        end.distance(center)
    } else {
        (to_center.length_squared() - projection * projection)
            .max(0.0)
            .sqrt()
    };
    dist <= radius
}

impl Surroundings {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    fn blocked(&self, pos: Vec2, speed: f32, heading: f32, with_peers: bool) -> bool {
        let (x, y) = shared::move_by(pos.x, pos.y, speed, heading);
        if shared::is_out_of_bounds(x, y, self.width, self.height) {
            return true;
        }
        let hits = |circles: &[(Vec2, f32)]| {
            circles
                .iter()
                .any(|&(center, radius)| will_crash(pos, speed, heading, center, radius))
        };
        (with_peers && hits(&self.peers)) || hits(&self.obstacles)
    }

    /// Settles the heading an agent at `pos` should move along this tick.
    ///
    /// Headings are tried alternately on each side of `heading`, one random-sized step further
    /// each time, first avoiding peers and obstacles, then obstacles alone. If both searches run
    /// out of budget the original heading is returned unchanged.
    pub fn resolve_heading<R: Rng + ?Sized>(
        &self,
        pos: Vec2,
        speed: f32,
        heading: f32,
        avoid_peers: bool,
        params: &AvoidanceParams,
        rng: &mut R,
    ) -> (f32, AvoidanceOutcome) {
        if !self.blocked(pos, speed, heading, avoid_peers) {
            return (heading, AvoidanceOutcome::Clear);
        }

        if avoid_peers {
            if let Some(found) = self.search(pos, speed, heading, true, params, rng) {
                return (found, AvoidanceOutcome::Adjusted);
            }
            if let Some(found) = self.search(pos, speed, heading, false, params, rng) {
                return (found, AvoidanceOutcome::PeersIgnored);
            }
        } else if let Some(found) = self.search(pos, speed, heading, false, params, rng) {
            return (found, AvoidanceOutcome::Adjusted);
        }

        (heading, AvoidanceOutcome::Exhausted)
    }

    fn search<R: Rng + ?Sized>(
        &self,
        pos: Vec2,
        speed: f32,
        initial: f32,
        with_peers: bool,
        params: &AvoidanceParams,
        rng: &mut R,
    ) -> Option<f32> {
        let step = params.step * (0.5 + 0.5 * rng.random::<f32>());
        (0..params.budget)
            .map(|attempt| {
                let offset = (attempt / 2 + 1) as f32 * step;
                if attempt % 2 == 1 {
                    initial + offset
                } else {
                    initial - offset
                }
            })
            .find(|&candidate| !self.blocked(pos, speed, candidate, with_peers))
            .map(shared::wrap_angle)
    }
}
