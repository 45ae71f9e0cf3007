use super::avoidance::{AvoidanceOutcome, Surroundings};
use super::{Cooldown, Marker, MarkerPurpose, MarkerStore, WorldMap};
use crate::config::{AgentParams, SimulationConfig, WarriorParams};

use macroquad::prelude::{Color, Vec2};
use rand::Rng;
use slotmap::{Key, new_key_type};
use std::collections::HashSet;
use std::f32::consts::PI;

new_key_type! {
    /// Key for ant slotmap.
    pub struct AntKey;
}

/// Reference to an ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AntRef {
    pub key: AntKey,
    pub colony_id: u32,
}

/// Caste of an ant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntKind {
    Forager,
    /// Hunts ants of other colonies. Retires once `lifespan` kills have been made.
    Warrior { lifespan: u32 },
}

/// What the ant decided to do on its last step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntState {
    Exploring,
    SeekingFood,
    FollowingMarker,
    Carrying,
    Hunting,
}

/// Result of heading for a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoTo {
    pub pos: Vec2,
    /// Heading to use from the next tick on.
    pub heading: f32,
    pub reached: bool,
}

/// Position of an ant at the start of the tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AntSnapshot {
    pub ant_ref: AntRef,
    pub pos: Vec2,
    pub speed: f32,
}

/// Mutations that must wait until every ant has stepped.
#[derive(Debug, Default)]
pub struct TickEffects {
    pub removed: HashSet<AntRef>,
    pub danger_markers: Vec<Marker>,
    pub kills: u32,
}

impl TickEffects {
    pub fn is_removed(&self, ant_ref: &AntRef) -> bool {
        self.removed.contains(ant_ref)
    }
}

/// The ant's own colony, as seen while one of its ants steps.
pub struct Home<'a> {
    pub colony_id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub marker_color: Color,
    pub markers: &'a mut MarkerStore,
    pub food_collected: &'a mut u32,
}

pub struct StepContext<'a> {
    pub config: &'a SimulationConfig,
    pub map: &'a mut WorldMap,
    pub home: Home<'a>,
    pub peers: &'a [AntSnapshot],
    pub effects: &'a mut TickEffects,
}

/// What happened during one ant step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub state: AntState,
    pub avoidance: AvoidanceOutcome,
    pub picked_food: bool,
    pub delivered_food: bool,
    pub dropped_marker: bool,
    pub kill: Option<AntRef>,
}

impl StepReport {
    fn new(state: AntState) -> Self {
        Self {
            state,
            avoidance: AvoidanceOutcome::Clear,
            picked_food: false,
            delivered_food: false,
            dropped_marker: false,
            kill: None,
        }
    }
}

/// State of an ant.
#[derive(Debug, Clone)]
pub struct Ant {
    pub ant_ref: AntRef,
    pub kind: AntKind,
    pub state: AntState,

    pub pos: Vec2,
    pub heading: f32,
    pub speed: f32,
    pub sight_radius: f32,
    pub epsilon: f32,
    pub angle_change_probability: f32,
    pub ignore_markers: Cooldown,
    pub carrying_food: bool,
    pub is_on_food_marker: bool,
    pub color: Color,
}

impl Ant {
    /// Create a new forager.
    pub fn forager(
        pos: Vec2,
        heading: f32,
        colony_id: u32,
        epsilon: f32,
        params: &AgentParams,
        color: Color,
    ) -> Self {
        Self {
            ant_ref: AntRef {
                key: AntKey::null(),
                colony_id,
            },
            kind: AntKind::Forager,
            state: AntState::Exploring,
            pos,
            heading,
            speed: params.speed,
            sight_radius: params.sight_radius,
            epsilon,
            angle_change_probability: params.angle_change_probability,
            ignore_markers: Cooldown::ready(),
            carrying_food: false,
            is_on_food_marker: false,
            color,
        }
    }

    /// Create a new warrior.
    pub fn warrior(
        pos: Vec2,
        heading: f32,
        colony_id: u32,
        params: &WarriorParams,
        color: Color,
    ) -> Self {
        Self {
            ant_ref: AntRef {
                key: AntKey::null(),
                colony_id,
            },
            kind: AntKind::Warrior {
                lifespan: params.lifespan,
            },
            state: AntState::Exploring,
            pos,
            heading,
            speed: params.speed,
            sight_radius: params.sight_radius,
            epsilon: 1.0,
            angle_change_probability: params.angle_change_probability,
            ignore_markers: Cooldown::ready(),
            carrying_food: false,
            is_on_food_marker: false,
            color,
        }
    }

    pub fn is_warrior(&self) -> bool {
        matches!(self.kind, AntKind::Warrior { .. })
    }

    /// Kills left before a warrior retires.
    pub fn lifespan(&self) -> Option<u32> {
        match self.kind {
            AntKind::Warrior { lifespan } => Some(lifespan),
            AntKind::Forager => None,
        }
    }

    /// Position one step ahead along the current heading.
    pub fn next_pos(&self) -> Vec2 {
        let (x, y) = shared::move_by(self.pos.x, self.pos.y, self.speed, self.heading);
        Vec2::new(x, y)
    }

    /// Heads for `destination`.
    ///
    /// Within reach (closer than one step, or already inside `radius`) the ant lands exactly on
    /// the destination and picks a random heading. Otherwise it moves one step along its
    /// *current* heading and the bearing to the destination is returned for the next tick.
    pub fn go_to<R: Rng + ?Sized>(&self, destination: Vec2, radius: f32, rng: &mut R) -> GoTo {
        let dist = shared::distance((self.pos.x, self.pos.y), (destination.x, destination.y));
        if dist < self.speed || dist < radius {
            return GoTo {
                pos: destination,
                heading: shared::random_heading(rng),
                reached: true,
            };
        }

        GoTo {
            pos: self.next_pos(),
            heading: shared::bearing_to((self.pos.x, self.pos.y), (destination.x, destination.y)),
            reached: false,
        }
    }

    /// Runs one tick of decision and motion.
    pub fn step<R: Rng + ?Sized>(&mut self, ctx: &mut StepContext<'_>, rng: &mut R) -> StepReport {
        match self.kind {
            AntKind::Forager => self.forage(ctx, rng),
            AntKind::Warrior { .. } => self.hunt(ctx, rng),
        }
    }

    /// Forager priorities: bring food home, then head for visible food, then follow a trail
    /// marker, otherwise explore.
    ///
    /// The marker an ant is standing on is still the nearest one next tick, so a forager that
    /// reached a marker stays on it until its ε draw fails or the marker expires.
    fn forage<R: Rng + ?Sized>(&mut self, ctx: &mut StepContext<'_>, rng: &mut R) -> StepReport {
        let start = self.pos;

        if self.carrying_food {
            let mut report = StepReport::new(AntState::Carrying);
            let goto = self.go_to(ctx.home.pos, ctx.home.radius, rng);
            report.avoidance = self.advance(goto, ctx, rng);
            if goto.reached {
                *ctx.home.food_collected += 1;
                self.carrying_food = false;
                report.delivered_food = true;
            }
            report.dropped_marker = self.mark_trail(start, goto.heading, ctx);
            return self.finish(report);
        }

        let exploit = rng.random::<f32>() < self.epsilon;

        let food = ctx
            .map
            .nearest_food(start, self.sight_radius)
            .map(|(key, food)| (key, food.pos, food.radius));
        if let (true, Some((food_key, food_pos, food_radius))) = (exploit, food) {
            let mut report = StepReport::new(AntState::SeekingFood);
            let goto = self.go_to(food_pos, food_radius, rng);
            report.avoidance = self.advance(goto, ctx, rng);
            if goto.reached && ctx.map.take_food(food_key) {
                self.carrying_food = true;
                report.picked_food = true;
            }
            report.dropped_marker = self.mark_trail(start, goto.heading, ctx);
            return self.finish(report);
        }

        if exploit && self.ignore_markers.is_ready() {
            let marker_pos = ctx
                .home
                .markers
                .nearest(start, MarkerPurpose::Food, self.sight_radius)
                .map(|m| m.pos);
            if let Some(marker_pos) = marker_pos {
                let mut report = StepReport::new(AntState::FollowingMarker);
                let goto = self.go_to(marker_pos, 0.0, rng);
                report.avoidance = self.advance(goto, ctx, rng);
                self.is_on_food_marker = goto.reached;
                return self.finish(report);
            }
        }

        let mut report = StepReport::new(AntState::Exploring);
        report.avoidance = self.explore(ctx, rng);
        self.finish(report)
    }

    fn hunt<R: Rng + ?Sized>(&mut self, ctx: &mut StepContext<'_>, rng: &mut R) -> StepReport {
        let Some(prey) = self.nearest_prey(ctx) else {
            let mut report = StepReport::new(AntState::Exploring);
            report.avoidance = self.explore(ctx, rng);
            return self.finish(report);
        };

        let mut report = StepReport::new(AntState::Hunting);
        let goto = self.go_to(prey.pos, 0.0, rng);
        report.avoidance = self.advance(goto, ctx, rng);
        if goto.reached {
            let markers = &ctx.config.markers;
            ctx.effects.removed.insert(prey.ant_ref);
            ctx.effects.danger_markers.push(Marker::danger(
                prey.pos,
                prey.ant_ref.colony_id,
                Color::from_hex(markers.danger_color),
                markers.lifetime,
            ));
            ctx.effects.kills += 1;
            report.kill = Some(prey.ant_ref);

            if let AntKind::Warrior { lifespan } = &mut self.kind {
                *lifespan = lifespan.saturating_sub(1);
                if *lifespan == 0 {
                    ctx.effects.removed.insert(self.ant_ref);
                }
            }

            // Head home
            if self.pos != ctx.home.pos {
                self.heading =
                    shared::bearing_to((self.pos.x, self.pos.y), (ctx.home.pos.x, ctx.home.pos.y));
            }
        }
        self.finish(report)
    }

    /// Closest live ant of another colony in sight, from the start-of-tick snapshot.
    fn nearest_prey(&self, ctx: &StepContext<'_>) -> Option<AntSnapshot> {
        let mut best: Option<(AntSnapshot, f32)> = None;
        for peer in ctx.peers {
            if peer.ant_ref.colony_id == self.ant_ref.colony_id
                || ctx.effects.is_removed(&peer.ant_ref)
            {
                continue;
            }
            let dist = self.pos.distance(peer.pos);
            if dist >= self.sight_radius {
                continue;
            }
            if best.map_or(true, |(_, best_dist)| dist < best_dist) {
                best = Some((*peer, dist));
            }
        }
        best.map(|(peer, _)| peer)
    }

    /// Commits a `go_to` result, steering around whatever blocks the current heading.
    fn advance<R: Rng + ?Sized>(
        &mut self,
        goto: GoTo,
        ctx: &StepContext<'_>,
        rng: &mut R,
    ) -> AvoidanceOutcome {
        if goto.reached {
            self.pos = goto.pos;
            self.heading = goto.heading;
            return AvoidanceOutcome::Clear;
        }

        let (heading, outcome) = self.resolve_heading(ctx, rng);
        self.pos = match outcome {
            AvoidanceOutcome::Clear | AvoidanceOutcome::Exhausted => goto.pos,
            AvoidanceOutcome::Adjusted | AvoidanceOutcome::PeersIgnored => {
                let (x, y) = shared::move_by(self.pos.x, self.pos.y, self.speed, heading);
                Vec2::new(x, y)
            }
        };
        self.heading = goto.heading;
        outcome
    }

    fn explore<R: Rng + ?Sized>(&mut self, ctx: &StepContext<'_>, rng: &mut R) -> AvoidanceOutcome {
        if ctx.config.markers.flee_danger && !self.is_warrior() && self.senses_danger(ctx) {
            self.heading = shared::wrap_angle(self.heading + PI);
        }
        let (heading, outcome) = self.resolve_heading(ctx, rng);
        self.heading = heading;
        self.pos = self.next_pos();
        self.is_on_food_marker = false;
        if rng.random_bool(self.angle_change_probability as f64) {
            self.heading = shared::random_heading(rng);
        }
        outcome
    }

    fn senses_danger(&self, ctx: &StepContext<'_>) -> bool {
        ctx.home
            .markers
            .nearest(self.pos, MarkerPurpose::Danger, self.sight_radius)
            .is_some()
    }

    fn resolve_heading<R: Rng + ?Sized>(
        &self,
        ctx: &StepContext<'_>,
        rng: &mut R,
    ) -> (f32, AvoidanceOutcome) {
        let avoid_peers = !self.is_warrior();
        self.surroundings(ctx, avoid_peers).resolve_heading(
            self.pos,
            self.speed,
            self.heading,
            avoid_peers,
            &ctx.config.avoidance,
            rng,
        )
    }

    fn surroundings(&self, ctx: &StepContext<'_>, with_peers: bool) -> Surroundings {
        let mut surroundings = Surroundings::new(ctx.map.width, ctx.map.height);
        surroundings.obstacles = ctx
            .map
            .obstacles_near(self.pos, self.sight_radius)
            .map(|o| (o.pos, o.radius))
            .collect();
        if with_peers {
            surroundings.peers = ctx
                .peers
                .iter()
                .filter(|p| p.ant_ref != self.ant_ref && !ctx.effects.is_removed(&p.ant_ref))
                .filter(|p| self.pos.distance(p.pos) < self.sight_radius)
                .map(|p| (p.pos, p.speed))
                .collect();
        }
        surroundings
    }

    /// Drops a food marker at `at` unless the ant is at its marker cap, then starts ignoring
    /// markers for a while. Returns true if a marker was dropped.
    fn mark_trail(&mut self, at: Vec2, heading: f32, ctx: &mut StepContext<'_>) -> bool {
        let markers = &ctx.config.markers;
        self.ignore_markers.start(markers.ignore_cooldown);
        if ctx.home.markers.live_count(self.ant_ref.key) >= markers.cap_per_agent {
            return false;
        }
        ctx.home.markers.lay(
            Marker::food(
                at,
                ctx.home.colony_id,
                heading,
                ctx.home.marker_color,
                markers.lifetime,
            )
            .dropped_by(self.ant_ref.key),
        );
        true
    }

    fn finish(&mut self, report: StepReport) -> StepReport {
        // A cooldown started this tick must not lose a tick straight away
        if !matches!(report.state, AntState::Carrying | AntState::SeekingFood) {
            self.ignore_markers.tick();
        }
        self.state = report.state;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::prelude::{BLUE, GREEN, RED};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn ant_at(x: f32, y: f32, speed: f32, heading: f32) -> Ant {
        let params = AgentParams {
            speed,
            sight_radius: 20.0,
            angle_change_probability: 0.0,
        };
        Ant::forager(Vec2::new(x, y), heading, 0, 1.0, &params, BLUE)
    }

    #[test]
    fn test_go_to_reachable_snaps() {
        let ant = ant_at(0.0, 0.0, 10.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let goto = ant.go_to(Vec2::new(7.0, 2.0), 0.0, &mut rng);
        assert_eq!(goto.pos, Vec2::new(7.0, 2.0));
        assert!(goto.reached);
    }

    #[test]
    fn test_go_to_not_reachable_keeps_current_heading() {
        let ant = ant_at(0.0, 0.0, 10.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(1);
        let goto = ant.go_to(Vec2::new(10.0, 2.0), 0.0, &mut rng);

        assert_eq!(goto.pos, Vec2::new(10.0, 0.0));
        assert!(!goto.reached);
        assert!((goto.heading - 0.1973).abs() < 1e-3, "heading {}", goto.heading);
    }

    #[test]
    fn test_go_to_moves_exactly_one_step_along_old_heading() {
        let ant = ant_at(12.5, 40.0, 3.0, 2.1);
        let mut rng = SmallRng::seed_from_u64(2);
        let goto = ant.go_to(Vec2::new(80.0, 90.0), 0.0, &mut rng);
        let (x, y) = shared::move_by(12.5, 40.0, 3.0, 2.1);
        assert_eq!(goto.pos, Vec2::new(x, y));
        assert!(!goto.reached);
    }

    #[test]
    fn test_go_to_heading_negative_below() {
        let ant = ant_at(10.0, 10.0, 1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(3);
        let destination = Vec2::new(14.0, 7.0);
        let goto = ant.go_to(destination, 0.0, &mut rng);
        let expected = -((14.0f32 - 10.0) / 5.0).acos();
        assert!((goto.heading - expected).abs() < 1e-6);
        assert!(goto.heading < 0.0);
    }

    #[test]
    fn test_go_to_inside_radius_counts_as_reached() {
        let ant = ant_at(0.0, 0.0, 1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(4);
        let goto = ant.go_to(Vec2::new(6.0, 0.0), 8.0, &mut rng);
        assert!(goto.reached);
        assert_eq!(goto.pos, Vec2::new(6.0, 0.0));
    }

    #[test]
    fn test_go_to_same_position_does_not_panic() {
        let ant = ant_at(5.0, 5.0, 1.0, 0.0);
        let mut rng = SmallRng::seed_from_u64(5);
        let goto = ant.go_to(Vec2::new(5.0, 5.0), 0.0, &mut rng);
        assert!(goto.reached);
    }

    struct Fixture {
        config: SimulationConfig,
        map: WorldMap,
        markers: MarkerStore,
        food_collected: u32,
        effects: TickEffects,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                config: SimulationConfig::default(),
                map: WorldMap::new(200.0, 200.0),
                markers: MarkerStore::new(),
                food_collected: 0,
                effects: TickEffects::default(),
            }
        }

        fn step(&mut self, ant: &mut Ant, peers: &[AntSnapshot], seed: u64) -> StepReport {
            let mut rng = SmallRng::seed_from_u64(seed);
            let mut ctx = StepContext {
                config: &self.config,
                map: &mut self.map,
                home: Home {
                    colony_id: 0,
                    pos: Vec2::new(20.0, 20.0),
                    radius: 5.0,
                    marker_color: GREEN,
                    markers: &mut self.markers,
                    food_collected: &mut self.food_collected,
                },
                peers,
                effects: &mut self.effects,
            };
            ant.step(&mut ctx, &mut rng)
        }
    }

    #[test]
    fn test_carrying_ant_delivers_and_marks() {
        let mut fixture = Fixture::new();
        let mut ant = ant_at(23.0, 20.0, 5.0, 0.0);
        ant.carrying_food = true;

        let report = fixture.step(&mut ant, &[], 1);
        assert_eq!(report.state, AntState::Carrying);
        assert!(report.delivered_food);
        assert!(!ant.carrying_food);
        assert_eq!(ant.pos, Vec2::new(20.0, 20.0));
        assert_eq!(fixture.food_collected, 1);

        let marker = fixture.markers.iter().next().expect("trail marker dropped");
        assert_eq!(marker.pos, Vec2::new(23.0, 20.0));
        assert_eq!(marker.purpose, MarkerPurpose::Food);
        assert_eq!(marker.heading, Some(ant.heading));
        assert!(!ant.ignore_markers.is_ready());
    }

    #[test]
    fn test_carrying_ant_far_from_home_walks_and_marks() {
        let mut fixture = Fixture::new();
        let mut ant = ant_at(100.0, 20.0, 5.0, std::f32::consts::PI);
        ant.carrying_food = true;

        let report = fixture.step(&mut ant, &[], 1);
        assert!(!report.delivered_food);
        assert!(ant.carrying_food);
        assert!((ant.pos.x - 95.0).abs() < 1e-4);
        assert_eq!(fixture.markers.len(), 1);
        assert_eq!(fixture.food_collected, 0);
    }

    #[test]
    fn test_marker_cap_limits_trail() {
        let mut fixture = Fixture::new();
        fixture.config.markers.cap_per_agent = 2;
        let mut ant = ant_at(150.0, 20.0, 1.0, std::f32::consts::PI);
        ant.carrying_food = true;

        for seed in 0..5 {
            fixture.step(&mut ant, &[], seed);
        }
        assert_eq!(fixture.markers.len(), 2);
    }

    #[test]
    fn test_seeking_food_picks_up_when_close() {
        let mut fixture = Fixture::new();
        let food = fixture
            .map
            .place_food_at(Vec2::new(105.0, 100.0), 1.0, 3)
            .unwrap();
        let mut ant = ant_at(100.0, 100.0, 10.0, 1.0);

        let report = fixture.step(&mut ant, &[], 7);
        assert_eq!(report.state, AntState::SeekingFood);
        assert!(report.picked_food);
        assert!(ant.carrying_food);
        assert_eq!(ant.pos, Vec2::new(105.0, 100.0));
        assert_eq!(fixture.map.foods[food].stock, 2);
        assert_eq!(
            fixture.markers.iter().next().map(|m| m.pos),
            Some(Vec2::new(100.0, 100.0))
        );
    }

    #[test]
    fn test_zero_epsilon_ignores_food() {
        let mut fixture = Fixture::new();
        fixture
            .map
            .place_food_at(Vec2::new(105.0, 100.0), 1.0, 3)
            .unwrap();
        let mut ant = ant_at(100.0, 100.0, 10.0, 1.0);
        ant.epsilon = 0.0;

        let report = fixture.step(&mut ant, &[], 7);
        assert_eq!(report.state, AntState::Exploring);
        assert!(!ant.carrying_food);
        assert!(fixture.markers.is_empty());
    }

    #[test]
    fn test_follows_visible_marker_when_cooldown_over() {
        let mut fixture = Fixture::new();
        fixture
            .markers
            .lay(Marker::food(Vec2::new(103.0, 100.0), 0, 0.0, GREEN, 10));
        let mut ant = ant_at(100.0, 100.0, 5.0, 0.0);

        let report = fixture.step(&mut ant, &[], 11);
        assert_eq!(report.state, AntState::FollowingMarker);
        assert!(ant.is_on_food_marker);
        assert_eq!(ant.pos, Vec2::new(103.0, 100.0));
    }

    #[test]
    fn test_cooldown_blocks_marker_following() {
        let mut fixture = Fixture::new();
        fixture
            .markers
            .lay(Marker::food(Vec2::new(103.0, 100.0), 0, 0.0, GREEN, 10));
        let mut ant = ant_at(100.0, 100.0, 5.0, 0.0);
        ant.ignore_markers.start(2);

        assert_eq!(fixture.step(&mut ant, &[], 1).state, AntState::Exploring);
        ant.pos = Vec2::new(100.0, 100.0);
        assert_eq!(fixture.step(&mut ant, &[], 2).state, AntState::Exploring);
        ant.pos = Vec2::new(100.0, 100.0);
        assert_eq!(
            fixture.step(&mut ant, &[], 3).state,
            AntState::FollowingMarker
        );
    }

    #[test]
    fn test_explorer_steers_around_peer() {
        let mut fixture = Fixture::new();
        let mut ant = ant_at(100.0, 100.0, 5.0, 0.0);
        let mut keys: slotmap::SlotMap<AntKey, ()> = slotmap::SlotMap::with_key();
        ant.ant_ref.key = keys.insert(());
        let peer = AntSnapshot {
            ant_ref: AntRef {
                key: keys.insert(()),
                colony_id: 1,
            },
            pos: Vec2::new(103.0, 100.0),
            speed: 1.0,
        };

        let report = fixture.step(&mut ant, &[peer], 5);
        assert_eq!(report.avoidance, AvoidanceOutcome::Adjusted);
        assert!(ant.pos.distance(peer.pos) > 1.0);
    }

    #[test]
    fn test_warrior_kills_and_turns_home() {
        let mut fixture = Fixture::new();
        let mut keys: slotmap::SlotMap<AntKey, ()> = slotmap::SlotMap::with_key();
        let params = WarriorParams {
            speed: 6.0,
            sight_radius: 30.0,
            angle_change_probability: 0.0,
            lifespan: 2,
        };
        let mut warrior = Ant::warrior(Vec2::new(100.0, 100.0), 0.0, 0, &params, BLUE);
        warrior.ant_ref.key = keys.insert(());
        let victim = AntSnapshot {
            ant_ref: AntRef {
                key: keys.insert(()),
                colony_id: 1,
            },
            pos: Vec2::new(104.0, 100.0),
            speed: 5.0,
        };

        let report = fixture.step(&mut warrior, &[victim], 9);
        assert_eq!(report.state, AntState::Hunting);
        assert_eq!(report.kill, Some(victim.ant_ref));
        assert_eq!(warrior.lifespan(), Some(1));
        assert_eq!(warrior.pos, victim.pos);
        assert!(fixture.effects.is_removed(&victim.ant_ref));
        assert!(!fixture.effects.is_removed(&warrior.ant_ref));

        let danger = &fixture.effects.danger_markers[0];
        assert_eq!(danger.purpose, MarkerPurpose::Danger);
        assert_eq!(danger.colony_id, 1);
        assert_eq!(danger.pos, victim.pos);

        let home = shared::bearing_to((104.0, 100.0), (20.0, 20.0));
        assert_eq!(warrior.heading, home);
    }

    #[test]
    fn test_warrior_ignores_own_colony() {
        let mut fixture = Fixture::new();
        let mut keys: slotmap::SlotMap<AntKey, ()> = slotmap::SlotMap::with_key();
        let mut warrior = Ant::warrior(
            Vec2::new(100.0, 100.0),
            0.0,
            0,
            &WarriorParams::default(),
            BLUE,
        );
        warrior.ant_ref.key = keys.insert(());
        let friend = AntSnapshot {
            ant_ref: AntRef {
                key: keys.insert(()),
                colony_id: 0,
            },
            pos: Vec2::new(103.0, 110.0),
            speed: 5.0,
        };

        let report = fixture.step(&mut warrior, &[friend], 9);
        assert_eq!(report.state, AntState::Exploring);
        assert!(report.kill.is_none());
    }

    #[test]
    fn test_warrior_retires_on_last_kill() {
        let mut fixture = Fixture::new();
        let mut keys: slotmap::SlotMap<AntKey, ()> = slotmap::SlotMap::with_key();
        let params = WarriorParams {
            lifespan: 1,
            ..WarriorParams::default()
        };
        let mut warrior = Ant::warrior(Vec2::new(100.0, 100.0), 0.0, 0, &params, BLUE);
        warrior.ant_ref.key = keys.insert(());
        let victim = AntSnapshot {
            ant_ref: AntRef {
                key: keys.insert(()),
                colony_id: 2,
            },
            pos: Vec2::new(101.0, 101.0),
            speed: 5.0,
        };

        fixture.step(&mut warrior, &[victim], 1);
        assert_eq!(warrior.lifespan(), Some(0));
        assert!(fixture.effects.is_removed(&warrior.ant_ref));
    }

    #[test]
    fn test_follower_stays_on_reached_marker() {
        let mut fixture = Fixture::new();
        fixture
            .markers
            .lay(Marker::food(Vec2::new(103.0, 100.0), 0, 0.0, GREEN, 40));
        let mut ant = ant_at(100.0, 100.0, 5.0, 0.0);

        for seed in 0..10 {
            let report = fixture.step(&mut ant, &[], seed);
            assert_eq!(report.state, AntState::FollowingMarker);
            assert_eq!(ant.pos, Vec2::new(103.0, 100.0));
            assert!(ant.is_on_food_marker);
        }
    }

    #[test]
    fn test_exhausted_avoidance_moves_along_current_heading() {
        let mut fixture = Fixture::new();
        fixture.map = WorldMap::new(3.0, 3.0);
        fixture.config.avoidance.budget = 20;
        let mut ant = ant_at(1.5, 1.5, 5.0, 0.7);
        ant.carrying_food = true;

        let report = fixture.step(&mut ant, &[], 3);
        assert_eq!(report.state, AntState::Carrying);
        assert_eq!(report.avoidance, AvoidanceOutcome::Exhausted);
        let (x, y) = shared::move_by(1.5, 1.5, 5.0, 0.7);
        assert_eq!(ant.pos, Vec2::new(x, y));
        assert_eq!(ant.heading, shared::bearing_to((1.5, 1.5), (20.0, 20.0)));
    }

    #[test]
    fn test_explorer_turns_away_from_danger() {
        let mut fixture = Fixture::new();
        fixture.config.markers.flee_danger = true;
        fixture
            .markers
            .lay(Marker::danger(Vec2::new(103.0, 100.0), 0, RED, 10));
        let mut ant = ant_at(100.0, 100.0, 5.0, 0.0);
        ant.epsilon = 0.0;

        let report = fixture.step(&mut ant, &[], 4);
        assert_eq!(report.state, AntState::Exploring);
        assert!((ant.pos.x - 95.0).abs() < 1e-3, "pos {:?}", ant.pos);
        assert!((ant.heading.abs() - std::f32::consts::PI).abs() < 1e-5);
    }

    #[test]
    fn test_danger_ignored_unless_enabled() {
        let mut fixture = Fixture::new();
        fixture
            .markers
            .lay(Marker::danger(Vec2::new(103.0, 100.0), 0, RED, 10));
        let mut ant = ant_at(100.0, 100.0, 5.0, 0.0);
        ant.epsilon = 0.0;

        fixture.step(&mut ant, &[], 4);
        assert!((ant.pos.x - 105.0).abs() < 1e-3, "pos {:?}", ant.pos);
        assert_eq!(ant.heading, 0.0);
    }
}
