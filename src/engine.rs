use crate::algorithms::distance::DistanceCache;
use crate::algorithms::environment::{Environment, EnvironmentParams};
use crate::algorithms::flocking::{FlockParams, Flocking};
use crate::algorithms::walls::{ELASTIC_COEF, LOSSY_COEF};
use crate::models::particles::{
    color_of, spawn_configs, spawn_rng, INITIAL_NUM_PARTICLES, INITIAL_POINT_SIZE,
    INITIAL_SPEED_LIMIT,
};
use crate::sim::{ParticleConfig, ParticleStore, MAX_PARTICLES};
use log::{debug, info, trace, warn};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

pub const MIN_POINT_SIZE: f64 = 1.0;
pub const MIN_SPEED_LIMIT: f64 = 1.0e-9;

pub const CMD_MORE_PARTICLES: &str = "more-particles";
pub const CMD_FEWER_PARTICLES: &str = "fewer-particles";
pub const CMD_FASTER: &str = "faster";
pub const CMD_SLOWER: &str = "slower";
pub const CMD_LARGER_POINTS: &str = "larger-points";
pub const CMD_SMALLER_POINTS: &str = "smaller-points";
pub const CMD_TOGGLE_GRAVITY: &str = "toggle-gravity";
pub const CMD_TOGGLE_RESTITUTION: &str = "toggle-restitution";
pub const CMD_QUIT: &str = "quit";

pub struct CommandInfo {
    pub id: &'static str,
    pub label: &'static str,
    /// Position in the legacy right-click menu, starting at 1.
    pub menu_index: u32,
}

pub fn command_catalog() -> &'static [CommandInfo] {
    &[
        CommandInfo { id: CMD_MORE_PARTICLES, label: "more particles", menu_index: 1 },
        CommandInfo { id: CMD_FEWER_PARTICLES, label: "fewer particles", menu_index: 2 },
        CommandInfo { id: CMD_FASTER, label: "faster", menu_index: 3 },
        CommandInfo { id: CMD_SLOWER, label: "slower", menu_index: 4 },
        CommandInfo { id: CMD_LARGER_POINTS, label: "larger particles", menu_index: 5 },
        CommandInfo { id: CMD_SMALLER_POINTS, label: "smaller particles", menu_index: 6 },
        CommandInfo { id: CMD_TOGGLE_GRAVITY, label: "toggle gravity", menu_index: 7 },
        CommandInfo { id: CMD_TOGGLE_RESTITUTION, label: "toggle restitution", menu_index: 8 },
        CommandInfo { id: CMD_QUIT, label: "quit", menu_index: 9 },
    ]
}

fn normalize_command_id(id: &str) -> Option<&'static str> {
    command_catalog().iter().find(|c| c.id == id).map(|c| c.id)
}

/// What the caller has to do after a command was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// Parameters changed and every particle was re-randomized.
    Respawned,
    /// The host should shut down; the simulation is left as it was.
    Quit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimParams {
    pub num_particles: usize,
    pub speed_limit: f64,
    /// Display only, never read by the physics.
    pub point_size: f64,
    pub gravity: bool,
    /// Lossy wall bounces (coefficient 0.9) instead of elastic ones.
    pub restitution: bool,
    /// Fold the base/repulsion force into the acceleration next to steering.
    /// Off by default: the unit up bias outweighs steering and pins the
    /// population to the top face.
    pub apply_environment: bool,
    /// Fixed spawn seed; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub flock: FlockParams,
    pub environment: EnvironmentParams,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            num_particles: INITIAL_NUM_PARTICLES,
            speed_limit: INITIAL_SPEED_LIMIT,
            point_size: INITIAL_POINT_SIZE,
            gravity: false,
            restitution: false,
            apply_environment: false,
            seed: None,
            flock: FlockParams::default(),
            environment: EnvironmentParams::default(),
        }
    }
}

impl SimParams {
    pub fn restitution_coefficient(&self) -> f64 {
        if self.restitution { LOSSY_COEF } else { ELASTIC_COEF }
    }

    /// Copy with every out-of-range value pulled back silently.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let mut p = self.clone();

        let count = p.num_particles.clamp(1, MAX_PARTICLES);
        if count != p.num_particles {
            warn!("particle count {} clamped to {}", p.num_particles, count);
            p.num_particles = count;
        }

        if !p.speed_limit.is_finite() {
            warn!("non-finite speed limit replaced by {}", defaults.speed_limit);
            p.speed_limit = defaults.speed_limit;
        }
        if p.speed_limit < MIN_SPEED_LIMIT {
            warn!("speed limit {} raised to {}", p.speed_limit, MIN_SPEED_LIMIT);
            p.speed_limit = MIN_SPEED_LIMIT;
        }

        if !p.point_size.is_finite() {
            p.point_size = defaults.point_size;
        }
        if p.point_size < MIN_POINT_SIZE {
            warn!("point size {} raised to {}", p.point_size, MIN_POINT_SIZE);
            p.point_size = MIN_POINT_SIZE;
        }

        if !p.flock.perception_radius.is_finite() || p.flock.perception_radius < 0.0 {
            p.flock.perception_radius = defaults.flock.perception_radius;
        }
        p
    }
}

/// Fixed-capacity buffers handed to a renderer after each tick. Only the
/// first `count` entries are meaningful.
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub points: Vec<[f32; 4]>,
    pub colors: Vec<[f32; 4]>,
    pub count: usize,
    pub point_size: f32,
}

impl Default for RenderFrame {
    fn default() -> Self {
        Self {
            points: vec![[0.0, 0.0, 0.0, 1.0]; MAX_PARTICLES],
            colors: vec![[0.0; 4]; MAX_PARTICLES],
            count: 0,
            point_size: INITIAL_POINT_SIZE as f32,
        }
    }
}

/// Simulation controller: owns the parameters, the particles and the
/// per-tick scratch, and runs refresh -> steer -> integrate -> collide.
pub struct Engine {
    params: SimParams,
    store: ParticleStore,
    distances: DistanceCache,
    flocking: Flocking,
    environment: Environment,
    rng: StdRng,
    ticks: u64,
}

impl Engine {
    pub fn new(params: SimParams) -> Self {
        let params = params.sanitized();
        let mut engine = Self {
            flocking: Flocking::new(params.flock.clone()),
            environment: Environment::new(params.environment.clone()),
            rng: spawn_rng(params.seed),
            params,
            store: ParticleStore::new(),
            distances: DistanceCache::default(),
            ticks: 0,
        };
        engine.respawn();
        engine
    }

    /// Engine with a hand-placed population instead of a random one.
    pub fn with_particles(params: SimParams, configs: &[ParticleConfig]) -> Result<Self, String> {
        if configs.is_empty() {
            return Err("at least one particle is required".to_string());
        }
        if configs.len() > MAX_PARTICLES {
            return Err(format!(
                "{} particles requested, capacity is {}",
                configs.len(),
                MAX_PARTICLES
            ));
        }
        let mut params = params.sanitized();
        params.num_particles = configs.len();
        let mut engine = Self {
            flocking: Flocking::new(params.flock.clone()),
            environment: Environment::new(params.environment.clone()),
            rng: spawn_rng(params.seed),
            params,
            store: ParticleStore::new(),
            distances: DistanceCache::default(),
            ticks: 0,
        };
        engine.store.reset(configs);
        engine.refresh_distances();
        Ok(engine)
    }

    pub fn params(&self) -> &SimParams { &self.params }
    pub fn store(&self) -> &ParticleStore { &self.store }
    pub fn distances(&self) -> &DistanceCache { &self.distances }
    pub fn len(&self) -> usize { self.store.len() }
    pub fn is_empty(&self) -> bool { self.store.is_empty() }
    pub fn ticks(&self) -> u64 { self.ticks }
    pub fn point_size(&self) -> f64 { self.params.point_size }

    /// Replace all parameters; the population is re-randomized.
    pub fn set_params(&mut self, params: SimParams) {
        let reseed = params.seed != self.params.seed;
        self.params = params.sanitized();
        self.flocking.params = self.params.flock.clone();
        self.environment.params = self.params.environment.clone();
        if reseed {
            self.rng = spawn_rng(self.params.seed);
        }
        self.respawn();
    }

    /// Throw away every particle and scatter `num_particles` new ones.
    pub fn respawn(&mut self) {
        let configs = spawn_configs(self.params.num_particles, self.params.speed_limit, &mut self.rng);
        self.store.reset(&configs);
        self.distances.refresh(self.store.positions());
        debug!(
            "respawned {} particles (speed limit {}, seed {:?})",
            self.store.len(),
            self.params.speed_limit,
            self.params.seed
        );
    }

    /// Recompute the pairwise distance table for the current positions.
    pub fn refresh_distances(&mut self) {
        self.distances.refresh(self.store.positions());
    }

    /// One simulation step over every particle, in index order.
    pub fn tick(&mut self) {
        self.refresh_distances();

        let speed_limit = self.params.speed_limit;
        let coef = self.params.restitution_coefficient();
        for i in 0..self.store.len() {
            let steering = self.flocking.direction(i, &self.store, &self.distances);
            self.store.accumulate(i, steering);
            if self.params.apply_environment {
                let force = self.environment.force(i, &self.store, &self.distances, self.params.gravity);
                self.store.accumulate(i, force);
            }
            self.store.advance(i, speed_limit);
            self.store.collide(i, coef);
        }

        self.ticks += 1;
        trace!("tick {} done for {} particles", self.ticks, self.store.len());
    }

    /// Steering that particle i would get from the last distance refresh.
    pub fn steering(&self, i: usize) -> Vector3<f64> {
        self.flocking.direction(i, &self.store, &self.distances)
    }

    /// Base plus repulsion force on particle i from the last distance refresh,
    /// whether or not it is folded into the motion.
    pub fn environment_force(&self, i: usize) -> Vector3<f64> {
        self.environment.force(i, &self.store, &self.distances, self.params.gravity)
    }

    pub fn place(&mut self, index: usize, pos: Vector3<f64>, vel: Vector3<f64>) -> Result<(), String> {
        if index >= self.store.len() {
            return Err(format!(
                "particle index {} out of range (population {})",
                index,
                self.store.len()
            ));
        }
        self.store.set_position(index, pos);
        self.store.set_velocity(index, vel);
        Ok(())
    }

    pub fn more_particles(&mut self) {
        self.params.num_particles = self.params.num_particles.saturating_mul(2).min(MAX_PARTICLES);
        self.respawn();
    }

    pub fn fewer_particles(&mut self) {
        self.params.num_particles = (self.params.num_particles / 2).max(1);
        self.respawn();
    }

    pub fn faster(&mut self) {
        let doubled = self.params.speed_limit * 2.0;
        if doubled.is_finite() {
            self.params.speed_limit = doubled;
        }
        self.respawn();
    }

    pub fn slower(&mut self) {
        self.params.speed_limit = (self.params.speed_limit / 2.0).max(MIN_SPEED_LIMIT);
        self.respawn();
    }

    pub fn larger_points(&mut self) {
        let doubled = self.params.point_size * 2.0;
        if doubled.is_finite() {
            self.params.point_size = doubled;
        }
        self.respawn();
    }

    pub fn smaller_points(&mut self) {
        self.params.point_size = (self.params.point_size / 2.0).max(MIN_POINT_SIZE);
        self.respawn();
    }

    pub fn toggle_gravity(&mut self) {
        self.params.gravity = !self.params.gravity;
        self.respawn();
    }

    pub fn toggle_restitution(&mut self) {
        self.params.restitution = !self.params.restitution;
        self.respawn();
    }

    pub fn apply_command(&mut self, command_id: &str) -> Result<CommandOutcome, String> {
        let id = normalize_command_id(command_id)
            .ok_or_else(|| format!("unknown command id '{}'", command_id))?;
        match id {
            CMD_MORE_PARTICLES => self.more_particles(),
            CMD_FEWER_PARTICLES => self.fewer_particles(),
            CMD_FASTER => self.faster(),
            CMD_SLOWER => self.slower(),
            CMD_LARGER_POINTS => self.larger_points(),
            CMD_SMALLER_POINTS => self.smaller_points(),
            CMD_TOGGLE_GRAVITY => self.toggle_gravity(),
            CMD_TOGGLE_RESTITUTION => self.toggle_restitution(),
            CMD_QUIT => {
                info!("quit requested");
                return Ok(CommandOutcome::Quit);
            }
            _ => return Err(format!("unknown command id '{}'", command_id)),
        }
        info!(
            "{}: {} particles, speed {}, point size {}, gravity {}, restitution {}",
            id,
            self.params.num_particles,
            self.params.speed_limit,
            self.params.point_size,
            self.params.gravity,
            self.params.restitution
        );
        Ok(CommandOutcome::Respawned)
    }

    pub fn apply_menu_index(&mut self, menu_index: u32) -> Result<CommandOutcome, String> {
        let id = command_catalog()
            .iter()
            .find(|c| c.menu_index == menu_index)
            .map(|c| c.id)
            .ok_or_else(|| format!("menu index {} outside 1..=9", menu_index))?;
        self.apply_command(id)
    }

    /// Copy positions and colours into `frame` without reallocating it.
    pub fn fill_frame(&self, frame: &mut RenderFrame) {
        let n = self.store.len();
        if frame.points.len() < n {
            frame.points.resize(n, [0.0, 0.0, 0.0, 1.0]);
        }
        if frame.colors.len() < n {
            frame.colors.resize(n, [0.0; 4]);
        }
        for i in 0..n {
            let p = self.store.homogeneous(i);
            frame.points[i] = [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32];
            frame.colors[i] = color_of(self.store.colors()[i]);
        }
        frame.count = n;
        frame.point_size = self.params.point_size as f32;
    }

    pub fn positions_flat(&self) -> Vec<f32> {
        let n = self.store.len();
        let mut out = Vec::with_capacity(n * 4);
        for i in 0..n {
            out.extend(self.store.homogeneous(i).iter().map(|c| *c as f32));
        }
        out
    }

    pub fn colors_flat(&self) -> Vec<f32> {
        let colors = self.store.colors();
        let mut out = Vec::with_capacity(colors.len() * 4);
        for c in colors {
            out.extend_from_slice(&color_of(*c));
        }
        out
    }

    pub fn state_matrix_flat(&self) -> Vec<f32> {
        let states = self.store.state_matrix();
        let mut out = Vec::with_capacity(states.len() * 6);
        for row in states {
            out.extend(row.iter().map(|c| *c as f32));
        }
        out
    }
}
