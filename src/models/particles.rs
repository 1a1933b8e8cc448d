use crate::sim::{clamp_speed, ParticleConfig, MAX_PARTICLES};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const INITIAL_NUM_PARTICLES: usize = 100;
pub const INITIAL_SPEED_LIMIT: f64 = 0.01;
pub const INITIAL_POINT_SIZE: f64 = 5.0;
pub const NUM_COLORS: usize = 8;

/// Display colours, RGBA.
pub const PALETTE: [[f32; 4]; NUM_COLORS] = [
    [0.0, 0.0, 0.0, 1.0], // black
    [1.0, 0.0, 0.0, 1.0], // red
    [1.0, 1.0, 0.0, 1.0], // yellow
    [0.0, 1.0, 0.0, 1.0], // green
    [0.0, 0.0, 1.0, 1.0], // blue
    [1.0, 0.0, 1.0, 1.0], // magenta
    [0.0, 1.0, 1.0, 1.0], // cyan
    [1.0, 1.0, 1.0, 1.0], // white
];

pub fn color_of(color: usize) -> [f32; 4] {
    PALETTE[color % NUM_COLORS]
}

/// RNG used for spawning: seeded when a seed is given, from OS entropy otherwise.
pub fn spawn_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Uniformly scattered particles in the unit cube.
///
/// Per axis the position is drawn from `[-1, 1)` and the velocity from
/// `speed_limit * [-1, 1)`; the velocity is then clamped to `speed_limit`.
/// `count` is clamped to `[1, MAX_PARTICLES]`.
pub fn spawn_configs<R: Rng + ?Sized>(count: usize, speed_limit: f64, rng: &mut R) -> Vec<ParticleConfig> {
    let count = count.clamp(1, MAX_PARTICLES);
    let mut configs = Vec::with_capacity(count);
    for i in 0..count {
        let mut position = [0.0; 3];
        let mut velocity = [0.0; 3];
        for axis in 0..3 {
            position[axis] = rng.gen_range(-1.0..1.0);
            velocity[axis] = speed_limit * rng.gen_range(-1.0..1.0);
        }
        let velocity = clamp_speed(Vector3::from(velocity), speed_limit);
        configs.push(ParticleConfig::new(position, velocity.into(), i % NUM_COLORS));
    }
    configs
}
