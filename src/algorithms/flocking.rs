use crate::algorithms::distance::DistanceCache;
use crate::algorithms::normalize_or_zero;
use crate::sim::ParticleStore;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PERCEPTION_RADIUS: f64 = 0.2;
pub const DEFAULT_SEPARATION_SCALE: f64 = 0.01;
pub const DEFAULT_SEPARATION_GUARD: f64 = 0.01;
pub const DEFAULT_COHESION_SCALE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlockParams {
    /// Neighbours closer than this (inclusive) steer the particle.
    pub perception_radius: f64,
    /// Numerator scale of the separation term.
    pub separation_scale: f64,
    /// Added to the squared distance in the separation denominator.
    pub separation_guard: f64,
    /// Length of the unit vector towards the neighbour centre of mass.
    pub cohesion_scale: f64,
    /// Count the particle itself as one of its neighbours.
    pub include_self: bool,
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            perception_radius: DEFAULT_PERCEPTION_RADIUS,
            separation_scale: DEFAULT_SEPARATION_SCALE,
            separation_guard: DEFAULT_SEPARATION_GUARD,
            cohesion_scale: DEFAULT_COHESION_SCALE,
            include_self: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Flocking {
    pub params: FlockParams,
}

impl Flocking {
    pub fn new(params: FlockParams) -> Self {
        Self { params }
    }

    /// Steering direction of particle i: separation from every neighbour,
    /// plus alignment and cohesion once more than one neighbour is seen, in
    /// which case the sum is normalized.
    ///
    /// The radius test and the sums read positions and velocities live, so
    /// particles already advanced this tick are seen at their new state. Only
    /// the separation denominator uses the distance from `cache`.
    pub fn direction(&self, i: usize, store: &ParticleStore, cache: &DistanceCache) -> Vector3<f64> {
        let positions = store.positions();
        let velocities = store.velocities();
        let n = cache.len().min(positions.len());
        if i >= n {
            return Vector3::zeros();
        }

        let r2 = self.params.perception_radius * self.params.perception_radius;
        let pos_i = positions[i];
        let vel_i = velocities[i];

        let mut steering: Vector3<f64> = Vector3::zeros();
        let mut velocity_sum: Vector3<f64> = Vector3::zeros();
        let mut position_sum: Vector3<f64> = Vector3::zeros();
        let mut neighbors = 0usize;

        for k in 0..n {
            if k == i && !self.params.include_self {
                continue;
            }
            let diff = pos_i - positions[k];
            if diff.norm_squared() > r2 {
                continue;
            }
            let d2 = cache.get(i, k);
            steering += diff * self.params.separation_scale / (self.params.separation_guard + d2);
            velocity_sum += velocities[k];
            position_sum += positions[k];
            neighbors += 1;
        }

        if neighbors > 1 {
            let inv = 1.0 / neighbors as f64;

            let heading = normalize_or_zero(velocity_sum * inv);
            steering += heading - vel_i;

            let to_center = normalize_or_zero(position_sum * inv - pos_i) * self.params.cohesion_scale;
            steering += to_center - vel_i;

            steering = normalize_or_zero(steering);
        }

        steering
    }
}
