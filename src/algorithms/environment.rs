use crate::algorithms::distance::DistanceCache;
use crate::sim::ParticleStore;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_REPULSION_SCALE: f64 = 0.001;
pub const DEFAULT_REPULSION_GUARD: f64 = 0.001;
pub const DEFAULT_UP_BIAS: [f64; 3] = [0.0, 0.0, 1.0];
pub const DEFAULT_GRAVITY_PULL: [f64; 3] = [0.0, -1.0, 0.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentParams {
    pub repulsion_scale: f64,
    pub repulsion_guard: f64,
    /// Base force while gravity is off.
    pub up_bias: [f64; 3],
    /// Base force while gravity is on; replaces `up_bias`.
    pub gravity_pull: [f64; 3],
}

impl Default for EnvironmentParams {
    fn default() -> Self {
        Self {
            repulsion_scale: DEFAULT_REPULSION_SCALE,
            repulsion_guard: DEFAULT_REPULSION_GUARD,
            up_bias: DEFAULT_UP_BIAS,
            gravity_pull: DEFAULT_GRAVITY_PULL,
        }
    }
}

/// Constant base force plus soft inverse-square repulsion from every other
/// particle in the box.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub params: EnvironmentParams,
}

impl Environment {
    pub fn new(params: EnvironmentParams) -> Self {
        Self { params }
    }

    pub fn base(&self, gravity: bool) -> Vector3<f64> {
        if gravity {
            Vector3::from(self.params.gravity_pull)
        } else {
            Vector3::from(self.params.up_bias)
        }
    }

    pub fn force(
        &self,
        i: usize,
        store: &ParticleStore,
        cache: &DistanceCache,
        gravity: bool,
    ) -> Vector3<f64> {
        let positions = store.positions();
        let n = cache.len().min(positions.len());
        let mut force = self.base(gravity);
        if i >= n {
            return force;
        }

        let pos_i = positions[i];
        for k in 0..n {
            if k == i {
                continue;
            }
            let diff = pos_i - positions[k];
            force += diff * self.params.repulsion_scale / (self.params.repulsion_guard + cache.get(i, k));
        }
        force
    }
}
