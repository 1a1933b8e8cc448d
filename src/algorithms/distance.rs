use crate::sim::MAX_PARTICLES;
use nalgebra::Vector3;

/// Symmetric table of squared pairwise distances, refreshed once per tick.
///
/// Storage is a flat `capacity x capacity` buffer allocated up front, so a
/// change of population never reallocates. Only the leading `len x len`
/// block is valid after `refresh`; the diagonal is 0.
#[derive(Debug, Clone)]
pub struct DistanceCache {
    d2: Vec<f64>,
    stride: usize,
    n: usize,
}

impl Default for DistanceCache {
    fn default() -> Self {
        Self::with_capacity(MAX_PARTICLES)
    }
}

impl DistanceCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            d2: vec![0.0; capacity * capacity],
            stride: capacity,
            n: 0,
        }
    }

    pub fn len(&self) -> usize { self.n }
    pub fn is_empty(&self) -> bool { self.n == 0 }
    pub fn capacity(&self) -> usize { self.stride }

    /// Squared distance between particles i and k from the last refresh.
    #[inline]
    pub fn get(&self, i: usize, k: usize) -> f64 {
        debug_assert!(i < self.n && k < self.n);
        self.d2[i * self.stride + k]
    }

    /// Recompute the table for `positions`. Positions beyond capacity are ignored.
    #[cfg(not(feature = "parallel"))]
    pub fn refresh(&mut self, positions: &[Vector3<f64>]) {
        let n = positions.len().min(self.stride);
        for i in 0..n {
            self.d2[i * self.stride + i] = 0.0;
            for k in 0..i {
                let d = (positions[i] - positions[k]).norm_squared();
                self.d2[i * self.stride + k] = d;
                self.d2[k * self.stride + i] = d;
            }
        }
        self.n = n;
    }

    /// Recompute the table for `positions`, one row per rayon task.
    /// `(a - b)^2` and `(b - a)^2` are bit-identical, so rows stay symmetric.
    #[cfg(feature = "parallel")]
    pub fn refresh(&mut self, positions: &[Vector3<f64>]) {
        use rayon::prelude::*;
        let n = positions.len().min(self.stride);
        self.d2
            .par_chunks_mut(self.stride)
            .take(n)
            .enumerate()
            .for_each(|(i, row)| {
                for k in 0..n {
                    row[k] = if i == k {
                        0.0
                    } else {
                        (positions[i] - positions[k]).norm_squared()
                    };
                }
            });
        self.n = n;
    }
}
