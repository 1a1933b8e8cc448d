use crate::algorithms::walls;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Предельный размер популяции; все буферы резервируются под него один раз.
pub const MAX_PARTICLES: usize = 1000;

/// Начальное состояние одной частицы (из спавнера или сценария).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleConfig {
    pub position: [f64; 3],
    pub velocity: [f64; 3],
    pub mass: f64,
    /// Слот палитры, для спавна `index % NUM_COLORS`
    pub color: usize,
}

impl ParticleConfig {
    pub fn new(position: [f64; 3], velocity: [f64; 3], color: usize) -> Self {
        Self {
            position,
            velocity,
            mass: 1.0,
            color,
        }
    }
}

/// Снимок одной частицы между тиками (для UI/отладочного вывода).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleSnapshot {
    /// Однородные координаты, w всегда 1.0
    pub position: [f64; 4],
    pub velocity: [f64; 3],
    pub mass: f64,
    pub color: usize,
}

/// Ограничить модуль скорости: длинный вектор масштабируется до `limit`.
pub fn clamp_speed(v: Vector3<f64>, limit: f64) -> Vector3<f64> {
    let speed = v.norm();
    if speed > limit {
        v * (limit / speed)
    } else {
        v
    }
}

/// Хранилище частиц в раскладке SoA.
/// Ускорение - рабочий буфер тика, между тиками он нулевой.
#[derive(Debug)]
pub struct ParticleStore {
    x: Vec<Vector3<f64>>,     // позиции
    v: Vec<Vector3<f64>>,     // скорости
    acc: Vec<Vector3<f64>>,   // ускорения, обнуляются в advance()
    mass: Vec<f64>,           // массы
    color: Vec<usize>,        // слоты палитры
}

impl Default for ParticleStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticleStore {
    pub fn new() -> Self {
        Self {
            x: Vec::with_capacity(MAX_PARTICLES),
            v: Vec::with_capacity(MAX_PARTICLES),
            acc: Vec::with_capacity(MAX_PARTICLES),
            mass: Vec::with_capacity(MAX_PARTICLES),
            color: Vec::with_capacity(MAX_PARTICLES),
        }
    }

    /// Заменить всю популяцию. Всё сверх `MAX_PARTICLES` отбрасывается.
    pub fn reset(&mut self, configs: &[ParticleConfig]) {
        self.x.clear();
        self.v.clear();
        self.acc.clear();
        self.mass.clear();
        self.color.clear();

        for c in configs.iter().take(MAX_PARTICLES) {
            self.x.push(Vector3::from(c.position));
            self.v.push(Vector3::from(c.velocity));
            self.acc.push(Vector3::zeros());
            self.mass.push(c.mass);
            self.color.push(c.color);
        }
    }

    pub fn len(&self) -> usize { self.x.len() }
    pub fn is_empty(&self) -> bool { self.x.is_empty() }
    pub fn capacity(&self) -> usize { self.x.capacity() }

    pub fn positions(&self) -> &[Vector3<f64>] { &self.x }
    pub fn velocities(&self) -> &[Vector3<f64>] { &self.v }
    pub fn accelerations(&self) -> &[Vector3<f64>] { &self.acc }
    pub fn colors(&self) -> &[usize] { &self.color }

    pub fn set_position(&mut self, i: usize, pos: Vector3<f64>) { self.x[i] = pos; }

    pub fn set_velocity(&mut self, i: usize, vel: Vector3<f64>) { self.v[i] = vel; }

    /// Добавить вклад в ускорение i-й частицы на текущем тике
    pub fn accumulate(&mut self, i: usize, a: Vector3<f64>) {
        self.acc[i] += a;
    }

    /// Шаг полунеявного Эйлера для i-й частицы: позиция сдвигается на прежнюю
    /// скорость, затем скорость получает накопленное ускорение и ограничивается.
    /// После шага ускорение обнуляется.
    pub fn advance(&mut self, i: usize, speed_limit: f64) {
        self.x[i] += self.v[i];
        self.v[i] += self.acc[i];
        self.v[i] = clamp_speed(self.v[i], speed_limit);
        self.acc[i] = Vector3::zeros();
    }

    /// Отражение i-й частицы от стенок куба
    pub fn collide(&mut self, i: usize, coef: f64) {
        walls::resolve(&mut self.x[i], &mut self.v[i], coef);
    }

    /// Однородная позиция i-й частицы, как её ждёт рендерер
    pub fn homogeneous(&self, i: usize) -> [f64; 4] {
        let p = self.x[i];
        [p.x, p.y, p.z, 1.0]
    }

    /// Получить матрицу состояний Nx6 (x,y,z,vx,vy,vz)
    pub fn state_matrix(&self) -> Vec<[f64; 6]> {
        let n = self.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push([
                self.x[i].x, self.x[i].y, self.x[i].z,
                self.v[i].x, self.v[i].y, self.v[i].z,
            ]);
        }
        out
    }

    /// Сформировать снимок по всем частицам.
    pub fn snapshots(&self) -> Vec<ParticleSnapshot> {
        let n = self.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            out.push(ParticleSnapshot {
                position: self.homogeneous(i),
                velocity: [self.v[i].x, self.v[i].y, self.v[i].z],
                mass: self.mass[i],
                color: self.color[i],
            });
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_leaves_slow_vectors_alone() {
        let v = Vector3::new(0.001, -0.002, 0.003);
        assert_eq!(clamp_speed(v, 0.01), v);
    }

    #[test]
    fn clamp_rescales_to_limit_keeping_direction() {
        let v = Vector3::new(3.0, 0.0, 4.0);
        let c = clamp_speed(v, 0.5);
        assert!((c.norm() - 0.5).abs() < 1e-12);
        assert!((c.x / c.z - 0.75).abs() < 1e-12);
    }

    #[test]
    fn clamp_of_zero_is_zero() {
        assert_eq!(clamp_speed(Vector3::zeros(), 0.01), Vector3::zeros());
    }

    #[test]
    fn advance_uses_previous_velocity_for_position() {
        let mut store = ParticleStore::new();
        store.reset(&[ParticleConfig::new([0.0, 0.0, 0.0], [0.01, 0.0, 0.0], 0)]);
        store.accumulate(0, Vector3::new(0.0, 0.02, 0.0));
        store.advance(0, 1.0);

        assert_eq!(store.positions()[0], Vector3::new(0.01, 0.0, 0.0));
        assert_eq!(store.velocities()[0], Vector3::new(0.01, 0.02, 0.0));
        assert_eq!(store.accelerations()[0], Vector3::zeros());
    }

    #[test]
    fn reset_keeps_reserved_capacity() {
        let mut store = ParticleStore::new();
        let configs: Vec<_> = (0..MAX_PARTICLES + 5)
            .map(|i| ParticleConfig::new([0.0; 3], [0.0; 3], i % 8))
            .collect();
        store.reset(&configs);
        assert_eq!(store.len(), MAX_PARTICLES);
        assert!(store.capacity() >= MAX_PARTICLES);

        store.reset(&configs[..3]);
        assert_eq!(store.len(), 3);
        assert_eq!(store.homogeneous(2)[3], 1.0);
    }

    #[test]
    fn snapshots_mirror_the_store() {
        let mut store = ParticleStore::new();
        let mut heavy = ParticleConfig::new([0.1, 0.2, 0.3], [0.01, 0.0, -0.01], 5);
        heavy.mass = 2.5;
        store.reset(&[ParticleConfig::new([0.0; 3], [0.0; 3], 0), heavy]);

        let snaps = store.snapshots();
        assert_eq!(snaps.len(), 2);
        assert_eq!(snaps[1].position, [0.1, 0.2, 0.3, 1.0]);
        assert_eq!(snaps[1].velocity, [0.01, 0.0, -0.01]);
        assert_eq!(snaps[1].mass, 2.5);
        assert_eq!(snaps[1].color, 5);
        assert_eq!(snaps[0].mass, 1.0);
    }
}
