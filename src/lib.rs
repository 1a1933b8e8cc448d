//! Стая частиц в кубе.
//!
//! Ограниченная популяция точечных частиц движется в кубе `[-1, 1]^3`:
//! разделение, выравнивание и сплочение, опциональная постоянная сила
//! и отражение от стенок с потерей энергии или без. [`Engine::tick`] делает
//! один шаг, рендерер читает позиции и цвета между тиками.

pub mod algorithms;
pub mod engine;
pub mod models;
pub mod sim;

pub use algorithms::distance::DistanceCache;
pub use algorithms::environment::{Environment, EnvironmentParams};
pub use algorithms::flocking::{FlockParams, Flocking};
pub use engine::{command_catalog, CommandInfo, CommandOutcome, Engine, RenderFrame, SimParams};
pub use models::particles::{spawn_configs, spawn_rng, NUM_COLORS, PALETTE};
pub use sim::{clamp_speed, ParticleConfig, ParticleSnapshot, ParticleStore, MAX_PARTICLES};

#[cfg(target_arch = "wasm32")]
pub mod wasm;
