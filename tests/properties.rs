use boxflock::algorithms::walls;
use boxflock::engine::{CMD_FEWER_PARTICLES, CMD_MORE_PARTICLES};
use boxflock::{clamp_speed, spawn_configs, spawn_rng, Engine, SimParams, MAX_PARTICLES};
use nalgebra::Vector3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_vector(rng: &mut StdRng, scale: f64) -> Vector3<f64> {
    Vector3::new(
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
        rng.gen_range(-scale..scale),
    )
}

// ==================================================================================
// Speed clamp
// ==================================================================================

#[test]
fn clamp_is_bounded_and_idempotent() {
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..1000 {
        let v = random_vector(&mut rng, 2.0);
        let s = rng.gen_range(0.001..1.5);

        let once = clamp_speed(v, s);
        let twice = clamp_speed(once, s);
        assert!(once.norm() <= s * (1.0 + 1e-12));
        assert!((twice - once).norm() <= 1e-12 * s);
        if v.norm() <= s {
            assert_eq!(once, v);
        }
    }
}

// ==================================================================================
// Distance cache
// ==================================================================================

#[test]
fn distance_table_is_exactly_symmetric() {
    let mut engine = Engine::new(SimParams {
        num_particles: 200,
        seed: Some(5),
        ..SimParams::default()
    });
    for _ in 0..3 {
        engine.tick();
    }
    engine.refresh_distances();

    let cache = engine.distances();
    let positions = engine.store().positions();
    assert_eq!(cache.len(), 200);
    for i in 0..cache.len() {
        for k in 0..i {
            assert_eq!(cache.get(i, k), cache.get(k, i));
            let expected = (positions[i] - positions[k]).norm_squared();
            assert!((cache.get(i, k) - expected).abs() < 1e-15);
        }
    }
}

// ==================================================================================
// Wall response
// ==================================================================================

#[test]
fn resolve_contains_every_axis() {
    let mut rng = StdRng::seed_from_u64(2);
    for coef in [walls::ELASTIC_COEF, walls::LOSSY_COEF] {
        for _ in 0..1000 {
            let mut p = random_vector(&mut rng, 1.3);
            let mut v = random_vector(&mut rng, 0.3);
            walls::resolve(&mut p, &mut v, coef);
            assert!(p.iter().all(|c| (-1.0..=1.0).contains(c)), "{:?}", p);
        }
    }
}

#[test]
fn elastic_bounce_keeps_axis_speed_and_lossy_bounce_drops_it() {
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..500 {
        let axis: usize = rng.gen_range(0..3);
        let mut p: Vector3<f64> = Vector3::zeros();
        p[axis] = rng.gen_range(1.0..1.2);
        let mut v: Vector3<f64> = Vector3::zeros();
        v[axis] = rng.gen_range(0.01..0.2);

        let (mut pe, mut ve) = (p, v);
        walls::resolve(&mut pe, &mut ve, walls::ELASTIC_COEF);
        assert_eq!(ve[axis].abs(), v[axis].abs());
        assert!(ve[axis] < 0.0);

        let (mut pl, mut vl) = (p, v);
        walls::resolve(&mut pl, &mut vl, walls::LOSSY_COEF);
        assert!(vl.norm() < v.norm());
    }
}

// ==================================================================================
// Population commands
// ==================================================================================

#[test]
fn population_stays_within_bounds() {
    let mut engine = Engine::new(SimParams {
        num_particles: 1,
        seed: Some(9),
        ..SimParams::default()
    });

    engine.apply_command(CMD_FEWER_PARTICLES).unwrap();
    assert_eq!(engine.len(), 1);

    for _ in 0..12 {
        engine.apply_command(CMD_MORE_PARTICLES).unwrap();
        assert!(engine.len() <= MAX_PARTICLES);
    }
    assert_eq!(engine.len(), MAX_PARTICLES);
    assert_eq!(engine.params().num_particles, MAX_PARTICLES);

    let mut rng = StdRng::seed_from_u64(4);
    for _ in 0..40 {
        let cmd = if rng.gen_bool(0.5) { CMD_MORE_PARTICLES } else { CMD_FEWER_PARTICLES };
        engine.apply_command(cmd).unwrap();
        assert!((1..=MAX_PARTICLES).contains(&engine.len()));
    }
}

#[test]
fn doubling_twice_quadruples() {
    let mut engine = Engine::new(SimParams {
        num_particles: 10,
        seed: Some(9),
        ..SimParams::default()
    });
    engine.more_particles();
    engine.more_particles();
    assert_eq!(engine.len(), 40);
    engine.fewer_particles();
    assert_eq!(engine.len(), 20);
}

// ==================================================================================
// Seeded respawn
// ==================================================================================

#[test]
fn same_seed_spawns_same_population() {
    let a = spawn_configs(64, 0.01, &mut spawn_rng(Some(123)));
    let b = spawn_configs(64, 0.01, &mut spawn_rng(Some(123)));
    let c = spawn_configs(64, 0.01, &mut spawn_rng(Some(124)));
    assert_eq!(a, b);
    assert_ne!(a, c);

    let params = SimParams {
        num_particles: 64,
        seed: Some(123),
        ..SimParams::default()
    };
    let mut e1 = Engine::new(params.clone());
    let mut e2 = Engine::new(params);
    for _ in 0..10 {
        e1.tick();
        e2.tick();
    }
    assert_eq!(e1.store().state_matrix(), e2.store().state_matrix());
}
