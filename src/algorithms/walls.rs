use nalgebra::Vector3;

/// Half-width of the enclosing cube.
pub const WALL: f64 = 1.0;
pub const ELASTIC_COEF: f64 = 1.0;
pub const LOSSY_COEF: f64 = 0.9;

fn reflect_axis(p: &mut f64, v: &mut f64, coef: f64) {
    if *p >= WALL {
        *v = -coef * *v;
        *p = WALL - coef * (*p - WALL);
    }
    if *p <= -WALL {
        *v = -coef * *v;
        *p = -WALL - coef * (*p + WALL);
    }
}

/// Lossy folds before the coordinate is pinned to the nearest face.
pub const MAX_FOLDS: usize = 64;

/// Mirror a coordinate that is still outside after the first reflection.
/// Elastic folding is periodic in `4 * WALL`, so it is reduced in one step;
/// lossy folding shrinks the overshoot and is bounded by `MAX_FOLDS`.
fn fold_inside(p: &mut f64, v: &mut f64, coef: f64) {
    if !p.is_finite() || (-WALL..=WALL).contains(&*p) {
        return;
    }
    if coef == ELASTIC_COEF {
        let t = (*p + WALL).rem_euclid(4.0 * WALL);
        if t <= 2.0 * WALL {
            *p = t - WALL;
        } else {
            *p = 3.0 * WALL - t;
            *v = -*v;
        }
        return;
    }
    for _ in 0..MAX_FOLDS {
        reflect_axis(p, v, coef);
        if (-WALL..=WALL).contains(&*p) {
            return;
        }
    }
    *p = p.clamp(-WALL, WALL);
}

/// Reflect a particle that crossed a face of the cube, one axis at a time
/// in order x, y, z. `coef` scales both the bounced velocity component and
/// the penetration that is folded back inside.
pub fn resolve(pos: &mut Vector3<f64>, vel: &mut Vector3<f64>, coef: f64) {
    for axis in 0..3usize {
        let (p, v) = (&mut pos[axis], &mut vel[axis]);
        reflect_axis(p, v, coef);
        // a step longer than the cube is wide lands outside again
        fold_inside(p, v, coef);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inside_is_untouched() {
        let mut p = Vector3::new(0.5, -0.5, 0.99);
        let mut v = Vector3::new(0.01, 0.02, 0.03);
        resolve(&mut p, &mut v, LOSSY_COEF);
        assert_eq!(p, Vector3::new(0.5, -0.5, 0.99));
        assert_eq!(v, Vector3::new(0.01, 0.02, 0.03));
    }

    #[test]
    fn elastic_bounce_on_upper_face() {
        let mut p = Vector3::new(1.04, 0.0, 0.0);
        let mut v = Vector3::new(0.05, 0.0, 0.0);
        resolve(&mut p, &mut v, ELASTIC_COEF);
        assert!((p.x - 0.96).abs() < 1e-12);
        assert_eq!(v.x, -0.05);
    }

    #[test]
    fn lossy_bounce_on_lower_face() {
        let mut p = Vector3::new(0.0, -1.1, 0.0);
        let mut v = Vector3::new(0.0, -0.1, 0.0);
        resolve(&mut p, &mut v, LOSSY_COEF);
        assert!((p.y - (-1.0 + 0.9 * 0.1)).abs() < 1e-12);
        assert!((v.y - 0.09).abs() < 1e-12);
    }

    #[test]
    fn corner_hit_reflects_every_axis() {
        let mut p = Vector3::new(1.02, -1.03, 1.01);
        let mut v = Vector3::new(0.02, -0.03, 0.01);
        resolve(&mut p, &mut v, ELASTIC_COEF);
        assert!(p.iter().all(|c| (-WALL..=WALL).contains(c)));
        assert!(v.x < 0.0 && v.y > 0.0 && v.z < 0.0);
    }

    #[test]
    fn huge_overshoot_is_folded_back_inside() {
        let mut p = Vector3::new(4.5, 0.0, -7.25);
        let mut v = Vector3::new(3.5, 0.0, -6.0);
        resolve(&mut p, &mut v, ELASTIC_COEF);
        assert!(p.iter().all(|c| (-WALL..=WALL).contains(c)));
    }

    #[test]
    fn elastic_fold_matches_repeated_reflection() {
        // 4.5 -> -2.5 -> 0.5, two reflections
        let mut p = Vector3::new(4.5, 0.0, -7.25);
        let mut v = Vector3::new(3.5, 0.0, -6.0);
        resolve(&mut p, &mut v, ELASTIC_COEF);
        assert!((p.x - 0.5).abs() < 1e-12);
        assert_eq!(v.x, 3.5);
        // -7.25 -> 5.25 -> -3.25 -> 1.25 -> 0.75, four reflections
        assert!((p.z - 0.75).abs() < 1e-12);
        assert_eq!(v.z, -6.0);
    }

    #[test]
    fn overshoot_beyond_f64_resolution_terminates() {
        for coef in [ELASTIC_COEF, LOSSY_COEF] {
            let mut p = Vector3::new(1e17, -3e16, 9.2e18);
            let mut v = Vector3::new(1e17, -3e16, 9.2e18);
            resolve(&mut p, &mut v, coef);
            assert!(p.iter().all(|c| (-WALL..=WALL).contains(c)), "{:?}", p);
            assert!(v.iter().all(|c| c.is_finite()));
        }
    }
}
