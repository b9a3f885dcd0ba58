//! Small random-draw helpers shared by the world and organism crates.
//!
//! `rand`'s own `random_bool` and `random_range` panic on out-of-range
//! arguments. Every probability and extent here comes from configuration,
//! so these wrappers clamp instead.

use rand::Rng;

use accretion_types::{Vec2, WorldBounds};

/// Roll a Bernoulli trial with success probability `p`.
///
/// `p <= 0` (or NaN) never succeeds; `p >= 1` always does.
pub fn roll(rng: &mut impl Rng, p: f64) -> bool {
    if p.is_nan() || p <= 0.0 {
        return false;
    }
    rng.random::<f64>() < p
}

/// A uniform sample from `[-extent, extent]`, or 0 for a non-positive extent.
pub fn symmetric(rng: &mut impl Rng, extent: f64) -> f64 {
    if !extent.is_finite() || extent <= 0.0 {
        return 0.0;
    }
    rng.random_range(-extent..=extent)
}

/// A vector with each component uniform in `[-extent, extent]`.
pub fn jitter(rng: &mut impl Rng, extent: f64) -> Vec2 {
    Vec2::new(symmetric(rng, extent), symmetric(rng, extent))
}

/// A uniformly random position inside the world rectangle.
pub fn position_in(rng: &mut impl Rng, bounds: WorldBounds) -> Vec2 {
    let x = rng.random::<f64>() * bounds.width;
    let y = rng.random::<f64>() * bounds.height;
    bounds.wrap(Vec2::new(x, y))
}

/// Multiply `value` by a factor drawn uniformly from `[1 - spread, 1 + spread]`.
pub fn perturb(rng: &mut impl Rng, value: f64, spread: f64) -> f64 {
    value * (1.0 + symmetric(rng, spread))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn roll_extremes() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..100 {
            assert!(!roll(&mut rng, 0.0));
            assert!(!roll(&mut rng, -1.0));
            assert!(!roll(&mut rng, f64::NAN));
            assert!(roll(&mut rng, 1.0));
            assert!(roll(&mut rng, 3.0));
        }
    }

    #[test]
    fn symmetric_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(11);
        for _ in 0..500 {
            let v = symmetric(&mut rng, 5.0);
            assert!((-5.0..=5.0).contains(&v));
        }
        assert!(symmetric(&mut rng, 0.0).abs() < f64::EPSILON);
        assert!(symmetric(&mut rng, -2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn positions_land_inside_bounds() {
        let mut rng = SmallRng::seed_from_u64(3);
        let bounds = WorldBounds::new(80.0, 40.0);
        for _ in 0..500 {
            assert!(bounds.contains(position_in(&mut rng, bounds)));
        }
    }

    #[test]
    fn perturb_within_spread() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..500 {
            let v = perturb(&mut rng, 100.0, 0.05);
            assert!((95.0..=105.0).contains(&v));
        }
    }
}
