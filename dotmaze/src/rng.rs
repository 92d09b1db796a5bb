use crate::geometry::Vector;

use rand::Rng;

/// Flips a biased coin, returning `true` with
/// the given probability. A probability of 0
/// never succeeds and one of 1 always does.
pub(crate) fn chance<R: Rng + ?Sized>(rng: &mut R, probability: f64) -> bool {
    rng.gen::<f64>() < probability
}

/// Returns a uniformly random value in `[0, upper)`,
/// or `(upper, 0]` if `upper` is negative.
pub(crate) fn uniform<R: Rng + ?Sized>(rng: &mut R, upper: f64) -> f64 {
    upper * rng.gen::<f64>()
}

/// Returns an acceleration with each axis drawn
/// independently from {-1, 0, 1}.
pub(crate) fn random_acceleration<R: Rng + ?Sized>(rng: &mut R) -> Vector {
    Vector::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1))
}
