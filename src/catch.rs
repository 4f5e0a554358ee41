//! Catch chance policies
//!
//! The chance of catching a Pokemon is a swappable policy keyed on its base
//! experience. The default curve makes experienced Pokemon harder to catch and
//! never lets any catch be more likely than a coin flip.

use rand::Rng;

/// Supposedly above the base experience of any Pokemon
const MAX_BASE_EXPERIENCE: u32 = 1000;

/// Headroom below the maximum so outliers still get a non-zero chance
const EXPERIENCE_BUFFER: u32 = 100;

/// More base experience means exponentially harder to catch
const CHANCE_EXPONENT: f64 = 1.2;

/// Scales the 0-1 curve down
const CHANCE_DIVISOR: f64 = 2.0;

/// Decides how likely a catch attempt is to succeed
pub trait CatchPolicy: Send + Sync {
    /// Probability in `[0, 1]` that a Pokemon with this base experience is caught
    fn catch_chance(&self, base_experience: u32) -> f64;
}

/// Default curve over base experience
///
/// The curve is read as the chance of a catch, so a roll below it succeeds.
/// Rolling above it instead would make experienced Pokemon easier to catch.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseExperiencePolicy;

impl CatchPolicy for BaseExperiencePolicy {
    fn catch_chance(&self, base_experience: u32) -> f64 {
        let capped = base_experience.min(MAX_BASE_EXPERIENCE - EXPERIENCE_BUFFER);
        let remaining = f64::from(MAX_BASE_EXPERIENCE - capped) / f64::from(MAX_BASE_EXPERIENCE);
        remaining.powf(CHANCE_EXPONENT) / CHANCE_DIVISOR
    }
}

/// A policy that always returns the same chance
#[derive(Debug, Clone, Copy)]
pub struct FixedChance(pub f64);

impl CatchPolicy for FixedChance {
    fn catch_chance(&self, _base_experience: u32) -> f64 {
        self.0.clamp(0.0, 1.0)
    }
}

/// Rolls a catch attempt against `policy`
pub fn attempt_catch<R: Rng>(
    policy: &dyn CatchPolicy,
    base_experience: u32,
    rng: &mut R,
) -> bool {
    rng.gen::<f64>() < policy.catch_chance(base_experience)
}
