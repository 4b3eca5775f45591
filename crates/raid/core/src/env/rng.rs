//! Randomness port for replayable raid resolution.
//!
//! Every random draw of a raid is a pure function of a seed: the attempt's own
//! seed mixed with its id and a [`RollContext`]. Re-running an execution with
//! the same oracle therefore reproduces the same outcome and damage figures.

/// Distinct random draws made while resolving one raid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum RollContext {
    OutcomeRoll = 0,
    StorageLoss = 1,
    ConditionLoss = 2,
    ProductionDelay = 3,
    TreasuryTheft = 4,
    InfluenceLoss = 5,
    CounterAttackChance = 6,
    CounterAttackFraction = 7,
}

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle: Send + Sync {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Uniform value in `[0, 1)`.
    fn unit(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / (f64::from(u32::MAX) + 1.0)
    }

    /// Uniform value in `[0, 100]`.
    fn percent(&self, seed: u64) -> f64 {
        f64::from(self.next_u32(seed)) / f64::from(u32::MAX) * 100.0
    }

    /// Uniform value in `[min, max]`.
    fn range_f64(&self, seed: u64, min: f64, max: f64) -> f64 {
        if min >= max {
            return min;
        }
        min + (max - min) * f64::from(self.next_u32(seed)) / f64::from(u32::MAX)
    }

    /// Returns true with probability `p`.
    fn chance(&self, seed: u64, p: f64) -> bool {
        self.unit(seed) < p
    }
}

/// PCG random number generator (Permuted Congruential Generator).
///
/// Uses the PCG-XSH-RR variant: 32-bit output from 64-bit state. The
/// generator is stateless; all state is carried by the seed.
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    /// XSH-RR output permutation.
    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        let state = Self::pcg_step(seed);
        Self::pcg_output(state)
    }
}

/// Compute the seed of one draw.
///
/// # Arguments
///
/// * `raid_seed` - Seed fixed on the attempt when it was planned
/// * `raid_id` - Attempt identifier
/// * `context` - Which draw of the execution this is
pub fn compute_seed(raid_seed: u64, raid_id: u64, context: RollContext) -> u64 {
    // SplitMix64 / FxHash style mixing
    let mut hash = raid_seed;
    hash ^= raid_id.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= (context as u64).wrapping_mul(0x517cc1b727220a95);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}

/// Seeded view over an oracle for one attempt.
///
/// Keeps the seed plumbing out of the resolution math.
#[derive(Clone, Copy)]
pub struct RaidDice<'a> {
    rng: &'a dyn RngOracle,
    raid_seed: u64,
    raid_id: u64,
}

impl<'a> RaidDice<'a> {
    pub fn new(rng: &'a dyn RngOracle, raid_seed: u64, raid_id: u64) -> Self {
        Self {
            rng,
            raid_seed,
            raid_id,
        }
    }

    fn seed(&self, context: RollContext) -> u64 {
        compute_seed(self.raid_seed, self.raid_id, context)
    }

    pub fn percent(&self, context: RollContext) -> f64 {
        self.rng.percent(self.seed(context))
    }

    pub fn range(&self, context: RollContext, min: f64, max: f64) -> f64 {
        self.rng.range_f64(self.seed(context), min, max)
    }

    pub fn chance(&self, context: RollContext, p: f64) -> bool {
        self.rng.chance(self.seed(context), p)
    }
}
