//! Injected environment for deterministic resolution.
mod rng;

pub use rng::{PcgRng, RaidDice, RngOracle, RollContext, compute_seed};
