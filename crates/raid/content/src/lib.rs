//! Data-driven raid balance tables and their loaders.
//!
//! The engine reads every tunable figure from a [`raid_core::RaidConfig`];
//! this crate ships the bundled `data/raid.toml` and loads operator overrides
//! from disk. Content is consumed at startup and never appears in raid state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, LoadResult};
