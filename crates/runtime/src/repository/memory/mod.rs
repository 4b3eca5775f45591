//! In-memory store implementations for tests and local runs.

mod store;
mod world;

pub use store::InMemoryRaidStore;
pub use world::MemoryWorld;
