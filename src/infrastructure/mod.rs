//! Adapters for the domain ports: storage backends and the settlement simulator.

pub mod in_memory;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod seed;
pub mod simulator;
