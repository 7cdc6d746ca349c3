//! Adapters implementing the domain ports.

pub mod gateway;
pub mod identity;
pub mod in_memory;
pub mod notifier;
#[cfg(feature = "storage-rocksdb")]
pub mod rocksdb;
pub mod seed;
