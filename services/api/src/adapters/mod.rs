pub mod memory;

pub use memory::{InMemoryRepository, RecordSet, SeedError};
