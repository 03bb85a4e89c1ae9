pub mod backend;
pub mod lmdb_storage;
pub mod manager;
pub mod memory;
pub mod seed;

pub use backend::Storage;
pub use lmdb_storage::LmdbStorage;
pub use manager::StorageManager;
pub use memory::MemoryStore;
pub use seed::{GraphSeed, SeedSummary};
