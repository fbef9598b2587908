pub mod error;
pub mod filesystem;
pub mod memory;
pub mod object_store;
pub mod storage_factory;

pub use object_store::ObjectStore;
