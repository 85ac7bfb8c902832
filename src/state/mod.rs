pub mod collections;
pub mod factory;
pub mod sled_store;
pub mod store;

pub use collections::{IncidentSnapshot, Store};
pub use factory::{create_backend, create_in_memory_backend};
pub use sled_store::SledKv;
pub use store::*;
