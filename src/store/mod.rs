pub mod memory;
pub mod rest;
pub mod traits;
pub mod types;
pub mod unconfigured;

pub use memory::{MemoryStore, StoreCall};
pub use rest::RestStore;
pub use traits::RemoteStore;
pub use types::{Embed, Select};
pub use unconfigured::UnconfiguredStore;
