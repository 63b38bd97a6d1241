// store

mod credential_store;
mod profile_registry;

pub use credential_store::*;
pub use profile_registry::*;
