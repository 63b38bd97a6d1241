mod credential_store_mem;
mod profile_registry_file;

pub use credential_store_mem::*;
pub use profile_registry_file::*;
