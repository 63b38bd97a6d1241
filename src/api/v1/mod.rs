mod error;
mod handler;
mod router;

pub use router::routes;
pub use error::recover_error;
