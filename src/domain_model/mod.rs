mod credential;
mod profile;
mod session;

pub use credential::*;
pub use profile::*;
pub use session::*;
