mod auth;
mod profile;

pub use auth::*;
pub use profile::*;
