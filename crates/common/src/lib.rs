//! Shared runtime helpers: logging setup, environment checks and small wire types
//! used by the server binary and the HTTP layer.

pub mod types;
pub mod utils;
pub mod env;
