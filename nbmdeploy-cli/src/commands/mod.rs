//! CLI command implementations.

pub mod config;
pub mod deploy;
pub mod inspect;
pub mod output;
pub mod validate;
