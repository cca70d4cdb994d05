//! Library components of the `reqnorm` command: configuration, logging and
//! the terminal resolver.

pub mod config;
pub mod logging;
pub mod prompt;
