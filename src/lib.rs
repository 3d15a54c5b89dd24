#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod directline;
pub mod error;
pub mod http;
pub mod orchestration;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
