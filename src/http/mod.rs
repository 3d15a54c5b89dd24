//! Shared HTTP plumbing for the bot and orchestration clients.

mod client;
mod error;

pub use client::{AuthConfig, HttpClient, HttpResponse};
pub use error::{Error, format_api_error};
