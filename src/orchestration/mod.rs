//! Orchestration (intent-routing) project client.
//!
//! Sends one query per call to the conversation-analysis endpoint and decodes
//! the routed prediction. `Display` on [`OrchestrationResult`] renders it for
//! the console.

mod client;
mod error;
mod render;
mod types;

#[cfg(test)]
mod tests;

pub use client::{OrchestrationClient, SUBSCRIPTION_KEY_HEADER};
pub use error::Error;
pub use types::{
    Answer, ConversationEntity, ConversationIntent, ConversationPrediction,
    ConversationTargetResult, OrchestrationPrediction, OrchestrationResult,
    QuestionAnsweringResult, Resolution, TargetIntentResult,
};
