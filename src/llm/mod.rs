//! Summarization client for the external generative model.

mod client;

pub use client::{LlmClient, LlmConfig, LlmError, Summarizer};

#[cfg(test)]
pub use client::CannedSummarizer;
