//! LLM provider layer for SearchBot.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait that all providers implement
//! - [`registry`]: static specs for the supported hosted providers + matching logic
//! - [`http_provider::HttpProvider`]: OpenAI-compatible HTTP client
//! - [`http_provider::create_provider`]: builder from the loaded `Config`

pub mod http_provider;
pub mod registry;
pub mod traits;

pub use http_provider::{create_provider, HttpProvider};
pub use registry::{ProviderConfig, ProviderSpec, PROVIDERS};
pub use traits::{LlmProvider, LlmRequestConfig};
