//! SearchBot agent: tool loop, search tools, and prompt builder.
//!
//! This crate contains:
//! - **tools**: Tool trait, registry, and the DuckDuckGo / arXiv / Wikipedia tools
//! - **context**: System prompt and message list construction
//! - **events**: Progress events for live display
//! - **agent_loop**: The LLM ↔ tool-calling loop

pub mod agent_loop;
pub mod context;
pub mod events;
pub mod tools;

pub use agent_loop::{AgentReply, AgentRequest, SearchAgent};
pub use context::ContextBuilder;
pub use events::{AgentEvent, AgentObserver, NoopObserver, RecordingObserver};
pub use tools::{build_search_tools, Tool, ToolRegistry};
