//! Configuration system: schema, loading, env var overrides, key checks.
//!
//! # Usage
//! ```no_run
//! use searchbot_core::config;
//!
//! let cfg = config::load_config(None);
//! println!("Model: {}", cfg.agent.model);
//! ```

pub mod keys;
pub mod loader;
pub mod schema;

pub use keys::{key_status, verify_api_keys, KeyStatus};
pub use loader::{get_config_path, load_config, save_config};
pub use schema::{
    AgentSettings, ChatConfig, Config, PromptStyle, ProviderConfig, ProvidersConfig,
    SearchConfig, WebConfig,
};
