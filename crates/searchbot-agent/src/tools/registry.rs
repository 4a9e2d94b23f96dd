//! Name-keyed set of search tools the agent offers to the model.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use searchbot_core::types::ToolDefinition;
use serde_json::Value;
use tracing::{debug, warn};

use super::base::Tool;

/// Search tools keyed by the name the model calls them by.
///
/// Kept in a `BTreeMap` so definitions and error listings come out in a
/// stable, alphabetical order.
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Add a tool, replacing any earlier one with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        debug!(tool = tool.name(), "registered search tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Label shown to users for a tool call; unknown names pass through.
    pub fn display_name(&self, name: &str) -> String {
        match self.tools.get(name) {
            Some(tool) => tool.display_name().to_string(),
            None => name.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Function definitions sent with every completion request.
    pub fn get_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    /// Run the named lookup. Failures come back as text for the model to
    /// read rather than as errors.
    pub async fn execute(&self, name: &str, params: HashMap<String, Value>) -> String {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "model asked for an unknown tool");
            return format!(
                "Error: Tool '{name}' not found. Available tools: {}",
                self.tool_names().join(", ")
            );
        };

        match tool.execute(params).await {
            Ok(text) => text,
            Err(e) => {
                warn!(tool = name, error = %e, "search tool failed");
                format!("Error executing {name}: {e}")
            }
        }
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
