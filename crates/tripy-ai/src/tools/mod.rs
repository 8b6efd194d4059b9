//! Tools the model may call mid-turn.
//!
//! A [`Tool`] declares itself with a [`ToolDefinition`] and turns the
//! model-extracted JSON arguments into a text result. Tool failures are
//! reported as text, never as errors: the model reads the result either way.

pub mod weather;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{ToolCall, ToolDefinition};

pub use weather::WeatherTool;

#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the model calls the tool by; must match `definition().name`.
    fn name(&self) -> &str;

    fn definition(&self) -> ToolDefinition;

    async fn call(&self, arguments: &Value) -> String;
}

/// The fixed set of tools declared on every model request.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Run the tool a call names; unknown names yield an explanatory result.
    pub async fn execute(&self, call: &ToolCall) -> String {
        debug!(tool = %call.name, "Executing tool");
        match self
            .tools
            .iter()
            .find(|t| t.name() == call.name)
        {
            Some(tool) => tool.call(&call.arguments).await,
            None => format!("Unknown tool: {}", call.name),
        }
    }
}

impl std::fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.tools.iter().map(|t| t.name()).collect();
        f.debug_struct("ToolSet").field("tools", &names).finish()
    }
}

/// Convert a ToolDefinition to the OpenAI `tools` array entry.
pub fn to_openai_tool(tool: &ToolDefinition) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        }
    })
}
