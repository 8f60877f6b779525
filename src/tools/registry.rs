//! Tool registry — named tools with JSON-schema inputs, dispatched by name

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::{Error, Result};

/// A capability the hosting runtime can invoke by name
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name
    fn name(&self) -> &'static str;

    /// Human-readable description shown to the calling agent
    fn description(&self) -> &'static str;

    /// JSON schema (an object schema) describing the arguments
    fn input_schema(&self) -> Map<String, Value>;

    /// Invoke the tool with JSON arguments, returning text
    ///
    /// # Errors
    ///
    /// Returns error if the arguments are invalid or the tool fails
    async fn call(&self, arguments: Value) -> Result<String>;
}

/// Tool metadata as advertised to clients
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Map<String, Value>,
}

/// Registered tools, in registration order
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool; a tool with the same name is replaced in place
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        tracing::debug!(tool = tool.name(), "registering tool");
        if let Some(slot) = self.tools.iter_mut().find(|t| t.name() == tool.name()) {
            *slot = tool;
        } else {
            self.tools.push(tool);
        }
    }

    /// Look up a tool by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name).cloned()
    }

    /// Definitions of all registered tools
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|t| ToolDefinition {
                name: t.name(),
                description: t.description(),
                input_schema: t.input_schema(),
            })
            .collect()
    }

    /// Number of registered tools
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether no tools are registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute a tool call by name
    ///
    /// # Errors
    ///
    /// Returns `UnknownTool` if nothing is registered under `name`, otherwise
    /// whatever the tool returns
    pub async fn call(&self, name: &str, arguments: Value) -> Result<String> {
        let tool = self
            .get(name)
            .ok_or_else(|| Error::UnknownTool(name.to_string()))?;

        tracing::info!(tool = name, "tool call");
        let result = tool.call(arguments).await;
        if let Err(e) = &result {
            tracing::warn!(tool = name, error = %e, "tool call failed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl Tool for Echo {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn description(&self) -> &'static str {
            self.0
        }

        fn input_schema(&self) -> Map<String, Value> {
            let mut schema = Map::new();
            schema.insert("type".to_string(), Value::from("object"));
            schema
        }

        async fn call(&self, arguments: Value) -> Result<String> {
            Ok(arguments.to_string())
        }
    }

    #[tokio::test]
    async fn dispatches_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("echo tool")));

        let out = registry.call("echo", serde_json::json!({"a": 1})).await.unwrap();
        assert_eq!(out, r#"{"a":1}"#);
    }

    #[tokio::test]
    async fn unknown_tool() {
        let registry = ToolRegistry::new();
        let err = registry.call("missing", Value::Null).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTool(name) if name == "missing"));
    }

    #[test]
    fn re_registering_replaces() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(Echo("first")));
        registry.register(Arc::new(Echo("second")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.definitions()[0].description, "second");
    }
}
