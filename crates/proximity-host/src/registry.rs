//! Explicit name to handler table for host operations.

use futures::future::BoxFuture;
use proximity_core::error::{ProximityError, Result};
use serde_json::Value;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

/// A registered operation: JSON arguments in, JSON result out
pub type OperationHandler = Arc<dyn Fn(Value) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Operations available to the host, populated once at start-up
#[derive(Clone, Default)]
pub struct OperationRegistry {
    handlers: BTreeMap<String, OperationHandler>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under a unique name
    pub fn register<F, Fut>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        if self.handlers.contains_key(name) {
            return Err(ProximityError::OperationExists { name: name.to_string() });
        }

        let handler: OperationHandler =
            Arc::new(move |args| -> BoxFuture<'static, Result<Value>> { Box::pin(handler(args)) });
        self.handlers.insert(name.to_string(), handler);
        tracing::debug!(operation = name, "Registered operation");
        Ok(())
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<Value> {
        let handler = self
            .handlers
            .get(name)
            .ok_or_else(|| ProximityError::OperationNotFound { name: name.to_string() })?;

        tracing::debug!(operation = name, "Executing operation");
        handler(args).await
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for OperationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationRegistry").field("operations", &self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn echo_registry() -> OperationRegistry {
        let mut registry = OperationRegistry::new();
        registry.register("echo", |args| async move { Ok(args) }).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_execute_registered_operation() {
        let registry = echo_registry();
        let result = registry.execute("echo", json!({"x": 1})).await.unwrap();
        assert_eq!(result, json!({"x": 1}));
    }

    #[tokio::test]
    async fn test_unknown_operation() {
        let registry = echo_registry();
        let result = registry.execute("map.click.handle-click", Value::Null).await;
        assert!(matches!(result, Err(ProximityError::OperationNotFound { name }) if name == "map.click.handle-click"));
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let mut registry = echo_registry();
        let result = registry.register("echo", |_| async { Ok(Value::Null) });
        assert!(matches!(result, Err(ProximityError::OperationExists { .. })));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = echo_registry();
        registry.register("alpha", |_| async { Ok(Value::Null) }).unwrap();
        assert_eq!(registry.names(), vec!["alpha", "echo"]);
    }
}
