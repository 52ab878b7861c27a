//! Build-time handler registration and entry-point resolution.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ExecError;

/// Error type handlers report failures with.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Boxed async function invoked for one job execution.
pub type JobHandler =
    Arc<dyn Fn() -> Pin<Box<dyn Future<Output = Result<(), HandlerError>> + Send>> + Send + Sync>;

/// Two-level lookup from `"module:function"` entry points to statically
/// linked handlers.
///
/// Registration happens once at startup (the deployment's handler
/// manifest); the scheduler and pool only ever resolve. An entry point's
/// module part is matched verbatim, so graph files and the manifest must
/// agree on module naming.
#[derive(Default)]
pub struct HandlerRegistry {
    modules: HashMap<String, HashMap<String, JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under `module:function`.
    ///
    /// Re-registering the same pair replaces the previous handler.
    pub fn register<F, Fut>(&mut self, module: &str, function: &str, handler: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
    {
        let handler: JobHandler = Arc::new(move || Box::pin(handler()));
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(function.to_string(), handler);
    }

    /// Resolve an entry point to its handler.
    ///
    /// Parsing happens before any lookup: a malformed entry point never
    /// touches the registry.
    pub fn resolve(&self, entry_point: &str) -> Result<JobHandler, ExecError> {
        let (module, function) = parse_entry_point(entry_point)?;
        let functions = self
            .modules
            .get(module)
            .ok_or_else(|| ExecError::ModuleNotFound(module.to_string()))?;
        functions
            .get(function)
            .cloned()
            .ok_or_else(|| ExecError::FunctionNotFound {
                module: module.to_string(),
                function: function.to_string(),
            })
    }

    /// Number of registered handlers across all modules.
    pub fn len(&self) -> usize {
        self.modules.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// Split `"module:function"` on the first `:`; both parts must be
/// non-empty.
pub(crate) fn parse_entry_point(entry_point: &str) -> Result<(&str, &str), ExecError> {
    entry_point
        .split_once(':')
        .filter(|(module, function)| !module.is_empty() && !function.is_empty())
        .ok_or_else(|| ExecError::MalformedEntryPoint(entry_point.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(module: &str, function: &str) -> HandlerRegistry {
        let mut registry = HandlerRegistry::new();
        registry.register(module, function, || async { Ok(()) });
        registry
    }

    #[test]
    fn parse_splits_on_first_colon() {
        assert_eq!(parse_entry_point("jobs:flow1").unwrap(), ("jobs", "flow1"));
        assert_eq!(
            parse_entry_point("pkg/jobs.py:flow1").unwrap(),
            ("pkg/jobs.py", "flow1")
        );
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert!(matches!(
            parse_entry_point("jobsflow1"),
            Err(ExecError::MalformedEntryPoint(_))
        ));
    }

    #[test]
    fn parse_rejects_empty_parts() {
        assert!(matches!(
            parse_entry_point(":flow1"),
            Err(ExecError::MalformedEntryPoint(_))
        ));
        assert!(matches!(
            parse_entry_point("jobs:"),
            Err(ExecError::MalformedEntryPoint(_))
        ));
    }

    #[test]
    fn resolve_known_entry_point() {
        let registry = registry_with("jobs", "flow1");
        assert!(registry.resolve("jobs:flow1").is_ok());
    }

    #[test]
    fn resolve_unknown_module() {
        let registry = registry_with("jobs", "flow1");
        assert!(matches!(
            registry.resolve("other:flow1"),
            Err(ExecError::ModuleNotFound(m)) if m == "other"
        ));
    }

    #[test]
    fn resolve_unknown_function() {
        let registry = registry_with("jobs", "flow1");
        match registry.resolve("jobs:flow2").map(|_| ()) {
            Err(ExecError::FunctionNotFound { module, function }) => {
                assert_eq!(module, "jobs");
                assert_eq!(function, "flow2");
            }
            other => panic!("expected FunctionNotFound, got {other:?}"),
        }
    }

    #[test]
    fn reregistering_replaces_and_len_counts_functions() {
        let mut registry = registry_with("jobs", "flow1");
        registry.register("jobs", "flow2", || async { Ok(()) });
        registry.register("jobs", "flow2", || async { Ok(()) });
        assert_eq!(registry.len(), 2);
    }
}
