//! Function Registry
//!
//! Name-indexed table of definitions, filled in one pass before execution
//! so forward references resolve.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::error::{ErrorKind, Result};

use super::definition::FunctionDef;

#[derive(Debug, Clone, Default)]
pub struct FunctionRegistry {
    functions: IndexMap<String, Arc<FunctionDef>>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition; names are unique
    pub fn register(&mut self, def: FunctionDef) -> Result<()> {
        if self.functions.contains_key(&def.name) {
            return Err(ErrorKind::DuplicateFunction(def.name));
        }
        self.functions.insert(def.name.clone(), Arc::new(def));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<FunctionDef>> {
        self.functions
            .get(name)
            .cloned()
            .ok_or_else(|| ErrorKind::UnknownFunction(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::ValueType;

    fn def(name: &str) -> FunctionDef {
        FunctionDef::new(name, ValueType::Bool, Vec::new(), Vec::new(), 1)
    }

    #[test]
    fn rejects_duplicates() {
        let mut registry = FunctionRegistry::new();
        registry.register(def("f")).unwrap();
        assert_eq!(
            registry.register(def("f")),
            Err(ErrorKind::DuplicateFunction("f".into()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unknown_lookup_fails() {
        let registry = FunctionRegistry::new();
        assert!(matches!(
            registry.get("missing"),
            Err(ErrorKind::UnknownFunction(name)) if name == "missing"
        ));
    }
}
