//! Engine Configuration
//!
//! Defines runtime limits for the Sust engine.
//! Configuration specifies constraints only; enforcement is handled by the engine.

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum number of nested function invocations per execution context
    pub max_call_depth: usize,

    /// Largest byte count a single `READ` may request
    pub max_read_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_call_depth: 256,
            max_read_size: 16 * 1024 * 1024,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    pub fn with_max_read_size(mut self, size: usize) -> Self {
        self.max_read_size = size;
        self
    }
}
