//! Configuration types for segwin

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One hour of one-second ticks.
pub const DEFAULT_WINDOW_SIZE: usize = 3600;

/// Metric names served out of the box.
pub const DEFAULT_METRICS: [&str; 3] = ["cpu", "memory", "requests"];

/// Per-engine configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EngineConfig {
    /// Window capacity in samples (one sample per tick)
    pub window_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl EngineConfig {
    /// Create a configuration with a custom window size
    pub fn with_window_size(window_size: usize) -> Self {
        Self { window_size }
    }
}

/// Registry configuration: which metrics exist and how large their windows are
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RegistryConfig {
    /// Window capacity shared by every engine
    pub window_size: usize,

    /// Metric names, one engine each
    pub metrics: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            metrics: DEFAULT_METRICS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl RegistryConfig {
    /// Create a configuration for the given metric names
    pub fn with_metrics<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Override the window size
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size;
        self
    }

    /// Engine configuration derived from this registry configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig::with_window_size(self.window_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.window_size, 3600);
    }

    #[test]
    fn test_registry_config_default() {
        let config = RegistryConfig::default();
        assert_eq!(config.window_size, 3600);
        assert_eq!(config.metrics, vec!["cpu", "memory", "requests"]);
    }

    #[test]
    fn test_registry_config_builder() {
        let config = RegistryConfig::with_metrics(["disk", "net"]).window_size(300);
        assert_eq!(config.metrics, vec!["disk", "net"]);
        assert_eq!(config.engine_config(), EngineConfig::with_window_size(300));
    }
}
