//! Engine limits.

use std::path::Path;

use lf_core::ValidationError;
use serde::{Deserialize, Serialize};

use crate::error::FlowResult;

/// Safety bounds for one traversal.
///
/// Every field has a default, so a config file only lists what it changes:
///
/// ```
/// let cfg = lf_flow::FlowConfig::from_yaml_str("max_global_iterations: 50").unwrap();
/// assert_eq!(cfg.max_global_iterations, 50);
/// assert_eq!(cfg.max_loop_iterations, 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FlowConfig {
    /// Revisits allowed per node before it is no longer executed.
    pub max_loop_iterations: usize,
    /// Node executions allowed per run.
    pub max_global_iterations: usize,
    /// How many recent executions count as "recent" for revisit detection.
    pub loop_detection_window: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_loop_iterations: 100,
            max_global_iterations: 1000,
            loop_detection_window: 10,
        }
    }
}

impl FlowConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut err = ValidationError::new();
        err.check(self.max_loop_iterations > 0, || {
            "max_loop_iterations must be positive".into()
        });
        err.check(self.max_global_iterations > 0, || {
            "max_global_iterations must be positive".into()
        });
        err.check(self.loop_detection_window > 0, || {
            "loop_detection_window must be positive".into()
        });
        err.into_result()
    }

    pub fn from_yaml_str(text: &str) -> FlowResult<Self> {
        let cfg: Self = serde_yaml::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_str(text: &str) -> FlowResult<Self> {
        let cfg: Self = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load(path: &Path) -> FlowResult<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }
    }
}
