//! Workflow blueprint files

use crate::template::{TemplateEngine, check_condition};
use crate::workflow::{FlowPersistence, LaunchStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// What a step passes to the next one when it proceeds
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Forward {
    /// The answer typed at this step
    #[default]
    Args,
    /// Whatever this step was given, unchanged
    Input,
}

/// One step of a blueprint
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StepConfig {
    /// Unique within the workflow
    pub name: String,

    /// Prompt template shown when the step is presented
    pub prompt: String,

    /// Falls back to `[defaults] launch_style`
    pub launch_style: Option<LaunchStyle>,

    /// Falls back to `[defaults] persistence`
    pub persistence: Option<FlowPersistence>,

    /// Expression over `args`; the step is skipped when it is true
    pub skip_if: Option<String>,

    #[serde(default)]
    pub forward: Forward,
}

/// A workflow blueprint as written in `.flowcurrent/workflows/<name>.toml`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkflowConfig {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub steps: Vec<StepConfig>,
}

impl WorkflowConfig {
    /// Collect every problem rather than stopping at the first
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.name.trim().is_empty() {
            errors.push("workflow name is empty".to_string());
        }
        if self.steps.is_empty() {
            errors.push(format!("workflow '{}' has no steps", self.name));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.name.trim().is_empty() {
                errors.push("step with an empty name".to_string());
            } else if !seen.insert(step.name.as_str()) {
                errors.push(format!("duplicate step name: {}", step.name));
            }
        }

        let engine = TemplateEngine::new();
        for step in &self.steps {
            if step.prompt.trim().is_empty() {
                errors.push(format!("step '{}' has an empty prompt", step.name));
            } else if let Err(e) = engine.validate(&step.prompt) {
                errors.push(format!("step '{}' prompt: {}", step.name, e));
            }

            if let Some(expr) = &step.skip_if {
                if let Err(e) = check_condition(expr) {
                    errors.push(format!("step '{}' skip_if: {}", step.name, e));
                }
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn step(&self, name: &str) -> Option<&StepConfig> {
        self.steps.iter().find(|s| s.name == name)
    }
}
