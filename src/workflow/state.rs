//! Workflow run state

use super::node::InstanceNode;
use std::fmt;
use std::rc::Rc;

/// Where a workflow is in its run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowState {
    /// Not launched, or abandoned
    #[default]
    Idle,
    /// A step is active
    Active,
    /// Ran off the end of the blueprint; abandon before relaunching
    Finished,
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlowState::Idle => "idle",
            FlowState::Active => "active",
            FlowState::Finished => "finished",
        };
        f.write_str(s)
    }
}

/// Result of a successful launch
#[derive(Debug, Clone)]
pub enum LaunchOutcome {
    /// This node is now active
    Presented(Rc<InstanceNode>),
    /// Every step was skipped; completion already fired with the launch args
    Completed,
}

impl LaunchOutcome {
    pub fn node(&self) -> Option<&Rc<InstanceNode>> {
        match self {
            LaunchOutcome::Presented(node) => Some(node),
            LaunchOutcome::Completed => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, LaunchOutcome::Completed)
    }
}
