//! Error types for workflow assembly and orchestration

use super::args::ArgsMismatch;
use thiserror::Error;

/// A blueprint that cannot be assembled
#[derive(Debug, Clone, Error)]
pub enum AssemblyError {
    #[error("step '{step}' takes {expected} but the step before it produces {found}")]
    IncompatibleArgs {
        step: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Errors surfaced by launch, proceed, back-up
///
/// All of these are recoverable; none change workflow state.
#[derive(Debug, Clone, Error)]
pub enum WorkflowError {
    #[error("workflow is already launched, abandon it before launching again")]
    AlreadyLaunched,

    #[error("cannot back up from '{step}': it is the first step")]
    NoPreviousStep { step: String },

    #[error("step '{step}' is not the active step")]
    NotActive { step: String },

    #[error("workflow has no active step")]
    NotRunning,

    #[error("step is not attached to a live workflow")]
    Detached,

    #[error("cannot create step '{step}': {source}")]
    ArgumentMismatch {
        step: String,
        #[source]
        source: ArgsMismatch,
    },

    #[error(transparent)]
    Assembly(#[from] AssemblyError),
}

impl WorkflowError {
    /// Launch was refused because a run is in progress
    pub fn is_relaunch(&self) -> bool {
        matches!(self, WorkflowError::AlreadyLaunched)
    }

    /// Back-up was refused because there is nowhere to go
    pub fn is_navigation(&self) -> bool {
        matches!(self, WorkflowError::NoPreviousStep { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::NoPreviousStep {
            step: "StepA".into(),
        };
        assert!(err.to_string().contains("StepA"));
        assert!(err.is_navigation());
        assert!(!err.is_relaunch());

        let err = WorkflowError::ArgumentMismatch {
            step: "StepB".into(),
            source: ArgsMismatch {
                expected: "alloc::string::String",
                found: "i64",
            },
        };
        let msg = err.to_string();
        assert!(msg.contains("StepB"));
        assert!(msg.contains("expected alloc::string::String, got i64"));
    }

    #[test]
    fn test_assembly_error_converts() {
        let err: WorkflowError = AssemblyError::IncompatibleArgs {
            step: "StepC".into(),
            expected: "i64",
            found: "()",
        }
        .into();
        assert!(err.to_string().contains("takes i64"));
    }
}
