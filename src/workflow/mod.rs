//! Workflow orchestration core
//!
//! This module handles:
//! - Blueprints of typed steps, checked for compatibility on append
//! - The live chain of step instances (doubly linked, weak back-pointers)
//! - Launch, proceed, back-up and abandon transitions
//! - Skip predicates and flow persistence
//!
//! # Example
//!
//! ```ignore
//! use flowcurrent::workflow::{FlowMetadata, PassedArgs, Workflow};
//!
//! let workflow = Workflow::starting_with(FlowMetadata::of::<EnterEmail>())
//!     .then_proceed_with(FlowMetadata::of::<ConfirmEmail>().skip_when(|args| args.is_none()))?;
//!
//! workflow.launch(responder, PassedArgs::None, Some(Box::new(|args| {
//!     println!("finished with {:?}", args);
//! })))?;
//! ```

mod args;
mod engine;
mod error;
mod flow;
mod launcher;
mod metadata;
mod node;
mod responder;
mod state;

#[cfg(test)]
pub(crate) mod test_support;

pub use args::{AnyArgs, ArgsMismatch, ArgsType, PassedArgs, extract_input, into_passed_args};
pub use engine::Workflow;
pub use error::{AssemblyError, WorkflowError};
pub use flow::{AnyFlowRepresentable, FlowRepresentable, WorkflowPointer};
pub use launcher::WorkflowLauncher;
pub use metadata::{FlowMetadata, FlowPersistence, LaunchStyle, PersistenceRule, SkipPredicate};
pub use node::InstanceNode;
pub use responder::{OnAbandoned, OnFinish, OrchestrationResponder};
pub use state::{FlowState, LaunchOutcome};
