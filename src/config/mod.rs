//! Configuration types and loading for flowcurrent

mod loader;
mod workflow;

pub use loader::{
    Defaults, FlowcurrentConfig, find_workflow, load_workflow, load_workflow_file,
    read_workflow_file, workflow_search_paths,
};
pub use workflow::{Forward, StepConfig, WorkflowConfig};
