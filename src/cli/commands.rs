//! CLI command implementations

use super::output::{OutputEvent, OutputHandler};
use super::session::{Session, SessionOutcome};
use crate::blueprint::{base_context, build_workflow, parse_launch_args};
use crate::config::{FlowcurrentConfig, WorkflowConfig, find_workflow, load_workflow, read_workflow_file};
use anyhow::{Context, Result};
use std::io::BufRead;
use std::path::Path;
use std::rc::Rc;

/// Run a workflow interactively, reading answers from `input`
///
/// Returns the process exit code: 0 when the workflow finished, 1 otherwise.
pub fn run_workflow<R: BufRead>(
    workflow_name: &str,
    args: &[String],
    project_dir: Option<&Path>,
    config: &FlowcurrentConfig,
    handler: Rc<dyn OutputHandler>,
    input: R,
) -> Result<i32> {
    let blueprint = load_workflow(workflow_name, project_dir)
        .with_context(|| format!("failed to load workflow '{}'", workflow_name))?;

    let launch_args = parse_launch_args(args);
    let workflow = build_workflow(&blueprint, &config.defaults, &launch_args)
        .with_context(|| format!("failed to assemble workflow '{}'", blueprint.name))?;
    let base = base_context(&blueprint, &launch_args);

    tracing::info!(workflow = %blueprint.name, steps = workflow.len(), "Starting workflow");

    let session = Session::new(
        blueprint.name.clone(),
        workflow,
        launch_args,
        &base,
        handler.clone(),
        config.defaults.animated(),
    );
    let outcome = session.run(input)?;

    match outcome {
        SessionOutcome::Finished(result) => {
            let output = result.map(|value| match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
            handler.result(true, output.as_deref());
            Ok(0)
        }
        SessionOutcome::Abandoned => {
            handler.result(false, None);
            Ok(1)
        }
        SessionOutcome::Interrupted => {
            handler.emit(OutputEvent::Error {
                message: "input ended before the workflow finished".into(),
            });
            handler.result(false, None);
            Ok(1)
        }
    }
}

/// Validate a workflow, listing every problem
pub fn validate_workflow(
    workflow_name: &str,
    project_dir: Option<&Path>,
    handler: &dyn OutputHandler,
) -> i32 {
    let parsed = find_workflow(workflow_name, project_dir).and_then(|path| read_workflow_file(&path));
    let wf = match parsed {
        Ok(wf) => wf,
        Err(e) => {
            handler.emit(OutputEvent::Error {
                message: format!("Failed to load workflow: {:#}", e),
            });
            return 1;
        }
    };

    match wf.validate() {
        Ok(()) => {
            handler.emit(OutputEvent::Info {
                message: format!("✓ Workflow '{}' is valid ({} steps)", wf.name, wf.steps.len()),
            });
            0
        }
        Err(errors) => {
            handler.emit(OutputEvent::Info {
                message: format!("✗ Workflow '{}' has {} error(s):", wf.name, errors.len()),
            });
            for err in &errors {
                handler.emit(OutputEvent::Info {
                    message: format!("  - {}", err),
                });
            }
            1
        }
    }
}

/// Describe a workflow's steps with defaults applied
pub fn show_workflow(
    workflow_name: &str,
    project_dir: Option<&Path>,
    config: &FlowcurrentConfig,
    handler: &dyn OutputHandler,
) -> Result<i32> {
    let blueprint = load_workflow(workflow_name, project_dir)?;
    for line in describe(&blueprint, config) {
        handler.emit(OutputEvent::Info { message: line });
    }
    Ok(0)
}

fn describe(blueprint: &WorkflowConfig, config: &FlowcurrentConfig) -> Vec<String> {
    let defaults = &config.defaults;
    let mut lines = vec![format!("{} ({} steps)", blueprint.name, blueprint.steps.len())];
    if !blueprint.description.is_empty() {
        lines.push(format!("  {}", blueprint.description));
    }

    for (i, step) in blueprint.steps.iter().enumerate() {
        lines.push(format!(
            "{}. {} [{}, {}]",
            i + 1,
            step.name,
            step.launch_style.unwrap_or(defaults.launch_style()),
            step.persistence.unwrap_or(defaults.persistence()),
        ));
        if let Some(skip_if) = &step.skip_if {
            lines.push(format!("   skip if: {}", skip_if));
        }
    }
    lines
}
