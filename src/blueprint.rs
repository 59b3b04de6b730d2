//! Workflows assembled from blueprint files
//!
//! Every configured step becomes a [`PromptStep`]: it shows a rendered prompt
//! and proceeds with the answer (or its own input, see [`Forward`]).

use crate::config::{Defaults, Forward, StepConfig, WorkflowConfig};
use crate::template::{TemplateContext, TemplateEngine, TemplateError, should_skip_step};
use crate::workflow::{
    AssemblyError, FlowMetadata, FlowRepresentable, PassedArgs, Workflow, WorkflowError,
    WorkflowPointer,
};

/// A step that asks one question
pub struct PromptStep {
    input: PassedArgs,
    prompt: String,
    forward: Forward,
    workflow: WorkflowPointer,
}

impl FlowRepresentable for PromptStep {
    type Input = PassedArgs;
    type Output = PassedArgs;

    fn new(input: PassedArgs) -> Self {
        Self {
            input,
            prompt: String::new(),
            forward: Forward::default(),
            workflow: WorkflowPointer::default(),
        }
    }

    fn workflow_pointer(&self) -> &WorkflowPointer {
        &self.workflow
    }

    fn workflow_pointer_mut(&mut self) -> &mut WorkflowPointer {
        &mut self.workflow
    }
}

impl PromptStep {
    fn configured(input: PassedArgs, step: &StepConfig) -> Self {
        Self {
            prompt: step.prompt.clone(),
            forward: step.forward,
            ..Self::new(input)
        }
    }

    pub fn input(&self) -> &PassedArgs {
        &self.input
    }

    pub fn forward(&self) -> Forward {
        self.forward
    }

    /// Render the prompt with this step's input as `args`
    pub fn render_prompt(
        &self,
        engine: &TemplateEngine,
        base: &TemplateContext,
    ) -> Result<String, TemplateError> {
        let mut ctx = base.clone();
        ctx.set_args(&self.input);
        engine.render_trimmed(&self.prompt, &ctx)
    }

    /// What proceeding with `answer` passes on
    pub fn output_for(&self, answer: &str) -> PassedArgs {
        match self.forward {
            Forward::Args => parse_answer(answer),
            Forward::Input => self.input.clone(),
        }
    }

    pub fn answer(&self, answer: &str) -> Result<(), WorkflowError> {
        self.proceed_in_workflow(self.output_for(answer))
    }
}

/// JSON objects and arrays are kept structured; anything else is text
pub fn parse_answer(answer: &str) -> PassedArgs {
    let trimmed = answer.trim();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            return PassedArgs::args(value);
        }
    }
    PassedArgs::args(serde_json::Value::String(answer.to_string()))
}

/// Launch args from the command line
///
/// Nothing gives no args; `key=value` pairs give a JSON object; anything
/// else is joined into one string.
pub fn parse_launch_args(args: &[String]) -> PassedArgs {
    if args.is_empty() {
        return PassedArgs::None;
    }

    let pairs: Option<serde_json::Map<String, serde_json::Value>> = args
        .iter()
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), serde_json::Value::String(v.to_string())))
        })
        .collect();

    match pairs {
        Some(map) => PassedArgs::args(serde_json::Value::Object(map)),
        None => parse_answer(&args.join(" ")),
    }
}

/// Context shared by every prompt and skip expression of one run
pub fn base_context(config: &WorkflowConfig, launch_args: &PassedArgs) -> TemplateContext {
    let mut ctx = TemplateContext::new();
    ctx.set_workflow(&config.name);
    ctx.set_launch_args(launch_args);
    ctx
}

fn step_metadata(step: &StepConfig, defaults: &Defaults, base: &TemplateContext) -> FlowMetadata {
    let config = step.clone();
    let mut metadata = FlowMetadata::from_factory(step.name.clone(), move |args| {
        Ok(PromptStep::configured(args.clone(), &config))
    })
    .with_launch_style(step.launch_style.unwrap_or(defaults.launch_style()))
    .with_persistence(step.persistence.unwrap_or(defaults.persistence()));

    if let Some(expr) = step.skip_if.clone().filter(|e| !e.trim().is_empty()) {
        let mut ctx = base.clone();
        ctx.set_step(&step.name);
        let name = step.name.clone();
        metadata = metadata.skip_when(move |args| {
            let mut ctx = ctx.clone();
            ctx.set_args(args);
            should_skip_step(Some(&expr), &ctx).unwrap_or_else(|e| {
                tracing::warn!(step = %name, error = %e, "skip_if failed, presenting step");
                false
            })
        });
    }

    metadata
}

/// Turn a blueprint into a workflow ready to launch with `launch_args`
pub fn build_workflow(
    config: &WorkflowConfig,
    defaults: &Defaults,
    launch_args: &PassedArgs,
) -> Result<Workflow, AssemblyError> {
    let base = base_context(config, launch_args);
    let workflow = Workflow::new();
    for step in &config.steps {
        workflow.append(step_metadata(step, defaults, &base))?;
    }
    tracing::debug!(workflow = %config.name, steps = workflow.len(), "Built workflow from blueprint");
    Ok(workflow)
}
