//! Variables visible to prompts and skip expressions

use crate::workflow::PassedArgs;
use minijinja::value::{Enumerator, Object, Value};
use std::sync::Arc;

const KNOWN: &[&str] = &["args", "launch_args", "step", "workflow"];

/// Snapshot of a run, rendered as `args`, `launch_args`, `step`, `workflow`
///
/// Payloads that have no JSON form show up as the string `<type name>`.
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    pub args: serde_json::Value,
    pub launch_args: serde_json::Value,
    pub step: Option<String>,
    pub workflow: Option<String>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context whose `args` is `args`
    pub fn with_args(args: &PassedArgs) -> Self {
        Self {
            args: args_to_json(args),
            ..Default::default()
        }
    }

    pub fn set_args(&mut self, args: &PassedArgs) {
        self.args = args_to_json(args);
    }

    pub fn set_launch_args(&mut self, args: &PassedArgs) {
        self.launch_args = args_to_json(args);
    }

    pub fn set_step(&mut self, name: impl Into<String>) {
        self.step = Some(name.into());
    }

    pub fn set_workflow(&mut self, name: impl Into<String>) {
        self.workflow = Some(name.into());
    }

    pub fn to_value(&self) -> Value {
        Value::from_object(ContextObject(self.clone()))
    }

    pub fn known_variables(&self) -> &'static [&'static str] {
        KNOWN
    }
}

fn args_to_json(args: &PassedArgs) -> serde_json::Value {
    args.to_json()
        .unwrap_or_else(|| serde_json::Value::String(format!("<{}>", args.type_name())))
}

#[derive(Debug)]
struct ContextObject(TemplateContext);

impl Object for ContextObject {
    fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
        let ctx = &self.0;
        match key.as_str()? {
            "args" => Some(Value::from_serialize(&ctx.args)),
            "launch_args" => Some(Value::from_serialize(&ctx.launch_args)),
            "step" => Some(ctx.step.clone().map(Value::from).unwrap_or(Value::from(()))),
            "workflow" => Some(
                ctx.workflow
                    .clone()
                    .map(Value::from)
                    .unwrap_or(Value::from(())),
            ),
            _ => None,
        }
    }

    fn enumerate(self: &Arc<Self>) -> Enumerator {
        Enumerator::Str(KNOWN)
    }
}
