//! Jinja-style templates for step prompts and skip expressions
//!
//! Both see the same variables:
//!
//! - `args`: what the previous step passed forward (`none` when nothing)
//! - `launch_args`: what the workflow was launched with
//! - `step`, `workflow`: names of the current step and workflow
//!
//! # Example
//!
//! ```ignore
//! use flowcurrent::template::{TemplateContext, TemplateEngine, should_skip_step};
//!
//! let ctx = TemplateContext::with_args(&PassedArgs::args("skip".to_string()));
//! assert!(should_skip_step(Some("args == 'skip'"), &ctx)?);
//! let prompt = TemplateEngine::new().render("Got {{ args }}", &ctx)?;
//! ```

mod conditionals;
mod context;
mod engine;
mod errors;
mod filters;

pub use conditionals::{check_condition, evaluate_condition, should_skip_step};
pub use context::TemplateContext;
pub use engine::TemplateEngine;
pub use errors::{TemplateError, suggest_correction};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::PassedArgs;

    #[test]
    fn test_prompt_then_skip_over_one_payload() {
        let engine = TemplateEngine::new();
        let mut ctx = TemplateContext::with_args(&PassedArgs::args(serde_json::json!({
            "email": "ada@example.com",
            "verified": true,
        })));
        ctx.set_workflow("signup");
        ctx.set_step("confirm");

        let prompt = engine
            .render("Confirm {{ args.email }} for {{ workflow }}?", &ctx)
            .unwrap();
        assert_eq!(prompt, "Confirm ada@example.com for signup?");

        assert!(should_skip_step(Some("args.verified"), &ctx).unwrap());
        assert!(!should_skip_step(Some("step == 'email'"), &ctx).unwrap());
    }

    #[test]
    fn test_error_suggestions() {
        let engine = TemplateEngine::new();
        let ctx = TemplateContext::with_args(&PassedArgs::args("x".to_string()));

        let err = engine.render("{{ workflw }}", &ctx).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("workflw") || msg.contains("undefined"));
    }
}
