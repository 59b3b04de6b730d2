//! Prompt rendering

use super::context::TemplateContext;
use super::errors::TemplateError;
use super::filters;
use minijinja::{Environment, UndefinedBehavior};

/// Environment with our filters and strict undefined handling
pub(crate) fn strict_environment<'source>() -> Environment<'source> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    filters::register_filters(&mut env);
    env
}

/// Renders step prompts against a [`TemplateContext`]
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self {
            env: strict_environment(),
        }
    }

    /// Render `template`
    ///
    /// ```ignore
    /// let ctx = TemplateContext::with_args(&PassedArgs::args("ada".to_string()));
    /// assert_eq!(engine.render("Hi {{ args }}", &ctx)?, "Hi ada");
    /// ```
    pub fn render(&self, template: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
        self.env
            .render_str(template, ctx.to_value())
            .map_err(|e| TemplateError::from_minijinja(e, template, ctx.known_variables()))
    }

    pub fn render_trimmed(
        &self,
        template: &str,
        ctx: &TemplateContext,
    ) -> Result<String, TemplateError> {
        self.render(template, ctx).map(|s| s.trim().to_string())
    }

    /// Check that `template` parses
    pub fn validate(&self, template: &str) -> Result<(), TemplateError> {
        strict_environment()
            .template_from_str(template)
            .map(|_| ())
            .map_err(|e| TemplateError::syntax(e.to_string(), e.line().unwrap_or(0)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::PassedArgs;

    #[test]
    fn test_plain_text() {
        let engine = TemplateEngine::new();
        let out = engine.render("Hello, world!", &TemplateContext::new()).unwrap();
        assert_eq!(out, "Hello, world!");
    }

    #[test]
    fn test_render_args_and_step() {
        let engine = TemplateEngine::new();
        let mut ctx = TemplateContext::with_args(&PassedArgs::args("ada".to_string()));
        ctx.set_step("email");
        ctx.set_workflow("signup");

        let out = engine
            .render("[{{ workflow }}/{{ step }}] Email for {{ args }}?", &ctx)
            .unwrap();
        assert_eq!(out, "[signup/email] Email for ada?");
    }

    #[test]
    fn test_launch_args_survive() {
        let engine = TemplateEngine::new();
        let mut ctx = TemplateContext::with_args(&PassedArgs::args("later".to_string()));
        ctx.set_launch_args(&PassedArgs::args("first".to_string()));

        let out = engine.render("{{ launch_args }} -> {{ args }}", &ctx).unwrap();
        assert_eq!(out, "first -> later");
    }

    #[test]
    fn test_none_args_with_default() {
        let engine = TemplateEngine::new();
        let ctx = TemplateContext::with_args(&PassedArgs::None);
        let out = engine
            .render("Name? {{ args | default('(nothing yet)') }}", &ctx)
            .unwrap();
        assert_eq!(out, "Name? (nothing yet)");
    }

    #[test]
    fn test_render_trimmed() {
        let engine = TemplateEngine::new();
        let out = engine
            .render_trimmed("\n  Next?  \n", &TemplateContext::new())
            .unwrap();
        assert_eq!(out, "Next?");
    }

    #[test]
    fn test_undefined_is_error() {
        let engine = TemplateEngine::new();
        let err = engine
            .render("{{ stpe }}", &TemplateContext::new())
            .unwrap_err();
        assert!(err.to_string().contains("undefined variable 'stpe'"));
        assert!(err.to_string().contains("did you mean 'step'"));
    }

    #[test]
    fn test_validate() {
        let engine = TemplateEngine::new();
        assert!(engine.validate("Hi {{ args }}").is_ok());
        assert!(engine.validate("Hi {{ args ").is_err());
        assert!(engine.validate("{% if args %}x").is_err());
    }
}
