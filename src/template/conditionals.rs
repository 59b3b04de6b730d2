//! Skip expressions such as `args == 'skip'` or `args.plan is defined`

use super::context::TemplateContext;
use super::engine::strict_environment;
use super::errors::TemplateError;

fn wrap(expr: &str) -> String {
    format!("{{% if {expr} %}}true{{% else %}}false{{% endif %}}")
}

/// Evaluate `expr` for truthiness
///
/// An empty expression is true. Undefined names are errors, so a typo
/// fails loudly instead of quietly reading as false.
pub fn evaluate_condition(expr: &str, ctx: &TemplateContext) -> Result<bool, TemplateError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Ok(true);
    }

    let source = wrap(expr);
    let env = strict_environment();
    let known = ctx.known_variables();
    let template = env
        .template_from_str(&source)
        .map_err(|e| TemplateError::expression(expr, e.to_string()))?;

    let rendered = template
        .render(ctx.to_value())
        .map_err(|e| TemplateError::from_minijinja(e, &source, known))?;

    Ok(rendered == "true")
}

/// Whether a step with this `skip_if` should be passed over
pub fn should_skip_step(
    skip_if: Option<&str>,
    ctx: &TemplateContext,
) -> Result<bool, TemplateError> {
    match skip_if.map(str::trim) {
        None | Some("") => Ok(false),
        Some(expr) => evaluate_condition(expr, ctx),
    }
}

/// Parse `expr` without evaluating it; an empty expression is fine
pub fn check_condition(expr: &str) -> Result<(), TemplateError> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Ok(());
    }

    let source = wrap(expr);
    let env = strict_environment();
    env.template_from_str(&source)
        .map(|_| ())
        .map_err(|e| TemplateError::expression(expr, e.to_string()))
}
