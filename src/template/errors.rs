//! Template errors with did-you-mean suggestions

use super::engine::strict_environment;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    /// A name the context does not define
    #[error("undefined variable '{name}'{}", .suggestion.as_ref().map(|s| format!(", did you mean '{}'?", s)).unwrap_or_default())]
    UndefinedVariable {
        name: String,
        suggestion: Option<String>,
    },

    #[error("syntax error on line {line}: {message}")]
    Syntax { message: String, line: usize },

    #[error("cannot evaluate '{expr}': {message}")]
    Expression { expr: String, message: String },

    #[error("template error: {0}")]
    Render(#[from] minijinja::Error),
}

impl TemplateError {
    pub fn undefined_variable(name: impl Into<String>, known: &[&str]) -> Self {
        let name = name.into();
        let root = name.split('.').next().unwrap_or(&name);
        let suggestion = suggest_correction(root, known);
        Self::UndefinedVariable { name, suggestion }
    }

    pub fn syntax(message: impl Into<String>, line: usize) -> Self {
        Self::Syntax {
            message: message.into(),
            line,
        }
    }

    pub fn expression(expr: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Expression {
            expr: expr.into(),
            message: message.into(),
        }
    }

    /// Classify a minijinja failure of `source`, pointing typos at a known name
    pub(crate) fn from_minijinja(err: minijinja::Error, source: &str, known: &[&str]) -> Self {
        match err.kind() {
            minijinja::ErrorKind::UndefinedError => {
                let name = first_unknown_name(source, known)
                    .or_else(|| undefined_name(&err.to_string()))
                    .unwrap_or_else(|| "unknown".into());
                Self::undefined_variable(name, known)
            }
            minijinja::ErrorKind::SyntaxError => {
                Self::syntax(err.to_string(), err.line().unwrap_or(0))
            }
            _ => Self::Render(err),
        }
    }
}

/// Alphabetically first top-level name in `source` that the context lacks
fn first_unknown_name(source: &str, known: &[&str]) -> Option<String> {
    let env = strict_environment();
    let template = env.template_from_str(source).ok()?;
    template
        .undeclared_variables(false)
        .into_iter()
        .filter(|name| !known.contains(&name.as_str()))
        .min()
}

/// Pull the offending name out of an undefined-value message
///
/// minijinja reports these as ``... variable is `args.emial` ``; when the
/// message has no backquoted name there is nothing to extract.
fn undefined_name(msg: &str) -> Option<String> {
    let start = msg.find('`')? + 1;
    let len = msg[start..].find('`')?;
    Some(msg[start..start + len].to_string())
}

/// Closest candidate within a few edits of `typo`
pub fn suggest_correction(typo: &str, candidates: &[&str]) -> Option<String> {
    let max_distance = (typo.len() / 2).max(2);
    candidates
        .iter()
        .map(|candidate| (levenshtein_distance(typo, candidate), candidate))
        .filter(|(distance, _)| *distance <= max_distance)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_string())
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != *cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b_chars.len()]
}
