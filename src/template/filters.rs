//! Filters available to prompts and skip expressions

use minijinja::value::Value;
use minijinja::{Error, ErrorKind, State};

pub fn register_filters(env: &mut minijinja::Environment) {
    env.add_filter("json", filter_json);
    env.add_filter("first", filter_first);
    env.add_filter("last", filter_last);
    env.add_filter("default", filter_default);
    env.add_filter("trim", filter_trim);
    env.add_filter("lines", filter_lines);
    env.add_filter("words", filter_words);
    env.add_filter("strftime", filter_strftime);
}

fn invalid(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::InvalidOperation, message.into())
}

fn is_empty(value: &Value) -> bool {
    value.is_undefined() || value.is_none() || value.as_str().is_some_and(str::is_empty)
}

/// Compact JSON rendering of any value
fn filter_json(_state: &State, value: Value) -> Result<Value, Error> {
    serde_json::to_string(&value)
        .map(Value::from)
        .map_err(|e| invalid(format!("cannot serialize to JSON: {}", e)))
}

/// First item of a sequence, or first character of a string
fn filter_first(_state: &State, value: Value) -> Result<Value, Error> {
    if is_empty(&value) {
        return Ok(Value::from(()));
    }
    if let Some(s) = value.as_str() {
        return Ok(s.chars().next().map(|c| Value::from(c.to_string())).unwrap_or_default());
    }
    let mut iter = value
        .try_iter()
        .map_err(|_| invalid("first expects a sequence or string"))?;
    Ok(iter.next().unwrap_or_default())
}

/// Last item of a sequence, or last character of a string
fn filter_last(_state: &State, value: Value) -> Result<Value, Error> {
    if is_empty(&value) {
        return Ok(Value::from(()));
    }
    if let Some(s) = value.as_str() {
        return Ok(s.chars().last().map(|c| Value::from(c.to_string())).unwrap_or_default());
    }
    let iter = value
        .try_iter()
        .map_err(|_| invalid("last expects a sequence or string"))?;
    Ok(iter.last().unwrap_or_default())
}

/// `fallback` when the value is missing, none or an empty string
fn filter_default(_state: &State, value: Value, fallback: Value) -> Result<Value, Error> {
    Ok(if is_empty(&value) { fallback } else { value })
}

fn filter_trim(_state: &State, value: Value) -> Result<Value, Error> {
    Ok(Value::from(value.to_string().trim()))
}

/// Non-blank lines of a string
fn filter_lines(_state: &State, value: Value) -> Result<Value, Error> {
    let text = value.to_string();
    Ok(Value::from_iter(
        text.lines()
            .map(str::trim_end)
            .filter(|line| !line.trim().is_empty())
            .map(Value::from),
    ))
}

/// Whitespace-separated words of a string
fn filter_words(_state: &State, value: Value) -> Result<Value, Error> {
    let text = value.to_string();
    Ok(Value::from_iter(text.split_whitespace().map(Value::from)))
}

/// Format `"now"` or an RFC 3339 timestamp
///
/// `{{ "now" | strftime("%Y-%m-%d") }}`
fn filter_strftime(_state: &State, value: Value, format: Value) -> Result<Value, Error> {
    let format = format
        .as_str()
        .ok_or_else(|| invalid("strftime expects a format string"))?;
    let input = value
        .as_str()
        .ok_or_else(|| invalid("strftime expects \"now\" or an RFC 3339 timestamp"))?;

    let datetime = if input == "now" {
        chrono::Utc::now()
    } else {
        chrono::DateTime::parse_from_rfc3339(input)
            .map_err(|e| invalid(format!("cannot parse timestamp '{}': {}", input, e)))?
            .with_timezone(&chrono::Utc)
    };

    Ok(Value::from(datetime.format(format).to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::{Environment, context};

    fn render(template: &str, ctx: Value) -> String {
        let mut env = Environment::new();
        register_filters(&mut env);
        env.render_str(template, ctx).unwrap()
    }

    #[test]
    fn test_json() {
        let out = render(
            "{{ value | json }}",
            context! { value => serde_json::json!({"email": "a@b.c"}) },
        );
        assert_eq!(out, r#"{"email":"a@b.c"}"#);
    }

    #[test]
    fn test_first_and_last() {
        let ctx = context! { items => vec!["a", "b", "c"], word => "hello" };
        assert_eq!(render("{{ items | first }}{{ items | last }}", ctx.clone()), "ac");
        assert_eq!(render("{{ word | first }}{{ word | last }}", ctx), "ho");
    }

    #[test]
    fn test_default_replaces_empty() {
        let ctx = context! { blank => "", set => "x" };
        assert_eq!(
            render("{{ blank | default('none given') }}|{{ set | default('y') }}", ctx),
            "none given|x"
        );
    }

    #[test]
    fn test_lines_skips_blank() {
        let out = render(
            "{{ text | lines | length }}",
            context! { text => "one\n\n  \ntwo\n" },
        );
        assert_eq!(out, "2");
    }

    #[test]
    fn test_words() {
        let out = render(
            "{{ text | words | last }}",
            context! { text => "  skip  this   step " },
        );
        assert_eq!(out, "step");
    }

    #[test]
    fn test_strftime_rfc3339() {
        let out = render(
            "{{ ts | strftime('%Y/%m/%d') }}",
            context! { ts => "2024-03-05T10:00:00Z" },
        );
        assert_eq!(out, "2024/03/05");
    }

    #[test]
    fn test_strftime_rejects_garbage() {
        let mut env = Environment::new();
        register_filters(&mut env);
        let result = env.render_str("{{ 'soon' | strftime('%Y') }}", context! {});
        assert!(result.is_err());
    }
}
