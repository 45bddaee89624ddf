use crate::{formatting::Formatter, scope, value::Value};
use std::fmt::Display;

/// Replaces `{token}` occurrences for which `resolve` returns text. `{{` and `}}` are escapes for
/// single braces, any other brace is kept as written.
fn substitute(template: &str, resolve: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find(&['{', '}'][..]) {
        result.push_str(&rest[..start]);
        let tail = &rest[start..];

        if tail.starts_with("{{") || tail.starts_with("}}") {
            result.push_str(&tail[..1]);
            rest = &tail[2..];
        } else if tail.starts_with('}') {
            result.push('}');
            rest = &tail[1..];
        } else {
            match tail[1..].find('}') {
                Some(end) => {
                    let token = &tail[1..=end];
                    match resolve(token) {
                        Some(text) => result.push_str(&text),
                        None => result.push_str(&tail[..end + 2]),
                    }
                    rest = &tail[end + 2..];
                },
                None => {
                    result.push_str(tail);
                    rest = "";
                },
            }
        }
    }
    result.push_str(rest);

    result
}

/// The "because" clause of a failure message.
///
/// Rendering is deferred until a failure is actually reported. With arguments, `{0}`, `{1}`, ...
/// are replaced and `{{`/`}}` collapse to single braces. Braces that are not placeholders render as
/// written, so user text can never break the message.
///
/// ```
/// use fluent_assertions::*;
///
/// Reason::new("totals must match").render().should().be("because totals must match".to_owned());
/// Reason::format("we want {0} in {set}", ["x"]).render().should().be("because we want x in {set}".to_owned());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reason {
    template: String,
    args: Vec<String>,
}

impl Reason {
    pub fn new(template: impl Into<String>) -> Self {
        Reason {
            template: template.into(),
            args: Vec::new(),
        }
    }

    pub fn format<I>(template: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Display,
    {
        Reason {
            template: template.into(),
            args: args.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    pub fn render(&self) -> String {
        let text = if self.args.is_empty() {
            self.template.clone()
        } else {
            substitute(&self.template, |token| token.parse::<usize>().ok().and_then(|i| self.args.get(i).cloned()))
        };

        let text = text.trim();
        if text.is_empty() {
            String::new()
        } else if text.starts_with("because ") {
            text.to_owned()
        } else {
            format!("because {}", text)
        }
    }
}

impl From<&str> for Reason {
    fn from(template: &str) -> Self {
        Reason::new(template)
    }
}

impl From<String> for Reason {
    fn from(template: String) -> Self {
        Reason::new(template)
    }
}

/// Turns a failure template into the final message.
///
/// `{reason}` becomes ` because ...` or nothing, `{context:fallback}` the most specific description
/// available, `{N}` the formatted N-th argument.
pub(crate) struct FailureMessageBuilder {
    context: Option<String>,
    label: Option<String>,
    identifier: Option<String>,
    reason: Option<Reason>,
}

impl FailureMessageBuilder {
    /// Collects the label and reason visible from the scope `scope`, or from the innermost one.
    pub(crate) fn for_scope(
        scope: Option<u64>,
        context: Option<String>,
        identifier: Option<String>,
        reason: Option<Reason>,
    ) -> Self {
        let environment = scope::environment(scope);
        let (provider, scope_reason) = match environment {
            Some(environment) => (environment.context, environment.reason),
            None => (None, None),
        };

        FailureMessageBuilder {
            context,
            label: provider.map(|p| p()),
            identifier,
            reason: reason.or(scope_reason),
        }
    }

    pub(crate) fn build(&self, template: &str, args: &[Value]) -> String {
        let message = substitute(template, |token| self.resolve(token, args));

        match &self.label {
            Some(label) if self.context.is_none() && !template.contains("{context") => format!("{}: {}", label, message),
            _ => message,
        }
    }

    fn resolve(&self, token: &str, args: &[Value]) -> Option<String> {
        if token == "reason" {
            let reason = self.reason.as_ref().map(Reason::render).unwrap_or_default();
            return Some(if reason.is_empty() { reason } else { format!(" {}", reason) });
        }

        if token == "context" || token.starts_with("context:") {
            let fallback = token.strip_prefix("context:").unwrap_or("object");
            let context = self.context.as_ref().or(self.label.as_ref()).or(self.identifier.as_ref());
            return Some(context.cloned().unwrap_or_else(|| fallback.to_owned()));
        }

        let index = token.parse::<usize>().ok()?;
        args.get(index).map(Formatter::to_string)
    }
}
