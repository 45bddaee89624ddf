use super::{message::FailureMessageBuilder, Reason};
use crate::{error::AssertionError, scope, value::Value};

/// One link of a failure reporting chain, the contract every assertion reports through.
///
/// A failure is recorded in the innermost [`AssertionScope`](crate::AssertionScope). Outside any
/// scope it panics right away, as if the assertion had its own single-use scope.
///
/// ```
/// use fluent_assertions::*;
///
/// fn be_even(value: i32) {
///     Assertion::current()
///         .for_condition(value % 2 == 0)
///         .fail_with("Expected {context:number} to be even{reason}, but found {0}.", &[value.to_value()]);
/// }
///
/// be_even(4);
/// should_fail_with_message!(be_even(3), "Expected number to be even, but found 3.");
/// ```
#[derive(Clone, Debug, Default)]
pub struct Assertion {
    reason: Option<Reason>,
    identifier: Option<String>,
    context: Option<String>,
    expectation: Option<String>,
    condition: bool,
    short_circuited: bool,
}

impl Assertion {
    pub fn current() -> Self {
        Assertion::default()
    }

    pub fn because(mut self, reason: impl Into<Reason>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_reason(mut self, reason: Option<Reason>) -> Self {
        self.reason = reason;
        self
    }

    /// Names the subject when no scope label is set, usually the text captured by `should!`.
    pub fn with_identifier(mut self, identifier: Option<&str>) -> Self {
        self.identifier = identifier.map(str::to_owned);
        self
    }

    /// Names the subject regardless of scope labels, used for paths inside an object graph.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Prepends `template` to every failure template of this chain.
    pub fn with_expectation(mut self, template: impl Into<String>) -> Self {
        self.expectation = Some(template.into());
        self
    }

    pub fn for_condition(mut self, condition: bool) -> Self {
        self.condition = condition;
        self
    }

    /// Evaluates `selector` only if no earlier link of the chain failed.
    pub fn given<T>(self, selector: impl FnOnce() -> T) -> GivenSelector<T> {
        let value = if self.short_circuited { None } else { Some(selector()) };
        GivenSelector { assertion: self, value }
    }

    pub fn fail_with(self, template: &str, args: &[Value]) -> Continuation {
        self.fail_with_args(template, || args.to_vec())
    }

    /// Like [`Assertion::fail_with`], but the arguments are only built when the condition failed.
    pub fn fail_with_args(self, template: &str, args: impl FnOnce() -> Vec<Value>) -> Continuation {
        if self.short_circuited || self.condition {
            let succeeded = !self.short_circuited;
            return Continuation { assertion: self, succeeded };
        }

        let template = match &self.expectation {
            Some(prefix) => format!("{}{}", prefix, template),
            None => template.to_owned(),
        };
        let message = FailureMessageBuilder::for_scope(None, self.context.clone(), self.identifier.clone(), self.reason.clone())
            .build(&template, &args());

        if !scope::record_failure(message.clone()) {
            panic!("{}", AssertionError::new(vec![message], vec![]));
        }

        Continuation {
            assertion: self,
            succeeded: false,
        }
    }
}

/// Result of [`Assertion::fail_with`], allows chaining dependent checks.
#[derive(Debug)]
pub struct Continuation {
    assertion: Assertion,
    succeeded: bool,
}

impl Continuation {
    /// Starts the next link. It is short-circuited when this one failed.
    pub fn then(self) -> Assertion {
        Assertion {
            condition: false,
            short_circuited: !self.succeeded,
            ..self.assertion
        }
    }

    pub fn succeeded(&self) -> bool {
        self.succeeded
    }
}

/// A chain link carrying a value selected from the subject.
pub struct GivenSelector<T> {
    assertion: Assertion,
    value: Option<T>,
}

impl<T> GivenSelector<T> {
    pub fn for_condition(mut self, predicate: impl FnOnce(&T) -> bool) -> Self {
        if let Some(value) = &self.value {
            self.assertion.condition = predicate(value);
        }
        self
    }

    pub fn fail_with(self, template: &str, args: impl FnOnce(&T) -> Vec<Value>) -> Continuation {
        let GivenSelector { assertion, value } = self;
        match value {
            Some(value) => assertion.fail_with_args(template, || args(&value)),
            None => Continuation {
                assertion,
                succeeded: false,
            },
        }
    }
}
