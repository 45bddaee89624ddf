use crate::{
    scope::{self, Assertion},
    utils::AndConstraint,
    value::{short_type_name, Inspect, Value},
    Assertions,
};
use lazy_static::lazy_static;
use regex::{escape, Regex};
use std::{
    any::Any,
    error::Error,
    future::Future,
    marker::PhantomData,
    panic::{self, AssertUnwindSafe},
};

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new("(?s)\\s+").unwrap();
}

fn normalize_string(input: &str) -> String {
    WHITESPACE.replace_all(input, " ").trim().to_string()
}

/// Whether `text` matches the glob `pattern`: `*` is any run of characters, `?` exactly one, and
/// whitespace runs compare equal to a single space. The pattern may match anywhere in `text`.
pub(crate) fn matches_pattern(text: &str, pattern: &str) -> bool {
    let reg_pattern = format!("(?s){}", escape(pattern).replace("\\*", ".*").replace("\\?", "."));
    let reg_pattern = normalize_string(&reg_pattern);

    Regex::new(&reg_pattern).map(|regex| regex.is_match(&normalize_string(text))).unwrap_or(false)
}

/// Making assertion on panic cause.
pub struct PanicCauseConstraint {
    cause: Option<Box<dyn Any + Send>>,
    assertion: Assertion,
}

impl PanicCauseConstraint {
    /// Panic cause should be a String, and matching pattern.
    pub fn with_message(self, pattern: impl AsRef<str>) -> Self {
        let pattern = pattern.as_ref();
        let message = match &self.cause {
            None => return self,
            Some(cause) => cause.downcast_ref::<String>().cloned().or_else(|| cause.downcast_ref::<&str>().map(|m| m.to_string())),
        };

        match message {
            Some(message) => {
                self.assertion
                    .clone()
                    .for_condition(matches_pattern(&message, pattern))
                    .fail_with_args("Expected {context:function} to panic with a message matching {0}{reason}, but found {1}.", || {
                        vec![pattern.to_value(), normalize_string(&message).to_value()]
                    });
            },
            None => {
                self.assertion.clone().fail_with(
                    "Expected {context:function} to panic with a message matching {0}{reason}, but the panic payload is not a string.",
                    &[pattern.to_value()],
                );
            },
        }

        self
    }

    /// The panic payload.
    ///
    /// Panics when the function did not panic, which can only be observed inside an
    /// [`AssertionScope`](crate::AssertionScope).
    pub fn which(self) -> Box<dyn Any + Send> {
        match self.cause {
            Some(cause) => cause,
            None => panic!("which() needs a function that panicked"),
        }
    }
}

/// Assertions for closures implementing [`FnOnce()`](std::ops::FnOnce).
///
/// The closure runs with its own empty scope stack, so an assertion failing inside it panics even
/// when the caller has an [`AssertionScope`](crate::AssertionScope) open.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// // test closure should panic
/// let subject = || {
///     panic!("{}", "this is the message");
/// };
/// subject.should().panic();
///
/// // with_message() normalize space characters
/// let subject = || {
///     panic!("this \t is\n the                   message");
/// };
/// subject.should().panic().with_message("this is the message");
///
/// // with_message() support glob patterns
/// let subject = || {
///     panic!("hello world");
/// };
/// subject.should().panic().with_message("h*w???d");
///
/// // if closure panic with no string message, use which() clause to test the value of Cause.
/// let subject = || {
///     std::panic::panic_any(13u32);
/// };
/// subject.should().panic().which().downcast_ref::<u32>().should().be_some().with_value(&13u32);
///
/// (|| 5).should().not_panic().and().should().be(Some(5));
/// ```
pub trait FnAssertions<R> {
    fn panic(self) -> PanicCauseConstraint;
    fn not_panic(self) -> AndConstraint<Option<R>>;
}

fn run_fn<F, R>(f: F) -> Result<R, Box<dyn Any + Send + 'static>>
where F: FnOnce() -> R {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(|p| {
        tracing::debug!(location = ?p.location(), "[FnAssertions::run_fn()] panic occurred");
    }));

    let result = scope::isolated(|| panic::catch_unwind(AssertUnwindSafe(f)));

    panic::set_hook(previous);

    result
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    cause
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| cause.downcast_ref::<&str>().map(|m| m.to_string()))
        .unwrap_or_else(|| "a non-string payload".to_owned())
}

impl<F, R> FnAssertions<R> for Assertions<F>
where F: FnOnce() -> R
{
    fn panic(self) -> PanicCauseConstraint {
        let assertion = self.assertion();

        match run_fn(self.into_inner()) {
            Ok(_) => {
                assertion
                    .clone()
                    .fail_with("Expected {context:function} to panic{reason}, but it returned normally.", &[]);
                PanicCauseConstraint { cause: None, assertion }
            },
            Err(cause) => PanicCauseConstraint {
                cause: Some(cause),
                assertion,
            },
        }
    }

    fn not_panic(self) -> AndConstraint<Option<R>> {
        let assertion = self.assertion();

        match run_fn(self.into_inner()) {
            Ok(value) => AndConstraint::new(Some(value)),
            Err(cause) => {
                assertion.fail_with("Did not expect {context:function} to panic{reason}, but it panicked with {0}.", &[
                    normalize_string(&panic_message(cause.as_ref())).to_value(),
                ]);
                AndConstraint::new(None)
            },
        }
    }
}

/// The error an action failed with, viewed as `X`.
pub struct ErrorConstraint<X> {
    error: Option<Box<dyn Error + 'static>>,
    depth: usize,
    assertion: Assertion,
    phantom: PhantomData<fn() -> X>,
}

fn layer<'a>(error: &'a (dyn Error + 'static), depth: usize) -> Option<&'a (dyn Error + 'static)> {
    let mut current = error;
    for _ in 0..depth {
        current = current.source()?;
    }
    Some(current)
}

impl<X: Error + 'static> ErrorConstraint<X> {
    fn matched(&self) -> Option<&X> {
        let error = self.error.as_deref()?;
        layer(error, self.depth)?.downcast_ref::<X>()
    }

    /// The matched error.
    ///
    /// Panics when there is none, which can only be observed inside an
    /// [`AssertionScope`](crate::AssertionScope).
    pub fn which(&self) -> &X {
        match self.matched() {
            Some(error) => error,
            None => panic!("which() needs an error of type {}", short_type_name(std::any::type_name::<X>())),
        }
    }

    /// The error's `Display` text should match the glob `pattern`.
    pub fn with_message(self, pattern: impl AsRef<str>) -> Self {
        let pattern = pattern.as_ref();
        if let Some(error) = self.matched() {
            let message = error.to_string();
            self.assertion
                .clone()
                .for_condition(matches_pattern(&message, pattern))
                .fail_with_args("Expected {context:function} to fail with a message matching {0}{reason}, but found {1}.", || {
                    vec![pattern.to_value(), message.to_value()]
                });
        }
        self
    }

    /// The matched error's `source()` should be a `Y`.
    pub fn with_inner_error<Y: Error + 'static>(self) -> ErrorConstraint<Y> {
        let source = self.matched().map(|error| error.source().map(|source| source.to_string()));

        let constraint = ErrorConstraint {
            error: self.error,
            depth: self.depth + 1,
            assertion: self.assertion,
            phantom: PhantomData,
        };

        if let Some(source) = source {
            constraint.assertion.clone().for_condition(constraint.matched().is_some()).fail_with_args(
                "Expected {context:function} to fail with inner error {0}{reason}, but found {1}.",
                || {
                    vec![
                        Value::literal(short_type_name(std::any::type_name::<Y>())),
                        Value::literal(source.unwrap_or_else(|| "no inner error".to_owned())),
                    ]
                },
            );
        }

        constraint
    }
}

fn assert_throws<T, E, X>(assertion: Assertion, result: Result<T, E>, exactly: bool) -> ErrorConstraint<X>
where
    E: Error + 'static,
    X: Error + 'static,
{
    let expected = Value::literal(short_type_name(std::any::type_name::<X>()));

    let error: Box<dyn Error + 'static> = match result {
        Ok(_) => {
            assertion
                .clone()
                .fail_with("Expected {context:function} to fail with {0}{reason}, but it succeeded.", &[expected]);
            return ErrorConstraint {
                error: None,
                depth: 0,
                assertion,
                phantom: PhantomData,
            };
        },
        Err(error) => Box::new(error),
    };

    let depth = if error.is::<X>() {
        Some(0)
    } else if !exactly && error.source().map_or(false, |source| source.is::<X>()) {
        Some(1)
    } else {
        None
    };

    let description = format!("{}: {}", short_type_name(std::any::type_name::<E>()), error);
    assertion
        .clone()
        .for_condition(depth.is_some())
        .fail_with_args("Expected {context:function} to fail with {0}{reason}, but it failed with {1}.", || {
            vec![expected.clone(), Value::literal(description.clone())]
        });

    ErrorConstraint {
        error: Some(error),
        depth: depth.unwrap_or_default(),
        assertion,
        phantom: PhantomData,
    }
}

fn assert_does_not_throw<T, E: Error>(assertion: Assertion, result: Result<T, E>) -> AndConstraint<Option<T>> {
    match result {
        Ok(value) => AndConstraint::new(Some(value)),
        Err(error) => {
            assertion.fail_with("Did not expect {context:function} to fail{reason}, but it failed with {0}.", &[Value::literal(
                format!("{}: {}", short_type_name(std::any::type_name::<E>()), error),
            )]);
            AndConstraint::new(None)
        },
    }
}

/// Assertions for actions returning a [`Result`] with an error implementing [`Error`].
///
/// `throw` accepts the error itself or its direct `source()`, so a wrapper around the interesting
/// error is unwrapped exactly once. `throw_exactly` only accepts the error itself.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("port {0} is out of range")]
/// struct PortError(u32);
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("invalid configuration")]
/// struct ConfigError(#[source] PortError);
///
/// (|| Err::<(), _>(ConfigError(PortError(70000))))
///     .should()
///     .throw::<PortError>()
///     .with_message("port * is out of range");
///
/// (|| Err::<(), _>(ConfigError(PortError(70000))))
///     .should()
///     .throw_exactly::<ConfigError>()
///     .with_inner_error::<PortError>();
///
/// (|| Ok::<_, PortError>(8080)).should().not_throw().and().should().be(Some(8080));
/// ```
pub trait FallibleFnAssertions<T> {
    fn throw<X: Error + 'static>(self) -> ErrorConstraint<X>;
    fn throw_exactly<X: Error + 'static>(self) -> ErrorConstraint<X>;
    fn not_throw(self) -> AndConstraint<Option<T>>;
}

impl<F, T, E> FallibleFnAssertions<T> for Assertions<F>
where
    F: FnOnce() -> Result<T, E>,
    E: Error + 'static,
{
    fn throw<X: Error + 'static>(self) -> ErrorConstraint<X> {
        let assertion = self.assertion();
        assert_throws(assertion, (self.into_inner())(), false)
    }

    fn throw_exactly<X: Error + 'static>(self) -> ErrorConstraint<X> {
        let assertion = self.assertion();
        assert_throws(assertion, (self.into_inner())(), true)
    }

    fn not_throw(self) -> AndConstraint<Option<T>> {
        let assertion = self.assertion();
        assert_does_not_throw(assertion, (self.into_inner())())
    }
}

impl<Fut, T, E> Assertions<Fut>
where
    Fut: Future<Output = Result<T, E>>,
    E: Error + 'static,
{
    /// Awaits the future and asserts like [`FallibleFnAssertions::throw`].
    pub async fn throw_async<X: Error + 'static>(self) -> ErrorConstraint<X> {
        let assertion = self.assertion();
        assert_throws(assertion, self.into_inner().await, false)
    }

    pub async fn throw_exactly_async<X: Error + 'static>(self) -> ErrorConstraint<X> {
        let assertion = self.assertion();
        assert_throws(assertion, self.into_inner().await, true)
    }

    pub async fn not_throw_async(self) -> AndConstraint<Option<T>> {
        let assertion = self.assertion();
        assert_does_not_throw(assertion, self.into_inner().await)
    }
}

#[cfg(test)]
mod tests {
    use super::matches_pattern;
    use crate::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("value cannot be null (parameter '{0}')")]
    struct ArgumentNullError(&'static str);

    #[derive(Debug, Error)]
    #[error("one or more errors occurred")]
    struct AggregateError(#[source] ArgumentNullError);

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] AggregateError);

    #[test]
    fn should_panic_with_message_as_string_matches_pattern() {
        (|| {
            panic!("{}", String::from("this is the message"));
        })
        .should()
        .panic()
        .with_message("mes*ge");
    }

    #[test]
    fn should_panic_with_message_as_str_matches_pattern() {
        (|| {
            panic!("this is the message");
        })
        .should()
        .panic()
        .with_message("mes*ge");
    }

    #[test]
    fn pattern_match_will_normalize_spaces() {
        (|| {
            panic!("this \nis  the \t message");
        })
        .should()
        .panic()
        .with_message("this is the message ");
    }

    #[test]
    fn pattern_treats_regex_characters_literally() {
        matches_pattern("Expected {1, 2} (index 3).", "{1, 2} (index ?).").should().be_true();
        matches_pattern("a+b", "a.b").should().be_false();
    }

    #[test]
    fn should_panic_which_assertion() {
        (|| {
            std::panic::panic_any(42u32);
        })
        .should()
        .panic()
        .which()
        .downcast_ref::<u32>()
        .should()
        .be_some()
        .with_value(&42);
    }

    #[test]
    fn returning_normally_fails_panic_assertion() {
        should_fail_with_message!((|| 1).should().panic(), "Expected function to panic, but it returned normally.");
    }

    #[test]
    fn not_panic_reports_panic_message() {
        should_fail_with_message!(
            (|| panic!("boom")).should().not_panic(),
            "Did not expect function to panic, but it panicked with \"boom\"."
        );
    }

    #[test]
    fn closure_assertions_ignore_the_callers_scope() {
        let scope = AssertionScope::new();
        (|| 1.should().be(2)).should().panic().with_message("Expected value to be 2, but found 1.");

        scope.has_failures().should().be_false();
    }

    #[test]
    fn throw_unwraps_exactly_one_layer() {
        (|| Err::<(), _>(AggregateError(ArgumentNullError("name"))))
            .should()
            .throw::<ArgumentNullError>()
            .with_message("*parameter 'name'*");

        should_fail_with_message!(
            (|| Err::<(), _>(Outer(AggregateError(ArgumentNullError("name"))))).should().throw::<ArgumentNullError>(),
            "Expected function to fail with ArgumentNullError, but it failed with Outer: outer."
        );
    }

    #[test]
    fn throw_exactly_does_not_unwrap() {
        should_fail_with_message!(
            (|| Err::<(), _>(AggregateError(ArgumentNullError("name")))).should().throw_exactly::<ArgumentNullError>(),
            "Expected function to fail with ArgumentNullError, but it failed with AggregateError: one or more errors occurred."
        );
    }

    #[test]
    fn inner_error_is_checked() {
        (|| Err::<(), _>(AggregateError(ArgumentNullError("name"))))
            .should()
            .throw_exactly::<AggregateError>()
            .with_inner_error::<ArgumentNullError>()
            .which()
            .0
            .should()
            .be("name");

        should_fail_with_message!(
            (|| Err::<(), _>(ArgumentNullError("name"))).should().throw::<ArgumentNullError>().with_inner_error::<AggregateError>(),
            "Expected function to fail with inner error AggregateError, but found no inner error."
        );
    }

    #[test]
    fn success_fails_throw_assertion() {
        should_fail_with_message!(
            (|| Ok::<_, ArgumentNullError>(3)).should().throw::<ArgumentNullError>(),
            "Expected function to fail with ArgumentNullError, but it succeeded."
        );
        (|| Ok::<_, ArgumentNullError>(3)).should().not_throw().and().should().be(Some(3));
    }

    #[tokio::test]
    async fn aggregate_error_from_future_is_unwrapped() {
        async { Err::<(), _>(AggregateError(ArgumentNullError("id"))) }
            .should()
            .throw_async::<ArgumentNullError>()
            .await
            .with_message("value cannot be null*");

        async { Ok::<_, ArgumentNullError>(1) }.should().not_throw_async().await;
    }
}
