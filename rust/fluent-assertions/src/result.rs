use crate::{scope::Assertion, utils::AndConstraint, value::Value, Assertions};
use std::{borrow::Borrow, fmt::Debug, marker::PhantomData};

pub struct IsOk;
pub struct IsErr;

#[allow(dead_code)]
pub struct ResultConstraint<T, E, R: Borrow<Result<T, E>>, OE> {
    subject: R,
    assertion: Assertion,
    phantom_t: PhantomData<fn() -> T>,
    phantom_r: PhantomData<fn() -> E>,
    ok_or_err: OE,
}

impl<T, E, R: Borrow<Result<T, E>>, OE> ResultConstraint<T, E, R, OE> {
    fn new(subject: R, assertion: Assertion, ok_or_err: OE) -> Self {
        ResultConstraint {
            subject,
            assertion,
            phantom_t: PhantomData,
            phantom_r: PhantomData,
            ok_or_err,
        }
    }

    pub fn and(self) -> R {
        self.subject
    }

    fn check_value<V: PartialEq + Debug + ?Sized>(&self, actual: Option<&V>, expected: &V, template: &str) {
        if let Some(actual) = actual {
            self.assertion
                .clone()
                .for_condition(actual.eq(expected))
                .fail_with_args(template, || vec![Value::debug(expected), Value::debug(actual)]);
        }
    }

    fn check_predicate<V: ?Sized>(&self, actual: Option<&V>, pred: impl FnOnce(&V) -> bool, template: &str) {
        if let Some(actual) = actual {
            self.assertion.clone().for_condition(pred(actual)).fail_with(template, &[]);
        }
    }
}

impl<T: PartialEq + Debug, E, R: Borrow<Result<T, E>>> ResultConstraint<T, E, R, IsOk> {
    pub fn with_value(self, value: impl Borrow<T>) -> AndConstraint<R> {
        self.check_value(
            self.subject.borrow().as_ref().ok(),
            value.borrow(),
            "Expected {context:result} to be Ok({0}){reason}, but found Ok({1}).",
        );

        AndConstraint::new(self.subject)
    }
}

impl<T, E, R: Borrow<Result<T, E>>> ResultConstraint<T, E, R, IsOk> {
    pub fn with_value_that(self, pred: impl FnOnce(&T) -> bool) -> AndConstraint<R> {
        self.check_predicate(
            self.subject.borrow().as_ref().ok(),
            pred,
            "Expected {context:result} to be Ok with a value matching the predicate{reason}, but it does not.",
        );

        AndConstraint::new(self.subject)
    }
}

impl<T, E> ResultConstraint<T, E, Result<T, E>, IsOk> {
    /// The `Ok` value.
    ///
    /// Panics on `Err`, which can only be observed inside an [`AssertionScope`](crate::AssertionScope).
    pub fn which_value(self) -> T {
        match self.subject {
            Ok(value) => value,
            Err(_) => panic!("which_value() needs a Result::Ok"),
        }
    }
}

impl<'r, T, E> ResultConstraint<T, E, &'r Result<T, E>, IsOk> {
    pub fn which_value(self) -> &'r T {
        match self.subject {
            Ok(value) => value,
            Err(_) => panic!("which_value() needs a Result::Ok"),
        }
    }
}

impl<T, E: PartialEq + Debug, R: Borrow<Result<T, E>>> ResultConstraint<T, E, R, IsErr> {
    pub fn with_value(self, value: impl Borrow<E>) -> AndConstraint<R> {
        self.check_value(
            self.subject.borrow().as_ref().err(),
            value.borrow(),
            "Expected {context:result} to be Err({0}){reason}, but found Err({1}).",
        );

        AndConstraint::new(self.subject)
    }
}

impl<T, E, R: Borrow<Result<T, E>>> ResultConstraint<T, E, R, IsErr> {
    pub fn with_value_that(self, pred: impl FnOnce(&E) -> bool) -> AndConstraint<R> {
        self.check_predicate(
            self.subject.borrow().as_ref().err(),
            pred,
            "Expected {context:result} to be Err with a value matching the predicate{reason}, but it does not.",
        );

        AndConstraint::new(self.subject)
    }
}

impl<T, E> ResultConstraint<T, E, Result<T, E>, IsErr> {
    /// The `Err` value.
    ///
    /// Panics on `Ok`, which can only be observed inside an [`AssertionScope`](crate::AssertionScope).
    pub fn which_value(self) -> E {
        match self.subject {
            Err(error) => error,
            Ok(_) => panic!("which_value() needs a Result::Err"),
        }
    }
}

impl<'r, T, E> ResultConstraint<T, E, &'r Result<T, E>, IsErr> {
    pub fn which_value(self) -> &'r E {
        match self.subject {
            Err(error) => error,
            Ok(_) => panic!("which_value() needs a Result::Err"),
        }
    }
}

/// Assertions for types implementing [`Borrow`](std::borrow::Borrow)<[`Result`]>.
///
/// `be_ok` and `be_err` do not print the value they found, so neither side needs to implement
/// [`Debug`].
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// // test subject to be Ok(_)
/// Result::Ok::<usize, usize>(1).should().be_ok();
///
/// // use with_value_that() clause to test inner value
/// Result::Ok::<usize, usize>(1).should().be_ok().with_value_that(|v| v < &3);
///
/// // or use with_value() clause if T implementing PartialEq
/// Result::Ok::<bool, ()>(true).should().be_ok().with_value(true);
///
/// // can also use which_value() clause to start a new test statement for inner value
/// Result::Ok::<String, ()>(String::from("Hello"))
///     .should()
///     .be_ok()
///     .which_value()
///     .should()
///     .start_with("H");
///
/// // if subject is reference, which_value() returns reference as well
/// Result::Ok::<u32, ()>(14).to_ref().should().be_ok().which_value().should().be(&14);
///
/// // same syntax for Err as well
/// Result::Err::<usize, usize>(1).should().be_err();
/// Result::Err::<usize, usize>(3).should().be_err().with_value_that(|v| v > &2);
/// Result::Err::<(), bool>(true).should().be_err().with_value(true);
/// Result::Err::<(), String>(String::from("Hello"))
///     .should()
///     .be_err()
///     .which_value()
///     .should()
///     .start_with("H");
/// Result::Err::<(), u32>(14).to_ref().should().be_err().which_value().should().be(&14);
/// ```
pub trait ResultAssertions<T, E, I: Borrow<Result<T, E>>> {
    fn be_ok(self) -> ResultConstraint<T, E, I, IsOk>;
    fn be_err(self) -> ResultConstraint<T, E, I, IsErr>;
}

impl<T, E, R: Borrow<Result<T, E>>> ResultAssertions<T, E, R> for Assertions<R> {
    fn be_ok(self) -> ResultConstraint<T, E, R, IsOk> {
        let assertion = self.assertion();
        assertion
            .clone()
            .for_condition(self.subject().borrow().is_ok())
            .fail_with("Expected {context:result} to be Ok{reason}, but found an Err.", &[]);

        ResultConstraint::new(self.into_inner(), assertion, IsOk)
    }

    fn be_err(self) -> ResultConstraint<T, E, R, IsErr> {
        let assertion = self.assertion();
        assertion
            .clone()
            .for_condition(self.subject().borrow().is_err())
            .fail_with("Expected {context:result} to be Err{reason}, but found an Ok.", &[]);

        ResultConstraint::new(self.into_inner(), assertion, IsErr)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn parsed(text: &str) -> Result<u32, String> {
        text.parse::<u32>().map_err(|e| e.to_string())
    }

    #[test]
    fn ok_variant_passes_and_yields_its_value() {
        parsed("42").should().be_ok().with_value(42u32);
        parsed("42").should().be_ok().with_value_that(|v| *v > 40);
        parsed("42").should().be_ok().which_value().should().be(42);

        let borrowed = parsed("7");
        (&borrowed).should().be_ok().which_value().should().be(&7);
    }

    #[test]
    fn err_variant_passes_and_yields_its_error() {
        parsed("x").should().be_err().with_value("invalid digit found in string".to_owned());
        parsed("x").should().be_err().with_value_that(|e| e.contains("digit"));

        let borrowed = parsed("");
        (&borrowed).should().be_err().which_value().should().start_with("cannot parse");
    }

    #[test]
    fn wrong_variant_is_reported_with_the_identifier() {
        let result = parsed("x");
        should_fail_with_message!(should!(result).be_ok(), "Expected result to be Ok, but found an Err.");

        let result = parsed("1");
        should_fail_with_message!(
            should!(result).because("the input is garbage").be_err(),
            "Expected result to be Err because the input is garbage, but found an Ok."
        );
    }

    #[test]
    fn unexpected_inner_values_are_reported() {
        should_fail_with_message!(parsed("5").should().be_ok().with_value(6u32), "Expected result to be Ok(6), but found Ok(5).");
        should_fail_with_message!(
            Err::<(), _>("Hello").should().be_err().with_value(&"world"),
            "Expected result to be Err(\"world\"), but found Err(\"Hello\")."
        );
        should_fail_with_message!(
            parsed("5").should().be_ok().with_value_that(|v| v % 2 == 0),
            "Expected result to be Ok with a value matching the predicate, but it does not."
        );
        should_fail_with_message!(
            parsed("x").should().be_err().with_value_that(String::is_empty),
            "Expected result to be Err with a value matching the predicate, but it does not."
        );
    }

    #[test]
    fn failures_inside_a_scope_do_not_stop_the_chain() {
        let scope = AssertionScope::new();
        parsed("x").should().be_ok().with_value(1u32);

        scope.discard().should().equal(&vec!["Expected result to be Ok, but found an Err.".to_owned()]);
    }

    #[test]
    fn values_without_debug_can_be_checked() {
        struct Opaque;

        Ok::<_, Opaque>(1).should().be_ok();
        Err::<Opaque, _>("gone").should().be_err().with_value("gone");
    }
}
