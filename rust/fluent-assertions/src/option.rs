use crate::{scope::Assertion, utils::AndConstraint, value::Value, Assertions};
use std::{borrow::Borrow, cmp::PartialEq, fmt::Debug, marker::PhantomData};

pub struct SomeConstraint<T, I: Borrow<Option<T>>> {
    subject: I,
    assertion: Assertion,
    phantom: PhantomData<fn() -> T>,
}

impl<T, I: Borrow<Option<T>>> SomeConstraint<T, I> {
    pub fn and(self) -> I {
        self.subject
    }

    pub fn with_value_that(self, pred: impl FnOnce(&T) -> bool) -> AndConstraint<I> {
        if let Some(value) = self.subject.borrow() {
            self.assertion
                .clone()
                .for_condition(pred(value))
                .fail_with("Expected {context:option} to contain a value matching the predicate{reason}, but it does not.", &[]);
        }
        AndConstraint::new(self.subject)
    }
}

impl<T: PartialEq + Debug, I: Borrow<Option<T>>> SomeConstraint<T, I> {
    pub fn with_value<E: Borrow<T>>(self, value: E) -> AndConstraint<I> {
        if let Some(subject_value) = self.subject.borrow() {
            let expected = value.borrow();
            self.assertion
                .clone()
                .for_condition(subject_value.eq(expected))
                .fail_with_args("Expected {context:option} to contain {0}{reason}, but found {1}.", || {
                    vec![Value::debug(expected), Value::debug(subject_value)]
                });
        }

        AndConstraint::new(self.subject)
    }
}

impl<T> SomeConstraint<T, Option<T>> {
    /// The contained value.
    ///
    /// Panics on `None`, which can only be observed inside an [`AssertionScope`](crate::AssertionScope).
    pub fn which_value(self) -> T {
        match self.subject {
            Some(value) => value,
            None => panic!("which_value() needs an Option::Some"),
        }
    }
}

impl<'o, T> SomeConstraint<T, &'o Option<T>> {
    pub fn which_value(self) -> &'o T {
        match self.subject {
            Some(value) => value,
            None => panic!("which_value() needs an Option::Some"),
        }
    }
}

/// Assertions for types implementing [`Borrow`](std::borrow::Borrow)<[`Option`]>.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// // test option to be Some(_)
/// Some(1).should().be_some();
///
/// // use clause with_value_test() to test inner value
/// Some("Hello World").should().be_some().with_value_that(|v| v.starts_with("H"));
///
/// // or use with_value() clause, if inner value implementing PartialEq
/// Some(42).should().be_some().with_value(42);
///
/// // can also use which_value() clause to start another test statement
/// Some(String::from("World"))
///     .should()
///     .be_some()
///     .which_value()
///     .should()
///     .start_with("W");
///
/// // if subject is a reference, which_value() is also a reference
/// (&Some(3)).should().be_some().which_value().should().be(&3);
///
/// // test option to be None
/// None::<u32>.should().be_none();
/// ```
pub trait OptionAssertions<T, I: Borrow<Option<T>>> {
    fn be_some(self) -> SomeConstraint<T, I>;
    fn be_none(self) -> AndConstraint<I>;
}

impl<T, I: Borrow<Option<T>>> OptionAssertions<T, I> for Assertions<I> {
    fn be_some(self) -> SomeConstraint<T, I> {
        let assertion = self.assertion();
        assertion
            .clone()
            .for_condition(self.subject().borrow().is_some())
            .fail_with("Expected {context:option} to have a value{reason}, but found None.", &[]);

        SomeConstraint {
            subject: self.into_inner(),
            assertion,
            phantom: PhantomData,
        }
    }

    fn be_none(self) -> AndConstraint<I> {
        self.assertion()
            .for_condition(self.subject().borrow().is_none())
            .fail_with("Expected {context:option} to be None{reason}, but found a value.", &[]);

        AndConstraint::new(self.into_inner())
    }
}

#[cfg(test)]
mod tests {

    use crate::*;

    #[test]
    fn should_not_panic_if_option_is_expected_to_contain_value_and_does() {
        let option = Some("Hello");
        option.should().be_some();
    }

    #[test]
    fn should_panic_if_option_is_expected_to_contain_value_and_does_not() {
        let option: Option<&str> = None;

        should_fail_with_message!(should!(option).be_some(), "Expected option to have a value, but found None.");
    }

    #[test]
    fn should_be_able_to_unwrap_option_if_some() {
        let option = Some("Hello");
        option
            .should()
            .be_some()
            .with_value(&"Hello")
            .and()
            .should()
            .be_some()
            .with_value_that(|v| v == &"Hello")
            .and()
            .should()
            .be_some()
            .which_value()
            .should()
            .be(&"Hello");
    }

    #[test]
    fn should_be_some_works_for_ref_option() {
        let option = Some("Hello");
        (&option).should().be_some().which_value().should().be(&"Hello");
    }

    #[test]
    fn should_panic_if_be_some_with_value_expectation_fail() {
        should_fail_with_message!(
            Some("Hello").should().be_some().with_value(&"world"),
            "Expected option to contain \"world\", but found \"Hello\"."
        );

        should_fail_with_message!(
            Some("Hello").should().be_some().which_value().should().be(&"world"),
            "Expected value to be \"world\", but found \"Hello\"."
        );

        should_fail_with_message!(
            Some("Hello").should().be_some().with_value_that(|v| v == &"world"),
            "Expected option to contain a value matching the predicate, but it does not."
        );
    }

    #[test]
    fn value_checks_are_skipped_for_none_inside_a_scope() {
        let scope = AssertionScope::new();
        None::<u8>.should().be_some().with_value(3);

        scope.discard().should().be(vec!["Expected option to have a value, but found None.".to_owned()]);
    }

    #[test]
    fn should_not_panic_if_option_is_empty() {
        let option: Option<&str> = None;
        option.should().be_none();
    }

    #[test]
    fn should_panic_if_option_is_not_empty_but_was_expected_as_empty() {
        let option = Some("Hello");

        should_fail_with_message!(option.should().be_none(), "Expected option to be None, but found a value.");
    }
}
