use crate::{utils::AndConstraint, value::Inspect, Assertions};
use std::borrow::Borrow;

/// Assertions for types implementing [`Borrow`](std::borrow::Borrow)<[`bool`]>.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// // test subject to be true
/// true.should().be_true();
///
/// // or false
/// false.should().be_false();
/// ```
pub trait BooleanAssertions<T> {
    fn be_true(self) -> AndConstraint<T>;
    fn be_false(self) -> AndConstraint<T>;
}

impl<T: Borrow<bool>> Assertions<T> {
    fn be_bool(self, expected: bool) -> AndConstraint<T> {
        let actual = *self.subject().borrow();

        self.assertion()
            .for_condition(actual == expected)
            .fail_with("Expected {context:boolean} to be {0}{reason}, but found {1}.", &[expected.to_value(), actual.to_value()]);

        AndConstraint::new(self.into_inner())
    }
}

impl<T: Borrow<bool>> BooleanAssertions<T> for Assertions<T> {
    fn be_true(self) -> AndConstraint<T> {
        self.be_bool(true)
    }

    fn be_false(self) -> AndConstraint<T> {
        self.be_bool(false)
    }
}
