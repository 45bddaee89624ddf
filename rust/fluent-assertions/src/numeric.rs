use crate::{utils::AndConstraint, value::Value, Assertions};
use num::Float;
use std::{borrow::Borrow, cmp::PartialOrd, fmt::Debug};

/// Assertions for types implementing [`PartialOrd`](std::cmp::PartialOrd).
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// // test subject < target value
/// 1.should().be_less_than(2);
///
/// // test subject <= target value
/// "One".should().be_less_than_or_equal_to("Two");
///
/// // test subject > target value
/// 5f32.should().be_greater_than(3f32);
///
/// // test subject >= target value
/// 33u8.should().be_greater_than_or_equal_to(33u8);
/// ```
pub trait OrderedAssertions<T>
where T: PartialOrd
{
    fn be_less_than<E: Borrow<T>>(self, other: E) -> AndConstraint<T>;
    fn be_less_than_or_equal_to<E: Borrow<T>>(self, other: E) -> AndConstraint<T>;
    fn be_greater_than<E: Borrow<T>>(self, other: E) -> AndConstraint<T>;
    fn be_greater_than_or_equal_to<E: Borrow<T>>(self, other: E) -> AndConstraint<T>;
}

impl<T> Assertions<T>
where T: PartialOrd + Debug
{
    fn compare(self, other: &T, holds: bool, relation: &str) -> AndConstraint<T> {
        self.assertion()
            .for_condition(holds)
            .fail_with_args(&format!("Expected {{context:value}} to be {} {{0}}{{reason}}, but found {{1}}.", relation), || {
                vec![Value::debug(other), Value::debug(self.subject())]
            });

        AndConstraint::new(self.into_inner())
    }
}

impl<T> OrderedAssertions<T> for Assertions<T>
where T: PartialOrd + Debug
{
    fn be_less_than<E: Borrow<T>>(self, other: E) -> AndConstraint<T> {
        let other = other.borrow();
        let holds = self.subject() < other;
        self.compare(other, holds, "less than")
    }

    fn be_less_than_or_equal_to<E: Borrow<T>>(self, other: E) -> AndConstraint<T> {
        let other = other.borrow();
        let holds = self.subject() <= other;
        self.compare(other, holds, "less than or equal to")
    }

    fn be_greater_than<E: Borrow<T>>(self, other: E) -> AndConstraint<T> {
        let other = other.borrow();
        let holds = self.subject() > other;
        self.compare(other, holds, "greater than")
    }

    fn be_greater_than_or_equal_to<E: Borrow<T>>(self, other: E) -> AndConstraint<T> {
        let other = other.borrow();
        let holds = self.subject() >= other;
        self.compare(other, holds, "greater than or equal to")
    }
}

/// Assertions for types implementing [`Float`](num::Float) trait.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// 2.0f64.should().be_close_to(2.0f64, 0.01f64);
/// ```
pub trait FloatAssertions<T: Float> {
    fn be_close_to<E: Borrow<T>, O: Borrow<T>>(self, expected: E, tolerance: O) -> AndConstraint<T>;
}

impl<T: Float + Debug> FloatAssertions<T> for Assertions<T> {
    fn be_close_to<E: Borrow<T>, O: Borrow<T>>(self, expected: E, tolerance: O) -> AndConstraint<T> {
        let subject = *self.subject();
        let expected = *expected.borrow();
        let tolerance = *tolerance.borrow();

        let difference = (subject - expected).abs();

        self.assertion()
            .for_condition(subject.is_finite() && difference <= tolerance.abs())
            .fail_with("Expected {context:value} to be close to {0} +/- {1}{reason}, but found {2}.", &[
                Value::debug(&expected),
                Value::debug(&tolerance),
                Value::debug(&subject),
            ]);

        AndConstraint::new(self.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn is_less_than_should_allow_multiple_borrow_forms() {
        1.should()
            .be_less_than(2)
            .and()
            .should()
            .be_less_than(&mut 2)
            .and()
            .should()
            .be_less_than(&2);
    }

    #[test]
    fn should_panic_if_value_is_greater_than_expected() {
        should_fail_with_message!(3.should().be_less_than(2), "Expected value to be less than 2, but found 3.");
    }

    #[test]
    fn is_less_than_or_equal_to_should_allow_multiple_borrow_forms() {
        2.should()
            .be_less_than_or_equal_to(2)
            .and()
            .should()
            .be_less_than_or_equal_to(&mut 2)
            .and()
            .should()
            .be_less_than_or_equal_to(&2);
    }

    #[test]
    fn should_panic_if_value_is_greater_than_or_not_equal_to_expected() {
        let count = 3;
        should_fail_with_message!(
            should!(count).because("only {0} slots exist").be_less_than_or_equal_to(2),
            "Expected count to be less than or equal to 2 because only {0} slots exist, but found 3."
        );
    }

    #[test]
    fn is_greater_than_should_allow_multiple_borrow_forms() {
        3.should()
            .be_greater_than(2)
            .and()
            .should()
            .be_greater_than(&mut 2)
            .and()
            .should()
            .be_greater_than(&2);
    }

    #[test]
    fn should_panic_if_value_is_less_than_expected() {
        should_fail_with_message!(2.should().be_greater_than(3), "Expected value to be greater than 3, but found 2.");
    }

    #[test]
    fn is_greater_than_or_equal_to_should_allow_multiple_borrow_forms() {
        3.should()
            .be_greater_than_or_equal_to(3)
            .and()
            .should()
            .be_greater_than_or_equal_to(&mut 3)
            .and()
            .should()
            .be_greater_than_or_equal_to(&3);
    }

    #[test]
    fn should_panic_if_value_is_less_than_or_not_equal_to_expected() {
        should_fail_with_message!(
            2.should().be_greater_than_or_equal_to(3),
            "Expected value to be greater than or equal to 3, but found 2."
        );
    }

    #[test]
    fn is_close_to_should_allow_multiple_borrow_forms() {
        2.0f64
            .should()
            .be_close_to(2.0f64, 0.01f64)
            .and()
            .should()
            .be_close_to(&mut 2.0f64, 0.01f64)
            .and()
            .should()
            .be_close_to(&2.0f64, 0.01f64);
    }

    #[test]
    fn should_panic_if_float_is_not_close_to() {
        should_fail_with_message!(
            2.0f64.should().be_close_to(1.0f64, 0.01f64),
            "Expected value to be close to 1.0 +/- 0.01, but found 2.0."
        );
    }

    #[test]
    fn should_panic_if_float_is_nan() {
        should_fail_with_message!(f64::NAN.should().be_close_to(1.0f64, 0.01f64), "*close to 1.0 +/- 0.01, but found NaN.");
    }

    #[test]
    fn should_panic_if_float_is_infinity() {
        should_fail_with_message!(f64::INFINITY.should().be_close_to(1.0f64, 0.01f64), "*but found inf.");
        should_fail_with_message!(f64::NEG_INFINITY.should().be_close_to(1.0f64, 0.01f64), "*but found -inf.");
    }
}
