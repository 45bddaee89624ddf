//! Utility classes to help write customized Assertions trait.

/// A class returned by assertion functions to enable the `and()` clause.
pub struct AndConstraint<T> {
    subject: T,
}

impl<T> AndConstraint<T> {
    pub fn new(value: T) -> Self {
        AndConstraint { subject: value }
    }

    pub fn and(self) -> T {
        self.subject
    }
}

/// A class returned by assertion functions to enable the `and()` and `which_value()` clause.
pub struct AndWhichValueConstraint<A, W> {
    subject: A,
    value: W,
}

impl<A, W> AndWhichValueConstraint<A, W> {
    pub fn new(subject: A, value: W) -> Self {
        AndWhichValueConstraint { subject, value }
    }

    pub fn and(self) -> A {
        self.subject
    }

    pub fn which_value(self) -> W {
        self.value
    }
}

#[macro_export]
/// Starts an assertion that names the subject by its source text.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// let total = 5;
/// should_fail_with_message!(should!(total).be(6), "Expected total to be 6, but found 5.");
/// ```
macro_rules! should {
    ($subject:expr) => {
        $crate::Should::should($subject).named(stringify!($subject))
    };
}

#[macro_export]
/// Convevient macro to assert that with specified expression, when executed will
/// panic with a message ([`String`] or &[`str`]), which pattern matches specified message.
/// See [`FnAssertions`](crate::FnAssertions) for details.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// should_fail_with_message!(
///     {
///         panic!("hello");
///     },
///     "hello"
/// );
/// ```
macro_rules! should_fail_with_message {
    ($expression:expr, $message:expr) => {{
        use $crate::FnAssertions;
        (|| $expression).should().panic().with_message($message);
    }};
}
