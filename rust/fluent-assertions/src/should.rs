use crate::{
    clock::{Clock, TokioClock},
    config::AssertionOptions,
    equivalency::{EquivalencyOptions, EquivalencyValidator},
    scope::{Assertion, AssertionScope, Reason},
    utils::AndConstraint,
    value::{Inspect, Value},
};
use std::{borrow::Borrow, cmp::PartialEq, fmt::Debug, sync::Arc};

/// Trait to start assertion. It has a blanket implementation on any type `T`.
/// Calling [`Should::should`] will return [`Assertions`]<`T`> to enable testing.
pub trait Should<T> {
    fn should(self) -> Assertions<T>;
}

impl<T> Should<T> for T {
    fn should(self) -> Assertions<T> {
        Assertions::new(self)
    }
}

/// A convenient trait to convert from owned to ref in fluent syntax.
/// [`Should::should()`] will move the object, while in some case the subject cannot be moved. Call [`ToRef::to_ref()`] to assert on reference.
/// This is not different from directly retrieve reference by `&`. But it's useful in a fluent syntax like below:
/// ```
/// use fluent_assertions::*;
///
/// Ok::<_, ()>((3, 4, 5)).should().be_ok().which_value().1.to_ref().should().be(&4);
/// ```
pub trait ToRef<T: ?Sized> {
    fn to_ref(&self) -> &T;
}

impl<T: ?Sized> ToRef<T> for T {
    fn to_ref(&self) -> &T {
        self
    }
}

/// A symbolic class to representing *assertable* subject. Created by
/// calling [`Should`] on subject to be tested. [`Assertions`] contains
/// some basic assertions functions, most assertions are provided by traits implemented on
/// [`Assertions`] for the types they apply to.
///
/// Every failure is reported through an [`Assertion`], so it is either collected by the enclosing
/// [`AssertionScope`] or raised right away.
///
/// ```Assertions``` class also enables extension point. A custom assertion is a trait implemented
/// on [`Assertions`] that reports through [`Assertions::assertion`].
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// trait EvenAssertions {
///     fn be_even(self) -> AndConstraint<i32>;
/// }
///
/// impl EvenAssertions for Assertions<i32> {
///     fn be_even(self) -> AndConstraint<i32> {
///         self.assertion()
///             .for_condition(self.subject() % 2 == 0)
///             .fail_with("Expected {context:number} to be even{reason}, but found {0}.", &[self.subject().to_value()]);
///         AndConstraint::new(self.into_inner())
///     }
/// }
///
/// 4.should().be_even();
/// should_fail_with_message!(3.should().because("pairs are needed").be_even(), "Expected number to be even because pairs are needed, but found 3.");
///
/// // test subject meeting condition specified by a predicate
/// "hello".should().satisfy(|x| x == &"hello");
///
/// // sometimes subject has multiple sub-fields to be tested, in this case,
/// // use pass() assertion, which takes an closure on subject
/// (3, 4, 5).should().pass(|s| {
///     s.0.should().be(3);
///     s.2.should().be(5);
/// });
///
/// 5.should().be(5);
/// 4.should().not_be(5);
/// String::from("abc").should().equal("abc");
/// ```
pub struct Assertions<T> {
    subject: T,
    reason: Option<Reason>,
    identifier: Option<String>,
    clock: Option<Arc<dyn Clock>>,
}

impl<T> Assertions<T> {
    pub fn new(subject: T) -> Self {
        Assertions {
            subject,
            reason: None,
            identifier: None,
            clock: None,
        }
    }

    /// The "because" clause for the failures of the following assertion.
    pub fn because(mut self, reason: impl Into<Reason>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// How failures refer to the subject, unless a scope names it.
    pub fn named(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// Replaces the [`TokioClock`] used by timing assertions.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub(crate) fn clock(&self) -> Arc<dyn Clock> {
        self.clock.clone().unwrap_or_else(|| Arc::new(TokioClock))
    }

    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }

    pub fn identifier(&self) -> Option<&str> {
        self.identifier.as_deref()
    }

    /// Starts a failure reporting chain carrying this subject's reason and name.
    pub fn assertion(&self) -> Assertion {
        Assertion::current().with_reason(self.reason.clone()).with_identifier(self.identifier.as_deref())
    }

    /// return the reference to subject
    pub fn subject(&self) -> &T {
        &self.subject
    }

    pub fn into_inner(self) -> T {
        self.subject
    }

    pub fn satisfy<F>(self, matching_function: F) -> AndConstraint<T>
    where
        F: Fn(&T) -> bool,
        T: Debug,
    {
        self.assertion()
            .for_condition(matching_function(self.subject()))
            .fail_with_args("Expected {context:value} to satisfy the predicate{reason}, but found {0}.", || {
                vec![Value::debug(self.subject())]
            });

        AndConstraint::new(self.subject)
    }

    pub fn pass<F>(self, checking_function: F) -> AndConstraint<T>
    where F: Fn(&T) {
        checking_function(self.subject());

        AndConstraint::new(self.subject)
    }

    pub fn equal<E>(self, expected: &E) -> AndConstraint<T>
    where
        T: PartialEq<E> + Debug,
        E: Debug + ?Sized,
    {
        self.assertion()
            .for_condition(self.subject().eq(expected))
            .fail_with_args("Expected {context:value} to be equal to {0}{reason}, but found {1}.", || {
                vec![Value::debug(expected), Value::debug(self.subject())]
            });

        AndConstraint::new(self.into_inner())
    }
}

impl<T> Assertions<T>
where T: PartialEq + Debug
{
    pub fn be<E: Borrow<T>>(self, expected: E) -> AndConstraint<T> {
        let expected = expected.borrow();

        self.assertion()
            .for_condition(self.subject().eq(expected))
            .fail_with_args("Expected {context:value} to be {0}{reason}, but found {1}.", || {
                vec![Value::debug(expected), Value::debug(self.subject())]
            });

        AndConstraint::new(self.into_inner())
    }

    pub fn not_be<E: Borrow<T>>(self, expected: E) -> AndConstraint<T> {
        let expected = expected.borrow();

        self.assertion()
            .for_condition(!self.subject().eq(expected))
            .fail_with_args("Did not expect {context:value} to be {0}{reason}.", || vec![Value::debug(expected)]);

        AndConstraint::new(self.into_inner())
    }
}

impl<T: Inspect> Assertions<T> {
    /// Compares the subject with `expectation` member by member, using the process-wide
    /// [`EquivalencyOptions`]. All differences are reported together.
    ///
    /// ```
    /// use fluent_assertions::*;
    ///
    /// #[derive(Inspect)]
    /// pub struct Order {
    ///     pub id: u32,
    ///     pub lines: Vec<String>,
    /// }
    ///
    /// let order = Order { id: 1, lines: vec!["pen".to_owned(), "ink".to_owned()] };
    /// let expectation = Order { id: 1, lines: vec!["ink".to_owned(), "pen".to_owned()] };
    ///
    /// order.should().be_equivalent_to(&expectation);
    /// ```
    pub fn be_equivalent_to<E: Inspect + ?Sized>(self, expectation: &E) -> AndConstraint<T> {
        self.be_equivalent_to_with(expectation, |options| options)
    }

    /// Like [`Assertions::be_equivalent_to`], with the defaults adjusted by `configure`.
    pub fn be_equivalent_to_with<E, F>(self, expectation: &E, configure: F) -> AndConstraint<T>
    where
        E: Inspect + ?Sized,
        F: FnOnce(EquivalencyOptions) -> EquivalencyOptions,
    {
        let options = configure(AssertionOptions::equivalency_defaults());
        EquivalencyValidator::new(&options, self.reason.as_ref()).assert_equality(
            &self.subject.to_value(),
            &expectation.to_value(),
            self.identifier.as_deref(),
        );

        AndConstraint::new(self.subject)
    }

    pub fn not_be_equivalent_to<E: Inspect + ?Sized>(self, unexpected: &E) -> AndConstraint<T> {
        let unexpected = unexpected.to_value();
        let options = AssertionOptions::equivalency_defaults();

        let differences = {
            let attempt = AssertionScope::new();
            EquivalencyValidator::new(&options, None).assert_equality(&self.subject.to_value(), &unexpected, self.identifier.as_deref());
            attempt.discard()
        };

        self.assertion()
            .for_condition(!differences.is_empty())
            .fail_with_args("Did not expect {context:subject} to be equivalent to {0}{reason}, but they are.", || vec![unexpected.clone()]);

        AndConstraint::new(self.subject)
    }
}
