//! # Fluent Assertions Testing in Rust
//!
//! FluentAssertions is a testing framework designed to make your assertions read like plain English.
//! This allows you to more easily expose the intent of your test, rather than having it shrouded by
//! assertions which work, but are opaque on their meaning. It's inspired by the same name [project](https://fluentassertions.com/) in C#.
//!
//! Methods available to assert with are dependent upon the type of the subject under test. There is also
//! an extension point to write customized asserts on specific types.
//!
//! ## Usage
//!
//! To quickly start using assertions, `use` the fluent_assertions root module:
//!
//! ```rust
//! use fluent_assertions::*;
//! ```
//!
//! ## Write Test with Fluent-Assertions
//!
//! Now that we have something to test, we need to actually start asserting on it. The first part
//! to that is to call the `should()` function.
//!
//! ```rust
//! use fluent_assertions::*;
//!
//! #[test]
//! pub fn should_be_the_correct_string() {
//!     let subject = "Hello World!";
//!
//!     // this call will consume subject
//!     subject.should().start_with("H");
//! }
//! ```
//!
//! When the subject is "ello World!" instead, the test fails with
//!
//! ```bash
//!     Expected string to start with "H", but "ello World!" does not.
//! ```
//!
//! Use [`should!`] to name the subject after the expression, and `because` to say why the
//! expectation matters:
//!
//! ```
//! use fluent_assertions::*;
//!
//! let greeting = "ello World!";
//! should_fail_with_message!(
//!     should!(greeting).because("every greeting is capitalized").start_with("H"),
//!     "Expected greeting to start with \"H\" because every greeting is capitalized, but \"ello World!\" does not."
//! );
//! ```
//!
//! ## Basic Use Cases
//!
//! Start testing by calling [`Should::should`] on the subject followed by assertions like below.
//!
//! ```
//! use fluent_assertions::*;
//!
//! let subject = 3 + 5;
//! subject.should().be(8);
//! ```
//!
//! You can use `and()` clause with any assertions to continue with a new assertion on the subject, like below.
//!
//! ```
//! use fluent_assertions::*;
//!
//! let subject = "Hello world";
//! subject
//!     .should()
//!     .start_with("H")
//!     .and()
//!     .should()
//!     .end_with("d")
//!     .and()
//!     .len()
//!     .should()
//!     .be(11);
//! ```
//!
//! Many assertions provide additional clause for more detailed testing. e.g.
//!
//! ```
//! use fluent_assertions::*;
//!
//! let subject = vec![1, 2, 2, 3, 4];
//! subject.should().contain(2).for_times(2);
//! ```
//!
//! Some times you want to test multiple fields of a subject. One way is to use multiple `should()` statement one on each field.
//! You can also use [`Assertions::pass`] for this.
//!
//! ```
//! use fluent_assertions::*;
//!
//! let subject = (1, 2, 3, 4, 5);
//! subject.should().pass(|s| {
//!     s.0.should().be(&1);
//!     s.2.should().be(&3);
//! });
//! ```
//!
//! **Note**: [`Should::should`] will consume the subject. If you want to continue using the subject, you could pass in a reference.
//!
//! ```
//! use fluent_assertions::*;
//!
//! let subject = String::from("Hello world");
//! (&subject).should().start_with("H");
//! ```
//!
//! There is also a helper trait [`ToRef`] to enable reference retrieval in fluent syntax, like below:
//!
//! ```
//! use fluent_assertions::*;
//!
//! // in this case you want to test second value of inner tuple. You cannot directly
//! // call which_value().1.should() because it will move the value, call to_ref() to
//! // retrieve a reference to test, without break the fluent syntax
//! Ok::<_, ()>((3, 4, 5)).should().be_ok().which_value().1.to_ref().should().be(&4);
//!
//! // compare with
//! (&Ok::<_, ()>((3, 4, 5)).should().be_ok().which_value().1).should().be(&4);
//! ```
//!
//! ## Collecting failures
//!
//! Outside of any [`AssertionScope`] a failing assertion panics right away. Inside one, failures
//! are collected and reported together when the outermost scope ends.
//!
//! ```
//! use fluent_assertions::*;
//!
//! should_fail_with_message!(
//!     {
//!         let _scope = AssertionScope::new();
//!         1.should().be(2);
//!         "a".should().be("b");
//!     },
//!     "Expected value to be 2, but found 1.*Expected value to be \"b\", but found \"a\"."
//! );
//! ```
//!
//! ## Structural equivalency
//!
//! [`Assertions::be_equivalent_to`] compares object graphs member by member. Types take part through
//! [`Inspect`], usually derived. See the [`equivalency`] module for selecting members, overriding
//! comparisons per member and adding custom steps.
//!
//! ```
//! use fluent_assertions::*;
//!
//! #[derive(Inspect)]
//! pub struct Address {
//!     pub city: String,
//! }
//!
//! #[derive(Inspect)]
//! pub struct Customer {
//!     pub name: String,
//!     pub address: Address,
//! }
//!
//! let customer = Customer { name: "Ann".to_owned(), address: Address { city: "Oslo".to_owned() } };
//! let moved = Customer { name: "Ann".to_owned(), address: Address { city: "Bergen".to_owned() } };
//!
//! should_fail_with_message!(customer.should().be_equivalent_to(&moved), "Expected subject.address.city to be \"Bergen\"*");
//! ```
//!
//! ## More examples
//!
//! Additional assertions are provided for different data structure. Some examples below.
//! For more details refer to the each `*Assertions` trait.
//!
//! ```rust
//! use fluent_assertions::*;
//! use std::time::Duration;
//!
//! // use be and sastisfy to assert the value of subject
//! // use and() to chain multiple assertions
//! let subject = "hello";
//! subject
//!     .should()
//!     .be("hello")
//!     .and()
//!     .should()
//!     .satisfy(|s| s.starts_with("h"))
//!     .and()
//!     .is_empty()
//!     .should()
//!     .be_false();
//!
//! // working with boolean
//! let subject = true;
//! subject.should().be_true();
//!
//! // working with iterators
//! vec![1, 2, 3].should().have_length(3).and().should().contain(2);
//! vec![2].should().be_single().which_value().should().be(2);
//!
//! // working with numbers
//! 3.should().be_greater_than(2).and().should().be_less_than_or_equal_to(3);
//!
//! // working with options
//! Some(5).should().be_some().with_value(5);
//!
//! // working with results
//! Ok::<_, ()>(8).should().be_ok().which_value().should().be_greater_than(5);
//! Err::<(), _>("hello").should().be_err().with_value_that(|v| v.starts_with("h"));
//!
//! // working with string
//! "hello".should().contain("ll").and().should().end_with("o");
//!
//! // working with closures
//! (|| panic!("test {}", 42)).should().panic().with_message("test 42");
//!
//! // working with futures
//! async { 3 }.should().complete_within(Duration::from_secs(1));
//! ```

extern crate self as fluent_assertions;

/// Exposes a type's members to [`Assertions::be_equivalent_to`].
///
/// `pub` fields become public members, other fields internal ones. Fields accept
/// `#[inspect(skip)]` and `#[inspect(rename = "Name")]`. Fieldless enums are compared by value
/// or by name.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// #[derive(Inspect)]
/// pub enum Status {
///     Active = 1,
///     Closed = 2,
/// }
///
/// #[derive(Inspect)]
/// pub struct Account {
///     #[inspect(rename = "Id")]
///     pub id: u64,
///     pub status: Status,
///     password: String,
/// }
///
/// let account = Account { id: 7, status: Status::Active, password: "x".to_owned() };
/// let expectation = Account { id: 7, status: Status::Active, password: "y".to_owned() };
///
/// // internal members are not compared unless included
/// account.should().be_equivalent_to(&expectation);
/// ```
pub use fluent_assertions_derive::Inspect;

pub use boolean::BooleanAssertions;
pub use call::{ErrorConstraint, FallibleFnAssertions, FnAssertions, PanicCauseConstraint};
pub use clock::{Clock, FakeClock, Timer, TokioClock};
pub use collection::{CountExtension, IterAssertions, IterConstraint, PartialEqIterAssertions, SingleExtension};
pub use config::AssertionOptions;
pub use equivalency::{
    AllMembersSelectionRule, AllPublicMembersSelectionRule, AssertionContext, AssertionRule, BuiltinStep, Comparands,
    CyclicReferenceHandling, EquivalencyOptions, EquivalencyResult, EquivalencyStep, EquivalencyValidationContext, EquivalencyValidator,
    ExcludeMemberByPathSelectionRule, ExcludeMemberByPredicateSelectionRule, IncludeMemberByPathSelectionRule, MemberInfo,
    MemberMatchingRule, MemberPath, MemberPredicate, MemberSelectionContext, MemberSelectionRule, MustMatchByNameRule, Node, PathSegment,
    Restriction, SelectedMember, TryMatchByNameRule,
};
pub use error::{AssertionError, ConfigurationError};
pub use formatting::{Formatter, FormattingContext, FormattingOptions, ValueFormatter};
pub use numeric::{FloatAssertions, OrderedAssertions};
pub use option::{OptionAssertions, SomeConstraint};
pub use result::{IsErr, IsOk, ResultAssertions, ResultConstraint};
pub use scope::{Assertion, AssertionScope, Continuation, GivenSelector, Reason};
pub use should::{Assertions, Should, ToRef};
pub use string::StringAssertions;
pub use utils::{AndConstraint, AndWhichValueConstraint};
pub use value::{
    short_type_name, EnumValue, FromValue, Inspect, Member, MultiArray, Object, ObjectBuilder, ObjectRef, Value, ValueKind, Visibility,
    XmlValue,
};

#[macro_use]
pub mod utils;
mod boolean;
mod call;
mod clock;
mod collection;
mod completion;
mod config;
pub mod equivalency;
mod error;
pub mod formatting;
mod numeric;
mod option;
mod result;
pub mod scope;
mod should;
mod string;
mod value;
