//! Structural comparison of object graphs.
//!
//! The [`EquivalencyValidator`] walks subject and expectation side by side. Each pair of values is a
//! [`Node`] handed to a pipeline of [`EquivalencyStep`]s: user steps first in registration order,
//! then the [`BuiltinStep`]s. The first step that completes the node wins.
//!
//! Which members of an object take part is decided by [`MemberSelectionRule`]s, how they are paired
//! with the expectation by [`MemberMatchingRule`]s, and individual nodes can be taken over by
//! [`AssertionRule`] overrides. All of it is configured through [`EquivalencyOptions`].
use crate::{
    scope::{Assertion, Reason},
    value::{short_type_name, Value},
};

mod matching;
mod node;
mod options;
mod rules;
mod selection;
mod steps;
mod validator;

pub use matching::{MemberMatchingRule, MustMatchByNameRule, TryMatchByNameRule};
pub use node::{MemberInfo, MemberPath, Node, PathSegment};
pub use options::{CyclicReferenceHandling, EquivalencyOptions, MemberPredicate, Restriction};
pub use rules::{AssertionContext, AssertionRule};
pub use selection::{
    AllMembersSelectionRule, AllPublicMembersSelectionRule, ExcludeMemberByPathSelectionRule, ExcludeMemberByPredicateSelectionRule,
    IncludeMemberByPathSelectionRule, MemberSelectionContext, MemberSelectionRule, SelectedMember,
};
pub use steps::BuiltinStep;
pub use validator::EquivalencyValidator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EquivalencyResult {
    AssertionCompleted,
    ContinueWithNext,
}

/// The pair of values compared at a node.
#[derive(Clone, Copy, Debug)]
pub struct Comparands<'a> {
    pub subject: &'a Value,
    pub expectation: &'a Value,
}

impl<'a> Comparands<'a> {
    pub fn new(subject: &'a Value, expectation: &'a Value) -> Self {
        Comparands { subject, expectation }
    }
}

/// Everything a step knows about the node it is asked to handle.
pub struct EquivalencyValidationContext<'a> {
    pub node: Node,
    pub options: &'a EquivalencyOptions,
    pub reason: Option<&'a Reason>,
}

impl<'a> EquivalencyValidationContext<'a> {
    /// An assertion reporting against this node, `{context:subject}` resolves to its path.
    pub fn assertion(&self) -> Assertion {
        Assertion::current().with_reason(self.reason.cloned()).with_context(self.node.description())
    }
}

/// A handler of the comparison pipeline.
///
/// ```
/// use fluent_assertions::*;
///
/// /// Treats every pair of strings as equivalent when they agree ignoring case.
/// struct CaseInsensitive;
///
/// impl EquivalencyStep for CaseInsensitive {
///     fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
///         matches!((comparands.subject, comparands.expectation), (Value::Str(_), Value::Str(_)))
///     }
///
///     fn handle(
///         &self,
///         context: &EquivalencyValidationContext<'_>,
///         comparands: &Comparands<'_>,
///         _: &mut EquivalencyValidator<'_>,
///     ) -> EquivalencyResult {
///         if let (Value::Str(s), Value::Str(e)) = (comparands.subject, comparands.expectation) {
///             context
///                 .assertion()
///                 .for_condition(s.eq_ignore_ascii_case(e))
///                 .fail_with("Expected {context:subject} to be {0} ignoring case, but found {1}.", &[e.to_value(), s.to_value()]);
///         }
///         EquivalencyResult::AssertionCompleted
///     }
/// }
///
/// "HELLO".should().be_equivalent_to_with(&"hello", |o| o.using_step(CaseInsensitive));
/// ```
pub trait EquivalencyStep: Send + Sync {
    fn can_handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool;

    fn handle(
        &self,
        context: &EquivalencyValidationContext<'_>,
        comparands: &Comparands<'_>,
        validator: &mut EquivalencyValidator<'_>,
    ) -> EquivalencyResult;

    fn describe(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}
