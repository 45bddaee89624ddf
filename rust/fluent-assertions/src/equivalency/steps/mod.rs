use super::{Comparands, EquivalencyResult, EquivalencyStep, EquivalencyValidationContext, EquivalencyValidator};
use crate::value::Value;
use strum_macros::Display as StrumDisplay;

mod assertion_rules;
mod collections;
mod leaf;
mod structural;

/// The steps every comparison ends with, in the order they are tried.
#[derive(Clone, Copy, Debug, PartialEq, Eq, StrumDisplay)]
pub enum BuiltinStep {
    /// Registered [`AssertionRule`](crate::AssertionRule) overrides, never for the root.
    AssertionRules,
    /// Both sides null, or the same object.
    ReferenceEquality,
    Dictionary,
    MultiDimensionalArray,
    /// Sequences, in any order unless strict ordering applies to the node.
    Enumerable,
    String,
    Xml,
    /// Enums by numeric value, or by name.
    Enum,
    /// Numbers, booleans, characters and opaque debug values.
    SimpleEquality,
    /// Objects, member by member.
    Structural,
}

impl BuiltinStep {
    pub const ALL: [BuiltinStep; 10] = [
        BuiltinStep::AssertionRules,
        BuiltinStep::ReferenceEquality,
        BuiltinStep::Dictionary,
        BuiltinStep::MultiDimensionalArray,
        BuiltinStep::Enumerable,
        BuiltinStep::String,
        BuiltinStep::Xml,
        BuiltinStep::Enum,
        BuiltinStep::SimpleEquality,
        BuiltinStep::Structural,
    ];

    fn step(&self) -> &'static dyn EquivalencyStep {
        match self {
            BuiltinStep::AssertionRules => &assertion_rules::AssertionRulesStep,
            BuiltinStep::ReferenceEquality => &leaf::ReferenceEqualityStep,
            BuiltinStep::Dictionary => &collections::DictionaryStep,
            BuiltinStep::MultiDimensionalArray => &collections::MultiDimensionalArrayStep,
            BuiltinStep::Enumerable => &collections::EnumerableStep,
            BuiltinStep::String => &leaf::StringStep,
            BuiltinStep::Xml => &leaf::XmlStep,
            BuiltinStep::Enum => &leaf::EnumStep,
            BuiltinStep::SimpleEquality => &leaf::SimpleEqualityStep,
            BuiltinStep::Structural => &structural::StructuralStep,
        }
    }
}

impl EquivalencyStep for BuiltinStep {
    fn can_handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        self.step().can_handle(context, comparands)
    }

    fn handle(
        &self,
        context: &EquivalencyValidationContext<'_>,
        comparands: &Comparands<'_>,
        validator: &mut EquivalencyValidator<'_>,
    ) -> EquivalencyResult {
        self.step().handle(context, comparands, validator)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

/// Failure for a pair a step cannot compare, e.g. a sequence against a number.
fn fail_on_kind_mismatch(context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, expected_kind: &str) {
    context.assertion().fail_with(
        "Expected {context:subject} to be {0} {1}{reason}, but found {2}.",
        &[Value::literal(expected_kind), comparands.expectation.clone(), comparands.subject.clone()],
    );
}
