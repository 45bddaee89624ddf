use super::fail_on_kind_mismatch;
use crate::{
    equivalency::{Comparands, EquivalencyResult, EquivalencyStep, EquivalencyValidationContext, EquivalencyValidator},
    string::first_difference,
    value::{Inspect, Value, XmlValue},
};

pub(super) struct ReferenceEqualityStep;

impl EquivalencyStep for ReferenceEqualityStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        let same_object = comparands.subject.identity().is_some() && comparands.subject.identity() == comparands.expectation.identity();
        same_object || comparands.subject.is_null() || comparands.expectation.is_null()
    }

    fn handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
        if comparands.subject.is_null() != comparands.expectation.is_null() {
            context.assertion().fail_with(
                "Expected {context:subject} to be {0}{reason}, but found {1}.",
                &[comparands.expectation.clone(), comparands.subject.clone()],
            );
        }

        EquivalencyResult::AssertionCompleted
    }
}

pub(super) struct StringStep;

impl EquivalencyStep for StringStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.expectation, Value::Str(_))
    }

    fn handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
        let (subject, expectation) = match (comparands.subject, comparands.expectation) {
            (Value::Str(subject), Value::Str(expectation)) => (subject, expectation),
            _ => {
                fail_on_kind_mismatch(context, comparands, "a string");
                return EquivalencyResult::AssertionCompleted;
            },
        };

        if let Some((index, near)) = first_difference(subject, expectation) {
            let (subject_length, expected_length) = (subject.chars().count(), expectation.chars().count());
            if subject_length != expected_length {
                context.assertion().fail_with(
                    "Expected {context:subject} to be {0} with a length of {1}{reason}, but {2} has a length of {3}, differs near {4} (index {5}).",
                    &[
                        comparands.expectation.clone(),
                        expected_length.to_value(),
                        comparands.subject.clone(),
                        subject_length.to_value(),
                        near.to_value(),
                        index.to_value(),
                    ],
                );
            } else {
                context.assertion().fail_with(
                    "Expected {context:subject} to be {0}{reason}, but {1} differs near {2} (index {3}).",
                    &[comparands.expectation.clone(), comparands.subject.clone(), near.to_value(), index.to_value()],
                );
            }
        }

        EquivalencyResult::AssertionCompleted
    }
}

pub(super) struct XmlStep;

impl EquivalencyStep for XmlStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.expectation, Value::Xml(_))
    }

    fn handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
        let kind = match comparands.expectation {
            Value::Xml(XmlValue::Element(_)) => "an XML element",
            Value::Xml(XmlValue::Document(_)) => "an XML document",
            _ => "an XML attribute",
        };

        match comparands.subject {
            Value::Xml(_) => {
                context
                    .assertion()
                    .for_condition(comparands.subject == comparands.expectation)
                    .fail_with(
                        "Expected {context:subject} to be {0}{reason}, but found {1}.",
                        &[comparands.expectation.clone(), comparands.subject.clone()],
                    );
            },
            _ => fail_on_kind_mismatch(context, comparands, kind),
        }

        EquivalencyResult::AssertionCompleted
    }
}

pub(super) struct EnumStep;

impl EquivalencyStep for EnumStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.subject, Value::Enum(_)) || matches!(comparands.expectation, Value::Enum(_))
    }

    fn handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
        let by_name = context.options.compare_enums_by_name();

        let equivalent = match (comparands.subject, comparands.expectation) {
            (Value::Enum(subject), Value::Enum(expectation)) if by_name => subject.name() == expectation.name(),
            (Value::Enum(subject), Value::Enum(expectation)) => subject.value() == expectation.value(),
            (Value::Enum(subject), Value::Int { value, .. }) | (Value::Int { value, .. }, Value::Enum(subject)) if !by_name => {
                subject.value() == *value
            },
            (Value::Enum(subject), Value::Str(name)) | (Value::Str(name), Value::Enum(subject)) if by_name => subject.name() == name,
            _ => false,
        };

        let template = if by_name {
            "Expected {context:subject} to equal {0} by name{reason}, but found {1}."
        } else {
            "Expected {context:subject} to equal {0} by value{reason}, but found {1}."
        };

        context
            .assertion()
            .for_condition(equivalent)
            .fail_with(template, &[comparands.expectation.clone(), comparands.subject.clone()]);

        EquivalencyResult::AssertionCompleted
    }
}

pub(super) struct SimpleEqualityStep;

impl EquivalencyStep for SimpleEqualityStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(
            comparands.expectation,
            Value::Bool(_) | Value::Int { .. } | Value::Float { .. } | Value::Char(_) | Value::Opaque { .. }
        )
    }

    fn handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
        context
            .assertion()
            .for_condition(comparands.subject == comparands.expectation)
            .fail_with(
                "Expected {context:subject} to be {0}{reason}, but found {1}.",
                &[comparands.expectation.clone(), comparands.subject.clone()],
            );

        EquivalencyResult::AssertionCompleted
    }
}
