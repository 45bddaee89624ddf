use super::fail_on_kind_mismatch;
use crate::{
    equivalency::{node::PathSegment, Comparands, EquivalencyResult, EquivalencyStep, EquivalencyValidationContext, EquivalencyValidator},
    formatting::Formatter,
    scope::{self, AssertionScope},
    value::{Inspect, MultiArray, Value},
};

pub(super) struct DictionaryStep;

impl EquivalencyStep for DictionaryStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.expectation, Value::Map(_))
    }

    fn handle(
        &self,
        context: &EquivalencyValidationContext<'_>,
        comparands: &Comparands<'_>,
        validator: &mut EquivalencyValidator<'_>,
    ) -> EquivalencyResult {
        let (subject, expectation) = match (comparands.subject, comparands.expectation) {
            (Value::Map(subject), Value::Map(expectation)) => (subject, expectation),
            _ => {
                fail_on_kind_mismatch(context, comparands, "a dictionary");
                return EquivalencyResult::AssertionCompleted;
            },
        };

        let lookup = |entries: &[(Value, Value)], key: &Value| entries.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone());

        let missing = expectation.iter().filter(|(k, _)| lookup(subject, k).is_none()).map(|(k, _)| k.clone()).collect::<Vec<_>>();
        let additional = subject.iter().filter(|(k, _)| lookup(expectation, k).is_none()).map(|(k, _)| k.clone()).collect::<Vec<_>>();

        context
            .assertion()
            .for_condition(missing.is_empty())
            .fail_with(
                "Expected {context:subject} to contain key(s) {0}{reason}, but it misses {1}.",
                &[Value::Seq(expectation.iter().map(|(k, _)| k.clone()).collect()), Value::Seq(missing)],
            );
        context
            .assertion()
            .for_condition(additional.is_empty())
            .fail_with(
                "Expected {context:subject} to not have key(s) {0}{reason}, but it has.",
                &[Value::Seq(additional)],
            );

        for (key, expected_value) in expectation {
            if let Some(value) = lookup(subject, key) {
                let child = context.node.child(
                    PathSegment::Key(Formatter::to_string(key)),
                    expected_value.type_name(),
                    expected_value.type_name(),
                );
                validator.recursively_assert_equality(Comparands::new(&value, expected_value), child);
            }
        }

        EquivalencyResult::AssertionCompleted
    }
}

pub(super) struct MultiDimensionalArrayStep;

impl MultiDimensionalArrayStep {
    fn dimensions_match(context: &EquivalencyValidationContext<'_>, subject: &MultiArray, expectation: &MultiArray) -> bool {
        if subject.rank() != expectation.rank() {
            context.assertion().fail_with(
                "Expected {context:subject} to have {0} dimension(s){reason}, but it has {1}.",
                &[expectation.rank().to_value(), subject.rank().to_value()],
            );
            return false;
        }

        let mismatch = subject.lengths().iter().zip(expectation.lengths()).position(|(s, e)| s != e);
        match mismatch {
            Some(dimension) => {
                context.assertion().fail_with(
                    "Expected dimension {0} of {context:subject} to contain {1} item(s){reason}, but found {2}.",
                    &[dimension.to_value(), expectation.lengths()[dimension].to_value(), subject.lengths()[dimension].to_value()],
                );
                false
            },
            None => true,
        }
    }
}

impl EquivalencyStep for MultiDimensionalArrayStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.expectation, Value::Array(_))
    }

    fn handle(
        &self,
        context: &EquivalencyValidationContext<'_>,
        comparands: &Comparands<'_>,
        validator: &mut EquivalencyValidator<'_>,
    ) -> EquivalencyResult {
        let (subject, expectation) = match (comparands.subject, comparands.expectation) {
            (Value::Array(subject), Value::Array(expectation)) => (subject, expectation),
            _ => {
                fail_on_kind_mismatch(context, comparands, "a multi-dimensional array");
                return EquivalencyResult::AssertionCompleted;
            },
        };

        if MultiDimensionalArrayStep::dimensions_match(context, subject, expectation) {
            for indices in expectation.indices() {
                if let (Some(value), Some(expected_value)) = (subject.get(&indices), expectation.get(&indices)) {
                    let child = context
                        .node
                        .child(PathSegment::Indices(indices), expected_value.type_name(), expected_value.type_name());
                    validator.recursively_assert_equality(Comparands::new(value, expected_value), child);
                }
            }
        }

        EquivalencyResult::AssertionCompleted
    }
}

pub(super) struct EnumerableStep;

impl EnumerableStep {
    fn assert_strictly_ordered(
        context: &EquivalencyValidationContext<'_>,
        subject: &[Value],
        expectation: &[Value],
        validator: &mut EquivalencyValidator<'_>,
    ) {
        for (index, (value, expected_value)) in subject.iter().zip(expectation).enumerate() {
            let child = context.node.child(PathSegment::Index(index), expected_value.type_name(), expected_value.type_name());
            validator.recursively_assert_equality(Comparands::new(value, expected_value), child);
        }
    }

    /// Pairs every expected item with an equivalent, not yet matched subject item. An item without
    /// a match reports the failures of the candidate that came closest.
    fn assert_loosely_ordered(
        context: &EquivalencyValidationContext<'_>,
        subject: &[Value],
        expectation: &[Value],
        validator: &mut EquivalencyValidator<'_>,
    ) {
        let mut matched = vec![false; subject.len()];

        for (index, expected_value) in expectation.iter().enumerate() {
            let child = context.node.child(PathSegment::Index(index), expected_value.type_name(), expected_value.type_name());
            let mut best: Option<Vec<String>> = None;

            for (candidate, value) in subject.iter().enumerate() {
                if matched[candidate] {
                    continue;
                }

                let failures = {
                    let attempt = AssertionScope::new();
                    validator.recursively_assert_equality(Comparands::new(value, expected_value), child.clone());
                    attempt.discard()
                };

                if failures.is_empty() {
                    matched[candidate] = true;
                    best = None;
                    break;
                }
                if best.as_ref().map_or(true, |b| failures.len() < b.len()) {
                    best = Some(failures);
                }
            }

            for failure in best.into_iter().flatten() {
                scope::record_failure(failure);
            }
        }
    }
}

impl EquivalencyStep for EnumerableStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.expectation, Value::Seq(_))
    }

    fn handle(
        &self,
        context: &EquivalencyValidationContext<'_>,
        comparands: &Comparands<'_>,
        validator: &mut EquivalencyValidator<'_>,
    ) -> EquivalencyResult {
        let (subject, expectation) = match (comparands.subject, comparands.expectation) {
            (Value::Seq(subject), Value::Seq(expectation)) => (subject, expectation),
            _ => {
                fail_on_kind_mismatch(context, comparands, "a collection");
                return EquivalencyResult::AssertionCompleted;
            },
        };

        if subject.len() != expectation.len() {
            let (difference, direction) = if subject.len() < expectation.len() {
                (expectation.len() - subject.len(), "less")
            } else {
                (subject.len() - expectation.len(), "more")
            };

            context.assertion().fail_with(
                "Expected {context:subject} to be a collection with {0} item(s){reason}, but {1} contains {2} item(s) {3} than {4}.",
                &[
                    expectation.len().to_value(),
                    comparands.subject.clone(),
                    difference.to_value(),
                    Value::literal(direction),
                    comparands.expectation.clone(),
                ],
            );
            return EquivalencyResult::AssertionCompleted;
        }

        if context.options.is_strict_ordering_for(&context.node.info()) {
            EnumerableStep::assert_strictly_ordered(context, subject, expectation, validator);
        } else {
            EnumerableStep::assert_loosely_ordered(context, subject, expectation, validator);
        }

        EquivalencyResult::AssertionCompleted
    }
}
