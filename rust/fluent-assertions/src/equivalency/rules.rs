use super::{node::MemberInfo, options::MemberPredicate, Comparands, EquivalencyValidationContext};
use crate::{
    scope::{AssertionScope, Reason},
    value::{short_type_name, FromValue, Value},
};
use std::{marker::PhantomData, sync::Arc};

/// An override taking over the comparison of the nodes it applies to.
///
/// Returns `true` when the rule handled the node, whether or not the values were equivalent.
/// Rules are never applied to the root of the comparison.
pub trait AssertionRule: Send + Sync {
    fn assert_equality(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool;

    fn describe(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// The pair handed to a typed override, converted to `T`.
#[derive(Clone, Debug)]
pub struct AssertionContext<T> {
    pub subject: T,
    pub expectation: T,
    pub member: MemberInfo,
    reason: Option<Reason>,
}

impl<T> AssertionContext<T> {
    pub fn reason(&self) -> Option<&Reason> {
        self.reason.as_ref()
    }
}

pub(crate) enum RuleCondition {
    Predicate(MemberPredicate),
    /// Short type name compared with the declared or runtime type of the node.
    Type(String),
}

/// An override built with `EquivalencyOptions::using(..).when(..)`.
pub(crate) struct TypedAssertionRule<T> {
    action: Arc<dyn Fn(AssertionContext<T>) + Send + Sync>,
    condition: RuleCondition,
    phantom: PhantomData<fn() -> T>,
}

impl<T: FromValue> TypedAssertionRule<T> {
    pub(crate) fn new(action: Arc<dyn Fn(AssertionContext<T>) + Send + Sync>, condition: RuleCondition) -> Self {
        TypedAssertionRule {
            action,
            condition,
            phantom: PhantomData,
        }
    }

    fn applies_to(&self, context: &EquivalencyValidationContext<'_>, member: &MemberInfo) -> bool {
        match &self.condition {
            RuleCondition::Predicate(predicate) => predicate(member),
            RuleCondition::Type(type_name) => {
                let node_type = if context.options.use_runtime_types() { &member.runtime_type } else { &member.declared_type };
                short_type_name(node_type) == *type_name
            },
        }
    }
}

impl<T: FromValue> AssertionRule for TypedAssertionRule<T> {
    fn assert_equality(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        let member = context.node.info();
        if !self.applies_to(context, &member) {
            return false;
        }

        let expectation = match T::from_value(comparands.expectation) {
            Some(expectation) => expectation,
            None => return false,
        };

        match T::from_value(comparands.subject) {
            Some(subject) => {
                let mut scope = AssertionScope::named(context.node.description());
                if let Some(reason) = context.reason {
                    scope = scope.because(reason.clone());
                }

                (self.action)(AssertionContext {
                    subject,
                    expectation,
                    member,
                    reason: context.reason.cloned(),
                });
                drop(scope);
            },
            None => {
                context.assertion().fail_with(
                    "Expected {context:subject} to be of type {0}{reason}, but found {1}.",
                    &[Value::literal(short_type_name(std::any::type_name::<T>())), comparands.subject.clone()],
                );
            },
        }

        true
    }

    fn describe(&self) -> String {
        let type_name = short_type_name(std::any::type_name::<T>());
        match &self.condition {
            RuleCondition::Predicate(_) => format!("Invoke action for {} when a predicate matches", type_name),
            RuleCondition::Type(condition) => format!("Invoke action for {} when the type is {}", type_name, condition),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    fn product(price: f64) -> Value {
        Object::builder("Product").field("Name", "Pen").field("Price", price).build()
    }

    #[test]
    fn typed_rule_replaces_default_comparison() {
        product(10.004).should().be_equivalent_to_with(&product(10.0), |o| {
            o.using::<f64, _>(|ctx| {
                ctx.subject.should().be_close_to(ctx.expectation, 0.01);
            })
            .when_type_is::<f64>()
        });
    }

    #[test]
    fn failure_inside_rule_names_the_member() {
        should_fail_with_message!(
            product(11.0).should().be_equivalent_to_with(&product(10.0), |o| {
                o.using::<f64, _>(|ctx| {
                    ctx.subject.should().be_close_to(ctx.expectation, 0.01);
                })
                .when(|m| m.name == "Price")
            }),
            "Expected subject.Price to be close to 10*"
        );
    }

    #[test]
    fn predicate_restricts_the_rule() {
        should_fail_with_message!(
            product(10.5).should().be_equivalent_to_with(&product(10.0), |o| {
                o.using::<f64, _>(|_| {}).when(|m| m.name == "Weight")
            }),
            "Expected subject.Price to be 10.0, but found 10.5.*"
        );
    }

    #[test]
    fn subject_of_the_wrong_type_fails() {
        let subject = Object::builder("Product").field("Price", "cheap").build();

        should_fail_with_message!(
            subject.should().be_equivalent_to_with(&product(10.0), |o| o
                .excluding("Name")
                .using::<f64, _>(|_| {})
                .when_type_is::<f64>()),
            "Expected subject.Price to be of type f64, but found \"cheap\".*"
        );
    }

    #[test]
    fn description_names_type_and_condition() {
        EquivalencyOptions::default()
            .using::<f64, _>(|_| {})
            .when_type_is::<f64>()
            .to_string()
            .should()
            .contain("Invoke action for f64 when the type is f64");
    }
}
