use crate::equivalency::{Comparands, EquivalencyResult, EquivalencyStep, EquivalencyValidationContext, EquivalencyValidator};

pub(super) struct AssertionRulesStep;

impl EquivalencyStep for AssertionRulesStep {
    fn can_handle(&self, context: &EquivalencyValidationContext<'_>, _: &Comparands<'_>) -> bool {
        !context.node.is_root() && !context.options.assertion_rules().is_empty()
    }

    fn handle(&self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
        // Most recently registered first.
        for rule in context.options.assertion_rules().iter().rev() {
            if rule.assert_equality(context, comparands) {
                tracing::trace!(
                    path = %context.node.description(),
                    rule = %rule.describe(),
                    "[AssertionRulesStep::handle()] node handled by assertion rule"
                );
                return EquivalencyResult::AssertionCompleted;
            }
        }

        EquivalencyResult::ContinueWithNext
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn rules_never_apply_to_the_root() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);

        should_fail_with_message!(
            1.should().be_equivalent_to_with(&2, move |o| o
                .using::<i32, _>(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .when(|_| true)),
            "Expected subject to be 2, but found 1.*"
        );

        calls.load(Ordering::SeqCst).should().be(0);
    }

    #[test]
    fn most_recent_rule_is_tried_first() {
        let subject = Object::builder("Order").field("Total", 1).build();
        let expectation = Object::builder("Order").field("Total", 2).build();

        subject.should().be_equivalent_to_with(&expectation, |o| {
            o.using::<i32, _>(|_| panic!("earlier rule must not run"))
                .when_type_is::<i32>()
                .using::<i32, _>(|_| {})
                .when_type_is::<i32>()
        });
    }

    #[test]
    fn rules_see_null_members_before_reference_equality() {
        let subject = Object::builder("Customer").field("Nick", None::<String>).build();
        let expectation = Object::builder("Customer").field("Nick", "").build();

        should_fail_with_message!(
            (&subject).should().be_equivalent_to(&expectation),
            "Expected subject.Nick to be \"\", but found <null>.*"
        );

        subject.should().be_equivalent_to_with(&expectation, |o| o.using::<Value, _>(|_| {}).when(|m| m.name == "Nick"));
    }

    #[test]
    fn non_applicable_rule_falls_through_to_earlier_one() {
        let subject = Object::builder("Order").field("Total", 1).build();
        let expectation = Object::builder("Order").field("Total", 2).build();

        subject.should().be_equivalent_to_with(&expectation, |o| {
            o.using::<i32, _>(|_| {}).when_type_is::<i32>().using::<String, _>(|_| panic!("not a string")).when(|_| true)
        });
    }
}
