use super::fail_on_kind_mismatch;
use crate::{
    equivalency::{
        matching::find_expectation_member, node::PathSegment, selection::select_members, Comparands, EquivalencyResult, EquivalencyStep,
        EquivalencyValidationContext, EquivalencyValidator,
    },
    value::Value,
};

pub(super) struct StructuralStep;

impl EquivalencyStep for StructuralStep {
    fn can_handle(&self, _: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) -> bool {
        matches!(comparands.expectation, Value::Object(_))
    }

    fn handle(
        &self,
        context: &EquivalencyValidationContext<'_>,
        comparands: &Comparands<'_>,
        validator: &mut EquivalencyValidator<'_>,
    ) -> EquivalencyResult {
        let (subject, expectation) = match (comparands.subject, comparands.expectation) {
            (Value::Object(subject), Value::Object(expectation)) => (subject, expectation),
            _ => {
                fail_on_kind_mismatch(context, comparands, "an object");
                return EquivalencyResult::AssertionCompleted;
            },
        };

        let selected = select_members(&context.node, subject, context.options);
        if selected.is_empty() {
            context.assertion().fail_with(
                "No members were found for comparison of {context:subject}{reason}. Include some members or choose a more meaningful assertion.",
                &[],
            );
            return EquivalencyResult::AssertionCompleted;
        }

        for member in selected {
            if let Some(expected_member) = find_expectation_member(&member, expectation, &context.node, context.options) {
                let child = context
                    .node
                    .child(
                        PathSegment::Member(member.info.name.clone()),
                        expected_member.declared_type(),
                        expected_member.value().type_name(),
                    )
                    .with_visibility(member.member.visibility());

                validator.recursively_assert_equality(Comparands::new(member.member.value(), expected_member.value()), child);
            }
        }

        EquivalencyResult::AssertionCompleted
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[derive(Inspect)]
    pub struct Address {
        pub city: String,
        pub zip: u32,
    }

    #[derive(Inspect)]
    pub struct Customer {
        pub name: String,
        pub address: Address,
        #[inspect(skip)]
        #[allow(dead_code)]
        cache: Vec<u8>,
    }

    fn customer(name: &str, city: &str) -> Customer {
        Customer {
            name: name.to_owned(),
            address: Address {
                city: city.to_owned(),
                zip: 1234,
            },
            cache: vec![1, 2, 3],
        }
    }

    #[test]
    fn nested_members_are_compared_by_path() {
        customer("Ann", "Oslo").should().be_equivalent_to(&customer("Ann", "Oslo"));

        should_fail_with_message!(
            customer("Ann", "Oslo").should().be_equivalent_to(&customer("Ann", "Bergen")),
            "Expected subject.address.city to be \"Bergen\" with a length of 6, but \"Oslo\" has a length of 4, differs near \"Osl\" (index 0).*"
        );
    }

    #[test]
    fn all_differences_are_reported_together() {
        should_fail_with_message!(
            customer("Ann", "Oslo").should().be_equivalent_to(&customer("Bob", "Bergen")),
            "Expected subject.name to be \"Bob\"*Expected subject.address.city to be \"Bergen\"*"
        );
    }

    #[test]
    fn excluded_members_are_ignored() {
        customer("Ann", "Oslo")
            .should()
            .be_equivalent_to_with(&customer("Ann", "Bergen"), |o| o.excluding("address.city"));
    }

    #[test]
    fn only_included_members_are_compared() {
        customer("Ann", "Oslo")
            .should()
            .be_equivalent_to_with(&customer("Bob", "Oslo"), |o| o.including("address.city"));
    }

    #[test]
    fn member_missing_on_expectation_is_reported() {
        let subject = Object::builder("Dto").field("name", "Ann").field("age", 36).build();
        let expectation = Object::builder("Entity").field("name", "Ann").build();

        should_fail_with_message!(
            (&subject).should().be_equivalent_to(&expectation),
            "Expectation has member age that the other object does not have.*"
        );
        subject.should().be_equivalent_to_with(&expectation, |o| o.excluding_missing_members());
    }

    #[test]
    fn objects_without_selected_members_fail() {
        should_fail_with_message!(
            customer("Ann", "Oslo").should().be_equivalent_to_with(&customer("Ann", "Oslo"), |o| o.excluding_members_where(|_| true)),
            "No members were found for comparison of subject.*"
        );
    }

    #[test]
    fn object_against_scalar_is_reported() {
        should_fail_with_message!(3.should().be_equivalent_to(&customer("Ann", "Oslo")), "Expected subject to be an object Customer*but found 3.*");
    }

    #[test]
    fn internal_members_take_part_when_included() {
        let account = |secret: &str| Object::builder("Account").field("Id", 1).internal("Secret", secret).build();

        account("a").should().be_equivalent_to(&account("b"));
        should_fail_with_message!(
            account("a").should().be_equivalent_to_with(&account("b"), |o| o.including_internal_members()),
            "Expected subject.Secret to be \"b\", but \"a\" differs near \"a\" (index 0).*"
        );
    }
}
