use super::{node::Node, options::EquivalencyOptions, selection::SelectedMember};
use crate::{
    scope::Assertion,
    value::{short_type_name, Member, Object, Value},
};

/// Finds the expectation member a selected subject member is compared with.
///
/// Registered rules are asked in order and the first match wins. When none matches, the name
/// based rule runs, reporting a missing counterpart unless missing members are excluded.
///
/// ```
/// use fluent_assertions::*;
///
/// struct StripIdSuffix;
///
/// impl MemberMatchingRule for StripIdSuffix {
///     fn match_member(&self, member: &SelectedMember, expectation: &Object, _: &Node, _: &EquivalencyOptions) -> Option<Member> {
///         member.info.name.strip_suffix("Id").and_then(|name| expectation.member(name))
///     }
/// }
///
/// let subject = Object::builder("Dto").field("NameId", "Ann").build();
/// let expectation = Object::builder("Entity").field("Name", "Ann").build();
///
/// subject.should().be_equivalent_to_with(&expectation, |o| o.using_matching_rule(StripIdSuffix));
/// ```
pub trait MemberMatchingRule: Send + Sync {
    fn match_member(&self, member: &SelectedMember, expectation: &Object, node: &Node, options: &EquivalencyOptions) -> Option<Member>;

    fn describe(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

pub struct MustMatchByNameRule;

impl MemberMatchingRule for MustMatchByNameRule {
    fn match_member(&self, member: &SelectedMember, expectation: &Object, node: &Node, _: &EquivalencyOptions) -> Option<Member> {
        let matched = expectation.member(&member.info.name);
        if matched.is_none() {
            Assertion::current().with_context(node.description()).fail_with(
                "Expectation has member {0} that the other object does not have.",
                &[Value::literal(member.info.path_text())],
            );
        }
        matched
    }

    fn describe(&self) -> String {
        "Match members by name (or report missing ones)".to_owned()
    }
}

pub struct TryMatchByNameRule;

impl MemberMatchingRule for TryMatchByNameRule {
    fn match_member(&self, member: &SelectedMember, expectation: &Object, _: &Node, _: &EquivalencyOptions) -> Option<Member> {
        expectation.member(&member.info.name)
    }

    fn describe(&self) -> String {
        "Match members by name (or skip missing ones)".to_owned()
    }
}

pub(crate) fn find_expectation_member(
    member: &SelectedMember,
    expectation: &Object,
    node: &Node,
    options: &EquivalencyOptions,
) -> Option<Member> {
    options
        .matching_rules()
        .iter()
        .find_map(|rule| rule.match_member(member, expectation, node, options))
        .or_else(|| options.builtin_matching_rule().match_member(member, expectation, node, options))
}
