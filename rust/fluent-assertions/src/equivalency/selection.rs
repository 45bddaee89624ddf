use super::{
    node::{MemberInfo, MemberPath, Node, PathSegment},
    options::{EquivalencyOptions, MemberPredicate},
};
use crate::value::{short_type_name, Member, Object};

/// A member picked for comparison, with the information rules get to see.
#[derive(Clone, Debug)]
pub struct SelectedMember {
    pub member: Member,
    pub info: MemberInfo,
}

impl SelectedMember {
    pub fn new(node: &Node, member: &Member) -> Self {
        let info = node
            .child(PathSegment::Member(member.name().to_owned()), member.declared_type(), member.value().type_name())
            .with_visibility(member.visibility())
            .info();

        SelectedMember {
            member: member.clone(),
            info,
        }
    }
}

/// What a selection rule may look at besides the current selection.
pub struct MemberSelectionContext<'a> {
    pub object: &'a Object,
    pub options: &'a EquivalencyOptions,
}

/// Decides which members of an object take part in the comparison.
///
/// Rules run in registration order, each receiving the previous selection. The standard rule
/// (all public members, or all members when internal ones are included) runs first, unless a
/// registered rule overrides it.
///
/// ```
/// use fluent_assertions::*;
///
/// struct ExcludeIdSuffix;
///
/// impl MemberSelectionRule for ExcludeIdSuffix {
///     fn select_members(&self, _: &Node, selected: Vec<SelectedMember>, _: &MemberSelectionContext<'_>) -> Vec<SelectedMember> {
///         selected.into_iter().filter(|m| !m.info.name.ends_with("Id")).collect()
///     }
/// }
///
/// let subject = Object::builder("Customer").field("Name", "Ann").field("CustomerId", 1).build();
/// let expectation = Object::builder("Customer").field("Name", "Ann").field("CustomerId", 2).build();
///
/// subject.should().be_equivalent_to_with(&expectation, |o| o.using_selection_rule(ExcludeIdSuffix));
/// ```
pub trait MemberSelectionRule: Send + Sync {
    fn overrides_standard_includes(&self) -> bool {
        false
    }

    fn select_members(&self, node: &Node, selected: Vec<SelectedMember>, context: &MemberSelectionContext<'_>) -> Vec<SelectedMember>;

    fn describe(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

fn add_members<'a>(
    node: &Node,
    mut selected: Vec<SelectedMember>,
    members: impl Iterator<Item = &'a Member>,
) -> Vec<SelectedMember> {
    for member in members {
        if !selected.iter().any(|s| s.member.name() == member.name()) {
            selected.push(SelectedMember::new(node, member));
        }
    }
    selected
}

/// Patterns without indices apply to every element of every collection on the way.
fn path_matches(path: &MemberPath, pattern: &MemberPath) -> bool {
    if pattern.has_indices() {
        path.matches(pattern)
    } else {
        path.members_only().matches(pattern)
    }
}

fn path_leads_to(path: &MemberPath, pattern: &MemberPath) -> bool {
    if pattern.has_indices() {
        path.is_ancestor_of(pattern)
    } else {
        path.members_only().is_ancestor_of(pattern)
    }
}

pub struct AllPublicMembersSelectionRule;

impl MemberSelectionRule for AllPublicMembersSelectionRule {
    fn select_members(&self, node: &Node, selected: Vec<SelectedMember>, context: &MemberSelectionContext<'_>) -> Vec<SelectedMember> {
        let members = context.object.members();
        add_members(node, selected, members.iter().filter(|m| m.is_public()))
    }

    fn describe(&self) -> String {
        "Include all public members".to_owned()
    }
}

pub struct AllMembersSelectionRule;

impl MemberSelectionRule for AllMembersSelectionRule {
    fn select_members(&self, node: &Node, selected: Vec<SelectedMember>, context: &MemberSelectionContext<'_>) -> Vec<SelectedMember> {
        let members = context.object.members();
        add_members(node, selected, members.iter())
    }

    fn describe(&self) -> String {
        "Include all public and internal members".to_owned()
    }
}

pub struct ExcludeMemberByPathSelectionRule {
    path: MemberPath,
}

impl ExcludeMemberByPathSelectionRule {
    pub fn new(path: MemberPath) -> Self {
        ExcludeMemberByPathSelectionRule { path }
    }
}

impl MemberSelectionRule for ExcludeMemberByPathSelectionRule {
    fn select_members(&self, _: &Node, mut selected: Vec<SelectedMember>, _: &MemberSelectionContext<'_>) -> Vec<SelectedMember> {
        selected.retain(|m| !path_matches(&m.info.path, &self.path));
        selected
    }

    fn describe(&self) -> String {
        format!("Exclude member {}", self.path)
    }
}

pub struct ExcludeMemberByPredicateSelectionRule {
    predicate: MemberPredicate,
}

impl ExcludeMemberByPredicateSelectionRule {
    pub fn new(predicate: MemberPredicate) -> Self {
        ExcludeMemberByPredicateSelectionRule { predicate }
    }
}

impl MemberSelectionRule for ExcludeMemberByPredicateSelectionRule {
    fn select_members(&self, _: &Node, mut selected: Vec<SelectedMember>, _: &MemberSelectionContext<'_>) -> Vec<SelectedMember> {
        selected.retain(|m| !(self.predicate)(&m.info));
        selected
    }

    fn describe(&self) -> String {
        "Exclude members matching a predicate".to_owned()
    }
}

/// Keeps the member at `path` and every member leading to it.
pub struct IncludeMemberByPathSelectionRule {
    path: MemberPath,
}

impl IncludeMemberByPathSelectionRule {
    pub fn new(path: MemberPath) -> Self {
        IncludeMemberByPathSelectionRule { path }
    }
}

impl MemberSelectionRule for IncludeMemberByPathSelectionRule {
    fn overrides_standard_includes(&self) -> bool {
        true
    }

    fn select_members(&self, node: &Node, selected: Vec<SelectedMember>, context: &MemberSelectionContext<'_>) -> Vec<SelectedMember> {
        let candidates = context
            .object
            .members()
            .iter()
            .map(|m| SelectedMember::new(node, m))
            .filter(|m| path_matches(&m.info.path, &self.path) || path_leads_to(&m.info.path, &self.path))
            .collect::<Vec<_>>();

        let mut selected = selected;
        for candidate in candidates {
            if !selected.iter().any(|s| s.member.name() == candidate.member.name()) {
                selected.push(candidate);
            }
        }
        selected
    }

    fn describe(&self) -> String {
        format!("Include member {}", self.path)
    }
}

/// Runs the standard rule and every registered rule for the members of `object` at `node`.
pub(crate) fn select_members(node: &Node, object: &Object, options: &EquivalencyOptions) -> Vec<SelectedMember> {
    let context = MemberSelectionContext { object, options };
    let rules = options.selection_rules();

    let mut selected = Vec::new();
    if !rules.iter().any(|r| r.overrides_standard_includes()) {
        selected = options.standard_selection_rule().select_members(node, selected, &context);
    }
    for rule in rules {
        selected = rule.select_members(node, selected, &context);
    }

    tracing::trace!(
        path = %node.description(),
        selected = selected.len(),
        "[selection::select_members()] members selected"
    );

    selected
}
