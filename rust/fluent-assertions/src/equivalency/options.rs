use super::{
    matching::{MemberMatchingRule, MustMatchByNameRule, TryMatchByNameRule},
    node::{MemberInfo, MemberPath},
    rules::{AssertionContext, AssertionRule, RuleCondition, TypedAssertionRule},
    selection::{
        AllMembersSelectionRule, AllPublicMembersSelectionRule, ExcludeMemberByPathSelectionRule, ExcludeMemberByPredicateSelectionRule,
        IncludeMemberByPathSelectionRule, MemberSelectionRule,
    },
    steps::BuiltinStep,
    EquivalencyStep,
};
use crate::value::{short_type_name, FromValue};
use derivative::Derivative;
use std::{
    fmt::{Display, Formatter},
    marker::PhantomData,
    sync::Arc,
};

pub type MemberPredicate = Arc<dyn Fn(&MemberInfo) -> bool + Send + Sync>;

/// What to do when the same pair of objects is met again below itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CyclicReferenceHandling {
    /// Report a failure for the node closing the cycle.
    ThrowException,
    /// Treat the node as equivalent and stop descending.
    Ignore,
}

/// Configuration of one structural comparison, built fluently from the process-wide defaults.
///
/// ```
/// use fluent_assertions::*;
///
/// let options = EquivalencyOptions::default()
///     .excluding("Id")
///     .with_strict_ordering()
///     .comparing_enums_by_name();
///
/// options.to_string().should().contain("Exclude member Id");
/// ```
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct EquivalencyOptions {
    include_internal_members: bool,
    use_runtime_types: bool,
    compare_enums_by_name: bool,
    cyclic_reference_handling: CyclicReferenceHandling,
    max_recursion_depth: Option<usize>,
    exclude_missing_members: bool,
    strict_ordering: bool,
    tracing: bool,
    #[derivative(Debug = "ignore")]
    strict_ordering_predicates: Vec<MemberPredicate>,
    #[derivative(Debug = "ignore")]
    selection_rules: Vec<Arc<dyn MemberSelectionRule>>,
    #[derivative(Debug = "ignore")]
    matching_rules: Vec<Arc<dyn MemberMatchingRule>>,
    #[derivative(Debug = "ignore")]
    assertion_rules: Vec<Arc<dyn AssertionRule>>,
    #[derivative(Debug = "ignore")]
    user_steps: Vec<Arc<dyn EquivalencyStep>>,
    builtin_steps: Vec<BuiltinStep>,
}

impl Default for EquivalencyOptions {
    fn default() -> Self {
        EquivalencyOptions {
            include_internal_members: false,
            use_runtime_types: false,
            compare_enums_by_name: false,
            cyclic_reference_handling: CyclicReferenceHandling::ThrowException,
            max_recursion_depth: Some(10),
            exclude_missing_members: false,
            strict_ordering: false,
            tracing: false,
            strict_ordering_predicates: Vec::new(),
            selection_rules: Vec::new(),
            matching_rules: Vec::new(),
            assertion_rules: Vec::new(),
            user_steps: Vec::new(),
            builtin_steps: BuiltinStep::ALL.to_vec(),
        }
    }
}

fn parse_path(path: &str) -> MemberPath {
    MemberPath::parse(path).unwrap_or_else(|e| panic!("{}", e))
}

impl EquivalencyOptions {
    /// Leaves out the member at `path`, such as `Id` or `Lines[].Price`.
    ///
    /// Panics when `path` is not a valid member path.
    pub fn excluding(self, path: &str) -> Self {
        self.using_selection_rule(ExcludeMemberByPathSelectionRule::new(parse_path(path)))
    }

    pub fn excluding_members_where<P>(self, predicate: P) -> Self
    where P: Fn(&MemberInfo) -> bool + Send + Sync + 'static {
        self.using_selection_rule(ExcludeMemberByPredicateSelectionRule::new(Arc::new(predicate)))
    }

    /// Compares only the members at the given paths, the standard selection is switched off.
    ///
    /// Panics when `path` is not a valid member path.
    pub fn including(self, path: &str) -> Self {
        self.using_selection_rule(IncludeMemberByPathSelectionRule::new(parse_path(path)))
    }

    pub fn including_internal_members(mut self) -> Self {
        self.include_internal_members = true;
        self
    }

    pub fn excluding_internal_members(mut self) -> Self {
        self.include_internal_members = false;
        self
    }

    /// Subject members without a counterpart on the expectation are skipped instead of reported.
    pub fn excluding_missing_members(mut self) -> Self {
        self.exclude_missing_members = true;
        self
    }

    pub fn using_selection_rule(mut self, rule: impl MemberSelectionRule + 'static) -> Self {
        self.selection_rules.push(Arc::new(rule));
        self
    }

    pub fn using_matching_rule(mut self, rule: impl MemberMatchingRule + 'static) -> Self {
        self.matching_rules.push(Arc::new(rule));
        self
    }

    pub fn using_rule(mut self, rule: Arc<dyn AssertionRule>) -> Self {
        self.assertion_rules.push(rule);
        self
    }

    /// Starts an assertion-rule override for nodes whose expectation converts to `T`.
    ///
    /// ```
    /// use fluent_assertions::*;
    ///
    /// let subject = Object::builder("Product").field("Price", 10.004).build();
    /// let expectation = Object::builder("Product").field("Price", 10.0).build();
    ///
    /// subject.should().be_equivalent_to_with(&expectation, |o| {
    ///     o.using::<f64, _>(|ctx| {
    ///         ctx.subject.should().be_close_to(ctx.expectation, 0.01);
    ///     })
    ///     .when_type_is::<f64>()
    /// });
    /// ```
    pub fn using<T, A>(self, action: A) -> Restriction<T>
    where
        T: FromValue + 'static,
        A: Fn(AssertionContext<T>) + Send + Sync + 'static,
    {
        Restriction {
            options: self,
            action: Arc::new(action),
            phantom: PhantomData,
        }
    }

    pub fn using_step(mut self, step: impl EquivalencyStep + 'static) -> Self {
        self.user_steps.push(Arc::new(step));
        self
    }

    /// Removes a built-in step. Nodes only that step could handle are then reported as unhandled.
    pub fn without_builtin_step(mut self, step: BuiltinStep) -> Self {
        self.builtin_steps.retain(|s| *s != step);
        self
    }

    pub fn with_strict_ordering(mut self) -> Self {
        self.strict_ordering = true;
        self
    }

    pub fn without_strict_ordering(mut self) -> Self {
        self.strict_ordering = false;
        self.strict_ordering_predicates.clear();
        self
    }

    pub fn with_strict_ordering_for<P>(mut self, predicate: P) -> Self
    where P: Fn(&MemberInfo) -> bool + Send + Sync + 'static {
        self.strict_ordering_predicates.push(Arc::new(predicate));
        self
    }

    pub fn respecting_runtime_types(mut self) -> Self {
        self.use_runtime_types = true;
        self
    }

    pub fn respecting_declared_types(mut self) -> Self {
        self.use_runtime_types = false;
        self
    }

    pub fn comparing_enums_by_name(mut self) -> Self {
        self.compare_enums_by_name = true;
        self
    }

    pub fn comparing_enums_by_value(mut self) -> Self {
        self.compare_enums_by_name = false;
        self
    }

    pub fn ignoring_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::Ignore;
        self
    }

    pub fn throwing_on_cyclic_references(mut self) -> Self {
        self.cyclic_reference_handling = CyclicReferenceHandling::ThrowException;
        self
    }

    /// Panics when `depth` is zero.
    pub fn with_max_recursion_depth(mut self, depth: usize) -> Self {
        if depth == 0 {
            panic!("{}", crate::error::ConfigurationError::ZeroRecursionDepth);
        }
        self.max_recursion_depth = Some(depth);
        self
    }

    pub fn allowing_infinite_recursion(mut self) -> Self {
        self.max_recursion_depth = None;
        self
    }

    /// Appends the visited nodes and the steps that handled them to the failure report.
    pub fn with_tracing(mut self) -> Self {
        self.tracing = true;
        self
    }

    pub fn include_internal_members(&self) -> bool {
        self.include_internal_members
    }

    pub fn use_runtime_types(&self) -> bool {
        self.use_runtime_types
    }

    pub fn compare_enums_by_name(&self) -> bool {
        self.compare_enums_by_name
    }

    pub fn cyclic_reference_handling(&self) -> CyclicReferenceHandling {
        self.cyclic_reference_handling
    }

    pub fn max_recursion_depth(&self) -> Option<usize> {
        self.max_recursion_depth
    }

    pub fn tracing_enabled(&self) -> bool {
        self.tracing
    }

    pub fn is_strict_ordering_for(&self, member: &MemberInfo) -> bool {
        self.strict_ordering || self.strict_ordering_predicates.iter().any(|p| p(member))
    }

    pub fn selection_rules(&self) -> &[Arc<dyn MemberSelectionRule>] {
        &self.selection_rules
    }

    pub(crate) fn standard_selection_rule(&self) -> &'static dyn MemberSelectionRule {
        if self.include_internal_members {
            &AllMembersSelectionRule
        } else {
            &AllPublicMembersSelectionRule
        }
    }

    pub fn matching_rules(&self) -> &[Arc<dyn MemberMatchingRule>] {
        &self.matching_rules
    }

    pub(crate) fn builtin_matching_rule(&self) -> &'static dyn MemberMatchingRule {
        if self.exclude_missing_members {
            &TryMatchByNameRule
        } else {
            &MustMatchByNameRule
        }
    }

    /// In registration order, applied most recent first.
    pub fn assertion_rules(&self) -> &[Arc<dyn AssertionRule>] {
        &self.assertion_rules
    }

    pub fn user_steps(&self) -> &[Arc<dyn EquivalencyStep>] {
        &self.user_steps
    }

    pub fn builtin_steps(&self) -> &[BuiltinStep] {
        &self.builtin_steps
    }
}

impl Display for EquivalencyOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut lines = vec![
            if self.use_runtime_types { "Use runtime types and members" } else { "Use declared types and members" }.to_owned(),
            if self.compare_enums_by_name { "Compare enums by name" } else { "Compare enums by value" }.to_owned(),
            match self.cyclic_reference_handling {
                CyclicReferenceHandling::ThrowException => "Report cyclic references",
                CyclicReferenceHandling::Ignore => "Ignore cyclic references",
            }
            .to_owned(),
            match self.max_recursion_depth {
                Some(depth) => format!("Stop at recursion depth {}", depth),
                None => "Allow infinite recursion".to_owned(),
            },
        ];

        if self.strict_ordering {
            lines.push("Use strict ordering of collections".to_owned());
        } else if self.strict_ordering_predicates.is_empty() {
            lines.push("Without strict ordering of collections".to_owned());
        } else {
            lines.push("Use strict ordering of collections matching a predicate".to_owned());
        }

        if !self.selection_rules.iter().any(|r| r.overrides_standard_includes()) {
            lines.push(self.standard_selection_rule().describe());
        }
        lines.extend(self.selection_rules.iter().map(|r| r.describe()));
        lines.extend(self.matching_rules.iter().map(|r| r.describe()));
        lines.push(self.builtin_matching_rule().describe());
        lines.extend(self.assertion_rules.iter().rev().map(|r| r.describe()));
        lines.extend(self.user_steps.iter().map(|s| s.describe()));

        for line in lines {
            writeln!(f, "- {}", line)?;
        }

        Ok(())
    }
}

/// Pending assertion-rule override, completed by [`Restriction::when`] or [`Restriction::when_type_is`].
pub struct Restriction<T> {
    options: EquivalencyOptions,
    action: Arc<dyn Fn(AssertionContext<T>) + Send + Sync>,
    phantom: PhantomData<fn() -> T>,
}

impl<T: FromValue + 'static> Restriction<T> {
    pub fn when<P>(self, predicate: P) -> EquivalencyOptions
    where P: Fn(&MemberInfo) -> bool + Send + Sync + 'static {
        let rule = TypedAssertionRule::new(self.action, RuleCondition::Predicate(Arc::new(predicate)));
        self.options.using_rule(Arc::new(rule))
    }

    pub fn when_type_is<U: ?Sized>(self) -> EquivalencyOptions {
        let type_name = short_type_name(std::any::type_name::<U>());
        let rule = TypedAssertionRule::new(self.action, RuleCondition::Type(type_name));
        self.options.using_rule(Arc::new(rule))
    }
}
