use super::{
    node::Node,
    options::{CyclicReferenceHandling, EquivalencyOptions},
    Comparands, EquivalencyResult, EquivalencyStep, EquivalencyValidationContext,
};
use crate::{
    scope::{AssertionScope, Reason},
    value::{Inspect, Value},
};

/// Walks two graphs depth first and reports every difference into the current scope.
///
/// ```
/// use fluent_assertions::*;
///
/// let subject = Object::builder("Point").field("X", 1).field("Y", 2).build();
/// let expectation = Object::builder("Point").field("X", 1).field("Y", 3).build();
/// let options = EquivalencyOptions::default();
///
/// let scope = AssertionScope::new();
/// EquivalencyValidator::new(&options, None).assert_equality(&subject, &expectation, Some("point"));
///
/// scope.discard().should().contain("Expected point.Y to be 3, but found 2.".to_owned());
/// ```
pub struct EquivalencyValidator<'o> {
    options: &'o EquivalencyOptions,
    reason: Option<&'o Reason>,
    objects_on_path: Vec<(usize, usize)>,
    trace: Vec<String>,
}

impl<'o> EquivalencyValidator<'o> {
    pub fn new(options: &'o EquivalencyOptions, reason: Option<&'o Reason>) -> Self {
        EquivalencyValidator {
            options,
            reason,
            objects_on_path: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn options(&self) -> &'o EquivalencyOptions {
        self.options
    }

    /// Compares the two roots. Failures are collected in a nested scope that carries the
    /// configuration as a reportable and merges into the caller's scope when done.
    pub fn assert_equality(&mut self, subject: &Value, expectation: &Value, identifier: Option<&str>) {
        let scope = AssertionScope::new();
        scope.add_reportable("configuration", self.options.to_string());

        tracing::debug!(
            identifier,
            expectation_type = expectation.type_name(),
            "[EquivalencyValidator::assert_equality()] comparing object graphs"
        );

        let root = Node::root(identifier, expectation.type_name());
        self.recursively_assert_equality(Comparands::new(subject, expectation), root);

        if self.options.tracing_enabled() && scope.has_failures() {
            scope.add_reportable("trace", self.trace.join("\n"));
        }
    }

    /// Runs the step pipeline for `node`. Steps call this again for the children of the node.
    pub fn recursively_assert_equality(&mut self, comparands: Comparands<'_>, node: Node) {
        let context = EquivalencyValidationContext {
            node,
            options: self.options,
            reason: self.reason,
        };

        if !self.should_continue_this_deep(&context) {
            return;
        }

        let identity = match (comparands.subject.identity(), comparands.expectation.identity()) {
            (None, None) => None,
            (subject, expectation) => Some((subject.unwrap_or_default(), expectation.unwrap_or_default())),
        };

        if let Some(identity) = identity {
            if self.objects_on_path.contains(&identity) {
                self.handle_cyclic_reference(&context, &comparands);
                return;
            }
            self.objects_on_path.push(identity);
        }

        self.run_steps(&context, &comparands);

        if identity.is_some() {
            self.objects_on_path.pop();
        }
    }

    fn should_continue_this_deep(&self, context: &EquivalencyValidationContext<'_>) -> bool {
        match self.options.max_recursion_depth() {
            Some(max) if context.node.depth() > max => {
                context
                    .assertion()
                    .fail_with("The maximum recursion depth of {0} was reached at {context:subject}{reason}.", &[max.to_value()]);
                false
            },
            _ => true,
        }
    }

    fn handle_cyclic_reference(&mut self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) {
        tracing::trace!(path = %context.node.description(), "[EquivalencyValidator::handle_cyclic_reference()] cyclic reference");

        if self.options.cyclic_reference_handling() == CyclicReferenceHandling::ThrowException {
            context.assertion().fail_with(
                "Expected {context:subject} to be {0}{reason}, but it contains a cyclic reference.",
                &[comparands.expectation.clone()],
            );
        }
    }

    fn run_steps(&mut self, context: &EquivalencyValidationContext<'_>, comparands: &Comparands<'_>) {
        let options = self.options;
        let user_steps = options.user_steps().iter().map(|s| s.as_ref() as &dyn EquivalencyStep);
        let builtin_steps = options.builtin_steps().iter().map(|s| s as &dyn EquivalencyStep);

        for step in user_steps.chain(builtin_steps) {
            if !step.can_handle(context, comparands) {
                continue;
            }

            tracing::trace!(
                path = %context.node.description(),
                step = %step.describe(),
                "[EquivalencyValidator::run_steps()] step handles node"
            );
            if options.tracing_enabled() {
                self.trace.push(format!("{}: {}", context.node.description(), step.describe()));
            }

            if step.handle(context, comparands, self) == EquivalencyResult::AssertionCompleted {
                return;
            }
        }

        context.assertion().fail_with(
            "No equivalency step was found to compare {context:subject} of kind {0} with an expectation of kind {1}.",
            &[
                Value::literal(comparands.subject.kind().to_string()),
                Value::literal(comparands.expectation.kind().to_string()),
            ],
        );
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::rc::Rc;

    fn node_pointing_to_itself(name: &str) -> Value {
        let node = Object::new("Node");
        node.set("Name", name);
        node.set("Parent", Rc::clone(&node));
        Value::Object(node)
    }

    #[test]
    fn cyclic_graphs_terminate_with_failure_by_default() {
        should_fail_with_message!(
            node_pointing_to_itself("a").should().be_equivalent_to(&node_pointing_to_itself("a")),
            "Expected subject.Parent to be*but it contains a cyclic reference.*"
        );
    }

    #[test]
    fn cyclic_graphs_can_be_ignored() {
        node_pointing_to_itself("a")
            .should()
            .be_equivalent_to_with(&node_pointing_to_itself("a"), |o| o.ignoring_cyclic_references());
    }

    #[test]
    fn differences_in_cyclic_graphs_are_still_found() {
        should_fail_with_message!(
            node_pointing_to_itself("a")
                .should()
                .be_equivalent_to_with(&node_pointing_to_itself("b"), |o| o.ignoring_cyclic_references()),
            "Expected subject.Name to be \"b\"*"
        );
    }

    #[test]
    fn recursion_depth_is_limited() {
        fn chain(length: usize) -> Value {
            let mut value = Object::builder("Link").field("Next", Value::Null).build();
            for _ in 0..length {
                value = Object::builder("Link").field("Next", value).build();
            }
            value
        }

        should_fail_with_message!(
            chain(5).should().be_equivalent_to_with(&chain(5), |o| o.with_max_recursion_depth(3)),
            "The maximum recursion depth of 3 was reached at subject.Next.Next.Next.Next.*"
        );
        chain(5).should().be_equivalent_to_with(&chain(5), |o| o.allowing_infinite_recursion());
    }

    #[test]
    fn unhandled_nodes_are_reported() {
        should_fail_with_message!(
            (1.5).should().be_equivalent_to_with(&1.5, |o| o.without_builtin_step(BuiltinStep::SimpleEquality)),
            "No equivalency step was found to compare subject of kind Float with an expectation of kind Float.*"
        );
    }

    #[test]
    fn configuration_is_reported_with_failures() {
        should_fail_with_message!(1.should().be_equivalent_to(&2), "Expected subject to be 2, but found 1.*With configuration:*- Compare enums by value*");
    }

    #[test]
    fn trace_is_reported_when_enabled() {
        let subject = Object::builder("Point").field("X", 1).build();
        let expectation = Object::builder("Point").field("X", 2).build();

        should_fail_with_message!(
            subject.should().be_equivalent_to_with(&expectation, |o| o.with_tracing()),
            "*With trace:*subject: Structural*subject.X: SimpleEquality*"
        );
    }
}
