//! Collecting failures instead of panicking on the first one.
//!
//! Every thread owns a stack of open scopes. An [`AssertionScope`] pushes a frame when created and
//! pops it when dropped, so the stack unwinds together with the call stack, panics included.
//! Failures land in the innermost frame. Closing a nested scope hands its failures to the parent,
//! closing the outermost one panics with everything collected so far.
//!
//! ```
//! use fluent_assertions::*;
//!
//! should_fail_with_message!(
//!     {
//!         let _scope = AssertionScope::new();
//!         5.should().be(6);
//!         "abc".should().start_with("x");
//!     },
//!     "Expected value to be 6, but found 5.*Expected string to start with \"x\", but \"abc\" does not."
//! );
//! ```
use crate::{error::AssertionError, value::Value};
use std::{
    cell::RefCell,
    marker::PhantomData,
    rc::Rc,
    sync::atomic::{AtomicU64, Ordering},
};

mod assertion;
mod message;

pub use assertion::{Assertion, Continuation, GivenSelector};
pub use message::Reason;
pub(crate) use message::FailureMessageBuilder;

type ContextProvider = Rc<dyn Fn() -> String>;

struct ScopeState {
    id: u64,
    context: Option<ContextProvider>,
    reason: Option<Reason>,
    failures: Vec<String>,
    reportables: Vec<(String, String)>,
    discarded: bool,
}

impl ScopeState {
    fn record(&mut self, failure: String) {
        if !self.failures.contains(&failure) {
            self.failures.push(failure);
        }
    }

    fn add_reportable(&mut self, key: String, value: String) {
        match self.reportables.iter_mut().find(|(k, _)| *k == key) {
            Some(existing) => existing.1 = value,
            None => self.reportables.push((key, value)),
        }
    }
}

thread_local! {
    static SCOPES: RefCell<Vec<ScopeState>> = RefCell::new(Vec::new());
}

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

fn with_scopes<R>(f: impl FnOnce(&mut Vec<ScopeState>) -> R) -> R {
    SCOPES.with(|scopes| f(&mut scopes.borrow_mut()))
}

fn with_scope<R>(id: u64, f: impl FnOnce(&mut ScopeState) -> R) -> Option<R> {
    with_scopes(|scopes| scopes.iter_mut().find(|s| s.id == id).map(f))
}

/// What a failure message needs from the innermost scope, read without holding the stack borrow.
pub(crate) struct ScopeEnvironment {
    pub context: Option<ContextProvider>,
    pub reason: Option<Reason>,
}

/// Context and reason visible to a failure reported in the scope `id`, or in the innermost scope.
pub(crate) fn environment(id: Option<u64>) -> Option<ScopeEnvironment> {
    with_scopes(|scopes| {
        let position = match id {
            Some(id) => scopes.iter().position(|s| s.id == id)?,
            None => scopes.len().checked_sub(1)?,
        };
        let visible = &scopes[..=position];

        Some(ScopeEnvironment {
            context: visible.iter().rev().find_map(|s| s.context.clone()),
            reason: visible.iter().rev().find_map(|s| s.reason.clone()),
        })
    })
}

/// Records a failure in the innermost scope. Returns `false` when no scope is open.
pub(crate) fn record_failure(failure: String) -> bool {
    with_scopes(|scopes| match scopes.last_mut() {
        Some(scope) => {
            scope.record(failure);
            true
        },
        None => false,
    })
}

/// Runs `f` with an empty scope stack, restoring the current one afterwards, even on panic.
pub(crate) fn isolated<R>(f: impl FnOnce() -> R) -> R {
    struct Restore(Option<Vec<ScopeState>>);

    impl Drop for Restore {
        fn drop(&mut self) {
            if let Some(saved) = self.0.take() {
                with_scopes(|scopes| *scopes = saved);
            }
        }
    }

    let _restore = Restore(Some(with_scopes(std::mem::take)));
    f()
}

/// A unit of failure collection. See the [module documentation](self).
///
/// The guard is bound to the thread that created it.
pub struct AssertionScope {
    id: u64,
    closed: bool,
    _not_send: PhantomData<Rc<()>>,
}

impl AssertionScope {
    pub fn new() -> Self {
        AssertionScope::push(None)
    }

    /// A scope whose label replaces the `{context}` of every failure reported inside it.
    pub fn named(label: impl Into<String>) -> Self {
        let label = label.into();
        AssertionScope::push(Some(Rc::new(move || label.clone())))
    }

    /// Like [`AssertionScope::named`], the label is only computed when a failure needs it.
    pub fn with_context<F>(provider: F) -> Self
    where F: Fn() -> String + 'static {
        AssertionScope::push(Some(Rc::new(provider)))
    }

    fn push(context: Option<ContextProvider>) -> Self {
        let id = NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed);
        let depth = with_scopes(|scopes| {
            scopes.push(ScopeState {
                id,
                context,
                reason: None,
                failures: Vec::new(),
                reportables: Vec::new(),
                discarded: false,
            });
            scopes.len()
        });

        tracing::trace!(id, depth, "[AssertionScope::push()] scope opened");

        AssertionScope {
            id,
            closed: false,
            _not_send: PhantomData,
        }
    }

    /// Number of scopes open on the current thread.
    pub fn depth() -> usize {
        with_scopes(|scopes| scopes.len())
    }

    /// Reason used by assertions inside this scope that do not provide their own.
    pub fn because(self, reason: impl Into<Reason>) -> Self {
        let reason = reason.into();
        with_scope(self.id, |s| s.reason = Some(reason));
        self
    }

    /// Reports a failure directly into this scope.
    pub fn fail_with(&self, template: &str, args: &[Value]) {
        let message = FailureMessageBuilder::for_scope(Some(self.id), None, None, None).build(template, args);
        with_scope(self.id, |s| s.record(message));
    }

    pub fn failures(&self) -> Vec<String> {
        with_scope(self.id, |s| s.failures.clone()).unwrap_or_default()
    }

    pub fn has_failures(&self) -> bool {
        with_scope(self.id, |s| !s.failures.is_empty()).unwrap_or(false)
    }

    /// Returns the failures collected so far and stops them from propagating.
    pub fn discard(&self) -> Vec<String> {
        with_scope(self.id, |s| {
            s.discarded = true;
            s.failures.clone()
        })
        .unwrap_or_default()
    }

    /// Attaches context shown once after all failures, such as the equivalency configuration.
    pub fn add_reportable(&self, key: impl Into<String>, value: impl Into<String>) {
        let (key, value) = (key.into(), value.into());
        with_scope(self.id, |s| s.add_reportable(key, value));
    }

    /// Closes the scope and returns the aggregate instead of panicking.
    ///
    /// A nested scope always returns `Ok`, its failures move to the parent.
    pub fn release(mut self) -> Result<(), AssertionError> {
        match self.close() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> Option<AssertionError> {
        if self.closed {
            return None;
        }
        self.closed = true;

        let id = self.id;
        with_scopes(|scopes| {
            let position = scopes.iter().position(|s| s.id == id)?;
            if position + 1 != scopes.len() {
                tracing::warn!(id, "[AssertionScope::close()] scope closed while inner scopes are still open");
            }
            let state = scopes.remove(position);

            tracing::trace!(id, failures = state.failures.len(), discarded = state.discarded, "[AssertionScope::close()] scope closed");

            if state.discarded {
                return None;
            }

            match position.checked_sub(1) {
                Some(parent) => {
                    let parent = &mut scopes[parent];
                    for failure in state.failures {
                        parent.record(failure);
                    }
                    for (key, value) in state.reportables {
                        if !parent.reportables.iter().any(|(k, _)| *k == key) {
                            parent.reportables.push((key, value));
                        }
                    }
                    None
                },
                None if state.failures.is_empty() => None,
                None => Some(AssertionError::new(state.failures, state.reportables)),
            }
        })
    }
}

impl Default for AssertionScope {
    fn default() -> Self {
        AssertionScope::new()
    }
}

impl Drop for AssertionScope {
    fn drop(&mut self) {
        if let Some(error) = self.close() {
            if std::thread::panicking() {
                tracing::error!(%error, "[AssertionScope::drop()] assertion failures dropped while unwinding");
            } else {
                panic!("{}", error);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn failures_are_aggregated_at_outermost_scope() {
        should_fail_with_message!(
            {
                let _scope = AssertionScope::new();
                1.should().be(2);
                3.should().be(4);
            },
            "Expected value to be 2, but found 1.

            Expected value to be 4, but found 3."
        );
    }

    #[test]
    fn identical_failures_are_reported_once() {
        let scope = AssertionScope::new();
        for _ in 0..3 {
            scope.fail_with("Same failure", &[]);
        }

        scope.discard().should().equal(&vec!["Same failure".to_owned()]);
    }

    #[test]
    fn discarded_inner_scope_never_surfaces() {
        let outer = AssertionScope::new();
        outer.fail_with("from A", &[]);
        {
            let middle = AssertionScope::new();
            middle.fail_with("from B", &[]);
            {
                let inner = AssertionScope::new();
                inner.fail_with("from C", &[]);
                inner.discard();
            }
        }

        outer.discard().should().equal(&vec!["from A".to_owned(), "from B".to_owned()]);
    }

    #[test]
    fn duplicates_across_levels_collapse() {
        let outer = AssertionScope::new();
        for _ in 0..2 {
            outer.fail_with("shared", &[]);
        }
        {
            let inner = AssertionScope::new();
            for _ in 0..3 {
                inner.fail_with("shared", &[]);
            }
            inner.fail_with("inner only", &[]);
        }

        outer.discard().should().equal(&vec!["shared".to_owned(), "inner only".to_owned()]);
    }

    #[test]
    fn discard_keeps_deduplicating() {
        let scope = AssertionScope::new();
        scope.fail_with("first", &[]);
        scope.discard();
        scope.fail_with("first", &[]);
        scope.fail_with("second", &[]);

        scope.failures().should().have_length(2);
    }

    #[test]
    fn release_returns_aggregate() {
        let scope = AssertionScope::new();
        scope.fail_with("broken", &[]);
        scope.add_reportable("configuration", "- strict");

        let error = scope.release().should().be_err().which_value();
        error.failures().should().have_length(1);
        error.to_string().should().be("broken\n\nWith configuration:\n- strict".to_owned());
        AssertionScope::depth().should().be(0);
    }

    #[test]
    fn release_of_nested_scope_moves_failures_to_parent() {
        let outer = AssertionScope::new();
        let inner = AssertionScope::new();
        inner.fail_with("nested", &[]);

        inner.release().should().be_ok();
        outer.discard().should().equal(&vec!["nested".to_owned()]);
    }

    #[test]
    fn empty_scope_closes_silently() {
        let scope = AssertionScope::new();
        scope.has_failures().should().be_false();
        scope.release().should().be_ok();
    }

    #[test]
    fn label_prefixes_templates_without_context() {
        let scope = AssertionScope::named("customer");
        scope.fail_with("no placeholder here", &[]);

        scope.discard().should().equal(&vec!["customer: no placeholder here".to_owned()]);
    }

    #[test]
    fn child_scope_inherits_enclosing_label() {
        let outer = AssertionScope::named("order");
        {
            let _inner = AssertionScope::new();
            5.should().be(6);
        }

        outer.discard().should().equal(&vec!["Expected order to be 6, but found 5.".to_owned()]);
    }

    #[test]
    fn own_label_wins_over_enclosing_label() {
        let outer = AssertionScope::named("order");
        {
            let _inner = AssertionScope::with_context(|| "line".to_owned());
            5.should().be(6);
        }

        outer.discard().should().equal(&vec!["Expected line to be 6, but found 5.".to_owned()]);
    }

    #[test]
    fn scope_reason_applies_to_assertions_without_one() {
        let scope = AssertionScope::new().because("totals must match");
        5.should().be(6);

        scope.discard().should().equal(&vec!["Expected value to be 6 because totals must match, but found 5.".to_owned()]);
    }

    #[test]
    fn failures_survive_a_panicking_assertion() {
        let outer = AssertionScope::new();

        let result = std::panic::catch_unwind(|| {
            let _inner = AssertionScope::new();
            1.should().be(2);
            panic!("user code blew up");
        });

        result.should().be_err();
        outer.discard().should().equal(&vec!["Expected value to be 2, but found 1.".to_owned()]);
    }

    #[test]
    fn scopes_are_thread_confined() {
        let _scope = AssertionScope::new();

        std::thread::spawn(|| AssertionScope::depth()).join().should().be_ok().with_value(0);
        AssertionScope::depth().should().be(1);
    }
}
