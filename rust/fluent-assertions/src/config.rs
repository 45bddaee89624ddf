//! Process-wide defaults, read by every assertion and changed rarely, usually once per test binary.
use crate::{equivalency::EquivalencyOptions, formatting::FormattingOptions};
use lazy_static::lazy_static;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

lazy_static! {
    static ref EQUIVALENCY_DEFAULTS: RwLock<Arc<EquivalencyOptions>> = RwLock::new(Arc::new(EquivalencyOptions::default()));
    static ref EQUIVALENCY_UPDATE: Mutex<()> = Mutex::new(());
    static ref FORMATTING_DEFAULTS: RwLock<FormattingOptions> = RwLock::new(FormattingOptions::default());
}

/// Entry point for the process-wide defaults.
///
/// ```
/// use fluent_assertions::*;
///
/// AssertionOptions::assert_equivalency_using(|o| o.with_max_recursion_depth(20));
/// AssertionOptions::equivalency_defaults().max_recursion_depth().should().be(Some(20));
///
/// AssertionOptions::reset_equivalency_defaults();
/// ```
pub struct AssertionOptions;

impl AssertionOptions {
    /// The options every `be_equivalent_to` starts from.
    pub fn equivalency_defaults() -> EquivalencyOptions {
        EQUIVALENCY_DEFAULTS.read().unwrap_or_else(PoisonError::into_inner).as_ref().clone()
    }

    /// Changes the defaults. Concurrent updates are applied one after the other, readers see
    /// either the old or the new options.
    pub fn assert_equivalency_using<F>(configure: F)
    where F: FnOnce(EquivalencyOptions) -> EquivalencyOptions {
        let _update = EQUIVALENCY_UPDATE.lock().unwrap_or_else(PoisonError::into_inner);
        let updated = Arc::new(configure(AssertionOptions::equivalency_defaults()));
        *EQUIVALENCY_DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = updated;

        tracing::debug!("[AssertionOptions::assert_equivalency_using()] equivalency defaults changed");
    }

    pub fn reset_equivalency_defaults() {
        AssertionOptions::assert_equivalency_using(|_| EquivalencyOptions::default());
    }

    pub fn formatting_defaults() -> FormattingOptions {
        *FORMATTING_DEFAULTS.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_formatting_defaults(options: FormattingOptions) {
        *FORMATTING_DEFAULTS.write().unwrap_or_else(PoisonError::into_inner) = options;

        tracing::debug!(?options, "[AssertionOptions::set_formatting_defaults()] formatting defaults changed");
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::thread;

    // Tests in this module change process-wide state. They only touch settings no other test
    // depends on and restore them before returning.

    #[test]
    fn concurrent_updates_are_not_lost() {
        let handles = (0..8)
            .map(|_| thread::spawn(|| AssertionOptions::assert_equivalency_using(|o| o.using_step(Noop))))
            .collect::<Vec<_>>();
        for handle in handles {
            handle.join().should().be_ok();
        }

        let steps = AssertionOptions::equivalency_defaults().user_steps().len();
        AssertionOptions::reset_equivalency_defaults();

        steps.should().be_greater_than_or_equal_to(8);
    }

    struct Noop;

    impl EquivalencyStep for Noop {
        fn can_handle(&self, _: &EquivalencyValidationContext<'_>, _: &Comparands<'_>) -> bool {
            false
        }

        fn handle(&self, _: &EquivalencyValidationContext<'_>, _: &Comparands<'_>, _: &mut EquivalencyValidator<'_>) -> EquivalencyResult {
            EquivalencyResult::ContinueWithNext
        }
    }

    #[test]
    fn configure_may_read_the_current_defaults() {
        AssertionOptions::assert_equivalency_using(|o| {
            let _current = AssertionOptions::equivalency_defaults();
            o
        });
    }
}
