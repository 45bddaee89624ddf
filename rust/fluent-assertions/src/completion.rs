use crate::{utils::AndConstraint, value::Value, Assertions};
use futures::future::{self, Either};
use std::{future::Future, time::Duration};

/// Assertions on how long a [`Future`] takes.
///
/// The future is raced against a delay of the subject's [`Clock`](crate::Clock), by default the
/// tokio clock. When the delay wins the future is dropped and one failure is reported. Work the
/// future already handed off elsewhere, e.g. to a spawned task, keeps running.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
/// use std::time::Duration;
///
/// async { 42 }
///     .should()
///     .complete_within(Duration::from_millis(100))
///     .and()
///     .should()
///     .be(Some(42));
///
/// futures::future::pending::<()>().should().not_complete_within(Duration::from_millis(5));
/// ```
impl<Fut: Future> Assertions<Fut> {
    /// Awaits the future for at most `timeout`. Yields its output if it completed in time.
    pub async fn complete_within_async(self, timeout: Duration) -> AndConstraint<Option<Fut::Output>> {
        let assertion = self.assertion();
        let output = self.race(timeout).await;

        assertion
            .for_condition(output.is_some())
            .fail_with("Expected {context:task} to complete within {0}{reason}, but it did not.", &[Value::debug(&timeout)]);

        AndConstraint::new(output)
    }

    pub async fn not_complete_within_async(self, timeout: Duration) -> AndConstraint<()> {
        let assertion = self.assertion();
        let output = self.race(timeout).await;

        assertion
            .for_condition(output.is_none())
            .fail_with("Did not expect {context:task} to complete within {0}{reason}, but it did.", &[Value::debug(&timeout)]);

        AndConstraint::new(())
    }

    /// Blocking form of [`Assertions::complete_within_async`], driven by a current-thread runtime.
    ///
    /// Panics when called from inside a tokio runtime.
    pub fn complete_within(self, timeout: Duration) -> AndConstraint<Option<Fut::Output>> {
        block_on("complete_within", self.complete_within_async(timeout))
    }

    /// Blocking form of [`Assertions::not_complete_within_async`].
    pub fn not_complete_within(self, timeout: Duration) -> AndConstraint<()> {
        block_on("not_complete_within", self.not_complete_within_async(timeout))
    }

    async fn race(self, timeout: Duration) -> Option<Fut::Output> {
        let clock = self.clock();
        let timer = clock.start_timer();
        let operation = Box::pin(self.into_inner());
        let delay = clock.delay(timeout);

        let output = match future::select(operation, delay).await {
            Either::Left((output, _)) => Some(output),
            Either::Right(((), _)) => None,
        };

        tracing::debug!(
            elapsed = ?timer.elapsed(),
            ?timeout,
            completed = output.is_some(),
            "[Assertions::race()] awaited operation"
        );
        output
    }
}

fn block_on<F: Future>(method: &str, future: F) -> F::Output {
    if tokio::runtime::Handle::try_current().is_ok() {
        panic!("{}() cannot block inside an async runtime, use {}_async() instead", method, method);
    }

    match tokio::runtime::Builder::new_current_thread().enable_time().build() {
        Ok(runtime) => runtime.block_on(future),
        Err(e) => {
            tracing::error!(error = %e, "[completion::block_on()] failed to build runtime");
            panic!("{}() failed to build a runtime: {}", method, e)
        },
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use futures::future;
    use std::{sync::Arc, time::Duration};

    #[test]
    fn fast_operation_completes() {
        async { "done" }
            .should()
            .complete_within(Duration::from_millis(50))
            .and()
            .should()
            .be(Some("done"));
    }

    #[test]
    fn never_ending_operation_fails_with_timeout() {
        should_fail_with_message!(
            future::pending::<()>().should().complete_within(Duration::from_millis(10)),
            "Expected task to complete within 10ms, but it did not."
        );
    }

    #[test]
    fn not_complete_within_fails_for_ready_operation() {
        should_fail_with_message!(
            future::ready(1).should().because("it waits for a lock").not_complete_within(Duration::from_secs(1)),
            "Did not expect task to complete within 1s because it waits for a lock, but it did."
        );
    }

    #[tokio::test]
    async fn blocking_form_refuses_to_run_inside_a_runtime() {
        (|| future::ready(()).should().complete_within(Duration::from_secs(1)))
            .should()
            .panic()
            .with_message("complete_within() cannot block inside an async runtime*");
    }

    #[tokio::test(start_paused = true)]
    async fn slow_operation_reports_exactly_one_failure_without_waiting_for_it() {
        let timer = TokioClock.start_timer();
        let scope = AssertionScope::new();

        tokio::time::sleep(Duration::from_millis(200))
            .should()
            .complete_within_async(Duration::from_millis(10))
            .await;

        scope.discard().should().have_length(1);
        timer.elapsed().should().be_less_than(Duration::from_millis(200));
    }

    #[tokio::test]
    async fn fake_clock_decides_the_race() {
        let clock = FakeClock::new();

        let assertion = future::pending::<()>()
            .should()
            .with_clock(Arc::new(clock.clone()))
            .not_complete_within_async(Duration::from_secs(3600));
        let advance = async {
            clock.advance(Duration::from_secs(3600));
        };

        futures::join!(assertion, advance);
        clock.now().should().be(Duration::from_secs(3600));
    }

    #[tokio::test]
    async fn fake_clock_timeout_fails_completion() {
        let clock = FakeClock::new();
        let scope = AssertionScope::new();

        let assertion = future::pending::<()>()
            .should()
            .with_clock(Arc::new(clock.clone()))
            .complete_within_async(Duration::from_millis(10));
        let expire = async {
            clock.complete();
        };
        futures::join!(assertion, expire);

        scope.discard().should().pass(|failures| {
            failures.len().should().be(1);
            failures[0].as_str().should().start_with("Expected task to complete within 10ms");
        });
    }
}
