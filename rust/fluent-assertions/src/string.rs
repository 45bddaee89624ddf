use crate::{scope::Assertion, utils::AndConstraint, value::Inspect, Assertions};
use regex::Regex;

/// Finds where `subject` starts to differ from `expected`, as a character index plus up to three
/// characters of `subject` from there.
pub(crate) fn first_difference(subject: &str, expected: &str) -> Option<(usize, String)> {
    if subject == expected {
        return None;
    }

    let index = subject
        .chars()
        .zip(expected.chars())
        .position(|(actual, expected)| actual != expected)
        .unwrap_or_else(|| subject.chars().count().min(expected.chars().count()));

    Some((index, subject.chars().skip(index).take(3).collect()))
}

fn fail_on_difference(assertion: Assertion, subject: &str, expected: &str) {
    if let Some((index, near)) = first_difference(subject, expected) {
        let (subject_length, expected_length) = (subject.chars().count(), expected.chars().count());
        if subject_length != expected_length {
            assertion.fail_with(
                "Expected {context:string} to be {0} with a length of {1}{reason}, but {2} has a length of {3}, differs near {4} (index {5}).",
                &[
                    expected.to_value(),
                    expected_length.to_value(),
                    subject.to_value(),
                    subject_length.to_value(),
                    near.to_value(),
                    index.to_value(),
                ],
            );
        } else {
            assertion.fail_with("Expected {context:string} to be {0}{reason}, but {1} differs near {2} (index {3}).", &[
                expected.to_value(),
                subject.to_value(),
                near.to_value(),
                index.to_value(),
            ]);
        }
    }
}

/// Assertions for types implementing [`ToString`] trait.
///
/// ### Examples
/// ```
/// use fluent_assertions::*;
///
/// // test subject.to_string() equal the target string
/// "Hello".should().equal_string("Hello");
///
/// // test subject starting with specified string
/// "Hello".should().start_with("H");
///
/// // test subject ending with specified string
/// "Hello".should().end_with("o");
///
/// // test subject containing specified string
/// "Hello".should().contain("ell");
///
/// // test subject to be an empty string
/// "".should().be_empty_string();
///
/// // test subject matches a regex pattern
/// "abcd".should().match_regex("^a.*d$");
///
/// should_fail_with_message!(
///     "Hello".should().equal_string("Helps"),
///     "Expected string to be \"Helps\", but \"Hello\" differs near \"lo\" (index 3)."
/// );
/// ```
pub trait StringAssertions<S> {
    fn equal_string<E: AsRef<str>>(self, expected: E) -> AndConstraint<S>;
    fn start_with<E: AsRef<str>>(self, expected: E) -> AndConstraint<S>;
    fn end_with<E: AsRef<str>>(self, expected: E) -> AndConstraint<S>;
    fn contain<E: AsRef<str>>(self, expected: E) -> AndConstraint<S>;
    fn be_empty_string(self) -> AndConstraint<S>;
    fn match_regex<E: AsRef<str>>(self, expected: E) -> AndConstraint<S>;
}

impl<S: ToString> StringAssertions<S> for Assertions<S> {
    fn equal_string<E: AsRef<str>>(self, expected: E) -> AndConstraint<S> {
        fail_on_difference(self.assertion(), &self.subject().to_string(), expected.as_ref());

        AndConstraint::new(self.into_inner())
    }

    fn start_with<E: AsRef<str>>(self, expected: E) -> AndConstraint<S> {
        let subject = self.subject().to_string();
        let expected = expected.as_ref();

        self.assertion()
            .for_condition(subject.starts_with(expected))
            .fail_with("Expected {context:string} to start with {0}{reason}, but {1} does not.", &[
                expected.to_value(),
                subject.to_value(),
            ]);

        AndConstraint::new(self.into_inner())
    }

    fn end_with<E: AsRef<str>>(self, expected: E) -> AndConstraint<S> {
        let subject = self.subject().to_string();
        let expected = expected.as_ref();

        self.assertion()
            .for_condition(subject.ends_with(expected))
            .fail_with("Expected {context:string} to end with {0}{reason}, but {1} does not.", &[
                expected.to_value(),
                subject.to_value(),
            ]);

        AndConstraint::new(self.into_inner())
    }

    fn contain<E: AsRef<str>>(self, expected: E) -> AndConstraint<S> {
        let subject = self.subject().to_string();
        let expected = expected.as_ref();

        self.assertion()
            .for_condition(subject.contains(expected))
            .fail_with("Expected {context:string} {0} to contain {1}{reason}.", &[
                subject.to_value(),
                expected.to_value(),
            ]);

        AndConstraint::new(self.into_inner())
    }

    fn be_empty_string(self) -> AndConstraint<S> {
        let subject = self.subject().to_string();

        self.assertion()
            .for_condition(subject.is_empty())
            .fail_with("Expected {context:string} to be empty{reason}, but found {0}.", &[subject.to_value()]);

        AndConstraint::new(self.into_inner())
    }

    /// Panics when `expected` is not a valid regular expression.
    fn match_regex<E: AsRef<str>>(self, expected: E) -> AndConstraint<S> {
        let regex = match Regex::new(expected.as_ref()) {
            Ok(regex) => regex,
            Err(e) => panic!("{} is not a valid regular expression: {}", expected.as_ref(), e),
        };
        let subject = self.subject().to_string();

        self.assertion()
            .for_condition(regex.is_match(&subject))
            .fail_with("Expected {context:string} to match regex {0}{reason}, but {1} does not.", &[
                regex.as_str().to_value(),
                subject.to_value(),
            ]);

        AndConstraint::new(self.into_inner())
    }
}
