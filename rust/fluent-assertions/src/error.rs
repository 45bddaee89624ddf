use itertools::Itertools;
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// The aggregate raised when the outermost [`AssertionScope`](crate::AssertionScope) closes with failures.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub struct AssertionError {
    failures: Vec<String>,
    reportables: Vec<(String, String)>,
}

impl AssertionError {
    pub fn new(failures: Vec<String>, reportables: Vec<(String, String)>) -> Self {
        AssertionError { failures, reportables }
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    pub fn reportables(&self) -> &[(String, String)] {
        &self.reportables
    }
}

impl Display for AssertionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.failures.iter().join("\n\n"))?;
        for (key, value) in &self.reportables {
            write!(f, "\n\nWith {}:\n{}", key, value)?;
        }

        Ok(())
    }
}

/// Misuse of the assertion API, as opposed to a failed assertion.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("a member path cannot be empty")]
    EmptyMemberPath,
    #[error("member path '{path}' is invalid: {reason}")]
    InvalidMemberPath { path: String, reason: String },
    #[error("the maximum recursion depth must be at least 1")]
    ZeroRecursionDepth,
    #[error("an array with lengths {lengths:?} cannot hold {items} item(s)")]
    DimensionMismatch { lengths: Vec<usize>, items: usize },
    #[error("row {row} has {length} item(s) while the first row has {width}")]
    RaggedRows { row: usize, length: usize, width: usize },
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn failures_are_separated_by_blank_line() {
        AssertionError::new(vec!["first".to_owned(), "second".to_owned()], vec![])
            .to_string()
            .should()
            .be("first\n\nsecond".to_owned());
    }

    #[test]
    fn reportables_follow_failures() {
        AssertionError::new(
            vec!["Expected subject.Name to be \"a\", but found \"b\".".to_owned()],
            vec![("configuration".to_owned(), "- Compare enums by value".to_owned())],
        )
        .to_string()
        .should()
        .end_with("\n\nWith configuration:\n- Compare enums by value");
    }

    #[test]
    fn configuration_error_names_path() {
        ConfigurationError::InvalidMemberPath {
            path: "Items[x]".to_owned(),
            reason: "index is not a number".to_owned(),
        }
        .to_string()
        .should()
        .be("member path 'Items[x]' is invalid: index is not a number".to_owned());
    }
}
