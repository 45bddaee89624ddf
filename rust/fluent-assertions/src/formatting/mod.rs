//! Renders [`Value`]s for failure messages.
//!
//! Formatting walks the value graph depth-first. Objects already on the current path are printed as a
//! cyclic-reference marker and the walk stops at `max_depth`, so any graph renders in bounded time.
//! Custom formatters registered through [`Formatter::add_formatter`] take precedence over the
//! built-in ones, the most recently added first.
use crate::{config::AssertionOptions, value::Value};
use lazy_static::lazy_static;
use std::sync::{Arc, PoisonError, RwLock};

mod builtin;
mod xml;

pub use builtin::indent_continuation;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormattingOptions {
    pub use_line_breaks: bool,
    pub max_depth: usize,
    pub max_items: usize,
}

impl Default for FormattingOptions {
    fn default() -> Self {
        FormattingOptions {
            use_line_breaks: false,
            max_depth: 5,
            max_items: 32,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FormattingContext {
    pub depth: usize,
    pub use_line_breaks: bool,
    pub max_items: usize,
}

/// Renders values of the kinds it can handle.
///
/// `format_child` must be used for nested values so that depth and cycle guards keep working. Its
/// first argument names the child (member name, index) for diagnostics.
pub trait ValueFormatter: Send + Sync {
    fn can_handle(&self, value: &Value) -> bool;

    fn format(
        &self,
        value: &Value,
        context: &FormattingContext,
        format_child: &mut dyn FnMut(&str, &Value) -> String,
    ) -> String;
}

type FormatterList = Arc<Vec<Arc<dyn ValueFormatter>>>;

lazy_static! {
    static ref CUSTOM_FORMATTERS: RwLock<FormatterList> = RwLock::new(Arc::new(Vec::new()));
}

pub struct Formatter;

impl Formatter {
    pub fn to_string(value: &Value) -> String {
        Formatter::to_string_with(value, AssertionOptions::formatting_defaults())
    }

    pub fn to_string_with(value: &Value, options: FormattingOptions) -> String {
        let custom = Formatter::custom_formatters();
        let mut graph = FormattedGraph {
            options,
            custom: custom.as_slice(),
            path: Vec::new(),
        };

        graph.format(value, 0)
    }

    pub fn add_formatter(formatter: Arc<dyn ValueFormatter>) {
        let mut formatters = CUSTOM_FORMATTERS.write().unwrap_or_else(PoisonError::into_inner);
        let mut updated = formatters.as_ref().clone();
        updated.push(formatter);
        *formatters = Arc::new(updated);

        tracing::debug!(count = formatters.len(), "[Formatter::add_formatter()] custom formatter registered");
    }

    pub fn remove_formatter(formatter: &Arc<dyn ValueFormatter>) {
        let mut formatters = CUSTOM_FORMATTERS.write().unwrap_or_else(PoisonError::into_inner);
        let updated = formatters.iter().filter(|f| !Arc::ptr_eq(f, formatter)).cloned().collect::<Vec<_>>();
        *formatters = Arc::new(updated);

        tracing::debug!(count = formatters.len(), "[Formatter::remove_formatter()] custom formatter removed");
    }

    pub fn clear_custom_formatters() {
        *CUSTOM_FORMATTERS.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(Vec::new());
    }

    fn custom_formatters() -> FormatterList {
        CUSTOM_FORMATTERS.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

struct FormattedGraph<'f> {
    options: FormattingOptions,
    custom: &'f [Arc<dyn ValueFormatter>],
    path: Vec<usize>,
}

impl<'f> FormattedGraph<'f> {
    fn format(&mut self, value: &Value, depth: usize) -> String {
        if depth > self.options.max_depth {
            return "{Maximum recursion depth was reached…}".to_owned();
        }

        let identity = value.identity();
        if let Some(id) = identity {
            if self.path.contains(&id) {
                return format!("{{Cyclic reference to type {} detected}}", value.type_name());
            }
            self.path.push(id);
        }

        let context = FormattingContext {
            depth,
            use_line_breaks: self.options.use_line_breaks,
            max_items: self.options.max_items,
        };

        let custom = self.custom;
        let result = match custom.iter().rev().find(|f| f.can_handle(value)) {
            Some(formatter) => formatter.format(value, &context, &mut |_: &str, child: &Value| self.format(child, depth + 1)),
            None => match builtin::BUILTIN_FORMATTERS.iter().find(|f| f.can_handle(value)) {
                Some(formatter) => formatter.format(value, &context, &mut |_: &str, child: &Value| self.format(child, depth + 1)),
                None => value.type_name().to_owned(),
            },
        };

        if identity.is_some() {
            self.path.pop();
        }

        result
    }
}
