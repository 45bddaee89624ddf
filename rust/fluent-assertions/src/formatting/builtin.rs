use super::{xml, FormattingContext, ValueFormatter};
use crate::value::{MultiArray, Value};
use itertools::Itertools;

pub(super) static BUILTIN_FORMATTERS: [&dyn ValueFormatter; 13] = [
    &NullFormatter,
    &BooleanFormatter,
    &NumericFormatter,
    &CharFormatter,
    &TextFormatter,
    &EnumFormatter,
    &SequenceFormatter,
    &MapFormatter,
    &MultiDimensionalArrayFormatter,
    &ObjectFormatter,
    &xml::XmlElementFormatter,
    &xml::XmlDocumentFormatter,
    &xml::XmlAttributeFormatter,
];

/// Indents every line but the first, for embedding a multi-line rendering after a prefix.
pub fn indent_continuation(text: &str) -> String {
    text.replace('\n', "\n    ")
}

fn join_items(parts: Vec<String>, context: &FormattingContext) -> String {
    if context.use_line_breaks {
        format!("{{\n    {}\n}}", parts.iter().map(|p| indent_continuation(p)).join(",\n    "))
    } else {
        format!("{{{}}}", parts.join(", "))
    }
}

struct NullFormatter;

impl ValueFormatter for NullFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        value.is_null()
    }

    fn format(&self, _: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        "<null>".to_owned()
    }
}

struct BooleanFormatter;

impl ValueFormatter for BooleanFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Bool(_))
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Bool(b) => b.to_string(),
            _ => unreachable!(),
        }
    }
}

struct NumericFormatter;

impl ValueFormatter for NumericFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Int { .. } | Value::Float { .. })
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Int { value, .. } => value.to_string(),
            Value::Float { value, .. } => format!("{:?}", value),
            _ => unreachable!(),
        }
    }
}

struct CharFormatter;

impl ValueFormatter for CharFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Char(_))
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Char(c) => format!("'{}'", c),
            _ => unreachable!(),
        }
    }
}

struct TextFormatter;

impl ValueFormatter for TextFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Str(_) | Value::Opaque { .. })
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Str(s) => format!("\"{}\"", s),
            Value::Opaque { repr, .. } => repr.clone(),
            _ => unreachable!(),
        }
    }
}

struct EnumFormatter;

impl ValueFormatter for EnumFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Enum(_))
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Enum(e) => format!("{}.{} {{value: {}}}", e.type_name(), e.name(), e.value()),
            _ => unreachable!(),
        }
    }
}

struct SequenceFormatter;

impl ValueFormatter for SequenceFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Seq(_))
    }

    fn format(&self, value: &Value, context: &FormattingContext, format_child: &mut dyn FnMut(&str, &Value) -> String) -> String {
        let items = match value {
            Value::Seq(items) => items,
            _ => unreachable!(),
        };

        if items.is_empty() {
            return "{empty}".to_owned();
        }

        let mut parts = items
            .iter()
            .take(context.max_items)
            .enumerate()
            .map(|(i, item)| format_child(&format!("[{}]", i), item))
            .collect_vec();
        if items.len() > context.max_items {
            parts.push("…".to_owned());
        }

        join_items(parts, context)
    }
}

struct MapFormatter;

impl ValueFormatter for MapFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Map(_))
    }

    fn format(&self, value: &Value, context: &FormattingContext, format_child: &mut dyn FnMut(&str, &Value) -> String) -> String {
        let entries = match value {
            Value::Map(entries) => entries,
            _ => unreachable!(),
        };

        if entries.is_empty() {
            return "{empty}".to_owned();
        }

        let mut parts = entries
            .iter()
            .take(context.max_items)
            .map(|(key, value)| {
                let key = format_child("key", key);
                let value = format_child(&key, value);
                format!("[{}] = {}", key, value)
            })
            .collect_vec();
        if entries.len() > context.max_items {
            parts.push("…".to_owned());
        }

        join_items(parts, context)
    }
}

struct MultiDimensionalArrayFormatter;

impl MultiDimensionalArrayFormatter {
    fn format_dimension(
        array: &MultiArray,
        dimension: usize,
        offset: usize,
        format_child: &mut dyn FnMut(&str, &Value) -> String,
    ) -> String {
        let lengths = array.lengths();
        let stride: usize = lengths[dimension + 1..].iter().product();

        let parts = (0..lengths[dimension])
            .map(|i| {
                let position = offset + i * stride;
                if dimension + 1 == lengths.len() {
                    format_child(&format!("[{}]", position), &array.items()[position])
                } else {
                    Self::format_dimension(array, dimension + 1, position, &mut *format_child)
                }
            })
            .collect_vec();

        format!("{{{}}}", parts.join(", "))
    }
}

impl ValueFormatter for MultiDimensionalArrayFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Array(_))
    }

    fn format(&self, value: &Value, _: &FormattingContext, format_child: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Array(array) if array.lengths().iter().any(|l| *l == 0) => "{empty}".to_owned(),
            Value::Array(array) => Self::format_dimension(array, 0, 0, format_child),
            _ => unreachable!(),
        }
    }
}

struct ObjectFormatter;

impl ValueFormatter for ObjectFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Object(_))
    }

    fn format(&self, value: &Value, _: &FormattingContext, format_child: &mut dyn FnMut(&str, &Value) -> String) -> String {
        let object = match value {
            Value::Object(object) => object,
            _ => unreachable!(),
        };

        let members = object.members();
        if members.is_empty() {
            return format!("{} {{ }}", object.type_name());
        }

        let lines = members
            .iter()
            .map(|m| format!("    {} = {}", m.name(), indent_continuation(&format_child(m.name(), m.value()))))
            .join(",\n");

        format!("{}\n{{\n{}\n}}", object.type_name(), lines)
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::collections::BTreeMap;

    #[derive(Inspect)]
    #[repr(u64)]
    enum Permission {
        #[allow(dead_code)]
        Read = 1,
        Everything = u64::MAX,
    }

    #[test]
    fn enum_names_type_and_numeric_value() {
        Formatter::to_string(&Permission::Everything.to_value())
            .should()
            .be("Permission.Everything {value: 18446744073709551615}".to_owned());
    }

    #[test]
    fn map_renders_keys_in_brackets() {
        let mut map = BTreeMap::new();
        map.insert("a", 1);
        map.insert("b", 2);

        Formatter::to_string(&map.to_value()).should().be("{[\"a\"] = 1, [\"b\"] = 2}".to_owned());
    }

    #[test]
    fn multi_dimensional_array_nests_per_dimension() {
        let array = MultiArray::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();

        Formatter::to_string(&array.to_value()).should().be("{{1, 2, 3}, {4, 5, 6}}".to_owned());
    }

    #[test]
    fn multi_dimensional_array_with_zero_length_is_empty() {
        let array = MultiArray::new(vec![2, 0], vec![]).unwrap();

        Formatter::to_string(&array.to_value()).should().be("{empty}".to_owned());
    }

    #[test]
    fn line_breaks_put_items_on_their_own_line() {
        let options = FormattingOptions {
            use_line_breaks: true,
            ..FormattingOptions::default()
        };

        Formatter::to_string_with(&vec![1, 2].to_value(), options).should().be("{\n    1,\n    2\n}".to_owned());
    }

    #[test]
    fn object_without_members() {
        Formatter::to_string(&Object::builder("Marker").build()).should().be("Marker { }".to_owned());
    }

    #[test]
    fn debug_values_render_verbatim() {
        Formatter::to_string(&Value::debug(&std::time::Duration::from_millis(10))).should().be("10ms".to_owned());
    }
}
