use super::{FormattingContext, ValueFormatter};
use crate::value::{Value, XmlValue};
use minidom::Element;

fn start_tag(element: &Element) -> String {
    let attributes = element.attrs().map(|(name, value)| format!(" {}=\"{}\"", name, value)).collect::<String>();
    format!("<{}{}", element.name(), attributes)
}

/// Only the outer element is shown, nested content is summarized.
pub(crate) fn format_element(element: &Element) -> String {
    let start = start_tag(element);

    if element.children().next().is_some() {
        return format!("{}>…</{}>", start, element.name());
    }

    let text = element.text();
    if text.is_empty() {
        format!("{} />", start)
    } else {
        format!("{}>{}</{}>", start, text, element.name())
    }
}

pub(super) struct XmlElementFormatter;

impl ValueFormatter for XmlElementFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Xml(XmlValue::Element(_)))
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Xml(XmlValue::Element(element)) => format_element(element),
            _ => unreachable!(),
        }
    }
}

pub(super) struct XmlDocumentFormatter;

impl ValueFormatter for XmlDocumentFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Xml(XmlValue::Document(_)))
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Xml(XmlValue::Document(Some(root))) => format_element(root),
            Value::Xml(XmlValue::Document(None)) => "[XML document without root element]".to_owned(),
            _ => unreachable!(),
        }
    }
}

pub(super) struct XmlAttributeFormatter;

impl ValueFormatter for XmlAttributeFormatter {
    fn can_handle(&self, value: &Value) -> bool {
        matches!(value, Value::Xml(XmlValue::Attribute { .. }))
    }

    fn format(&self, value: &Value, _: &FormattingContext, _: &mut dyn FnMut(&str, &Value) -> String) -> String {
        match value {
            Value::Xml(XmlValue::Attribute { name, value }) => format!("{}=\"{}\"", name, value),
            _ => unreachable!(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use minidom::Element;

    #[test]
    fn element_with_children_is_summarized() {
        let element = Element::builder("order")
            .attr("id", "1")
            .append(Element::builder("line").append("book").build())
            .build();

        Formatter::to_string(&element.to_value()).should().be("<order id=\"1\">…</order>".to_owned());
    }

    #[test]
    fn element_with_text_is_inline() {
        let element = Element::builder("name").attr("lang", "en").append("John").build();

        Formatter::to_string(&element.to_value()).should().be("<name lang=\"en\">John</name>".to_owned());
    }

    #[test]
    fn empty_element_is_self_closing() {
        let element = Element::builder("flag").attr("set", "true").build();

        Formatter::to_string(&element.to_value()).should().be("<flag set=\"true\" />".to_owned());
    }

    #[test]
    fn document_without_root() {
        Formatter::to_string(&Value::Xml(XmlValue::Document(None)))
            .should()
            .be("[XML document without root element]".to_owned());
    }

    #[test]
    fn attribute_renders_name_and_value() {
        let attribute = Value::Xml(XmlValue::Attribute {
            name: "id".to_owned(),
            value: "42".to_owned(),
        });

        Formatter::to_string(&attribute).should().be("id=\"42\"".to_owned());
    }
}
