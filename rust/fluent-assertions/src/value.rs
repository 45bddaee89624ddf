//! Dynamic view over the values under test.
//!
//! The equivalency engine and the formatter never look at Rust types directly. Every subject and
//! expectation is first turned into a [`Value`] through [`Inspect`], either hand written or produced
//! by `#[derive(Inspect)]`. Objects are reference counted so that graphs may contain cycles and so
//! that the engine can tell "the same instance" apart from "an equal instance".
use crate::{error::ConfigurationError, formatting::Formatter};
use itertools::Itertools;
use minidom::Element;
use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt::{Debug, Formatter as FmtFormatter},
    rc::Rc,
};
use strum_macros::{Display as StrumDisplay, EnumDiscriminants};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Internal,
}

/// A named member of an [`Object`].
#[derive(Clone, Debug, PartialEq)]
pub struct Member {
    name: String,
    value: Value,
    visibility: Visibility,
    declared_type: String,
}

impl Member {
    pub fn new(name: impl Into<String>, value: Value) -> Self {
        let declared_type = value.type_name().to_owned();
        Member {
            name: name.into(),
            value,
            visibility: Visibility::Public,
            declared_type,
        }
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_declared_type(mut self, declared_type: impl Into<String>) -> Self {
        self.declared_type = declared_type.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }
}

/// An instance with identity. Two `Rc<Object>` pointing to the same allocation are the same object.
///
/// Members live behind a `RefCell` so a graph can point back at itself:
/// ```
/// use fluent_assertions::*;
///
/// let node = Object::new("Node");
/// node.set("Name", "root");
/// node.set("Parent", node.clone());
/// node.member("Parent").should().be_some();
/// ```
pub struct Object {
    type_name: String,
    members: RefCell<Vec<Member>>,
}

pub type ObjectRef = Rc<Object>;

impl Object {
    pub fn new(type_name: impl Into<String>) -> ObjectRef {
        Rc::new(Object {
            type_name: type_name.into(),
            members: RefCell::new(Vec::new()),
        })
    }

    pub fn builder(type_name: impl Into<String>) -> ObjectBuilder {
        ObjectBuilder {
            object: Object::new(type_name),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Sets a public member, replacing any member with the same name.
    pub fn set(&self, name: impl Into<String>, value: impl Inspect) {
        self.set_member(Member::new(name, value.to_value()));
    }

    pub fn set_internal(&self, name: impl Into<String>, value: impl Inspect) {
        self.set_member(Member::new(name, value.to_value()).with_visibility(Visibility::Internal));
    }

    pub fn set_member(&self, member: Member) {
        let mut members = self.members.borrow_mut();
        match members.iter_mut().find(|m| m.name == member.name) {
            Some(existing) => *existing = member,
            None => members.push(member),
        }
    }

    pub fn members(&self) -> Vec<Member> {
        self.members.borrow().clone()
    }

    pub fn member(&self, name: &str) -> Option<Member> {
        self.members.borrow().iter().find(|m| m.name == name).cloned()
    }
}

impl Debug for Object {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> std::fmt::Result {
        // members are not followed, the graph may be cyclic
        f.debug_struct("Object")
            .field("type_name", &self.type_name)
            .field("members", &self.members.borrow().iter().map(|m| m.name.as_str()).collect_vec())
            .finish()
    }
}

pub struct ObjectBuilder {
    object: ObjectRef,
}

impl ObjectBuilder {
    pub fn field(self, name: impl Into<String>, value: impl Inspect) -> Self {
        self.object.set(name, value);
        self
    }

    pub fn internal(self, name: impl Into<String>, value: impl Inspect) -> Self {
        self.object.set_internal(name, value);
        self
    }

    pub fn member(self, member: Member) -> Self {
        self.object.set_member(member);
        self
    }

    pub fn into_object(self) -> ObjectRef {
        self.object
    }

    pub fn build(self) -> Value {
        Value::Object(self.object)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumValue {
    type_name: String,
    name: String,
    value: i128,
}

impl EnumValue {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>, value: i128) -> Self {
        EnumValue {
            type_name: type_name.into(),
            name: name.into(),
            value,
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> i128 {
        self.value
    }
}

/// Row-major multi-dimensional array.
#[derive(Clone, Debug, PartialEq)]
pub struct MultiArray {
    lengths: Vec<usize>,
    items: Vec<Value>,
}

impl MultiArray {
    pub fn new(lengths: Vec<usize>, items: Vec<Value>) -> Result<Self, ConfigurationError> {
        let expected: usize = lengths.iter().product();
        if lengths.is_empty() || expected != items.len() {
            return Err(ConfigurationError::DimensionMismatch {
                lengths,
                items: items.len(),
            });
        }

        Ok(MultiArray { lengths, items })
    }

    /// Builds a two-dimensional array from rows of equal length.
    pub fn from_rows<T: Inspect>(rows: &[Vec<T>]) -> Result<Self, ConfigurationError> {
        let width = rows.first().map_or(0, Vec::len);
        if let Some((row, ragged)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(ConfigurationError::RaggedRows {
                row,
                length: ragged.len(),
                width,
            });
        }
        let items = rows.iter().flat_map(|r| r.iter().map(Inspect::to_value)).collect_vec();
        MultiArray::new(vec![rows.len(), width], items)
    }

    pub fn lengths(&self) -> &[usize] {
        &self.lengths
    }

    pub fn rank(&self) -> usize {
        self.lengths.len()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn get(&self, indices: &[usize]) -> Option<&Value> {
        if indices.len() != self.lengths.len() || indices.iter().zip(&self.lengths).any(|(i, l)| i >= l) {
            return None;
        }

        let offset = indices.iter().zip(&self.lengths).fold(0, |acc, (i, l)| acc * l + i);
        self.items.get(offset)
    }

    /// All index tuples in row-major order.
    pub fn indices(&self) -> Vec<Vec<usize>> {
        self.lengths.iter().map(|l| 0..*l).multi_cartesian_product().collect()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum XmlValue {
    Element(Element),
    Document(Option<Element>),
    Attribute { name: String, value: String },
}

/// A value as seen by the formatter and the equivalency engine.
#[derive(Clone, EnumDiscriminants)]
#[strum_discriminants(name(ValueKind), derive(StrumDisplay))]
pub enum Value {
    Null,
    Bool(bool),
    Int { value: i128, type_name: &'static str },
    Float { value: f64, type_name: &'static str },
    Char(char),
    Str(String),
    Enum(EnumValue),
    Seq(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Array(MultiArray),
    Object(ObjectRef),
    Xml(XmlValue),
    Opaque { type_name: String, repr: String },
}

impl Value {
    /// Captures any `Debug` type as an opaque leaf compared by its debug text.
    pub fn debug<T: Debug + ?Sized>(value: &T) -> Value {
        Value::Opaque {
            type_name: short_type_name(std::any::type_name::<T>()),
            repr: format!("{:?}", value),
        }
    }

    /// A leaf rendered verbatim, used for names and descriptions in failure messages.
    pub fn literal(text: impl Into<String>) -> Value {
        Value::Opaque {
            type_name: "str".to_owned(),
            repr: text.into(),
        }
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::from(self)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int { type_name, .. } | Value::Float { type_name, .. } => type_name,
            Value::Char(_) => "char",
            Value::Str(_) => "String",
            Value::Enum(e) => e.type_name(),
            Value::Seq(_) => "Vec",
            Value::Map(_) => "Map",
            Value::Array(_) => "Array",
            Value::Object(o) => o.type_name(),
            Value::Xml(XmlValue::Element(_)) => "Element",
            Value::Xml(XmlValue::Document(_)) => "Document",
            Value::Xml(XmlValue::Attribute { .. }) => "Attribute",
            Value::Opaque { type_name, .. } => type_name,
        }
    }

    /// Address of the referenced object, `None` for values without identity.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Object(o) => Some(Rc::as_ptr(o) as usize),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int { value, .. } => Some(*value as f64),
            Value::Float { value, .. } => Some(*value),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int { value: a, .. }, Value::Int { value: b, .. }) => a == b,
            (Value::Float { value: a, .. }, Value::Float { value: b, .. }) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Int { value: a, .. }, Value::Float { value: b, .. }) => (*a as f64) == *b,
            (Value::Float { value: a, .. }, Value::Int { value: b, .. }) => *a == (*b as f64),
            (Value::Char(a), Value::Char(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Enum(a), Value::Enum(b)) => a == b,
            (Value::Seq(a), Value::Seq(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Xml(a), Value::Xml(b)) => a == b,
            (
                Value::Opaque {
                    type_name: ta,
                    repr: ra,
                },
                Value::Opaque {
                    type_name: tb,
                    repr: rb,
                },
            ) => ta == tb && ra == rb,
            _ => false,
        }
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut FmtFormatter<'_>) -> std::fmt::Result {
        f.write_str(&Formatter::to_string(self))
    }
}

/// Strips module paths from a type name, `alloc::vec::Vec<my::Foo>` becomes `Vec<Foo>`.
pub fn short_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut segment = String::new();

    for c in full_name.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            result.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            result.push(c);
        }
    }
    result.push_str(segment.rsplit("::").next().unwrap_or_default());

    result
}

/// Produces the [`Value`] view of a type. Usually derived with `#[derive(Inspect)]`.
///
/// The method is named `to_value` so it stays callable on `Option` and iterators, whose own
/// `inspect` methods would otherwise take precedence.
///
/// ```
/// use fluent_assertions::*;
///
/// Some(3).to_value().kind().should().be(ValueKind::Int);
/// None::<u8>.to_value().is_null().should().be_true();
/// ```
pub trait Inspect {
    fn to_value(&self) -> Value;
}

macro_rules! impl_inspect_int {
    ($($t:ty),*) => {
        $(impl Inspect for $t {
            fn to_value(&self) -> Value {
                Value::Int { value: *self as i128, type_name: stringify!($t) }
            }
        })*
    };
}

impl_inspect_int!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, usize);

macro_rules! impl_inspect_float {
    ($($t:ty),*) => {
        $(impl Inspect for $t {
            fn to_value(&self) -> Value {
                Value::Float { value: *self as f64, type_name: stringify!($t) }
            }
        })*
    };
}

impl_inspect_float!(f32, f64);

impl Inspect for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl Inspect for char {
    fn to_value(&self) -> Value {
        Value::Char(*self)
    }
}

impl Inspect for str {
    fn to_value(&self) -> Value {
        Value::Str(self.to_owned())
    }
}

impl Inspect for String {
    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }
}

impl Inspect for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl Inspect for ObjectRef {
    fn to_value(&self) -> Value {
        Value::Object(self.clone())
    }
}

impl Inspect for MultiArray {
    fn to_value(&self) -> Value {
        Value::Array(self.clone())
    }
}

impl Inspect for Element {
    fn to_value(&self) -> Value {
        Value::Xml(XmlValue::Element(self.clone()))
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: Inspect> Inspect for [T] {
    fn to_value(&self) -> Value {
        Value::Seq(self.iter().map(Inspect::to_value).collect())
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn to_value(&self) -> Value {
        // hash order is not stable, sort by rendered key so output and traversal are deterministic
        let entries = self
            .iter()
            .map(|(k, v)| (k.to_value(), v.to_value()))
            .sorted_by_key(|(k, _)| Formatter::to_string(k))
            .collect();
        Value::Map(entries)
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn to_value(&self) -> Value {
        Value::Map(self.iter().map(|(k, v)| (k.to_value(), v.to_value())).collect())
    }
}

/// Converts a [`Value`] back into a concrete type for typed assertion rules.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(impl FromValue for $t {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::Int { value, .. } => <$t>::try_from(*value).ok(),
                    _ => None,
                }
            }
        })*
    };
}

impl_from_value_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64, usize);

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for f32 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64().map(|v| v as f32)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for char {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

#[cfg(test)]
mod tests {
    use crate::*;
    use std::collections::HashMap;

    #[test]
    fn short_type_name_strips_paths_inside_generics() {
        short_type_name("alloc::vec::Vec<my_crate::model::Customer>")
            .should()
            .be("Vec<Customer>".to_owned());
        short_type_name("i32").should().be("i32".to_owned());
    }

    #[test]
    fn objects_compare_by_identity() {
        let first = Object::builder("Customer").field("Name", "John").build();
        let second = Object::builder("Customer").field("Name", "John").build();

        (first == second).should().be_false();
        (first == first.clone()).should().be_true();
    }

    #[test]
    fn set_replaces_member_with_same_name() {
        let object = Object::new("Customer");
        object.set("Name", "John");
        object.set("Name", "Jane");

        object.members().should().have_length(1);
        object.member("Name").should().be_some().which_value().value().should().be(&Value::Str("Jane".to_owned()));
    }

    #[test]
    fn integers_of_different_width_are_equal_values() {
        (5u8.to_value() == 5i64.to_value()).should().be_true();
        (u64::MAX.to_value() == (u64::MAX as i128).to_value()).should().be_true();
    }

    #[test]
    fn option_none_is_null() {
        None::<i32>.to_value().is_null().should().be_true();
        Some(3).to_value().kind().should().be(ValueKind::Int);
    }

    #[test]
    fn hash_map_entries_are_sorted() {
        let mut map = HashMap::new();
        map.insert("b", 2);
        map.insert("a", 1);

        match map.to_value() {
            Value::Map(entries) => entries[0].0.clone().should().be(Value::Str("a".to_owned())),
            other => panic!("unexpected {:?}", other),
        };
    }

    #[test]
    fn multi_array_rejects_mismatched_items() {
        MultiArray::new(vec![2, 2], vec![1.to_value()]).should().be_err();
    }

    #[test]
    fn multi_array_rejects_ragged_rows() {
        MultiArray::from_rows(&[vec![1], vec![2, 3], vec![]])
            .should()
            .be_err()
            .with_value(ConfigurationError::RaggedRows { row: 1, length: 2, width: 1 });
        MultiArray::from_rows(&[vec![1, 2], vec![3]]).should().be_err();
    }

    #[test]
    fn nan_equals_nan() {
        (f64::NAN.to_value() == f64::NAN.to_value()).should().be_true();
        (f32::NAN.to_value() == f64::NAN.to_value()).should().be_true();
        (f64::NAN.to_value() == 1.0.to_value()).should().be_false();
    }

    #[test]
    fn multi_array_indexes_row_major() {
        let array = MultiArray::from_rows(&[vec![1, 2, 3], vec![4, 5, 6]]).unwrap();

        array.get(&[1, 0]).should().be_some().with_value(&4.to_value());
        array.get(&[2, 0]).should().be_none();
        array.indices().should().have_length(6);
    }

    #[test]
    fn from_value_checks_range() {
        u8::from_value(&300.to_value()).should().be_none();
        i64::from_value(&300u16.to_value()).should().be_some().with_value(300);
        f64::from_value(&2.to_value()).should().be_some().with_value(2.0);
    }
}
