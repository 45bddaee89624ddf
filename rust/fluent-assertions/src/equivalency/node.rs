use crate::{error::ConfigurationError, value::Visibility};
use itertools::Itertools;
use std::fmt::{Display, Formatter};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSegment {
    Member(String),
    Index(usize),
    /// Dictionary key, stored as rendered by the formatter.
    Key(String),
    /// Position in a multi-dimensional array.
    Indices(Vec<usize>),
    /// `[]` in a parsed path, matches any index or key.
    AnyIndex,
}

/// Location of a node inside the compared graph, `Items[2].Name` style.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberPath {
    segments: Vec<PathSegment>,
}

impl MemberPath {
    pub fn root() -> Self {
        MemberPath::default()
    }

    /// Parses `Orders[].Lines[2].Price`. `[]` matches every element of a collection.
    pub fn parse(text: &str) -> Result<Self, ConfigurationError> {
        let invalid = |reason: &str| ConfigurationError::InvalidMemberPath {
            path: text.to_owned(),
            reason: reason.to_owned(),
        };

        if text.trim().is_empty() {
            return Err(ConfigurationError::EmptyMemberPath);
        }

        let mut segments = Vec::new();
        let mut rest = text.trim();
        let mut expect_member = true;

        while !rest.is_empty() {
            if let Some(inner) = rest.strip_prefix('[') {
                let end = inner.find(']').ok_or_else(|| invalid("missing closing bracket"))?;
                segments.push(MemberPath::parse_index(&inner[..end]).map_err(|reason| invalid(reason))?);
                rest = &inner[end + 1..];
                expect_member = false;
            } else {
                if !expect_member {
                    rest = rest.strip_prefix('.').ok_or_else(|| invalid("expected '.' or '[' after an index"))?;
                }
                let end = rest.find(&['.', '['][..]).unwrap_or(rest.len());
                let name = &rest[..end];
                if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
                    return Err(invalid("member names must be non-empty identifiers"));
                }
                segments.push(PathSegment::Member(name.to_owned()));
                rest = &rest[end..];
                expect_member = false;
            }
        }

        Ok(MemberPath { segments })
    }

    fn parse_index(text: &str) -> Result<PathSegment, &'static str> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(PathSegment::AnyIndex);
        }
        if text.starts_with('"') {
            return Ok(PathSegment::Key(text.to_owned()));
        }

        let indices = text
            .split(',')
            .map(|i| i.trim().parse::<usize>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| "index is not a number")?;

        Ok(match indices.as_slice() {
            [single] => PathSegment::Index(*single),
            _ => PathSegment::Indices(indices),
        })
    }

    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment);
        MemberPath { segments }
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Name of the last member segment.
    pub fn member_name(&self) -> Option<&str> {
        self.segments.iter().rev().find_map(|s| match s {
            PathSegment::Member(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Whether `self` equals `pattern`, where an `[]` in the pattern stands for any index.
    pub fn matches(&self, pattern: &MemberPath) -> bool {
        self.segments.len() == pattern.segments.len() && self.segments.iter().zip(&pattern.segments).all(|(s, p)| segment_matches(s, p))
    }

    /// Whether `pattern` continues below `self`, so `self` must be kept to reach it.
    pub fn is_ancestor_of(&self, pattern: &MemberPath) -> bool {
        self.segments.len() < pattern.segments.len() && self.segments.iter().zip(&pattern.segments).all(|(s, p)| segment_matches(s, p))
    }

    /// The path with every index replaced by `[]`.
    pub fn without_indices(&self) -> MemberPath {
        MemberPath {
            segments: self
                .segments
                .iter()
                .map(|s| match s {
                    PathSegment::Member(name) => PathSegment::Member(name.clone()),
                    _ => PathSegment::AnyIndex,
                })
                .collect(),
        }
    }

    /// Whether the path uses no index at all, like `Lines.Price`.
    pub fn has_indices(&self) -> bool {
        self.segments.iter().any(|s| !matches!(s, PathSegment::Member(_)))
    }

    /// The path with its index segments dropped, so `Lines[2].Price` becomes `Lines.Price`.
    pub fn members_only(&self) -> MemberPath {
        MemberPath {
            segments: self.segments.iter().filter(|s| matches!(s, PathSegment::Member(_))).cloned().collect(),
        }
    }
}

fn segment_matches(segment: &PathSegment, pattern: &PathSegment) -> bool {
    match (segment, pattern) {
        (PathSegment::Member(_), PathSegment::AnyIndex) => false,
        (_, PathSegment::AnyIndex) => true,
        _ => segment == pattern,
    }
}

impl Display for MemberPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Member(name) if i == 0 => write!(f, "{}", name)?,
                PathSegment::Member(name) => write!(f, ".{}", name)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
                PathSegment::Key(key) => write!(f, "[{}]", key)?,
                PathSegment::Indices(indices) => write!(f, "[{}]", indices.iter().join(","))?,
                PathSegment::AnyIndex => f.write_str("[]")?,
            }
        }

        Ok(())
    }
}

/// A position in the compared graph, handed to rules and predicates.
#[derive(Clone, Debug)]
pub struct Node {
    path: MemberPath,
    identifier: Option<String>,
    declared_type: String,
    runtime_type: String,
    visibility: Visibility,
}

impl Node {
    pub fn root(identifier: Option<&str>, runtime_type: &str) -> Self {
        Node {
            path: MemberPath::root(),
            identifier: identifier.map(str::to_owned),
            declared_type: runtime_type.to_owned(),
            runtime_type: runtime_type.to_owned(),
            visibility: Visibility::Public,
        }
    }

    pub fn child(&self, segment: PathSegment, declared_type: &str, runtime_type: &str) -> Self {
        Node {
            path: self.path.child(segment),
            identifier: self.identifier.clone(),
            declared_type: declared_type.to_owned(),
            runtime_type: runtime_type.to_owned(),
            visibility: Visibility::Public,
        }
    }

    pub(crate) fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn path(&self) -> &MemberPath {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path.is_root()
    }

    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    pub fn declared_type(&self) -> &str {
        &self.declared_type
    }

    pub fn runtime_type(&self) -> &str {
        &self.runtime_type
    }

    /// Path of the selected member without the subject's name, `Items[2].Name`.
    pub fn selected_member_path(&self) -> String {
        self.path.to_string()
    }

    /// How failures refer to this node: `subject.Items[2]`, or `order.Items[2]` when the subject
    /// was captured by `should!(order)`.
    pub fn description(&self) -> String {
        let root = self.identifier.as_deref().unwrap_or("subject");
        match self.path.segments.first() {
            None => root.to_owned(),
            Some(PathSegment::Member(_)) => format!("{}.{}", root, self.path),
            Some(_) => format!("{}{}", root, self.path),
        }
    }

    pub fn info(&self) -> MemberInfo {
        MemberInfo {
            path: self.path.clone(),
            name: self.path.member_name().unwrap_or_default().to_owned(),
            declared_type: self.declared_type.clone(),
            runtime_type: self.runtime_type.clone(),
            visibility: self.visibility,
        }
    }
}

/// Read-only description of a member, passed to user predicates.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberInfo {
    pub path: MemberPath,
    pub name: String,
    pub declared_type: String,
    pub runtime_type: String,
    pub visibility: Visibility,
}

impl MemberInfo {
    pub fn path_text(&self) -> String {
        self.path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn parse_and_display_round_trip_for_mixed_paths() {
        for text in ["Items[2].Name", "Grid[0,1]", "Map[\"k\"].Value", "Orders[].Lines"] {
            MemberPath::parse(text).unwrap().to_string().should().be(text.to_owned());
        }
    }

    #[test]
    fn parse_rejects_malformed_paths() {
        MemberPath::parse("").should().be_err().with_value(ConfigurationError::EmptyMemberPath);
        MemberPath::parse("Items[x]").should().be_err();
        MemberPath::parse("Items[2").should().be_err();
        MemberPath::parse("a..b").should().be_err();
        MemberPath::parse("Items[1]Name").should().be_err();
    }

    #[test]
    fn wildcard_index_matches_any_element() {
        let pattern = MemberPath::parse("Orders[].Total").unwrap();

        MemberPath::parse("Orders[3].Total").unwrap().matches(&pattern).should().be_true();
        MemberPath::parse("Orders[3].Count").unwrap().matches(&pattern).should().be_false();
        MemberPath::parse("Orders[3]").unwrap().is_ancestor_of(&pattern).should().be_true();
    }

    #[test]
    fn description_uses_identifier_when_captured() {
        let root = Node::root(Some("order"), "Order");
        let line = root
            .child(PathSegment::Member("Lines".to_owned()), "Vec", "Vec")
            .child(PathSegment::Index(2), "Line", "Line");

        root.description().should().be("order".to_owned());
        line.description().should().be("order.Lines[2]".to_owned());
        line.selected_member_path().should().be("Lines[2]".to_owned());
        Node::root(None, "Vec").child(PathSegment::Index(0), "i32", "i32").description().should().be("subject[0]".to_owned());
    }
}
