//! Structural type trees.
//!
//! [`render`] turns a reflection list into a [`StructuralTree`]: an ordered,
//! record-like model of the generated type. Trees are what snapshots store
//! and hash; the text form is produced separately by the
//! [`printer`](crate::printer).

use crate::{PrimitiveKind, UnitReflection, UnitShape};

/// Built-in type tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    String,
    Number,
    Boolean,
    Date,
    Null,
    Undefined,
    Object,
    Unknown,
    /// Produced for a primitive unit that lists no kinds.
    Never,
}

impl Keyword {
    /// Returns the token as printed in a declaration.
    ///
    /// # Examples
    ///
    /// ```
    /// use schema_snapshot_core::Keyword;
    ///
    /// assert_eq!(Keyword::Date.as_str(), "Date");
    /// assert_eq!(Keyword::from_token("Date"), Some(Keyword::Date));
    /// assert_eq!(Keyword::from_token("date"), None);
    /// ```
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "Date",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Object => "object",
            Self::Unknown => "unknown",
            Self::Never => "never",
        }
    }

    /// Parses a printed token back into a keyword.
    pub fn from_token(token: &str) -> Option<Self> {
        let keyword = match token {
            "string" => Self::String,
            "number" => Self::Number,
            "boolean" => Self::Boolean,
            "Date" => Self::Date,
            "null" => Self::Null,
            "undefined" => Self::Undefined,
            "object" => Self::Object,
            "unknown" => Self::Unknown,
            "never" => Self::Never,
            _ => return None,
        };
        Some(keyword)
    }
}

/// Type expression of a single member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeNode {
    Keyword(Keyword),
    Record(StructuralTree),
    /// Alternatives in declaration order.
    Union(Vec<TypeNode>),
    /// Caller-supplied fragment, kept verbatim.
    Custom(String),
}

/// One named member of a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub key: String,
    pub optional: bool,
    pub ty: TypeNode,
}

impl Member {
    /// Creates a mandatory member.
    pub fn required(key: &str, ty: TypeNode) -> Self {
        Self {
            key: key.to_string(),
            optional: false,
            ty,
        }
    }

    /// Creates an optional member.
    pub fn optional(key: &str, ty: TypeNode) -> Self {
        Self {
            key: key.to_string(),
            optional: true,
            ty,
        }
    }
}

/// Ordered record of members.
///
/// Member order is preserved exactly as rendered; no sorting or
/// deduplication takes place.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::{Keyword, Member, StructuralTree, TypeNode};
///
/// let tree = StructuralTree::new()
///     .with_member(Member::required("a", TypeNode::Keyword(Keyword::String)))
///     .with_member(Member::optional("b", TypeNode::Keyword(Keyword::Number)));
///
/// assert_eq!(tree.len(), 2);
/// assert!(tree.member("b").unwrap().optional);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructuralTree {
    pub members: Vec<Member>,
}

impl StructuralTree {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a member.
    pub fn with_member(mut self, member: Member) -> Self {
        self.members.push(member);
        self
    }

    /// Finds the first member with `key`.
    pub fn member(&self, key: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.key == key)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Renders a reflection list into a structural tree.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::*;
///
/// let tree = render(&[
///     UnitReflection::primitive("a", PrimitiveKind::String),
///     UnitReflection::primitive("b", PrimitiveKind::Date).optional(),
/// ]);
///
/// assert_eq!(tree.members[0], Member::required("a", TypeNode::Keyword(Keyword::String)));
/// assert_eq!(tree.members[1], Member::optional("b", TypeNode::Keyword(Keyword::Date)));
/// ```
pub fn render(units: &[UnitReflection]) -> StructuralTree {
    StructuralTree {
        members: units.iter().map(render_unit).collect(),
    }
}

fn render_unit(unit: &UnitReflection) -> Member {
    let ty = match &unit.shape {
        UnitShape::Primitive(kinds) => match kinds.as_slice() {
            [] => TypeNode::Keyword(Keyword::Never),
            [kind] => kind_node(*kind),
            kinds => TypeNode::Union(kinds.iter().copied().map(kind_node).collect()),
        },
        UnitShape::Recursive(values) => TypeNode::Record(render(values)),
        UnitShape::Custom(fragment) => TypeNode::Custom(fragment.clone()),
    };

    Member {
        key: unit.key.clone(),
        optional: !unit.required,
        ty,
    }
}

fn kind_node(kind: PrimitiveKind) -> TypeNode {
    let keyword = match kind {
        PrimitiveKind::String => Keyword::String,
        PrimitiveKind::Number => Keyword::Number,
        PrimitiveKind::Boolean => Keyword::Boolean,
        PrimitiveKind::Date => Keyword::Date,
        PrimitiveKind::Null => Keyword::Null,
        PrimitiveKind::Undefined => Keyword::Undefined,
        PrimitiveKind::Object => Keyword::Object,
        PrimitiveKind::Unknown => Keyword::Unknown,
        PrimitiveKind::Select => return select_node(),
    };
    TypeNode::Keyword(keyword)
}

/// `{ key: string; value: string }`
fn select_node() -> TypeNode {
    TypeNode::Record(
        StructuralTree::new()
            .with_member(Member::required("key", TypeNode::Keyword(Keyword::String)))
            .with_member(Member::required("value", TypeNode::Keyword(Keyword::String))),
    )
}
