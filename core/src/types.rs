//! Reflection model for caller-defined schema units.
//!
//! A schema is described as an ordered list of [`UnitReflection`] nodes. Each
//! node carries a key, a required flag and exactly one [`UnitShape`]. The
//! order of the list is significant: it drives both the rendered member order
//! and the content hash of a snapshot.
//!
//! The serde representation discriminates shapes through an explicit `kind`
//! field, so configuration files read naturally:
//!
//! ```yaml
//! - { key: id, kind: number }
//! - { key: nickname, required: false, kind: [string, "null"] }
//! - key: address
//!   kind: recursive
//!   values:
//!     - { key: city, kind: string }
//! - { key: tags, kind: custom, fragment: "Array<string>" }
//! ```

use serde::{Deserialize, Serialize};

use crate::validate::ReflectionError;

/// Primitive return-value kind of a leaf unit.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::PrimitiveKind;
///
/// assert_eq!(PrimitiveKind::Date.as_str(), "date");
/// assert_eq!(PrimitiveKind::Select.as_str(), "select");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Date,
    Null,
    Undefined,
    Object,
    Unknown,
    /// A `{ key, value }` pair picked from a fixed list of options.
    Select,
}

impl PrimitiveKind {
    /// Returns the tag used for this kind in serialized reflections.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Object => "object",
            Self::Unknown => "unknown",
            Self::Select => "select",
        }
    }
}

/// The variant part of a [`UnitReflection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnitShape {
    /// One primitive kind, or several rendered as a union in list order.
    Primitive(Vec<PrimitiveKind>),
    /// Nested container of further units.
    Recursive(Vec<UnitReflection>),
    /// Pre-rendered type fragment inserted verbatim.
    Custom(String),
}

/// One node of a schema tree.
///
/// Use the constructors [`primitive`](UnitReflection::primitive),
/// [`union`](UnitReflection::union), [`recursive`](UnitReflection::recursive)
/// and [`custom`](UnitReflection::custom), then chain
/// [`optional`](UnitReflection::optional) for members that may be absent.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::{PrimitiveKind, UnitReflection};
///
/// let user = UnitReflection::recursive(
///     "user",
///     vec![
///         UnitReflection::primitive("name", PrimitiveKind::String),
///         UnitReflection::primitive("born", PrimitiveKind::Date).optional(),
///     ],
/// );
///
/// assert!(user.required);
/// assert_eq!(user.children().len(), 2);
/// assert!(!user.children()[1].required);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawUnit", into = "RawUnit")]
pub struct UnitReflection {
    /// Whether the member must be present.
    pub required: bool,
    /// Member name.
    pub key: String,
    /// Kind-specific payload.
    pub shape: UnitShape,
}

impl UnitReflection {
    /// Creates a required unit with a single primitive kind.
    pub fn primitive(key: &str, kind: PrimitiveKind) -> Self {
        Self::with_shape(key, UnitShape::Primitive(vec![kind]))
    }

    /// Creates a required unit whose kinds render as a union.
    pub fn union(key: &str, kinds: Vec<PrimitiveKind>) -> Self {
        Self::with_shape(key, UnitShape::Primitive(kinds))
    }

    /// Creates a required container unit.
    pub fn recursive(key: &str, values: Vec<UnitReflection>) -> Self {
        Self::with_shape(key, UnitShape::Recursive(values))
    }

    /// Creates a required unit backed by a caller-rendered fragment.
    pub fn custom(key: &str, fragment: &str) -> Self {
        Self::with_shape(key, UnitShape::Custom(fragment.to_string()))
    }

    fn with_shape(key: &str, shape: UnitShape) -> Self {
        Self {
            required: true,
            key: key.to_string(),
            shape,
        }
    }

    /// Marks the unit as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets the required flag explicitly.
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Returns `true` for container units.
    pub fn is_recursive(&self) -> bool {
        matches!(self.shape, UnitShape::Recursive(_))
    }

    /// Returns the nested units of a container, or an empty slice for leaves.
    pub fn children(&self) -> &[UnitReflection] {
        match &self.shape {
            UnitShape::Recursive(values) => values,
            _ => &[],
        }
    }
}

/// Maps a caller's own schema representation into reflection units.
///
/// Implementations must be pure and total, and must emit units in the same
/// traversal order as the source, since order feeds the content hash.
pub trait ReflectUnits {
    /// Produces the reflection of this schema.
    fn reflect(&self) -> Vec<UnitReflection>;
}

impl ReflectUnits for [UnitReflection] {
    fn reflect(&self) -> Vec<UnitReflection> {
        self.to_vec()
    }
}

impl ReflectUnits for Vec<UnitReflection> {
    fn reflect(&self) -> Vec<UnitReflection> {
        self.clone()
    }
}

/// Kind tag accepted in the `kind` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
enum KindTag {
    String,
    Number,
    Boolean,
    Date,
    Null,
    Undefined,
    Object,
    Unknown,
    Select,
    Recursive,
    Custom,
}

impl KindTag {
    fn primitive(self) -> Option<PrimitiveKind> {
        let kind = match self {
            Self::String => PrimitiveKind::String,
            Self::Number => PrimitiveKind::Number,
            Self::Boolean => PrimitiveKind::Boolean,
            Self::Date => PrimitiveKind::Date,
            Self::Null => PrimitiveKind::Null,
            Self::Undefined => PrimitiveKind::Undefined,
            Self::Object => PrimitiveKind::Object,
            Self::Unknown => PrimitiveKind::Unknown,
            Self::Select => PrimitiveKind::Select,
            Self::Recursive | Self::Custom => return None,
        };
        Some(kind)
    }
}

impl From<PrimitiveKind> for KindTag {
    fn from(kind: PrimitiveKind) -> Self {
        match kind {
            PrimitiveKind::String => Self::String,
            PrimitiveKind::Number => Self::Number,
            PrimitiveKind::Boolean => Self::Boolean,
            PrimitiveKind::Date => Self::Date,
            PrimitiveKind::Null => Self::Null,
            PrimitiveKind::Undefined => Self::Undefined,
            PrimitiveKind::Object => Self::Object,
            PrimitiveKind::Unknown => Self::Unknown,
            PrimitiveKind::Select => Self::Select,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawKind {
    Tag(KindTag),
    Union(Vec<PrimitiveKind>),
}

/// Wire form of [`UnitReflection`]; converted with shape invariants checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawUnit {
    #[serde(default = "default_required")]
    required: bool,
    key: String,
    kind: RawKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<UnitReflection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fragment: Option<String>,
}

fn default_required() -> bool {
    true
}

impl TryFrom<RawUnit> for UnitReflection {
    type Error = ReflectionError;

    fn try_from(raw: RawUnit) -> Result<Self, Self::Error> {
        let RawUnit {
            required,
            key,
            kind,
            values,
            fragment,
        } = raw;

        let is_recursive = matches!(kind, RawKind::Tag(KindTag::Recursive));
        let is_custom = matches!(kind, RawKind::Tag(KindTag::Custom));
        if values.is_some() && !is_recursive {
            return Err(ReflectionError::UnexpectedValues(key));
        }
        if fragment.is_some() && !is_custom {
            return Err(ReflectionError::UnexpectedFragment(key));
        }

        let shape = match kind {
            RawKind::Union(kinds) => UnitShape::Primitive(kinds),
            RawKind::Tag(tag) => match tag.primitive() {
                Some(kind) => UnitShape::Primitive(vec![kind]),
                None if is_recursive => match values {
                    Some(values) => UnitShape::Recursive(values),
                    None => return Err(ReflectionError::MissingValues(key)),
                },
                None => match fragment {
                    Some(fragment) => UnitShape::Custom(fragment),
                    None => return Err(ReflectionError::MissingFragment(key)),
                },
            },
        };

        Ok(Self {
            required,
            key,
            shape,
        })
    }
}

impl From<UnitReflection> for RawUnit {
    fn from(unit: UnitReflection) -> Self {
        let (kind, values, fragment) = match unit.shape {
            UnitShape::Primitive(kinds) if kinds.len() == 1 => {
                (RawKind::Tag(kinds[0].into()), None, None)
            }
            UnitShape::Primitive(kinds) => (RawKind::Union(kinds), None, None),
            UnitShape::Recursive(values) => (RawKind::Tag(KindTag::Recursive), Some(values), None),
            UnitShape::Custom(fragment) => (RawKind::Tag(KindTag::Custom), None, Some(fragment)),
        };
        Self {
            required: unit.required,
            key: unit.key,
            kind,
            values,
            fragment,
        }
    }
}
