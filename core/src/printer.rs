//! Text printer for structural trees.
//!
//! Emits a small, fixed subset of TypeScript type syntax: records with one
//! member per line, four-space indentation, `;` after every member, `|`
//! between union alternatives. The snapshot codec builds its artifact text
//! from these helpers, so any change here changes the persisted format.

use crate::{StructuralTree, TypeNode, UnitReflection, render};

const INDENT: &str = "    ";

/// Prints a tree as a standalone record, starting at column zero.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::*;
///
/// let tree = render(&[
///     UnitReflection::primitive("a", PrimitiveKind::String),
///     UnitReflection::union("b", vec![PrimitiveKind::Number, PrimitiveKind::Null]).optional(),
/// ]);
///
/// assert_eq!(print_tree(&tree), "{\n    a: string;\n    b?: number | null;\n}");
/// ```
pub fn print_tree(tree: &StructuralTree) -> String {
    let mut out = String::new();
    write_tree(&mut out, tree, 0);
    out
}

/// Wraps the rendered units in an exported interface named `name`.
///
/// This is the "single type" output, as opposed to the snapshot artifact.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::*;
///
/// let text = render_as_declaration(
///     &[UnitReflection::primitive("id", PrimitiveKind::Number)],
///     "UserTree",
/// );
/// assert_eq!(text, "export interface UserTree {\n    id: number;\n}\n");
/// ```
pub fn render_as_declaration(units: &[UnitReflection], name: &str) -> String {
    let tree = render(units);
    let mut out = format!("export interface {name} ");
    write_tree(&mut out, &tree, 0);
    out.push('\n');
    out
}

/// Writes `tree` as a record whose closing brace sits at `depth`.
pub fn write_tree(out: &mut String, tree: &StructuralTree, depth: usize) {
    if tree.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push_str("{\n");
    for member in &tree.members {
        write_member_prefix(out, depth + 1, &member.key, member.optional);
        write_type(out, &member.ty, depth + 1);
        out.push_str(";\n");
    }
    write_indent(out, depth);
    out.push('}');
}

/// Writes a type expression for a member at `depth`.
pub fn write_type(out: &mut String, node: &TypeNode, depth: usize) {
    match node {
        TypeNode::Keyword(keyword) => out.push_str(keyword.as_str()),
        TypeNode::Record(tree) => write_tree(out, tree, depth),
        TypeNode::Union(alternatives) => {
            for (i, alternative) in alternatives.iter().enumerate() {
                if i > 0 {
                    out.push_str(" | ");
                }
                write_type(out, alternative, depth);
            }
        }
        TypeNode::Custom(fragment) => out.push_str(fragment),
    }
}

/// Writes the indentation, key, optional marker and `: ` of a member line.
pub fn write_member_prefix(out: &mut String, depth: usize, key: &str, optional: bool) {
    write_indent(out, depth);
    write_key(out, key);
    if optional {
        out.push('?');
    }
    out.push_str(": ");
}

/// Writes a member key, quoting it when it is not a plain identifier.
pub fn write_key(out: &mut String, key: &str) {
    if is_identifier(key) {
        out.push_str(key);
    } else {
        out.push_str(&quote_literal(key));
    }
}

/// Quotes `value` as a double-quoted string literal with JSON escapes.
///
/// # Examples
///
/// ```
/// use schema_snapshot_core::quote_literal;
///
/// assert_eq!(quote_literal("v1"), "\"v1\"");
/// assert_eq!(quote_literal("say \"hi\""), r#""say \"hi\"""#);
/// ```
pub fn quote_literal(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}

/// Returns `true` if `key` can be printed without quotes.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn write_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str(INDENT);
    }
}
