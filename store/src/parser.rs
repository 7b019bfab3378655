//! Recursive-descent parser for snapshot artifacts.
//!
//! Grammar accepted (whitespace allowed between all tokens):
//!
//! ```text
//! declaration := ["export"] "type" ident "=" ["|"] snapshot ("|" snapshot)* [";"]
//! snapshot    := "{" (key ["?"] ":" value sep)* "}"
//! record      := "{" (key ["?"] ":" type sep)* "}"
//! type        := primary ("|" primary)*   | <raw text up to the member end>
//! primary     := keyword | record
//! key         := ident | string
//! sep         := ";" | "," | <before "}">
//! ```
//!
//! A member type that does not fit `type` is kept verbatim as a custom
//! fragment, which is how caller-rendered fragments survive a round trip.

use schema_snapshot_core::{Keyword, Member, StructuralTree, TypeNode};

use crate::Snapshot;
use crate::error::DecodeError;

type ParseResult<T> = Result<T, DecodeError>;

/// A decoded artifact.
#[derive(Debug)]
pub(crate) struct Declaration {
    pub name: String,
    pub snapshots: Vec<Snapshot>,
}

/// Value of a snapshot member before shape checks.
enum EnvelopeValue {
    Literal(String),
    Record(StructuralTree),
    Other,
}

pub(crate) struct Parser<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Parses the whole input as one declaration.
    pub fn parse_declaration(mut self) -> ParseResult<Declaration> {
        self.skip_ws();
        let start = self.pos;
        let first = self.read_ident();
        match first {
            "export" => self.expect_keyword("type")?,
            "type" => {}
            _ => {
                return Err(DecodeError::ExpectedKeyword {
                    keyword: "type",
                    offset: start,
                });
            }
        }

        let name = self.parse_ident("a declaration name")?;
        self.expect_char('=', "`=`")?;
        self.eat('|');

        let mut snapshots = Vec::new();
        loop {
            let index = snapshots.len();
            snapshots.push(self.parse_snapshot(index)?);
            if !self.eat('|') {
                break;
            }
        }

        self.eat(';');
        self.skip_ws();
        if self.pos < self.src.len() {
            return Err(DecodeError::TrailingContent { offset: self.pos });
        }

        Ok(Declaration { name, snapshots })
    }

    fn parse_snapshot(&mut self, index: usize) -> ParseResult<Snapshot> {
        self.expect_char('{', "`{` opening a snapshot")?;

        let mut title = None;
        let mut hash = None;
        let mut tree = None;
        loop {
            if self.eat('}') {
                break;
            }
            let key = self.parse_key()?;
            self.eat('?');
            self.expect_char(':', "`:`")?;
            let value = self.parse_envelope_value()?;
            let slot = match key.as_str() {
                "title" => &mut title,
                "hash" => &mut hash,
                "type" => &mut tree,
                _ => {
                    self.end_member()?;
                    continue;
                }
            };
            if slot.is_none() {
                *slot = Some(value);
            }
            self.end_member()?;
        }

        let title = match title {
            Some(EnvelopeValue::Literal(title)) => title,
            Some(_) => return Err(wrong_shape(index, "title", "a string literal")),
            None => return Err(DecodeError::MissingMember { index, member: "title" }),
        };
        let hash = match hash {
            Some(EnvelopeValue::Literal(hash)) => hash,
            Some(_) => return Err(wrong_shape(index, "hash", "a string literal")),
            None => return Err(DecodeError::MissingMember { index, member: "hash" }),
        };
        let tree = match tree {
            Some(EnvelopeValue::Record(tree)) => tree,
            Some(_) => return Err(wrong_shape(index, "type", "a record type")),
            None => return Err(DecodeError::MissingMember { index, member: "type" }),
        };

        Ok(Snapshot { title, hash, tree })
    }

    fn parse_envelope_value(&mut self) -> ParseResult<EnvelopeValue> {
        self.skip_ws();
        let parsed = match self.peek() {
            Some('"') => self.attempt(|p| p.parse_string().map(EnvelopeValue::Literal)),
            Some('{') => self.attempt(|p| p.parse_record().map(EnvelopeValue::Record)),
            _ => None,
        };
        match parsed {
            Some(value) => Ok(value),
            None => {
                self.pos = self.scan_member_end()?;
                Ok(EnvelopeValue::Other)
            }
        }
    }

    fn parse_record(&mut self) -> ParseResult<StructuralTree> {
        self.expect_char('{', "`{`")?;

        let mut tree = StructuralTree::new();
        loop {
            if self.eat('}') {
                break;
            }
            let key = self.parse_key()?;
            let optional = self.eat('?');
            self.expect_char(':', "`:`")?;
            let ty = self.parse_member_type()?;
            tree.members.push(Member { key, optional, ty });
            self.end_member()?;
        }

        Ok(tree)
    }

    fn parse_member_type(&mut self) -> ParseResult<TypeNode> {
        self.skip_ws();
        let start = self.pos;
        if let Some(node) = self.attempt(Self::parse_structural_type) {
            return Ok(node);
        }

        let end = self.scan_member_end()?;
        let raw = self.src[start..end].trim_end();
        if raw.is_empty() {
            return Err(self.unexpected_at(end, "a member type"));
        }
        self.pos = end;
        Ok(TypeNode::Custom(raw.to_string()))
    }

    fn parse_structural_type(&mut self) -> ParseResult<TypeNode> {
        let first = self.parse_primary()?;
        let mut alternatives = vec![first];
        while self.eat('|') {
            alternatives.push(self.parse_primary()?);
        }

        if alternatives.len() == 1 {
            Ok(alternatives.remove(0))
        } else {
            Ok(TypeNode::Union(alternatives))
        }
    }

    fn parse_primary(&mut self) -> ParseResult<TypeNode> {
        self.skip_ws();
        if self.peek() == Some('{') {
            return self.parse_record().map(TypeNode::Record);
        }

        let start = self.pos;
        let token = self.read_ident();
        match Keyword::from_token(token) {
            Some(keyword) => Ok(TypeNode::Keyword(keyword)),
            None => Err(self.unexpected_at(start, "a type keyword or record")),
        }
    }

    fn parse_key(&mut self) -> ParseResult<String> {
        self.skip_ws();
        if self.peek() == Some('"') {
            self.parse_string()
        } else {
            self.parse_ident("a member key")
        }
    }

    fn parse_ident(&mut self, expected: &'static str) -> ParseResult<String> {
        self.skip_ws();
        let start = self.pos;
        let ident = self.read_ident();
        if ident.is_empty() {
            return Err(self.unexpected_at(start, expected));
        }
        Ok(ident.to_string())
    }

    /// Parses a double-quoted literal, decoding JSON escapes.
    fn parse_string(&mut self) -> ParseResult<String> {
        self.skip_ws();
        let start = self.pos;
        self.expect_char('"', "`\"`")?;

        let mut escaped = false;
        for (offset, c) in self.src[self.pos..].char_indices() {
            if escaped {
                escaped = false;
                continue;
            }
            match c {
                '\\' => escaped = true,
                '"' => {
                    let end = self.pos + offset + 1;
                    let literal = serde_json::from_str::<String>(&self.src[start..end])
                        .map_err(|_| DecodeError::InvalidLiteral { offset: start })?;
                    self.pos = end;
                    return Ok(literal);
                }
                _ => {}
            }
        }

        Err(DecodeError::InvalidLiteral { offset: start })
    }

    /// Runs `f`, keeping its result only if it stops at a member boundary.
    /// Otherwise the position is restored and `None` returned.
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        let start = self.pos;
        match f(self) {
            Ok(value) if self.at_member_end() => Some(value),
            _ => {
                self.pos = start;
                None
            }
        }
    }

    /// Finds the offset where the current member's type ends: the first
    /// `;`, `,` or unmatched `}` outside nested brackets and strings.
    fn scan_member_end(&self) -> ParseResult<usize> {
        let rest = &self.src[self.pos..];
        let mut depth = 0usize;
        let mut quote: Option<char> = None;
        let mut escaped = false;
        let mut prev = '\0';

        for (offset, c) in rest.char_indices() {
            let at = self.pos + offset;
            if let Some(q) = quote {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                prev = c;
                continue;
            }

            match c {
                '"' | '\'' | '`' => quote = Some(c),
                '{' | '(' | '[' | '<' => depth += 1,
                '}' if depth == 0 => return Ok(at),
                '>' if prev == '=' => {}
                '}' | ')' | ']' | '>' => depth = depth.saturating_sub(1),
                ';' | ',' if depth == 0 => return Ok(at),
                _ => {}
            }
            prev = c;
        }

        if quote.is_some() {
            return Err(DecodeError::InvalidLiteral { offset: self.pos });
        }
        Err(DecodeError::UnexpectedEnd {
            expected: "`;` ending a member",
        })
    }

    fn end_member(&mut self) -> ParseResult<()> {
        self.skip_ws();
        match self.peek() {
            Some(';' | ',') => {
                self.bump();
                Ok(())
            }
            Some('}') => Ok(()),
            _ => Err(self.unexpected_at(self.pos, "`;` or `}`")),
        }
    }

    fn at_member_end(&mut self) -> bool {
        self.skip_ws();
        matches!(self.peek(), Some(';' | ',' | '}'))
    }

    fn expect_keyword(&mut self, keyword: &'static str) -> ParseResult<()> {
        self.skip_ws();
        let start = self.pos;
        if self.read_ident() != keyword {
            return Err(DecodeError::ExpectedKeyword {
                keyword,
                offset: start,
            });
        }
        Ok(())
    }

    fn expect_char(&mut self, want: char, expected: &'static str) -> ParseResult<()> {
        self.skip_ws();
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            _ => Err(self.unexpected_at(self.pos, expected)),
        }
    }

    /// Consumes `c` after optional whitespace if it is next.
    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn read_ident(&mut self) -> &'a str {
        let src: &'a str = self.src;
        let start = self.pos;
        let len = src[start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '$'))
            .unwrap_or(src.len() - start);
        self.pos = start + len;
        &src[start..start + len]
    }

    fn skip_ws(&mut self) {
        let rest = &self.src[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn unexpected_at(&self, offset: usize, expected: &'static str) -> DecodeError {
        match self.src[offset..].chars().next() {
            Some(found) => DecodeError::Unexpected {
                found,
                offset,
                expected,
            },
            None => DecodeError::UnexpectedEnd { expected },
        }
    }
}

/// Reads `text` as the type of one record member, exactly as the decoder
/// reads it from `key: <text>;`. Fails unless all of `text` is consumed.
pub(crate) fn parse_member_text(text: &str) -> ParseResult<TypeNode> {
    let src = format!("{text};");
    let mut parser = Parser::new(&src);
    let node = parser.parse_member_type()?;
    parser.skip_ws();
    if parser.pos != text.len() {
        return Err(DecodeError::TrailingContent { offset: parser.pos });
    }
    Ok(node)
}

fn wrong_shape(index: usize, member: &'static str, expected: &'static str) -> DecodeError {
    DecodeError::WrongShape {
        index,
        member,
        expected,
    }
}
