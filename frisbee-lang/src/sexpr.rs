//! Reader for the s-expression rendering emitted by the front-end parser.
//!
//! The parser tool writes one nested s-expression per source file; this
//! module turns that text into a tree of atoms, string literals and lists.
//! The typed decoder in [`crate::ast::decode`] does the rest.

// Layer 1: Standard library imports
use std::fmt::{self, Display};
use std::iter::Peekable;
use std::str::CharIndices;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// One node of the parser tool's output.
///
/// Atoms and string literals are kept apart: `5`, `True` and node tags
/// arrive as atoms, while identifiers and literal strings arrive quoted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sexpr {
    /// Bare token: a node tag, an integer literal or `True`/`False`.
    Atom(String),
    /// Double-quoted string, quotes stripped.
    Str(String),
    /// Parenthesised list of nodes.
    List(Vec<Sexpr>),
}

impl Sexpr {
    /// The atom payload, if this node is an atom.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Self::Atom(a) => Some(a),
            _ => None,
        }
    }

    /// The list payload, if this node is a list.
    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }
}

impl Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atom(a) => write!(f, "{a}"),
            Self::Str(s) => write!(f, "\"{s}\""),
            Self::List(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Reader failures, positioned by byte offset into the input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SexprError {
    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("unbalanced `)` at byte {0}")]
    UnbalancedClose(usize),

    #[error("unterminated string literal starting at byte {0}")]
    UnterminatedString(usize),

    #[error("trailing content at byte {0}")]
    TrailingContent(usize),

    #[error("empty input")]
    Empty,
}

/// Parse a single s-expression, requiring nothing but whitespace after it.
pub fn parse(input: &str) -> Result<Sexpr, SexprError> {
    let mut chars = input.char_indices().peekable();
    skip_whitespace(&mut chars);
    let expr = parse_node(&mut chars)?;
    skip_whitespace(&mut chars);
    match chars.next() {
        Some((at, _)) => Err(SexprError::TrailingContent(at)),
        None => Ok(expr),
    }
}

fn skip_whitespace(chars: &mut Peekable<CharIndices<'_>>) {
    while let Some((_, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else {
            break;
        }
    }
}

fn parse_node(chars: &mut Peekable<CharIndices<'_>>) -> Result<Sexpr, SexprError> {
    skip_whitespace(chars);
    match chars.peek().copied() {
        None => Err(SexprError::Empty),
        Some((at, ')')) => Err(SexprError::UnbalancedClose(at)),
        Some((_, '(')) => parse_list(chars),
        Some((at, '"')) => parse_string(chars, at),
        Some(_) => parse_atom(chars),
    }
}

fn parse_list(chars: &mut Peekable<CharIndices<'_>>) -> Result<Sexpr, SexprError> {
    chars.next(); // consume '('
    let mut items = Vec::new();
    loop {
        skip_whitespace(chars);
        match chars.peek().copied() {
            None => return Err(SexprError::UnexpectedEof),
            Some((_, ')')) => {
                chars.next();
                return Ok(Sexpr::List(items));
            }
            Some(_) => items.push(parse_node(chars)?),
        }
    }
}

fn parse_string(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
) -> Result<Sexpr, SexprError> {
    chars.next(); // consume opening quote
    let mut text = String::new();
    for (_, c) in chars.by_ref() {
        match c {
            '"' => return Ok(Sexpr::Str(text)),
            other => text.push(other),
        }
    }
    Err(SexprError::UnterminatedString(start))
}

fn parse_atom(chars: &mut Peekable<CharIndices<'_>>) -> Result<Sexpr, SexprError> {
    let mut text = String::new();
    while let Some((_, c)) = chars.peek().copied() {
        if c.is_whitespace() || c == '(' || c == ')' || c == '"' {
            break;
        }
        text.push(c);
        chars.next();
    }
    Ok(Sexpr::Atom(text))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atom() {
        assert_eq!(parse("42").unwrap(), Sexpr::Atom("42".to_string()));
    }

    #[test]
    fn test_parse_string_keeps_spaces() {
        assert_eq!(
            parse("\"hello world\"").unwrap(),
            Sexpr::Str("hello world".to_string())
        );
    }

    #[test]
    fn test_parse_nested_list() {
        let parsed = parse("(ExpOp (ExpInt 1) \"+\" (ExpInt 2))").unwrap();
        let Sexpr::List(items) = parsed else {
            panic!("expected list");
        };

        assert_eq!(items.len(), 4);
        assert_eq!(items[0], Sexpr::Atom("ExpOp".to_string()));
        assert_eq!(items[2], Sexpr::Str("+".to_string()));
    }

    #[test]
    fn test_parse_ignores_surrounding_whitespace() {
        let parsed = parse("  ( ExpVoid )\n").unwrap();
        assert_eq!(parsed, Sexpr::List(vec![Sexpr::Atom("ExpVoid".to_string())]));
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(parse("(\"oops").unwrap_err(), SexprError::UnterminatedString(1));
    }

    #[test]
    fn test_unbalanced_close() {
        assert!(matches!(parse(")"), Err(SexprError::UnbalancedClose(0))));
    }

    #[test]
    fn test_trailing_content_rejected() {
        assert!(matches!(
            parse("(ExpVoid) junk"),
            Err(SexprError::TrailingContent(_))
        ));
    }

    #[test]
    fn test_missing_close() {
        assert_eq!(parse("(ExpInt 1").unwrap_err(), SexprError::UnexpectedEof);
    }

    #[test]
    fn test_display_round_trip() {
        let text = "(MethodDecl (TypeInt) \"add\" (FEmpty) (Empty))";
        let parsed = parse(text).unwrap();

        assert_eq!(parsed.to_string(), text);
    }
}
