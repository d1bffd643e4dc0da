//! Result and errors.
use std::fmt::{self, Display, Formatter};

use itertools::Itertools;
use smol_str::SmolStr;

use crate::lex::{Span, TokenKind};

pub type JackResult<T> = std::result::Result<T, JackError>;

#[derive(Debug)]
pub enum JackError {
    /// Source does not follow the grammar. Compilation of the
    /// unit stopped at the first offending token.
    Syntax(SyntaxError),
    /// The unit parsed, but names or literals in it are invalid.
    /// All problems found in the unit are reported together.
    Semantic(Vec<Diagnostic>),
    Io(std::io::Error),
    Fmt(fmt::Error),
}

impl Display for JackError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Syntax(err) => write!(f, "{err}"),
            Self::Semantic(diagnostics) => {
                write!(f, "{}", diagnostics.iter().map(|d| d.to_string()).join("\n"))
            }
            Self::Io(err) => write!(f, "{err}"),
            Self::Fmt(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for JackError {}

impl From<SyntaxError> for JackError {
    fn from(err: SyntaxError) -> Self {
        JackError::Syntax(err)
    }
}

impl From<std::io::Error> for JackError {
    fn from(err: std::io::Error) -> Self {
        JackError::Io(err)
    }
}

impl From<fmt::Error> for JackError {
    fn from(err: fmt::Error) -> Self {
        JackError::Fmt(err)
    }
}

// ----------------------------------------------------------------------------

/// Fatal grammar violation, with enough context to point at the
/// offending source line.
#[derive(Debug)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub line: usize,
    pub column: usize,
    /// Text of the line the error occurred on.
    pub source_line: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// A token of one of the expected kinds was required.
    Mismatch {
        expected: Box<[TokenKind]>,
        encountered: TokenKind,
    },
    /// Character, or unterminated string literal, the lexer
    /// could not make a token of.
    UnknownToken(String),
    /// Source ended in the middle of a production.
    EndOfSource,
}

impl SyntaxError {
    pub fn new(source: &str, span: Span, kind: SyntaxErrorKind) -> Self {
        let (line, column) = span.line_column(source);
        Self {
            kind,
            line,
            column,
            source_line: span.surrounding_line(source).to_owned(),
        }
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "syntax error at {}:{}: {}", self.line, self.column, self.kind)?;

        let gutter = self.line.to_string().len();
        writeln!(f, "{:gutter$} |", "")?;
        writeln!(f, "{} | {}", self.line, self.source_line)?;
        write!(f, "{:gutter$} | {:>column$}", "", "^", column = self.column)
    }
}

impl Display for SyntaxErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch { expected, encountered } => write!(
                f,
                "encountered unexpected token '{}', expected {}",
                encountered,
                expected.iter().map(|kind| format!("'{kind}'")).join(" or ")
            ),
            Self::UnknownToken(fragment) => write!(f, "unknown token {fragment:?}"),
            Self::EndOfSource => write!(f, "unexpected end of source code"),
        }
    }
}

// ----------------------------------------------------------------------------

/// Problem found while compiling that does not stop parsing,
/// but does prevent any output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// Name is neither in the subroutine nor the class symbol table.
    Unresolved(SmolStr),
    /// Name declared twice in the same scope.
    Duplicate(SmolStr),
    /// Integer constant larger than the VM can represent.
    IntegerOverflow(SmolStr),
}

impl Diagnostic {
    pub fn new(source: &str, span: Span, kind: DiagnosticKind) -> Self {
        let (line, column) = span.line_column(source);
        Self { kind, line, column }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "error at {}:{}: {}", self.line, self.column, self.kind)
    }
}

impl Display for DiagnosticKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved(name) => write!(f, "could not find '{name}' in symbol table"),
            Self::Duplicate(name) => write!(f, "'{name}' is already declared in this scope"),
            Self::IntegerOverflow(text) => {
                write!(f, "integer constant {text} is out of range 0..={}", crate::constants::MAX_INT)
            }
        }
    }
}
