//! Tokens

use std::fmt;

#[derive(Debug, Clone)]
pub struct Token {
    pub span: Span,
    pub kind: TokenKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[rustfmt::skip]
pub enum TokenKind {
    // Symbols
    LeftBrace,    // {
    RightBrace,   // }
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    Dot,          // .
    Comma,        // ,
    Semicolon,    // ;
    Plus,         // +
    Minus,        // -
    Star,         // *
    Slash,        // /
    Amp,          // &
    Pipe,         // |
    Less,         // <
    Greater,      // >
    Eq,           // =
    Tilde,        // ~

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// String literal, including the surrounding quotes.
    String,
    /// Decimal number literal
    Number,

    // ------------------------------------------------------------------------
    // Special
    /// Unsupported character, or a string literal missing its closing quote.
    Unknown,
    /// End-of-file
    EOF,
}

/// Lexical class of a token, as used by the token listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenClass {
    Keyword,
    Symbol,
    IntegerConstant,
    StringConstant,
    Identifier,
    Unknown,
    EOF,
}

impl TokenKind {
    pub fn class(&self) -> TokenClass {
        use TokenKind as TK;
        match self {
            TK::Ident => TokenClass::Identifier,
            TK::Keyword(_) => TokenClass::Keyword,
            TK::String => TokenClass::StringConstant,
            TK::Number => TokenClass::IntegerConstant,
            TK::Unknown => TokenClass::Unknown,
            TK::EOF => TokenClass::EOF,
            _ => TokenClass::Symbol,
        }
    }

    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        *self == TokenKind::Keyword(keyword)
    }

    /// Operators allowed between two terms of an expression.
    #[inline]
    pub fn is_binary_operator(&self) -> bool {
        use TokenKind as TK;
        matches!(
            self,
            TK::Plus | TK::Minus | TK::Star | TK::Slash | TK::Amp | TK::Pipe | TK::Less | TK::Greater | TK::Eq
        )
    }

    #[inline]
    pub fn is_unary_operator(&self) -> bool {
        matches!(self, TokenKind::Minus | TokenKind::Tilde)
    }

    /// Keywords that open a statement.
    #[inline]
    pub fn is_statement(&self) -> bool {
        use Keyword as K;
        matches!(
            self,
            TokenKind::Keyword(K::Let | K::If | K::While | K::Do | K::Return)
        )
    }

    #[rustfmt::skip]
    pub fn from_symbol(c: char) -> Option<Self> {
        use TokenKind as TK;
        match c {
            '{' => Some(TK::LeftBrace),
            '}' => Some(TK::RightBrace),
            '(' => Some(TK::LeftParen),
            ')' => Some(TK::RightParen),
            '[' => Some(TK::LeftBracket),
            ']' => Some(TK::RightBracket),
            '.' => Some(TK::Dot),
            ',' => Some(TK::Comma),
            ';' => Some(TK::Semicolon),
            '+' => Some(TK::Plus),
            '-' => Some(TK::Minus),
            '*' => Some(TK::Star),
            '/' => Some(TK::Slash),
            '&' => Some(TK::Amp),
            '|' => Some(TK::Pipe),
            '<' => Some(TK::Less),
            '>' => Some(TK::Greater),
            '=' => Some(TK::Eq),
            '~' => Some(TK::Tilde),
            _   => None,
        }
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as TK;
        match self {
            TK::LeftBrace    => write!(f, "{{"),
            TK::RightBrace   => write!(f, "}}"),
            TK::LeftParen    => write!(f, "("),
            TK::RightParen   => write!(f, ")"),
            TK::LeftBracket  => write!(f, "["),
            TK::RightBracket => write!(f, "]"),
            TK::Dot          => write!(f, "."),
            TK::Comma        => write!(f, ","),
            TK::Semicolon    => write!(f, ";"),
            TK::Plus         => write!(f, "+"),
            TK::Minus        => write!(f, "-"),
            TK::Star         => write!(f, "*"),
            TK::Slash        => write!(f, "/"),
            TK::Amp          => write!(f, "&"),
            TK::Pipe         => write!(f, "|"),
            TK::Less         => write!(f, "<"),
            TK::Greater      => write!(f, ">"),
            TK::Eq           => write!(f, "="),
            TK::Tilde        => write!(f, "~"),
            TK::Ident        => write!(f, "identifier"),
            TK::Keyword(kw)  => write!(f, "{kw}"),
            TK::String       => write!(f, "string constant"),
            TK::Number       => write!(f, "integer constant"),
            TK::Unknown      => write!(f, "unknown token"),
            TK::EOF          => write!(f, "end-of-file"),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Span {
    pub index: u32,
    pub size: u32,
}

impl Span {
    pub fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    #[inline]
    pub fn fragment<'a>(&self, text: &'a str) -> &'a str {
        &text[(self.index as usize)..(self.index as usize + self.size as usize)]
    }

    /// Ending index of the span, exclusive.
    #[inline]
    pub fn end(&self) -> u32 {
        self.index + self.size
    }

    /// One-based line and column of the span's first character.
    pub fn line_column(&self, text: &str) -> (usize, usize) {
        let before = &text[..(self.index as usize).min(text.len())];
        let line = before.matches('\n').count() + 1;
        let column = match before.rfind('\n') {
            Some(newline) => before[newline + 1..].chars().count() + 1,
            None => before.chars().count() + 1,
        };
        (line, column)
    }

    /// The full line of source that contains the start of the span,
    /// without its line ending.
    pub fn surrounding_line<'a>(&self, text: &'a str) -> &'a str {
        let index = (self.index as usize).min(text.len());
        let start = text[..index].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = text[index..].find('\n').map(|i| index + i).unwrap_or(text.len());
        text[start..end].trim_end_matches('\r')
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[rustfmt::skip]
pub enum Keyword {
    // ------------------------------------------------------------------------
    // Program structure
    Class,        // class
    Constructor,  // constructor
    Function,     // function
    Method,       // method
    Field,        // field
    Static,       // static
    Var,          // var

    // ------------------------------------------------------------------------
    // Types
    Int,          // int
    Char,         // char
    Boolean,      // boolean
    Void,         // void

    // ------------------------------------------------------------------------
    // Constants
    True,         // true
    False,        // false
    Null,         // null
    This,         // this

    // ------------------------------------------------------------------------
    // Statements
    Let,          // let
    Do,           // do
    If,           // if
    Else,         // else
    While,        // while
    Return,       // return
}

impl Keyword {
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "class"       => Some(Self::Class),
            "constructor" => Some(Self::Constructor),
            "function"    => Some(Self::Function),
            "method"      => Some(Self::Method),
            "field"       => Some(Self::Field),
            "static"      => Some(Self::Static),
            "var"         => Some(Self::Var),
            // ----------------------------------------------------------------
            "int"         => Some(Self::Int),
            "char"        => Some(Self::Char),
            "boolean"     => Some(Self::Boolean),
            "void"        => Some(Self::Void),
            // ----------------------------------------------------------------
            "true"        => Some(Self::True),
            "false"       => Some(Self::False),
            "null"        => Some(Self::Null),
            "this"        => Some(Self::This),
            // ----------------------------------------------------------------
            "let"         => Some(Self::Let),
            "do"          => Some(Self::Do),
            "if"          => Some(Self::If),
            "else"        => Some(Self::Else),
            "while"       => Some(Self::While),
            "return"      => Some(Self::Return),
            // ----------------------------------------------------------------
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Class       => "class",
            Self::Constructor => "constructor",
            Self::Function    => "function",
            Self::Method      => "method",
            Self::Field       => "field",
            Self::Static      => "static",
            Self::Var         => "var",
            Self::Int         => "int",
            Self::Char        => "char",
            Self::Boolean     => "boolean",
            Self::Void        => "void",
            Self::True        => "true",
            Self::False       => "false",
            Self::Null        => "null",
            Self::This        => "this",
            Self::Let         => "let",
            Self::Do          => "do",
            Self::If          => "if",
            Self::Else        => "else",
            Self::While       => "while",
            Self::Return      => "return",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_span_fragment() {
        const CODE: &str = "let x = 12;";

        let spans = &[
            Span::new(0, 3),  // let
            Span::new(4, 1),  // x
            Span::new(6, 1),  // =
            Span::new(8, 2),  // 12
            Span::new(10, 1), // ;
        ];

        assert_eq!(spans[0].fragment(CODE), "let");
        assert_eq!(spans[1].fragment(CODE), "x");
        assert_eq!(spans[2].fragment(CODE), "=");
        assert_eq!(spans[3].fragment(CODE), "12");
        assert_eq!(spans[4].fragment(CODE), ";");
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line() {
        const CODE: &str = "------------\n....here....\n------------";

        let span = Span::new(17, 4);
        assert_eq!(span.fragment(CODE), "here");
        assert_eq!(span.surrounding_line(CODE), "....here....");
        assert_eq!(span.line_column(CODE), (2, 5));
    }

    #[test]
    #[rustfmt::skip]
    fn test_span_surrounding_line_crlf() {
        const CODE: &str = "------------\r\n....here....\r\n------------";

        let span = Span::new(18, 4);
        assert_eq!(span.fragment(CODE), "here");
        assert_eq!(span.surrounding_line(CODE), "....here....");
        assert_eq!(span.line_column(CODE), (2, 5));
    }

    #[test]
    fn test_span_surrounding_full_text() {
        const CODE: &str = "....here....";

        let span = Span::new(4, 4);
        assert_eq!(span.surrounding_line(CODE), "....here....");
        assert_eq!(span.line_column(CODE), (1, 5));
    }

    #[test]
    fn test_keyword_round_trip_names() {
        for name in ["class", "method", "boolean", "this", "return"] {
            let keyword = Keyword::parse(name).expect("keyword");
            assert_eq!(keyword.to_string(), name);
        }
        assert_eq!(Keyword::parse("Class"), None);
        assert_eq!(Keyword::parse("main"), None);
    }

    #[test]
    fn test_operator_classes() {
        assert!(TokenKind::Minus.is_binary_operator());
        assert!(TokenKind::Minus.is_unary_operator());
        assert!(!TokenKind::Tilde.is_binary_operator());
        assert!(TokenKind::Keyword(Keyword::While).is_statement());
        assert!(!TokenKind::Keyword(Keyword::Else).is_statement());
        assert_eq!(TokenKind::Semicolon.class(), TokenClass::Symbol);
    }
}
