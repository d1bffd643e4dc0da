//! Lexical analysis
use super::{
    cursor::{Cursor, EOF_CHAR},
    tokens::{Keyword, Span, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// Start absolute byte position of the current token
    /// in the source.
    start_pos: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant EOF char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.next();

        let start_pos = cursor.offset();

        Self {
            cursor,
            original: source_code,
            start_pos,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// ## Implementation
    ///
    /// Each iteration (`next_token` call) starts with the assumption that
    /// the internal cursor is pointing to the start of the remaining source
    /// to be consumed.
    ///
    /// When an iteration is done building a token, it must leave the cursor
    /// at the start of the next token's text. It may not finish leaving the
    /// cursor pointing into its own token.
    pub fn next_token(&mut self) -> Token {
        use TokenKind as TK;

        self.erase_trivia();

        // Assume that lexer initialization, or previous iteration,
        // leaves the cursor at the next character.
        self.start_token();

        match self.cursor.current() {
            '"' => self.consume_string(),
            '0'..='9' => self.consume_number(),
            c if is_letter(c) => self.consume_ident(),
            EOF_CHAR if self.cursor.at_end() => self.make_token(TK::EOF),
            c => match TokenKind::from_symbol(c) {
                Some(kind) => self.make_token(kind),
                None => self.make_token(TK::Unknown),
            },
        }
    }

    /// Indicates whether the lexer is at the end of the source.
    ///
    /// Note that source can contain '\0' characters, but not be at
    /// the actual end. It's thus important to verify with this function
    /// whenever a [`EOF_CHAR`] is encountered.
    pub fn at_end(&self) -> bool {
        self.cursor.at_end()
    }

    /// Create a span using the starting position of the current token,
    /// and the current offset of the cursor.
    fn make_span(&mut self) -> Span {
        let start = self.start_pos;
        let end = self.cursor.peek_offset();

        // start and end can be equal, and a token can have 0 size.
        debug_assert!(end >= start);
        let size = end - start;

        Span { index: start, size }
    }

    /// Primes the lexer to consume the next token.
    fn start_token(&mut self) {
        self.start_pos = self.cursor.offset();
    }

    /// Build a token, using the source text from the position
    /// stored by [`start_token`](struct.Lexer.html#fn-start_token) to the
    /// current cursor position.
    ///
    /// Also prepare the cursor for the next iteration.
    fn make_token(&mut self, kind: TokenKind) -> Token {
        let span = if kind == TokenKind::EOF {
            Span::new(self.cursor.offset(), 0)
        } else {
            self.make_span()
        };

        // Position the cursor to the starting character for the
        // next token, so the lexer's internal state is primed
        // for the next iteration.
        self.cursor.next();

        Token { span, kind }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Erase whitespace and comments up to the start of the next token.
    fn erase_trivia(&mut self) {
        loop {
            while is_whitespace(self.cursor.current()) {
                self.cursor.next();
            }

            match (self.cursor.current(), self.cursor.peek()) {
                ('/', '/') => self.erase_comment_line(),
                ('/', '*') => self.erase_comment_block(),
                _ => return,
            }
        }
    }

    /// Erase comment line up to, but not including, the trailing newline.
    fn erase_comment_line(&mut self) {
        while !is_newline(self.cursor.current()) && !self.cursor.at_end() {
            self.cursor.next();
        }
    }

    /// Erase a `/* ... */` or `/** ... */` comment, including the closing
    /// delimiter. An unterminated comment runs to the end of the source.
    fn erase_comment_block(&mut self) {
        debug_assert_eq!(self.cursor.current(), '/');

        // Step over the opening "/*" so "/*/" is not taken as closed.
        self.cursor.next();
        self.cursor.next();

        while !self.cursor.at_end() {
            if self.cursor.current() == '*' && self.cursor.peek() == '/' {
                self.cursor.next();
                self.cursor.next();
                return;
            }
            self.cursor.next();
        }
    }

    /// Make a string literal token, quotes included.
    ///
    /// String constants may not span lines. A literal missing its
    /// closing quote becomes an [`TokenKind::Unknown`] token.
    fn consume_string(&mut self) -> Token {
        debug_assert_eq!(self.cursor.current(), '"');

        loop {
            match self.cursor.peek() {
                '"' => {
                    self.cursor.next();
                    return self.make_token(TokenKind::String);
                }
                '\n' | '\r' => return self.make_token(TokenKind::Unknown),
                EOF_CHAR if self.cursor.peek_offset() as usize >= self.original.len() => {
                    return self.make_token(TokenKind::Unknown)
                }
                _ => {
                    self.cursor.next();
                }
            }
        }
    }

    /// Make an identifier or keyword token.
    fn consume_ident(&mut self) -> Token {
        debug_assert!(is_letter(self.cursor.current()));

        while is_letter_or_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        let fragment = self.make_span().fragment(self.original);
        let token_kind = match Keyword::parse(fragment) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };

        self.make_token(token_kind)
    }

    /// Make a decimal number literal token.
    fn consume_number(&mut self) -> Token {
        debug_assert!(is_digit(self.cursor.current()));

        while is_digit(self.cursor.peek()) {
            self.cursor.next();
        }

        self.make_token(TokenKind::Number)
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(
        c,
        '\u{0020}' // space
            | '\u{0009}' // tab
            | '\u{000A}' // line feed
            | '\u{000D}' // carriage return
            | '\u{00A0}' // no-break space
            | '\u{FEFF}' // zero width no-break space
    )
}

fn is_newline(c: char) -> bool {
    matches!(c, '\r' | '\n')
}

#[allow(clippy::manual_is_ascii_check)] // consistency with other functions
fn is_digit(c: char) -> bool {
    matches!(c, '0'..='9')
}

fn is_letter(c: char) -> bool {
    matches!(c, 'a'..='z' | 'A'..='Z' | '_')
}

fn is_letter_or_digit(c: char) -> bool {
    is_letter(c) || is_digit(c)
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Token;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields the final [`TokenKind::EOF`] token exactly once.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    // Track end so an EOF token is emitted once.
    done: bool,
    lexer: Lexer<'a>,
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.lexer.next_token();
        if token.kind == TokenKind::EOF {
            self.done = true;
        }
        Some(token)
    }
}
