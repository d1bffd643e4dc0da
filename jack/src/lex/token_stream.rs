//! Peekable token stream.
use std::iter::Peekable;

use crate::error::{JackError, JackResult, SyntaxError, SyntaxErrorKind};

use super::{lexer::LexerIter, Lexer, Span, Token, TokenKind};

/// Buffered stream of tokens with one token of look ahead.
///
/// Tokens are lazily lexed. Peeking or consuming the next token
/// triggers the internal lexer.
pub struct TokenStream<'a> {
    lexer: Peekable<LexerIter<'a>>,
    /// Keep reference to the source so the parser can
    /// slice fragments from it.
    original: &'a str,
    /// A copy of the previous token.
    /// This can be used to build errors that refer
    /// to the end of the previous token's span.
    prev: Option<Token>,
}

impl<'a> TokenStream<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            original: lexer.source_code(),
            lexer: lexer.into_iter().peekable(),
            prev: None,
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.original
    }

    pub fn previous_token(&self) -> Option<&Token> {
        self.prev.as_ref()
    }

    /// Helper function to extract the span's string fragment
    /// from the original source code.
    #[inline]
    pub fn span_fragment(&self, span: &Span) -> &'a str {
        span.fragment(self.original)
    }

    /// Consumes the current token regardless of type.
    ///
    /// # Errors
    ///
    /// Returns [`SyntaxErrorKind::EndOfSource`] when the end-of-file
    /// token was already consumed.
    pub fn next_token(&mut self) -> JackResult<Token> {
        match self.lexer.next() {
            Some(token) => {
                self.prev = Some(token.clone());
                Ok(token)
            }
            None => Err(self.end_of_source()),
        }
    }

    /// Consumes the current token if it matches the given token kind.
    ///
    /// Returns true when matched. Returns false when token kinds
    /// do not match, or the token stream is at the end.
    ///
    /// Does not consume the token if the types do not match.
    pub fn match_token(&mut self, token_kind: TokenKind) -> bool {
        match self.lexer.peek() {
            Some(token) if token.kind == token_kind => {
                let _ = self.next_token(); // discard
                true
            }
            _ => false,
        }
    }

    /// Return the current token and advance the cursor.
    ///
    /// The consumed token must match the given token type, otherwise
    /// a syntax error is returned. The cursor is not advanced if
    /// the token kind does not match.
    pub fn consume(&mut self, token_kind: TokenKind) -> JackResult<Token> {
        self.consume_any(&[token_kind])
    }

    /// Return the current token and advance the cursor, if it matches
    /// any of the given kinds.
    pub fn consume_any(&mut self, token_kinds: &[TokenKind]) -> JackResult<Token> {
        match self.lexer.peek() {
            Some(token) if token_kinds.contains(&token.kind) => self.next_token(),
            Some(token) => {
                let token = token.clone();
                Err(self.unexpected(&token, token_kinds))
            }
            None => Err(self.end_of_source()),
        }
    }

    /// Return the current token without advancing the cursor.
    ///
    /// Returns `None` when the end-of-file token was consumed.
    #[inline]
    pub fn peek(&mut self) -> Option<&Token> {
        self.lexer.peek()
    }

    /// Return the current token kind without advancing the cursor.
    ///
    /// Reports [`TokenKind::EOF`] past the end of the stream.
    #[inline]
    pub fn peek_kind(&mut self) -> TokenKind {
        self.lexer.peek().map(|token| token.kind).unwrap_or(TokenKind::EOF)
    }

    /// Build an error for a token that does not fit the grammar
    /// at this point.
    #[cold]
    pub fn unexpected(&self, token: &Token, expected: &[TokenKind]) -> JackError {
        let kind = match token.kind {
            TokenKind::EOF => SyntaxErrorKind::EndOfSource,
            TokenKind::Unknown => SyntaxErrorKind::UnknownToken(self.span_fragment(&token.span).to_owned()),
            encountered => SyntaxErrorKind::Mismatch {
                expected: expected.into(),
                encountered,
            },
        };
        SyntaxError::new(self.original, token.span, kind).into()
    }

    #[cold]
    fn end_of_source(&self) -> JackError {
        let span = Span::new(self.original.len() as u32, 0);
        SyntaxError::new(self.original, span, SyntaxErrorKind::EndOfSource).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lex::Keyword;

    #[test]
    fn test_consume_and_peek() {
        let mut stream = TokenStream::new(Lexer::new("let x;"));

        assert_eq!(stream.peek_kind(), TokenKind::Keyword(Keyword::Let));
        stream.consume(TokenKind::Keyword(Keyword::Let)).unwrap();

        let name = stream.consume(TokenKind::Ident).unwrap();
        assert_eq!(stream.span_fragment(&name.span), "x");

        assert!(!stream.match_token(TokenKind::Comma));
        assert!(stream.match_token(TokenKind::Semicolon));
        assert_eq!(stream.peek_kind(), TokenKind::EOF);
        stream.next_token().unwrap();
        assert_eq!(stream.peek_kind(), TokenKind::EOF);
        assert!(stream.next_token().is_err());
    }

    #[test]
    fn test_consume_mismatch_does_not_advance() {
        let mut stream = TokenStream::new(Lexer::new("x = 1"));

        let err = stream.consume(TokenKind::Semicolon).unwrap_err();
        match err {
            JackError::Syntax(err) => {
                assert_eq!(
                    err.kind,
                    SyntaxErrorKind::Mismatch {
                        expected: vec![TokenKind::Semicolon].into(),
                        encountered: TokenKind::Ident,
                    }
                );
                assert_eq!((err.line, err.column), (1, 1));
            }
            err => panic!("unexpected error {err}"),
        }

        assert_eq!(stream.peek_kind(), TokenKind::Ident);
    }

    #[test]
    fn test_unknown_token_error() {
        let mut stream = TokenStream::new(Lexer::new("\n  @"));

        let err = stream.consume(TokenKind::Ident).unwrap_err();
        match err {
            JackError::Syntax(err) => {
                assert_eq!(err.kind, SyntaxErrorKind::UnknownToken("@".to_owned()));
                assert_eq!((err.line, err.column), (2, 3));
            }
            err => panic!("unexpected error {err}"),
        }
    }
}
