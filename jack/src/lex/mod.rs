//! Lexical analysis of Jack source.
mod cursor;
mod lexer;
mod token_stream;
mod tokens;

pub use self::{
    lexer::{Lexer, LexerIter},
    token_stream::TokenStream,
    tokens::{Keyword, Span, Token, TokenClass, TokenKind},
};
