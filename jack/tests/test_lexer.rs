use jack::lex::{Keyword, Lexer, TokenKind};

fn token_kinds(source: &str) -> Vec<TokenKind> {
    Lexer::new(source).into_iter().map(|token| token.kind).collect()
}

#[test]
fn test_lex_statement() {
    use TokenKind as TK;

    assert_eq!(
        token_kinds("let a[i] = -x;"),
        &[
            TK::Keyword(Keyword::Let),
            TK::Ident,
            TK::LeftBracket,
            TK::Ident,
            TK::RightBracket,
            TK::Eq,
            TK::Minus,
            TK::Ident,
            TK::Semicolon,
            TK::EOF,
        ]
    );
}

#[test]
fn test_lex_fragments() {
    const CODE: &str = "do Output.printString(\"a b\", 42);";

    let fragments = Lexer::new(CODE)
        .into_iter()
        .map(|token| token.span.fragment(CODE))
        .collect::<Vec<_>>();

    assert_eq!(
        fragments,
        &["do", "Output", ".", "printString", "(", "\"a b\"", ",", "42", ")", ";", ""]
    );
}

#[test]
fn test_lex_comments() {
    use TokenKind as TK;

    let source = "
        // line comment
        /* block
           comment */
        /** doc comment */
        return /* inline */ x; // trailing";

    assert_eq!(
        token_kinds(source),
        &[TK::Keyword(Keyword::Return), TK::Ident, TK::Semicolon, TK::EOF]
    );
}

#[test]
fn test_lex_slash_is_division() {
    use TokenKind as TK;

    assert_eq!(
        token_kinds("a/b"),
        &[TK::Ident, TK::Slash, TK::Ident, TK::EOF]
    );
}

#[test]
fn test_lex_keyword_prefix_is_identifier() {
    use TokenKind as TK;

    assert_eq!(
        token_kinds("classy this_ do1 _x"),
        &[TK::Ident, TK::Ident, TK::Ident, TK::Ident, TK::EOF]
    );
}

#[test]
fn test_lex_unknown() {
    use TokenKind as TK;

    assert_eq!(token_kinds("x ? y"), &[TK::Ident, TK::Unknown, TK::Ident, TK::EOF]);
    assert_eq!(token_kinds("\"open"), &[TK::Unknown, TK::EOF]);
}

#[test]
fn test_lex_eof_once() {
    let mut iter = Lexer::new("").into_iter();
    assert_eq!(iter.next().map(|token| token.kind), Some(TokenKind::EOF));
    assert!(iter.next().is_none());
}
