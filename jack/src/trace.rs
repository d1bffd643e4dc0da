//! Token listing in the `<tokens>` XML form used by the course tools.
use std::fmt::Write;

use crate::{
    error::{JackResult, SyntaxError, SyntaxErrorKind},
    lex::{Lexer, TokenClass},
};

/// List every token of the source, one element per line.
///
/// # Errors
///
/// Fails on the first character, or unterminated string,
/// that does not form a token.
pub fn token_listing(source_code: &str) -> JackResult<String> {
    let mut out = String::new();
    write_token_listing(source_code, &mut out)?;
    Ok(out)
}

pub fn write_token_listing(source_code: &str, out: &mut impl Write) -> JackResult<()> {
    writeln!(out, "<tokens>")?;

    for token in Lexer::new(source_code) {
        let fragment = token.span.fragment(source_code);

        let (tag, text) = match token.kind.class() {
            TokenClass::Keyword => ("keyword", fragment),
            TokenClass::Symbol => ("symbol", fragment),
            TokenClass::IntegerConstant => ("integerConstant", fragment),
            TokenClass::StringConstant => ("stringConstant", fragment.trim_matches('"')),
            TokenClass::Identifier => ("identifier", fragment),
            TokenClass::EOF => break,
            TokenClass::Unknown => {
                let kind = SyntaxErrorKind::UnknownToken(fragment.to_owned());
                return Err(SyntaxError::new(source_code, token.span, kind).into());
            }
        };

        writeln!(out, "<{tag}> {} </{tag}>", escape(text))?;
    }

    writeln!(out, "</tokens>")?;
    Ok(())
}

fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '&' => escaped.push_str("&amp;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::JackError;

    #[test]
    fn test_listing() {
        let listing = token_listing("if (x < 10) { do Output.printString(\"a&b\"); }").unwrap();

        assert_eq!(
            listing,
            "<tokens>
<keyword> if </keyword>
<symbol> ( </symbol>
<identifier> x </identifier>
<symbol> &lt; </symbol>
<integerConstant> 10 </integerConstant>
<symbol> ) </symbol>
<symbol> { </symbol>
<keyword> do </keyword>
<identifier> Output </identifier>
<symbol> . </symbol>
<identifier> printString </identifier>
<symbol> ( </symbol>
<stringConstant> a&amp;b </stringConstant>
<symbol> ) </symbol>
<symbol> ; </symbol>
<symbol> } </symbol>
</tokens>
"
        );
    }

    #[test]
    fn test_comments_skipped() {
        let listing = token_listing("/** doc */ // line\nreturn;").unwrap();
        assert_eq!(
            listing,
            "<tokens>\n<keyword> return </keyword>\n<symbol> ; </symbol>\n</tokens>\n"
        );
    }

    #[test]
    fn test_unknown_character() {
        let err = token_listing("let x = #;").unwrap_err();
        match err {
            JackError::Syntax(err) => {
                assert_eq!(err.kind, SyntaxErrorKind::UnknownToken("#".to_owned()));
                assert_eq!(err.column, 9);
            }
            err => panic!("unexpected error {err}"),
        }
    }
}
