//! Single pass compiler from Jack to VM code.
use smol_str::SmolStr;

use crate::{
    constants::{MAX_INT, MEMORY_ALLOC, STRING_APPEND_CHAR, STRING_NEW, TEMP_ARRAY_ADDR, TEMP_DISCARD},
    error::{Diagnostic, DiagnosticKind, JackError, JackResult},
    lex::{Keyword, Lexer, Span, Token, TokenKind, TokenStream},
    symbol::{self, Symbol, SymbolKind, SymbolTable},
    vm::{Command, Segment, VmWriter},
};

use super::{
    frame::{Frame, SubroutineKind},
    CompilerConf,
};

/// Storage kind and type shared by every name in one declaration list.
///
/// `field int x, y;` declares both `x` and `y` as integer fields.
#[derive(Debug, Clone)]
struct Declaration {
    kind: SymbolKind,
    ty: SmolStr,
}

/// Recursive descent parser that emits VM code as it goes.
///
/// There is no syntax tree. Each production parses its tokens,
/// updates the symbol tables and drives the writer in one step.
pub struct Compiler<'a> {
    stream: TokenStream<'a>,
    conf: CompilerConf,
    class_name: SmolStr,
    /// Static and field names of the class being compiled.
    class_symbols: SymbolTable,
    /// Argument and local names of the current subroutine.
    symbols: SymbolTable,
    frame: Frame,
    writer: VmWriter,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Compiler<'a> {
    pub fn new(lexer: Lexer<'a>, conf: CompilerConf) -> Self {
        Self {
            stream: TokenStream::new(lexer),
            conf,
            class_name: SmolStr::default(),
            class_symbols: SymbolTable::new(),
            symbols: SymbolTable::new(),
            frame: Frame::default(),
            writer: VmWriter::new(),
            diagnostics: vec![],
        }
    }

    /// Compile the single class of the source unit.
    ///
    /// # Errors
    ///
    /// A syntax error stops compilation at the offending token.
    /// Name and literal problems are collected, and returned together
    /// as [`JackError::Semantic`] once the whole unit was parsed.
    pub fn compile(mut self) -> JackResult<VmWriter> {
        self.compile_class()?;
        self.stream.consume(TokenKind::EOF)?;

        if self.diagnostics.is_empty() {
            Ok(self.writer)
        } else {
            Err(JackError::Semantic(self.diagnostics))
        }
    }

    #[cold]
    fn report(&mut self, span: Span, kind: DiagnosticKind) {
        let diagnostic = Diagnostic::new(self.stream.source_code(), span, kind);
        log::debug!("{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    #[inline]
    fn fragment(&self, token: &Token) -> &'a str {
        self.stream.span_fragment(&token.span)
    }

    #[inline]
    fn peek_keyword(&mut self, keyword: Keyword) -> bool {
        self.stream.peek_kind().is_keyword(keyword)
    }

    /// Find a name in the subroutine scope, then the class scope.
    ///
    /// Fields are out of reach in functions, which have no receiver.
    fn lookup(&self, name: &str) -> Option<Symbol> {
        let symbol = symbol::resolve(&self.symbols, &self.class_symbols, name)?;
        if symbol.kind == SymbolKind::Field && self.frame.kind == SubroutineKind::Function {
            return None;
        }
        Some(symbol.clone())
    }

    /// Like [`Compiler::lookup`], but a missing name is reported.
    fn resolve(&mut self, token: &Token) -> Option<Symbol> {
        let name = self.fragment(token);
        let symbol = self.lookup(name);
        if symbol.is_none() {
            self.report(token.span, DiagnosticKind::Unresolved(name.into()));
        }
        symbol
    }

    fn declare(&mut self, decl: &Declaration, name: &Token) {
        let text = self.fragment(name);
        let table = match decl.kind {
            SymbolKind::Static | SymbolKind::Field => &mut self.class_symbols,
            SymbolKind::Argument | SymbolKind::Local => &mut self.symbols,
        };

        if let Err(err) = table.insert(text, decl.ty.clone(), decl.kind) {
            self.report(name.span, DiagnosticKind::Duplicate(err.name));
        }
    }

    fn push_symbol(&mut self, symbol: &Symbol) {
        self.writer.write_push(symbol.segment(), symbol.index);
    }

    /// Push a constant, reporting values the VM can not represent.
    fn push_constant(&mut self, value: u32, span: Span) {
        match u16::try_from(value) {
            Ok(value) if value <= MAX_INT => self.writer.write_push(Segment::Constant, value),
            _ => self.report(span, DiagnosticKind::IntegerOverflow(value.to_string().into())),
        }
    }
}

/// Program structure
impl<'a> Compiler<'a> {
    /// `class Name { classVarDec* subroutineDec* }`
    fn compile_class(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::Class))?;
        let name = self.stream.consume(TokenKind::Ident)?;
        self.class_name = self.fragment(&name).into();
        self.class_symbols.reset();
        self.stream.consume(TokenKind::LeftBrace)?;

        while self.peek_keyword(Keyword::Static) || self.peek_keyword(Keyword::Field) {
            self.compile_class_var_dec()?;
        }

        while matches!(
            self.stream.peek_kind(),
            TokenKind::Keyword(Keyword::Constructor | Keyword::Function | Keyword::Method)
        ) {
            self.compile_subroutine()?;
        }

        self.stream.consume(TokenKind::RightBrace)?;
        log::debug!("class {} symbols:\n{}", self.class_name, self.class_symbols);

        Ok(())
    }

    /// `(static | field) type name (, name)* ;`
    fn compile_class_var_dec(&mut self) -> JackResult<()> {
        let token = self.stream.consume_any(&[
            TokenKind::Keyword(Keyword::Static),
            TokenKind::Keyword(Keyword::Field),
        ])?;
        let kind = if token.kind.is_keyword(Keyword::Static) {
            SymbolKind::Static
        } else {
            SymbolKind::Field
        };
        let ty = self.compile_type(false)?;

        self.compile_declaration_list(Declaration { kind, ty })
    }

    /// `var type name (, name)* ;`
    fn compile_var_dec(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::Var))?;
        let ty = self.compile_type(false)?;

        self.compile_declaration_list(Declaration {
            kind: SymbolKind::Local,
            ty,
        })
    }

    fn compile_declaration_list(&mut self, decl: Declaration) -> JackResult<()> {
        loop {
            let name = self.stream.consume(TokenKind::Ident)?;
            self.declare(&decl, &name);

            if !self.stream.match_token(TokenKind::Comma) {
                break;
            }
        }
        self.stream.consume(TokenKind::Semicolon)?;
        Ok(())
    }

    /// `int | char | boolean | ClassName`, and `void` for return types.
    fn compile_type(&mut self, allow_void: bool) -> JackResult<SmolStr> {
        const TYPES: &[TokenKind] = &[
            TokenKind::Keyword(Keyword::Int),
            TokenKind::Keyword(Keyword::Char),
            TokenKind::Keyword(Keyword::Boolean),
            TokenKind::Ident,
        ];
        const RETURN_TYPES: &[TokenKind] = &[
            TokenKind::Keyword(Keyword::Void),
            TokenKind::Keyword(Keyword::Int),
            TokenKind::Keyword(Keyword::Char),
            TokenKind::Keyword(Keyword::Boolean),
            TokenKind::Ident,
        ];

        let token = self.stream.consume_any(if allow_void { RETURN_TYPES } else { TYPES })?;
        Ok(self.fragment(&token).into())
    }

    /// `(constructor | function | method) (void | type) name ( parameterList ) subroutineBody`
    fn compile_subroutine(&mut self) -> JackResult<()> {
        let token = self.stream.consume_any(&[
            TokenKind::Keyword(Keyword::Constructor),
            TokenKind::Keyword(Keyword::Function),
            TokenKind::Keyword(Keyword::Method),
        ])?;
        let kind = match token.kind {
            TokenKind::Keyword(keyword) => SubroutineKind::from_keyword(keyword),
            _ => None,
        }
        .unwrap_or(SubroutineKind::Function);

        self.compile_type(true)?;
        let name = self.stream.consume(TokenKind::Ident)?;
        let function = SmolStr::from(format!("{}.{}", self.class_name, self.fragment(&name)));

        self.symbols.reset();
        if kind == SubroutineKind::Method {
            // Receiver object.
            self.symbols.reserve(SymbolKind::Argument, 1);
        }
        self.frame = Frame::new(function.clone(), kind, self.conf.qualify_labels);

        self.stream.consume(TokenKind::LeftParen)?;
        self.compile_parameter_list()?;
        self.stream.consume(TokenKind::RightParen)?;

        // Body
        self.stream.consume(TokenKind::LeftBrace)?;
        while self.peek_keyword(Keyword::Var) {
            self.compile_var_dec()?;
        }

        let local_count = self.symbols.kind_count(SymbolKind::Local);
        log::trace!("function {function} {local_count}");
        self.writer.write_function(function.clone(), local_count);

        match kind {
            SubroutineKind::Constructor => {
                let field_count = self.class_symbols.kind_count(SymbolKind::Field);
                self.writer.write_push(Segment::Constant, field_count);
                self.writer.write_call(MEMORY_ALLOC, 1);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Method => {
                self.writer.write_push(Segment::Argument, 0);
                self.writer.write_pop(Segment::Pointer, 0);
            }
            SubroutineKind::Function => {}
        }

        self.compile_statements()?;
        self.stream.consume(TokenKind::RightBrace)?;
        log::debug!("{function} symbols:\n{}", self.symbols);

        Ok(())
    }

    /// `((type name) (, type name)*)?`
    fn compile_parameter_list(&mut self) -> JackResult<()> {
        if self.stream.peek_kind() == TokenKind::RightParen {
            return Ok(());
        }

        loop {
            let ty = self.compile_type(false)?;
            let name = self.stream.consume(TokenKind::Ident)?;
            self.declare(
                &Declaration {
                    kind: SymbolKind::Argument,
                    ty,
                },
                &name,
            );

            if !self.stream.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(())
    }
}

/// Statements
impl<'a> Compiler<'a> {
    fn compile_statements(&mut self) -> JackResult<()> {
        loop {
            match self.stream.peek_kind() {
                TokenKind::Keyword(Keyword::Let) => self.compile_let()?,
                TokenKind::Keyword(Keyword::If) => self.compile_if()?,
                TokenKind::Keyword(Keyword::While) => self.compile_while()?,
                TokenKind::Keyword(Keyword::Do) => self.compile_do()?,
                TokenKind::Keyword(Keyword::Return) => self.compile_return()?,
                _ => break,
            }
        }
        Ok(())
    }

    /// `{ statements }`
    fn compile_block(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::LeftBrace)?;
        self.compile_statements()?;
        self.stream.consume(TokenKind::RightBrace)?;
        Ok(())
    }

    /// `let name ([ expression ])? = expression ;`
    fn compile_let(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::Let))?;
        let name = self.stream.consume(TokenKind::Ident)?;
        let target = self.resolve(&name);

        let token = self.stream.consume_any(&[TokenKind::Eq, TokenKind::LeftBracket])?;
        if token.kind == TokenKind::LeftBracket {
            if let Some(symbol) = &target {
                self.push_symbol(symbol);
            }
            self.compile_expression()?;
            self.stream.consume(TokenKind::RightBracket)?;
            self.writer.write_arithmetic(Command::Add);

            // The right hand side may itself use `pointer 1`,
            // so the element address waits in temp.
            self.writer.write_pop(Segment::Temp, TEMP_ARRAY_ADDR);

            self.stream.consume(TokenKind::Eq)?;
            self.compile_expression()?;
            self.stream.consume(TokenKind::Semicolon)?;

            self.writer.write_push(Segment::Temp, TEMP_ARRAY_ADDR);
            self.writer.write_pop(Segment::Pointer, 1);
            self.writer.write_pop(Segment::That, 0);
        } else {
            self.compile_expression()?;
            self.stream.consume(TokenKind::Semicolon)?;

            if let Some(symbol) = &target {
                self.writer.write_pop(symbol.segment(), symbol.index);
            }
        }

        Ok(())
    }

    /// `if ( expression ) { statements } (else { statements })?`
    fn compile_if(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::If))?;
        let labels = self.frame.next_if();

        self.stream.consume(TokenKind::LeftParen)?;
        self.compile_expression()?;
        self.stream.consume(TokenKind::RightParen)?;

        self.writer.write_if(labels.on_true.clone());
        self.writer.write_goto(labels.on_false.clone());
        self.writer.write_label(labels.on_true);
        self.compile_block()?;

        if self.stream.match_token(TokenKind::Keyword(Keyword::Else)) {
            self.writer.write_goto(labels.end.clone());
            self.writer.write_label(labels.on_false);
            self.compile_block()?;
            self.writer.write_label(labels.end);
        } else {
            self.writer.write_label(labels.on_false);
        }

        Ok(())
    }

    /// `while ( expression ) { statements }`
    fn compile_while(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::While))?;
        let labels = self.frame.next_while();

        self.writer.write_label(labels.exp.clone());
        self.stream.consume(TokenKind::LeftParen)?;
        self.compile_expression()?;
        self.stream.consume(TokenKind::RightParen)?;
        self.writer.write_arithmetic(Command::Not);
        self.writer.write_if(labels.end.clone());

        self.compile_block()?;

        self.writer.write_goto(labels.exp);
        self.writer.write_label(labels.end);

        Ok(())
    }

    /// `do subroutineCall ;`
    fn compile_do(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::Do))?;
        let name = self.stream.consume(TokenKind::Ident)?;
        self.compile_subroutine_call(&name)?;
        self.stream.consume(TokenKind::Semicolon)?;

        // Every call leaves a value on the stack.
        self.writer.write_pop(Segment::Temp, TEMP_DISCARD);

        Ok(())
    }

    /// `return expression? ;`
    fn compile_return(&mut self) -> JackResult<()> {
        self.stream.consume(TokenKind::Keyword(Keyword::Return))?;

        if self.stream.match_token(TokenKind::Semicolon) {
            self.writer.write_push(Segment::Constant, 0);
        } else {
            self.compile_expression()?;
            self.stream.consume(TokenKind::Semicolon)?;
        }
        self.writer.write_return();

        Ok(())
    }
}

/// Expressions
impl<'a> Compiler<'a> {
    /// `term (op term)*`
    ///
    /// Operators have no precedence and apply strictly from
    /// left to right, so `2 + 3 * 4` is `(2 + 3) * 4`.
    fn compile_expression(&mut self) -> JackResult<()> {
        self.compile_term()?;

        while self.stream.peek_kind().is_binary_operator() {
            let operator = self.stream.next_token()?;
            self.compile_term()?;
            if let Some(command) = binary_command(operator.kind) {
                self.writer.write_arithmetic(command);
            }
        }

        Ok(())
    }

    fn compile_term(&mut self) -> JackResult<()> {
        const TERMS: &[TokenKind] = &[
            TokenKind::Number,
            TokenKind::String,
            TokenKind::Keyword(Keyword::True),
            TokenKind::Keyword(Keyword::False),
            TokenKind::Keyword(Keyword::Null),
            TokenKind::Keyword(Keyword::This),
            TokenKind::Ident,
            TokenKind::LeftParen,
            TokenKind::Minus,
            TokenKind::Tilde,
        ];

        let token = self.stream.next_token()?;

        match token.kind {
            TokenKind::Number => self.compile_integer(&token),
            TokenKind::String => self.compile_string(&token),
            TokenKind::Keyword(Keyword::True) => {
                self.writer.write_push(Segment::Constant, 1);
                self.writer.write_arithmetic(Command::Neg);
            }
            TokenKind::Keyword(Keyword::False | Keyword::Null) => {
                self.writer.write_push(Segment::Constant, 0);
            }
            TokenKind::Keyword(Keyword::This) => {
                self.writer.write_push(Segment::Pointer, 0);
            }
            TokenKind::LeftParen => {
                self.compile_expression()?;
                self.stream.consume(TokenKind::RightParen)?;
            }
            TokenKind::Minus => {
                self.compile_term()?;
                self.writer.write_arithmetic(Command::Neg);
            }
            TokenKind::Tilde => {
                self.compile_term()?;
                self.writer.write_arithmetic(Command::Not);
            }
            TokenKind::Ident => match self.stream.peek_kind() {
                TokenKind::LeftBracket => self.compile_array_read(&token)?,
                TokenKind::LeftParen | TokenKind::Dot => self.compile_subroutine_call(&token)?,
                _ => {
                    if let Some(symbol) = self.resolve(&token) {
                        self.push_symbol(&symbol);
                    }
                }
            },
            _ => return Err(self.stream.unexpected(&token, TERMS)),
        }

        Ok(())
    }

    fn compile_integer(&mut self, token: &Token) {
        let text = self.fragment(token);
        match text.parse::<u16>() {
            Ok(value) if value <= MAX_INT => self.writer.write_push(Segment::Constant, value),
            _ => self.report(token.span, DiagnosticKind::IntegerOverflow(text.into())),
        }
    }

    /// Builds the string at runtime, one character at a time.
    fn compile_string(&mut self, token: &Token) {
        let literal = self.fragment(token);
        let text = literal
            .strip_prefix('"')
            .and_then(|s| s.strip_suffix('"'))
            .unwrap_or(literal);

        let length = text.encode_utf16().count();
        self.push_constant(u32::try_from(length).unwrap_or(u32::MAX), token.span);
        self.writer.write_call(STRING_NEW, 1);

        for unit in text.encode_utf16() {
            self.push_constant(u32::from(unit), token.span);
            self.writer.write_call(STRING_APPEND_CHAR, 2);
        }
    }

    /// `name [ expression ]`
    fn compile_array_read(&mut self, name: &Token) -> JackResult<()> {
        self.stream.consume(TokenKind::LeftBracket)?;
        if let Some(symbol) = self.resolve(name) {
            self.push_symbol(&symbol);
        }
        self.compile_expression()?;
        self.stream.consume(TokenKind::RightBracket)?;

        self.writer.write_arithmetic(Command::Add);
        self.writer.write_pop(Segment::Pointer, 1);
        self.writer.write_push(Segment::That, 0);

        Ok(())
    }

    /// Call whose leading identifier was already consumed.
    ///
    /// - `name(...)` calls a method on the current object.
    /// - `var.name(...)` calls a method on the object in `var`.
    /// - `Class.name(...)` calls a function or constructor.
    fn compile_subroutine_call(&mut self, first: &Token) -> JackResult<()> {
        let first_name = self.fragment(first);

        let token = self.stream.consume_any(&[TokenKind::LeftParen, TokenKind::Dot])?;
        let (function, receiver) = if token.kind == TokenKind::Dot {
            let name = self.stream.consume(TokenKind::Ident)?;
            let name = self.fragment(&name);
            self.stream.consume(TokenKind::LeftParen)?;

            match self.lookup(first_name) {
                Some(symbol) => {
                    self.push_symbol(&symbol);
                    (format!("{}.{name}", symbol.ty), 1)
                }
                None => {
                    // A field named in a function, not a class.
                    if self.class_symbols.lookup(first_name).is_some() {
                        self.report(first.span, DiagnosticKind::Unresolved(first_name.into()));
                    }
                    (format!("{first_name}.{name}"), 0)
                }
            }
        } else {
            self.writer.write_push(Segment::Pointer, 0);
            (format!("{}.{first_name}", self.class_name), 1)
        };

        let arg_count = self.compile_expression_list()?;
        self.stream.consume(TokenKind::RightParen)?;
        self.writer.write_call(function, arg_count + receiver);

        Ok(())
    }

    /// `(expression (, expression)*)?`
    ///
    /// Returns the number of expressions.
    fn compile_expression_list(&mut self) -> JackResult<u16> {
        if self.stream.peek_kind() == TokenKind::RightParen {
            return Ok(0);
        }

        let mut count = 0;
        loop {
            self.compile_expression()?;
            count += 1;

            if !self.stream.match_token(TokenKind::Comma) {
                break;
            }
        }

        Ok(count)
    }
}

fn binary_command(kind: TokenKind) -> Option<Command> {
    use TokenKind as TK;
    match kind {
        TK::Plus => Some(Command::Add),
        TK::Minus => Some(Command::Sub),
        TK::Star => Some(Command::Multiply),
        TK::Slash => Some(Command::Divide),
        TK::Amp => Some(Command::And),
        TK::Pipe => Some(Command::Or),
        TK::Less => Some(Command::Lt),
        TK::Greater => Some(Command::Gt),
        TK::Eq => Some(Command::Eq),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn compile(source: &str) -> JackResult<Vec<String>> {
        let writer = Compiler::new(Lexer::new(source), CompilerConf::default()).compile()?;
        Ok(writer.instructions().iter().map(|i| i.to_string()).collect())
    }

    #[test]
    fn test_binary_command() {
        assert_eq!(binary_command(TokenKind::Star), Some(Command::Multiply));
        assert_eq!(binary_command(TokenKind::Eq), Some(Command::Eq));
        assert_eq!(binary_command(TokenKind::Tilde), None);
    }

    #[test]
    fn test_empty_class() {
        assert!(compile("class Empty {}").unwrap().is_empty());
    }

    #[test]
    fn test_negative_literal_is_unary() {
        let code = compile("class A { function int f() { return -7; } }").unwrap();
        assert_eq!(
            code,
            &["function A.f 0", "push constant 7", "neg", "return"]
        );
    }

    #[test]
    fn test_integer_range() {
        let code = compile("class A { function int f() { return 32767; } }").unwrap();
        assert_eq!(code[1], "push constant 32767");

        match compile("class A { function int f() { return 32768; } }") {
            Err(JackError::Semantic(diagnostics)) => {
                assert_eq!(diagnostics.len(), 1);
                assert_eq!(
                    diagnostics[0].kind,
                    DiagnosticKind::IntegerOverflow("32768".into())
                );
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn test_trailing_tokens_rejected() {
        assert!(matches!(
            compile("class A {} class B {}"),
            Err(JackError::Syntax(_))
        ));
    }
}
