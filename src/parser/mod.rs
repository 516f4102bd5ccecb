//! Recursive-descent parser for Source, producing the typed-AST shapes
//! declared in [`ast`]. Structured the way the teacher's own
//! `parser::grammar::Parser` is laid out (token buffer + cursor position
//! + accumulated error list) rather than via parser combinators.

pub mod ast;

use crate::lexer::{Token, TokenKind};
use crate::span::Span;
use crate::typeck::types::Term;
use ast::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
    errors: Vec<ParseError>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, position: 0, errors: Vec::new() }
    }

    pub fn into_errors(self) -> Vec<ParseError> {
        self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let start = self.current_span();
        let mut statements = Vec::new();
        while !self.is_eof() {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }
        let end = self.previous_span().unwrap_or(start);
        Program { body: Block { statements, span: start.merge(end) } }
    }

    // ---- token plumbing ----

    fn is_eof(&self) -> bool {
        matches!(self.peek_kind(), TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.position.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> &TokenKind {
        &self.peek().kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        self.tokens.get(self.position + offset).map(|t| &t.kind).unwrap_or(&TokenKind::Eof)
    }

    fn current_span(&self) -> Span {
        self.peek().span
    }

    fn previous_span(&self) -> Option<Span> {
        self.position.checked_sub(1).and_then(|i| self.tokens.get(i)).map(|t| t.span)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn matches(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, context: &str) -> Option<Token> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            self.error(format!("expected {kind:?} {context}, found {:?}", self.peek_kind()));
            None
        }
    }

    fn error(&mut self, message: String) {
        self.errors.push(ParseError { message, span: self.current_span() });
    }

    /// Error recovery: discard tokens until the next statement boundary
    /// (a `;` or the start of a new statement keyword) so one malformed
    /// statement doesn't poison the rest of the parse.
    fn synchronize(&mut self) {
        if self.is_eof() {
            return;
        }
        self.advance();
        while !self.is_eof() {
            if matches!(self.peek_kind(), TokenKind::Semicolon) {
                self.advance();
                return;
            }
            if matches!(
                self.peek_kind(),
                TokenKind::Const
                    | TokenKind::Let
                    | TokenKind::Function
                    | TokenKind::If
                    | TokenKind::While
                    | TokenKind::For
                    | TokenKind::Return
                    | TokenKind::LBrace
            ) {
                return;
            }
            self.advance();
        }
    }

    // ---- statements ----

    fn parse_statement(&mut self) -> Option<Statement> {
        let start = self.current_span();
        match self.peek_kind() {
            TokenKind::Const | TokenKind::Let => self.parse_variable_declaration(start),
            TokenKind::Function => self.parse_function_declaration(start),
            TokenKind::Return => self.parse_return(start),
            TokenKind::If => self.parse_if(start),
            TokenKind::While => self.parse_while(start),
            TokenKind::For => self.parse_for(start),
            TokenKind::LBrace => {
                let block = self.parse_block()?;
                let span = start.merge(block.span);
                Some(Statement {
                    kind: StatementKind::Block(block),
                    meta: self.fresh_meta(span),
                })
            }
            _ => {
                let expr = self.parse_expr()?;
                self.expect(&TokenKind::Semicolon, "after expression statement");
                let span = start.merge(self.previous_span().unwrap_or(start));
                Some(Statement { kind: StatementKind::Expression(expr), meta: self.fresh_meta(span) })
            }
        }
    }

    fn fresh_meta(&self, span: Span) -> NodeMeta {
        NodeMeta::new(span, Term::Variable(placeholder_var()))
    }

    fn parse_variable_declaration(&mut self, start: Span) -> Option<Statement> {
        let kind = if self.matches(&TokenKind::Const) {
            DeclKind::Const
        } else {
            self.expect(&TokenKind::Let, "to begin declaration");
            DeclKind::Let
        };
        let name = self.parse_identifier_name()?;
        self.expect(&TokenKind::Eq, "in variable declaration")?;
        let init = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon, "after variable declaration")?;
        let span = start.merge(self.previous_span().unwrap_or(start));
        Some(Statement {
            kind: StatementKind::VariableDeclaration { kind, name, init },
            meta: self.fresh_meta(span),
        })
    }

    fn parse_function_declaration(&mut self, start: Span) -> Option<Statement> {
        self.expect(&TokenKind::Function, "to begin function declaration")?;
        let name = self.parse_identifier_name()?;
        let params = self.parse_param_list()?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Statement {
            kind: StatementKind::FunctionDeclaration {
                name,
                params,
                body,
                function_inferred_type: Term::Variable(placeholder_var()),
            },
            meta: self.fresh_meta(span),
        })
    }

    fn parse_return(&mut self, start: Span) -> Option<Statement> {
        self.expect(&TokenKind::Return, "to begin return statement")?;
        let value = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(&TokenKind::Semicolon, "after return statement")?;
        let span = start.merge(self.previous_span().unwrap_or(start));
        Some(Statement { kind: StatementKind::Return(value), meta: self.fresh_meta(span) })
    }

    fn parse_if(&mut self, start: Span) -> Option<Statement> {
        self.expect(&TokenKind::If, "to begin if statement")?;
        self.expect(&TokenKind::LParen, "after `if`")?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "after if condition")?;
        let consequent = self.parse_block()?;
        let mut span = start.merge(consequent.span);
        let alternate = if self.matches(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                let else_start = self.current_span();
                let nested = self.parse_if(else_start)?;
                let nested_span = nested.meta.span;
                span = span.merge(nested_span);
                Some(Block { statements: vec![nested], span: nested_span })
            } else {
                let block = self.parse_block()?;
                span = span.merge(block.span);
                Some(block)
            }
        } else {
            None
        };
        Some(Statement {
            kind: StatementKind::If { test, consequent, alternate },
            meta: self.fresh_meta(span),
        })
    }

    fn parse_while(&mut self, start: Span) -> Option<Statement> {
        self.expect(&TokenKind::While, "to begin while statement")?;
        self.expect(&TokenKind::LParen, "after `while`")?;
        let test = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "after while condition")?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Statement { kind: StatementKind::While { test, body }, meta: self.fresh_meta(span) })
    }

    fn parse_for(&mut self, start: Span) -> Option<Statement> {
        self.expect(&TokenKind::For, "to begin for statement")?;
        self.expect(&TokenKind::LParen, "after `for`")?;
        let init_start = self.current_span();
        let init = Box::new(self.parse_variable_declaration(init_start)?);
        let test = self.parse_expr()?;
        self.expect(&TokenKind::Semicolon, "after for-loop condition")?;
        let update = self.parse_expr()?;
        self.expect(&TokenKind::RParen, "after for-loop update")?;
        let body = self.parse_block()?;
        let span = start.merge(body.span);
        Some(Statement {
            kind: StatementKind::For { init, test, update, body },
            meta: self.fresh_meta(span),
        })
    }

    fn parse_block(&mut self) -> Option<Block> {
        let start = self.current_span();
        self.expect(&TokenKind::LBrace, "to begin block")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) && !self.is_eof() {
            match self.parse_statement() {
                Some(stmt) => statements.push(stmt),
                None => self.synchronize(),
            }
        }
        let end = self.expect(&TokenKind::RBrace, "to close block")?;
        Some(Block { statements, span: start.merge(end.span) })
    }

    fn parse_param_list(&mut self) -> Option<Vec<String>> {
        self.expect(&TokenKind::LParen, "to begin parameter list")?;
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                params.push(self.parse_identifier_name()?);
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RParen, "to close parameter list")?;
        Some(params)
    }

    fn parse_identifier_name(&mut self) -> Option<String> {
        match self.peek_kind().clone() {
            TokenKind::Identifier(name) => {
                self.advance();
                Some(name)
            }
            other => {
                self.error(format!("expected identifier, found {other:?}"));
                None
            }
        }
    }

    // ---- expressions (precedence climbing) ----

    fn parse_expr(&mut self) -> Option<Expr> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let expr = self.parse_conditional()?;
        if self.matches(&TokenKind::Eq) {
            let value = self.parse_assignment()?;
            let target = match expr.kind {
                ExprKind::Identifier(name) => AssignTarget::Identifier(name),
                ExprKind::Member { object, index } => AssignTarget::Member { object, index },
                _ => {
                    self.error("invalid assignment target".to_string());
                    AssignTarget::Identifier(String::new())
                }
            };
            let span = start.merge(value.meta.span);
            return Some(Expr {
                kind: ExprKind::Assignment { target, value: Box::new(value) },
                meta: self.fresh_meta(span),
            });
        }
        Some(expr)
    }

    fn parse_conditional(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let test = self.parse_logical_or()?;
        if self.matches(&TokenKind::Question) {
            let consequent = self.parse_assignment()?;
            self.expect(&TokenKind::Colon, "in conditional expression")?;
            let alternate = self.parse_assignment()?;
            let span = start.merge(alternate.meta.span);
            return Some(Expr {
                kind: ExprKind::Conditional {
                    test: Box::new(test),
                    consequent: Box::new(consequent),
                    alternate: Box::new(alternate),
                },
                meta: self.fresh_meta(span),
            });
        }
        Some(test)
    }

    fn parse_logical_or(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut left = self.parse_logical_and()?;
        while self.matches(&TokenKind::PipePipe) {
            let right = self.parse_logical_and()?;
            let span = start.merge(right.meta.span);
            left = Expr {
                kind: ExprKind::Logical { op: LogicalOp::Or, left: Box::new(left), right: Box::new(right) },
                meta: self.fresh_meta(span),
            };
        }
        Some(left)
    }

    fn parse_logical_and(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut left = self.parse_equality()?;
        while self.matches(&TokenKind::AmpAmp) {
            let right = self.parse_equality()?;
            let span = start.merge(right.meta.span);
            left = Expr {
                kind: ExprKind::Logical { op: LogicalOp::And, left: Box::new(left), right: Box::new(right) },
                meta: self.fresh_meta(span),
            };
        }
        Some(left)
    }

    fn parse_equality(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut left = self.parse_relational()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::EqEqEq => BinaryOp::Eq,
                TokenKind::BangEqEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_relational()?;
            let span = start.merge(right.meta.span);
            left = Expr {
                kind: ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                meta: self.fresh_meta(span),
            };
        }
        Some(left)
    }

    fn parse_relational(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            let span = start.merge(right.meta.span);
            left = Expr {
                kind: ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                meta: self.fresh_meta(span),
            };
        }
        Some(left)
    }

    fn parse_additive(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            let span = start.merge(right.meta.span);
            left = Expr {
                kind: ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                meta: self.fresh_meta(span),
            };
        }
        Some(left)
    }

    fn parse_multiplicative(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek_kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_unary()?;
            let span = start.merge(right.meta.span);
            left = Expr {
                kind: ExprKind::Binary { op, left: Box::new(left), right: Box::new(right) },
                meta: self.fresh_meta(span),
            };
        }
        Some(left)
    }

    fn parse_unary(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let op = match self.peek_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Bang => Some(UnaryOp::Not),
            _ => None,
        };
        if let Some(op) = op {
            self.advance();
            let operand = self.parse_unary()?;
            let span = start.merge(operand.meta.span);
            return Some(Expr {
                kind: ExprKind::Unary { op, operand: Box::new(operand) },
                meta: self.fresh_meta(span),
            });
        }
        self.parse_call()
    }

    fn parse_call(&mut self) -> Option<Expr> {
        let start = self.current_span();
        let mut expr = self.parse_primary()?;
        loop {
            if self.matches(&TokenKind::LParen) {
                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        args.push(self.parse_assignment()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(&TokenKind::RParen, "to close call arguments")?;
                let span = start.merge(end.span);
                expr = Expr {
                    kind: ExprKind::Call { callee: Box::new(expr), args },
                    meta: self.fresh_meta(span),
                };
            } else if self.matches(&TokenKind::LBracket) {
                let index = self.parse_expr()?;
                let end = self.expect(&TokenKind::RBracket, "to close index expression")?;
                let span = start.merge(end.span);
                expr = Expr {
                    kind: ExprKind::Member { object: Box::new(expr), index: Box::new(index) },
                    meta: self.fresh_meta(span),
                };
            } else {
                break;
            }
        }
        Some(expr)
    }

    fn parse_primary(&mut self) -> Option<Expr> {
        let start = self.current_span();

        // Single-identifier arrow function: `x => expr`.
        if let TokenKind::Identifier(_) = self.peek_kind() {
            if matches!(self.peek_at(1), TokenKind::FatArrow) {
                let name = self.parse_identifier_name()?;
                self.advance(); // `=>`
                return self.parse_arrow_body(start, vec![name]);
            }
        }

        // Parenthesised expression or an arrow function's parameter list;
        // disambiguated by trying the arrow shape first and backtracking.
        if self.check(&TokenKind::LParen) {
            if let Some(params) = self.try_parse_arrow_params() {
                self.advance(); // `=>`, left positioned by try_parse_arrow_params
                return self.parse_arrow_body(start, params);
            }
            self.advance(); // `(`
            let inner = self.parse_expr()?;
            let end = self.expect(&TokenKind::RParen, "to close parenthesised expression")?;
            let span = start.merge(end.span);
            let mut inner = inner;
            inner.meta.span = span;
            return Some(inner);
        }

        match self.peek_kind().clone() {
            TokenKind::Number(n) => {
                self.advance();
                Some(Expr { kind: ExprKind::Literal(Literal::Number(n)), meta: self.fresh_meta(start) })
            }
            TokenKind::StringLit(s) => {
                self.advance();
                Some(Expr { kind: ExprKind::Literal(Literal::Str(s)), meta: self.fresh_meta(start) })
            }
            TokenKind::Bool(b) => {
                self.advance();
                Some(Expr { kind: ExprKind::Literal(Literal::Bool(b)), meta: self.fresh_meta(start) })
            }
            TokenKind::Null => {
                self.advance();
                Some(Expr { kind: ExprKind::Literal(Literal::Null), meta: self.fresh_meta(start) })
            }
            TokenKind::Undefined => {
                self.advance();
                Some(Expr { kind: ExprKind::Literal(Literal::Undefined), meta: self.fresh_meta(start) })
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Some(Expr { kind: ExprKind::Identifier(name), meta: self.fresh_meta(start) })
            }
            TokenKind::LBracket => {
                self.advance();
                let mut elems = Vec::new();
                if !self.check(&TokenKind::RBracket) {
                    loop {
                        elems.push(self.parse_assignment()?);
                        if !self.matches(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                let end = self.expect(&TokenKind::RBracket, "to close array literal")?;
                let span = start.merge(end.span);
                Some(Expr { kind: ExprKind::Array(elems), meta: self.fresh_meta(span) })
            }
            other => {
                self.error(format!("expected expression, found {other:?}"));
                None
            }
        }
    }

    /// Tries to parse `(a, b, ...) =>` starting at the current `(`,
    /// leaving the cursor positioned just before the `=>` token on
    /// success; restores the cursor and returns `None` on any mismatch so
    /// the caller falls back to parenthesised-expression parsing.
    fn try_parse_arrow_params(&mut self) -> Option<Vec<String>> {
        let saved = self.position;
        let saved_errors = self.errors.len();
        self.advance(); // `(`
        let mut params = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                match self.peek_kind().clone() {
                    TokenKind::Identifier(name) => {
                        self.advance();
                        params.push(name);
                    }
                    _ => {
                        self.position = saved;
                        self.errors.truncate(saved_errors);
                        return None;
                    }
                }
                if !self.matches(&TokenKind::Comma) {
                    break;
                }
            }
        }
        if !self.matches(&TokenKind::RParen) || !self.check(&TokenKind::FatArrow) {
            self.position = saved;
            self.errors.truncate(saved_errors);
            return None;
        }
        Some(params)
    }

    fn parse_arrow_body(&mut self, start: Span, params: Vec<String>) -> Option<Expr> {
        let body = if self.check(&TokenKind::LBrace) {
            ArrowBody::Block(Box::new(self.parse_block()?))
        } else {
            ArrowBody::Expr(Box::new(self.parse_assignment()?))
        };
        let end = match &body {
            ArrowBody::Block(b) => b.span,
            ArrowBody::Expr(e) => e.meta.span,
        };
        let span = start.merge(end);
        Some(Expr { kind: ExprKind::Arrow { params, body }, meta: self.fresh_meta(span) })
    }
}

/// Placeholder variable id for pre-decoration nodes; overwritten by Pass A
/// of [`crate::typeck::infer`] before any constraint touches it.
fn placeholder_var() -> crate::typeck::types::TypeVar {
    crate::typeck::types::TypeVar { id: usize::MAX, kind: crate::typeck::types::KindConstraint::None }
}

pub fn parse(source: &str) -> Result<Program, Vec<ParseError>> {
    let tokens = crate::lexer::tokenize(source).map_err(|e| {
        vec![ParseError { message: format!("unexpected character `{}`", e.lexeme), span: e.span }]
    })?;
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    if parser.errors.is_empty() {
        Ok(program)
    } else {
        Err(parser.errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_variable_declaration() {
        let program = parse("const x = 5;").unwrap();
        assert_eq!(program.body.statements.len(), 1);
        assert!(matches!(program.body.statements[0].kind, StatementKind::VariableDeclaration { .. }));
    }

    #[test]
    fn parses_binary_precedence() {
        let program = parse("const x = 1 + 2 * 3;").unwrap();
        let StatementKind::VariableDeclaration { init, .. } = &program.body.statements[0].kind else {
            panic!("expected declaration");
        };
        let ExprKind::Binary { op: BinaryOp::Add, right, .. } = &init.kind else {
            panic!("expected top-level addition");
        };
        assert!(matches!(right.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn parses_single_param_arrow() {
        let program = parse("const f = x => x + 1;").unwrap();
        let StatementKind::VariableDeclaration { init, .. } = &program.body.statements[0].kind else {
            panic!("expected declaration");
        };
        assert!(matches!(init.kind, ExprKind::Arrow { .. }));
    }

    #[test]
    fn parses_multi_param_arrow_with_block_body() {
        let program = parse("const f = (a, b) => { return a + b; };").unwrap();
        let StatementKind::VariableDeclaration { init, .. } = &program.body.statements[0].kind else {
            panic!("expected declaration");
        };
        let ExprKind::Arrow { params, body } = &init.kind else {
            panic!("expected arrow function");
        };
        assert_eq!(params.len(), 2);
        assert!(matches!(body, ArrowBody::Block(_)));
    }

    #[test]
    fn parses_parenthesised_expression() {
        let program = parse("const x = (1 + 2) * 3;").unwrap();
        let StatementKind::VariableDeclaration { init, .. } = &program.body.statements[0].kind else {
            panic!("expected declaration");
        };
        assert!(matches!(init.kind, ExprKind::Binary { op: BinaryOp::Mul, .. }));
    }

    #[test]
    fn parses_if_else_chain() {
        let program = parse("if (x) { 1; } else if (y) { 2; } else { 3; }").unwrap();
        assert_eq!(program.body.statements.len(), 1);
        assert!(matches!(program.body.statements[0].kind, StatementKind::If { .. }));
    }

    #[test]
    fn parses_function_declaration() {
        let program = parse("function add(a, b) { return a + b; }").unwrap();
        assert!(matches!(program.body.statements[0].kind, StatementKind::FunctionDeclaration { .. }));
    }

    #[test]
    fn reports_error_on_malformed_declaration() {
        let result = parse("const = 5;");
        assert!(result.is_err());
    }
}
