//! Lexical analysis: turns `&str` source text into a flat token stream.

pub mod token;

pub use token::{Token, TokenKind};

use crate::span::Span;
use logos::Logos;

#[derive(Debug, Clone, PartialEq)]
pub struct LexError {
    pub span: Span,
    pub lexeme: String,
}

/// Scans an entire source string into tokens, trailed by a single `Eof`.
///
/// Line/column are recomputed from byte offsets rather than tracked
/// incrementally by `logos`, matching the teacher's `lexer::Span` contract
/// that every token carries a fully resolved location.
pub struct Lexer<'src> {
    source: &'src str,
    line_starts: Vec<usize>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        let mut line_starts = vec![0];
        for (i, c) in source.char_indices() {
            if c == '\n' {
                line_starts.push(i + 1);
            }
        }
        Self { source, line_starts }
    }

    fn locate(&self, offset: usize) -> (usize, usize) {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        };
        let column = offset - self.line_starts[line] + 1;
        (line + 1, column)
    }

    fn span(&self, start: usize, end: usize) -> Span {
        let (line, column) = self.locate(start);
        Span::with_location(start, end, line, column)
    }

    pub fn tokenize(&self) -> Result<Vec<Token>, LexError> {
        let mut lex = TokenKind::lexer(self.source);
        let mut tokens = Vec::new();
        while let Some(result) = lex.next() {
            let span = self.span(lex.span().start, lex.span().end);
            match result {
                Ok(kind) => tokens.push(Token {
                    kind,
                    span,
                    lexeme: lex.slice().to_string(),
                }),
                Err(()) => {
                    return Err(LexError {
                        span,
                        lexeme: lex.slice().to_string(),
                    })
                }
            }
        }
        let eof_at = self.source.len();
        tokens.push(Token {
            kind: TokenKind::Eof,
            span: self.span(eof_at, eof_at),
            lexeme: String::new(),
        });
        Ok(tokens)
    }
}

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenizes_declaration() {
        let toks = tokenize("const x = 5;").unwrap();
        let kinds: Vec<_> = toks.iter().map(|t| &t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                &TokenKind::Const,
                &TokenKind::Identifier("x".into()),
                &TokenKind::Eq,
                &TokenKind::Number(5.0),
                &TokenKind::Semicolon,
                &TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn tracks_line_and_column() {
        let toks = tokenize("const x = 1;\nconst y = 2;").unwrap();
        let y = toks
            .iter()
            .find(|t| t.kind == TokenKind::Identifier("y".into()))
            .unwrap();
        assert_eq!(y.span.line, 2);
    }

    #[test]
    fn rejects_unknown_character() {
        assert!(tokenize("const x = `bad`;").is_err());
    }

    #[test]
    fn string_literal_with_escape() {
        let toks = tokenize(r#""a\nb""#).unwrap();
        assert_eq!(toks[0].kind, TokenKind::StringLit("a\nb".to_string()));
    }
}
