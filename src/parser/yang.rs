//! Compact-form reader
//!
//! A recursive-descent pass over the token stream producing the generic
//! statement tree. Unknown prefixed keywords are accepted as extension
//! instances; unknown unprefixed keywords are a syntax error.

use crate::error::{Error, Result, SyntaxError};
use crate::keywords::{Keyword, KeywordOrCustom};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::parser::stmt::Statement;

/// Parse compact-form source into its single top-level statement
pub fn parse_text(input: &str) -> Result<Statement> {
    let tokens = Lexer::new(input).tokenize()?;
    parse_tokens(tokens)
}

/// Parse compact-form bytes, rejecting invalid UTF-8
pub fn parse_bytes(input: &[u8]) -> Result<Statement> {
    let tokens = Lexer::from_bytes(input)?.tokenize()?;
    parse_tokens(tokens)
}

fn parse_tokens(tokens: Vec<Token>) -> Result<Statement> {
    let mut parser = StatementParser { tokens, pos: 0 };
    let root = parser.parse_statement()?;
    parser.expect_eof()?;
    Ok(root)
}

struct StatementParser {
    tokens: Vec<Token>,
    pos: usize,
}

impl StatementParser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos.min(self.tokens.len() - 1)].clone();
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        }
        token
    }

    fn error_at(&self, token: &Token, message: impl Into<String>) -> Error {
        Error::Syntax(SyntaxError::new(message).at(token.line, token.column))
    }

    fn parse_statement(&mut self) -> Result<Statement> {
        let token = self.bump();
        let word = match token.kind {
            TokenKind::Word(ref w) => w.clone(),
            _ => return Err(self.error_at(&token, "expected statement keyword")),
        };

        let keyword = if let Some((prefix, local)) = word.split_once(':') {
            KeywordOrCustom::Custom(prefix.to_string(), local.to_string())
        } else {
            match Keyword::from_name(&word) {
                Some(kw) => KeywordOrCustom::Keyword(kw),
                None => {
                    return Err(
                        self.error_at(&token, format!("unknown statement '{}'", word))
                    )
                }
            }
        };

        let arg = match &self.peek().kind {
            TokenKind::Word(w) => {
                let arg = w.clone();
                self.bump();
                Some(arg)
            }
            TokenKind::Quoted(s) => {
                let arg = s.clone();
                self.bump();
                Some(arg)
            }
            _ => None,
        };

        let mut statement = Statement {
            keyword,
            arg,
            children: Vec::new(),
            line: token.line,
            column: token.column,
        };

        let next = self.bump();
        match next.kind {
            TokenKind::Semicolon => Ok(statement),
            TokenKind::LeftBrace => {
                loop {
                    match &self.peek().kind {
                        TokenKind::RightBrace => {
                            self.bump();
                            return Ok(statement);
                        }
                        TokenKind::Eof => {
                            return Err(self.error_at(
                                &next,
                                "unterminated block, expected '}'",
                            ))
                        }
                        _ => statement.children.push(self.parse_statement()?),
                    }
                }
            }
            _ => Err(self.error_at(&next, "expected ';' or '{' after statement")),
        }
    }

    fn expect_eof(&mut self) -> Result<()> {
        let token = self.peek().clone();
        if token.kind == TokenKind::Eof {
            Ok(())
        } else {
            Err(self.error_at(&token, "trailing content after top-level statement"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_leaf() {
        let stmt = parse_text("leaf port { type int8 { range \"0 .. 50\"; } default \"20\"; }")
            .unwrap();
        assert_eq!(stmt.fixed_keyword(), Some(Keyword::Leaf));
        assert_eq!(stmt.arg.as_deref(), Some("port"));
        assert_eq!(stmt.children.len(), 2);

        let ty = &stmt.children[0];
        assert_eq!(ty.fixed_keyword(), Some(Keyword::Type));
        assert_eq!(ty.child_arg(Keyword::Range), Some("0 .. 50"));
    }

    #[test]
    fn test_parse_no_argument() {
        let stmt = parse_text("input { leaf x { type string; } }").unwrap();
        assert_eq!(stmt.fixed_keyword(), Some(Keyword::Input));
        assert_eq!(stmt.arg, None);
    }

    #[test]
    fn test_extension_instance() {
        let stmt = parse_text("module m { ext:annotation \"x\" { ext:detail; } }").unwrap();
        let ext = &stmt.children[0];
        assert!(ext.is_custom());
        assert_eq!(
            ext.keyword,
            KeywordOrCustom::Custom("ext".into(), "annotation".into())
        );
        assert_eq!(ext.children.len(), 1);
    }

    #[test]
    fn test_unknown_keyword_rejected() {
        let err = parse_text("modul m;").unwrap_err();
        assert!(format!("{}", err).contains("unknown statement 'modul'"));
    }

    #[test]
    fn test_missing_terminator() {
        let err = parse_text("leaf port").unwrap_err();
        assert!(format!("{}", err).contains("expected ';' or '{'"));
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_text("module m { leaf x { type string; }").unwrap_err();
        assert!(format!("{}", err).contains("unterminated block"));
    }

    #[test]
    fn test_trailing_content() {
        let err = parse_text("module m { } extra").unwrap_err();
        assert!(format!("{}", err).contains("trailing content"));
    }
}
