//! Compact-form lexical reader
//!
//! Tokenizes the native curly-brace surface form using logos: unquoted
//! words, quoted strings with `+` concatenation, block braces, statement
//! terminators, and `//` / `/* */` comments (stripped during lexing).
//! Invalid UTF-8 is rejected up front.
//!
//! # Design
//!
//! - `RawToken` — the logos token set over the source text
//! - [`Lexer`] — wraps the raw stream into position-carrying [`Token`]s
//!   and merges `+`-concatenated string literals into one argument
//!
//! Statement keywords are not lexed specially: in this grammar they are
//! context-dependent, so the dispatcher classifies words later.

use crate::error::{Error, Result, SyntaxError};
use logos::Logos;

/// Raw compact-form token.
///
/// LIMITATION: when a literal fails its callback (an unsupported escape
/// sequence in a double-quoted string), logos emits a generic error token
/// for the span. The specific reason is not preserved; the reader reports
/// a syntax error at the offending line and column. Unterminated strings
/// and block comments surface the same way.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n]+")] // Skip whitespace
#[logos(skip r"//[^\n]*")] // Skip // comments
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")] // Skip /* */ comments
enum RawToken {
    /// Delimiter `{`
    #[token("{")]
    LeftBrace,

    /// Delimiter `}`
    #[token("}")]
    RightBrace,

    /// Statement terminator `;`
    #[token(";")]
    Semicolon,

    /// String concatenation `+` between quoted literals
    #[token("+")]
    Plus,

    /// Double-quoted string literal; honors `\n \t \" \\` escapes
    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape_string(&s[1..s.len() - 1])
    })]
    DoubleQuoted(String),

    /// Single-quoted string literal; no escapes
    #[regex(r"'[^']*'", |lex| {
        let s = lex.slice();
        s[1..s.len() - 1].to_string()
    })]
    SingleQuoted(String),

    /// Unquoted word: a keyword or an unquoted argument. Ends at
    /// whitespace, a structural character, a quote, or a comment start;
    /// a single `/` may appear inside (schema paths), `//` and `/*`
    /// may not.
    #[regex(r#"[+/]?[^/*+ \t\r\n;{}"'][^/ \t\r\n;{}"']*(/[^/* \t\r\n;{}"'][^/ \t\r\n;{}"']*)*"#)]
    Word,
}

/// Unescape a double-quoted string literal's content. Only the four
/// escapes the grammar defines are accepted.
fn unescape_string(s: &str) -> Option<String> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => result.push('\n'),
                Some('t') => result.push('\t'),
                Some('"') => result.push('"'),
                Some('\\') => result.push('\\'),
                _ => return None, // unsupported escape sequence
            }
        } else {
            result.push(c);
        }
    }
    Some(result)
}

/// A single lexical token with its source position
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Token kind and payload
    pub kind: TokenKind,
    /// Line of the first character (1-based)
    pub line: usize,
    /// Column of the first character (1-based)
    pub column: usize,
}

/// Kinds of compact-form tokens
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// Unquoted word: a keyword or an unquoted argument
    Word(String),
    /// Quoted string argument; `+`-concatenated literals are merged
    Quoted(String),
    /// `{`
    LeftBrace,
    /// `}`
    RightBrace,
    /// `;`
    Semicolon,
    /// End of input
    Eof,
}

/// Tokenizer over the compact form
pub struct Lexer<'a> {
    input: &'a str,
}

impl<'a> Lexer<'a> {
    /// Create a lexer over raw bytes, rejecting invalid UTF-8
    pub fn from_bytes(input: &'a [u8]) -> Result<Self> {
        let text = std::str::from_utf8(input).map_err(|e| {
            let (line, column) = crate::documents::line_col(input, e.valid_up_to());
            Error::Syntax(SyntaxError::new("invalid UTF-8 in input").at(line, column))
        })?;
        Ok(Self::new(text))
    }

    /// Create a lexer over a source string
    pub fn new(input: &'a str) -> Self {
        Self { input }
    }

    fn position(&self, offset: usize) -> (usize, usize) {
        crate::documents::line_col(self.input.as_bytes(), offset)
    }

    /// Tokenize the whole input, merging `+`-concatenated string
    /// literals into single [`TokenKind::Quoted`] tokens.
    pub fn tokenize(self) -> Result<Vec<Token>> {
        let mut raw = RawToken::lexer(self.input).spanned().peekable();
        let mut tokens = Vec::new();

        while let Some((result, span)) = raw.next() {
            let (line, column) = self.position(span.start);
            let token = result.map_err(|_| {
                Error::Syntax(SyntaxError::new("malformed token").at(line, column))
            })?;

            let kind = match token {
                RawToken::LeftBrace => TokenKind::LeftBrace,
                RawToken::RightBrace => TokenKind::RightBrace,
                RawToken::Semicolon => TokenKind::Semicolon,
                RawToken::Word => TokenKind::Word(self.input[span].to_string()),
                RawToken::DoubleQuoted(value) | RawToken::SingleQuoted(value) => {
                    let mut value = value;
                    // A quoted literal followed by `+` concatenates with
                    // the next quoted literal, any number of times.
                    while matches!(raw.peek(), Some((Ok(RawToken::Plus), _))) {
                        raw.next();
                        match raw.next() {
                            Some((Ok(RawToken::DoubleQuoted(next)), _))
                            | Some((Ok(RawToken::SingleQuoted(next)), _)) => {
                                value.push_str(&next);
                            }
                            other => {
                                let offset = other
                                    .map(|(_, span)| span.start)
                                    .unwrap_or(self.input.len());
                                let (line, column) = self.position(offset);
                                return Err(Error::Syntax(
                                    SyntaxError::new("expected string literal after '+'")
                                        .at(line, column),
                                ));
                            }
                        }
                    }
                    TokenKind::Quoted(value)
                }
                RawToken::Plus => {
                    return Err(Error::Syntax(
                        SyntaxError::new("'+' is only valid between string literals")
                            .at(line, column),
                    ))
                }
            };
            tokens.push(Token { kind, line, column });
        }

        let (line, column) = self.position(self.input.len());
        tokens.push(Token {
            kind: TokenKind::Eof,
            line,
            column,
        });
        Ok(tokens)
    }

    /// The full source the lexer was created over
    pub fn source(&self) -> &'a str {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_basic_statement() {
        let tokens = kinds("leaf port { type int8; }");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Word("leaf".into()),
                TokenKind::Word("port".into()),
                TokenKind::LeftBrace,
                TokenKind::Word("type".into()),
                TokenKind::Word("int8".into()),
                TokenKind::Semicolon,
                TokenKind::RightBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_quoted_strings() {
        let tokens = kinds(r#"description "a b c";"#);
        assert_eq!(tokens[1], TokenKind::Quoted("a b c".into()));
    }

    #[test]
    fn test_escapes_in_double_quotes() {
        let tokens = kinds(r#"description "line\nnext\ttab \"q\" \\";"#);
        assert_eq!(
            tokens[1],
            TokenKind::Quoted("line\nnext\ttab \"q\" \\".into())
        );
    }

    #[test]
    fn test_single_quotes_literal() {
        let tokens = kinds(r"pattern '\d+';");
        assert_eq!(tokens[1], TokenKind::Quoted(r"\d+".into()));
    }

    #[test]
    fn test_concatenation() {
        let tokens = kinds("range \"0 .. \" + '50' + \" | 127\";");
        assert_eq!(tokens[1], TokenKind::Quoted("0 .. 50 | 127".into()));
    }

    #[test]
    fn test_comments() {
        let tokens = kinds("leaf // trailing\n/* block\ncomment */ port;");
        assert_eq!(
            tokens,
            vec![
                TokenKind::Word("leaf".into()),
                TokenKind::Word("port".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_positions() {
        let tokens = Lexer::new("leaf\n  port;").tokenize().unwrap();
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }

    #[test]
    fn test_word_shapes() {
        // Paths, signs, and ranges lex as single words.
        let tokens = kinds("augment /sys:system;");
        assert_eq!(tokens[1], TokenKind::Word("/sys:system".into()));

        let tokens = kinds("value +1;");
        assert_eq!(tokens[1], TokenKind::Word("+1".into()));

        let tokens = kinds("path ../port;");
        assert_eq!(tokens[1], TokenKind::Word("../port".into()));
    }

    #[test]
    fn test_unterminated_string() {
        let err = Lexer::new("description \"oops").tokenize().unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
        assert!(format!("{}", err).contains("line 1"));
    }

    #[test]
    fn test_invalid_escape() {
        let err = Lexer::new(r#"description "bad \q";"#).tokenize().unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn test_invalid_utf8() {
        let err = Lexer::from_bytes(b"leaf \xff;").err().unwrap();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn test_unterminated_comment() {
        let err = Lexer::new("/* no end").tokenize().unwrap_err();
        assert!(matches!(err, Error::Syntax(_)));
    }

    #[test]
    fn test_stray_plus_rejected() {
        let err = Lexer::new("leaf + port;").tokenize().unwrap_err();
        assert!(format!("{}", err).contains("between string literals"));

        let err = Lexer::new("range \"0 .. 5\" + ;").tokenize().unwrap_err();
        assert!(format!("{}", err).contains("expected string literal after '+'"));
    }
}
