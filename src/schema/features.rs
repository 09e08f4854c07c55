//! Feature expressions
//!
//! `if-feature` arguments are boolean expressions over feature names:
//! `expr = term ('or' term)*`, `term = factor ('and' factor)*`,
//! `factor = 'not' factor | '(' expr ')' | name`. A guarded node is
//! pruned from the compiled tree when its expression is not satisfied by
//! the Context's enabled-feature set.

use crate::error::{Error, Result, ValidationError};

/// A compiled if-feature expression
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureExpr {
    /// A (possibly prefixed) feature name
    Feature(String),
    /// Logical negation
    Not(Box<FeatureExpr>),
    /// Logical conjunction
    And(Box<FeatureExpr>, Box<FeatureExpr>),
    /// Logical disjunction
    Or(Box<FeatureExpr>, Box<FeatureExpr>),
}

impl FeatureExpr {
    /// Parse an if-feature expression
    pub fn parse(text: &str) -> Result<FeatureExpr> {
        let tokens: Vec<&str> = tokenize(text);
        if tokens.is_empty() {
            return Err(invalid(text, "empty expression"));
        }
        let mut parser = ExprParser {
            tokens,
            pos: 0,
            source: text,
        };
        let expr = parser.parse_or()?;
        if parser.pos != parser.tokens.len() {
            return Err(invalid(text, "trailing tokens"));
        }
        Ok(expr)
    }

    /// Evaluate against a feature oracle
    pub fn eval(&self, enabled: &dyn Fn(&str) -> bool) -> bool {
        match self {
            FeatureExpr::Feature(name) => enabled(name),
            FeatureExpr::Not(inner) => !inner.eval(enabled),
            FeatureExpr::And(a, b) => a.eval(enabled) && b.eval(enabled),
            FeatureExpr::Or(a, b) => a.eval(enabled) || b.eval(enabled),
        }
    }

    /// Every feature name referenced by the expression
    pub fn referenced(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect(&mut names);
        names
    }

    fn collect<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            FeatureExpr::Feature(name) => names.push(name),
            FeatureExpr::Not(inner) => inner.collect(names),
            FeatureExpr::And(a, b) | FeatureExpr::Or(a, b) => {
                a.collect(names);
                b.collect(names);
            }
        }
    }
}

fn invalid(expr: &str, detail: &str) -> Error {
    Error::Validation(
        ValidationError::new(format!("malformed if-feature expression: {}", detail))
            .with_offending(expr),
    )
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return tokens;
        }
        if let Some(tail) = rest.strip_prefix('(') {
            tokens.push("(");
            rest = tail;
        } else if let Some(tail) = rest.strip_prefix(')') {
            tokens.push(")");
            rest = tail;
        } else {
            let end = rest
                .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
                .unwrap_or(rest.len());
            tokens.push(&rest[..end]);
            rest = &rest[end..];
        }
    }
}

struct ExprParser<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    source: &'a str,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn parse_or(&mut self) -> Result<FeatureExpr> {
        let mut left = self.parse_and()?;
        while self.peek() == Some("or") {
            self.bump();
            let right = self.parse_and()?;
            left = FeatureExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FeatureExpr> {
        let mut left = self.parse_factor()?;
        while self.peek() == Some("and") {
            self.bump();
            let right = self.parse_factor()?;
            left = FeatureExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_factor(&mut self) -> Result<FeatureExpr> {
        match self.bump() {
            Some("not") => Ok(FeatureExpr::Not(Box::new(self.parse_factor()?))),
            Some("(") => {
                let expr = self.parse_or()?;
                if self.bump() != Some(")") {
                    return Err(invalid(self.source, "unbalanced parenthesis"));
                }
                Ok(expr)
            }
            Some(name) if name != ")" && name != "and" && name != "or" => {
                if !crate::names::is_prefixed_identifier(name) {
                    return Err(invalid(self.source, "feature name expected"));
                }
                Ok(FeatureExpr::Feature(name.to_string()))
            }
            _ => Err(invalid(self.source, "operand expected")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(expr: &str, on: &[&str]) -> bool {
        FeatureExpr::parse(expr)
            .unwrap()
            .eval(&|name| on.contains(&name))
    }

    #[test]
    fn test_single_feature() {
        assert!(eval("ssh", &["ssh"]));
        assert!(!eval("ssh", &[]));
    }

    #[test]
    fn test_operators_and_precedence() {
        // 'not' binds tightest, then 'and', then 'or'
        assert!(eval("a or b and c", &["a"]));
        assert!(!eval("a or b and c", &["b"]));
        assert!(eval("a or b and c", &["b", "c"]));
        assert!(eval("not a or b", &["b"]));
        assert!(eval("not a", &[]));
        assert!(!eval("not (a or b)", &["b"]));
    }

    #[test]
    fn test_prefixed_feature_names() {
        assert!(eval("sys:ldap", &["sys:ldap"]));
    }

    #[test]
    fn test_referenced() {
        let expr = FeatureExpr::parse("a and (not b or c)").unwrap();
        assert_eq!(expr.referenced(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_malformed_expressions() {
        for expr in ["", "and", "a or", "(a", "a)", "a b", "not"] {
            assert!(FeatureExpr::parse(expr).is_err(), "accepted '{}'", expr);
        }
    }
}
