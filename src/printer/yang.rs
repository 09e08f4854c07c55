//! Compact-form printer

use crate::keywords::KeywordOrCustom;
use crate::parser::stmt::Statement;

/// Print a statement tree in the compact form
pub fn print_statement(stmt: &Statement) -> String {
    let mut out = String::new();
    print_into(stmt, 0, &mut out);
    out
}

fn print_into(stmt: &Statement, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    match &stmt.keyword {
        KeywordOrCustom::Keyword(kw) => out.push_str(kw.name()),
        KeywordOrCustom::Custom(prefix, name) => {
            out.push_str(prefix);
            out.push(':');
            out.push_str(name);
        }
    }
    if let Some(arg) = &stmt.arg {
        out.push(' ');
        out.push_str(&format_argument(arg));
    }
    if stmt.children.is_empty() {
        out.push_str(";\n");
    } else {
        out.push_str(" {\n");
        for child in &stmt.children {
            print_into(child, depth + 1, out);
        }
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str("}\n");
    }
}

/// Quote an argument unless it lexes as a single unquoted word
fn format_argument(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg.chars().all(|c| {
            !c.is_whitespace()
                && !matches!(c, '{' | '}' | ';' | '"' | '\'' | '/' | '+' | '\\')
        });
    if plain {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '\t' => quoted.push_str("\\t"),
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::yang::parse_text;

    #[test]
    fn test_print_reparse_equal() {
        let text = "module m {\n  namespace \"urn:tests:m\";\n  prefix m;\n  \
                    leaf port {\n    type int8 {\n      range \"0 .. 50 | 127\";\n    }\n    \
                    default 20;\n  }\n}\n";
        let stmt = parse_text(text).unwrap();
        let printed = print_statement(&stmt);
        let reparsed = parse_text(&printed).unwrap();
        assert_eq!(stmt, reparsed);
    }

    #[test]
    fn test_quoting() {
        assert_eq!(format_argument("simple"), "simple");
        assert_eq!(format_argument("a b"), "\"a b\"");
        assert_eq!(format_argument("quote\"inside"), "\"quote\\\"inside\"");
        assert_eq!(format_argument("line\nbreak"), "\"line\\nbreak\"");
        assert_eq!(format_argument(""), "\"\"");
    }

    #[test]
    fn test_escape_roundtrip() {
        let text = "module m {\n  namespace \"urn:m\";\n  prefix m;\n  \
                    description \"tab\\there \\\"and\\\" back\\\\slash\";\n}\n";
        let stmt = parse_text(text).unwrap();
        let printed = print_statement(&stmt);
        let reparsed = parse_text(&printed).unwrap();
        assert_eq!(stmt, reparsed);
    }
}
