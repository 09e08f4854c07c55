//! XML-form printer

use crate::keywords::{KeywordOrCustom, YIN_NAMESPACE};
use crate::parser::stmt::Statement;
use std::collections::BTreeSet;

/// Print a statement tree in the XML form.
///
/// Extension-instance prefixes are declared on the root element with
/// placeholder URIs; re-reading keeps them classified as extension
/// instances with the same prefixed naming.
pub fn print_statement(stmt: &Statement) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let mut prefixes = BTreeSet::new();
    collect_custom_prefixes(stmt, &mut prefixes);

    print_into(stmt, 0, true, &prefixes, &mut out);
    out
}

fn collect_custom_prefixes(stmt: &Statement, prefixes: &mut BTreeSet<String>) {
    if let KeywordOrCustom::Custom(prefix, _) = &stmt.keyword {
        if !prefix.is_empty() {
            prefixes.insert(prefix.clone());
        }
    }
    for child in &stmt.children {
        collect_custom_prefixes(child, prefixes);
    }
}

fn print_into(
    stmt: &Statement,
    depth: usize,
    is_root: bool,
    prefixes: &BTreeSet<String>,
    out: &mut String,
) {
    let indent = "  ".repeat(depth);
    let tag = match &stmt.keyword {
        KeywordOrCustom::Keyword(kw) => kw.name().to_string(),
        KeywordOrCustom::Custom(prefix, name) if !prefix.is_empty() => {
            format!("{}:{}", prefix, name)
        }
        KeywordOrCustom::Custom(_, name) => name.clone(),
    };

    out.push_str(&indent);
    out.push('<');
    out.push_str(&tag);

    if is_root {
        out.push_str(&format!(" xmlns=\"{}\"", YIN_NAMESPACE));
        for prefix in prefixes {
            out.push_str(&format!(
                " xmlns:{}=\"urn:yangschema:extension:{}\"",
                prefix, prefix
            ));
        }
    }

    // The argument: an attribute, a <text>/<value> child, or (for
    // extension instances) a 'name' attribute.
    let mut arg_child: Option<(&'static str, &str)> = None;
    match (&stmt.keyword, &stmt.arg) {
        (KeywordOrCustom::Keyword(kw), Some(arg)) => match kw.yin_argument() {
            Some((attr, false)) => {
                out.push_str(&format!(" {}=\"{}\"", attr, escape_attr(arg)));
            }
            Some((attr, true)) => arg_child = Some((attr, arg)),
            None => {}
        },
        (KeywordOrCustom::Custom(..), Some(arg)) => {
            out.push_str(&format!(" name=\"{}\"", escape_attr(arg)));
        }
        _ => {}
    }

    if stmt.children.is_empty() && arg_child.is_none() {
        out.push_str("/>\n");
        return;
    }

    out.push_str(">\n");
    if let Some((carrier, text)) = arg_child {
        out.push_str(&format!(
            "{}  <{}>{}</{}>\n",
            indent,
            carrier,
            escape_text(text),
            carrier
        ));
    }
    for child in &stmt.children {
        print_into(child, depth + 1, false, prefixes, out);
    }
    out.push_str(&format!("{}</{}>\n", indent, tag));
}

fn escape_attr(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn escape_text(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
