//! XML-form reader
//!
//! Walks the element tree produced by [`crate::documents`] and emits the
//! generic statement tree. Elements in the YIN namespace are dispatched by
//! local name; elements in a foreign namespace become extension instances;
//! elements with no resolvable namespace are rejected.

use crate::documents::{Document, Element};
use crate::error::{Error, Result, SyntaxError};
use crate::keywords::{match_keyword, Keyword, KeywordOrCustom};
use crate::parser::stmt::Statement;

/// Parse XML-form source into its single top-level statement
pub fn parse_text(input: &str) -> Result<Statement> {
    parse_bytes(input.as_bytes())
}

/// Parse XML-form bytes, rejecting invalid UTF-8
pub fn parse_bytes(input: &[u8]) -> Result<Statement> {
    let doc = Document::parse(input)?;
    element_to_statement(&doc.root, None)
}

fn syntax(element: &Element, message: impl Into<String>) -> Error {
    Error::Syntax(SyntaxError::new(message).at(element.line, element.column))
}

fn element_to_statement(element: &Element, parent: Option<Keyword>) -> Result<Statement> {
    let keyword = match_keyword(
        &element.local,
        element.prefix.as_deref(),
        element.namespace.as_deref(),
        parent,
    )
    .ok_or_else(|| {
        if element.namespace.is_none() {
            syntax(
                element,
                format!("element '{}' has no resolvable namespace", element.local),
            )
        } else {
            syntax(element, format!("unknown element '{}'", element.local))
        }
    })?;

    match keyword {
        KeywordOrCustom::Keyword(kw) => keyword_statement(element, kw),
        KeywordOrCustom::Custom(..) => Ok(custom_statement(element, keyword)),
    }
}

fn keyword_statement(element: &Element, kw: Keyword) -> Result<Statement> {
    let mut statement = Statement {
        keyword: KeywordOrCustom::Keyword(kw),
        arg: None,
        children: Vec::new(),
        line: element.line,
        column: element.column,
    };

    let mut skip_first_child = false;
    match kw.yin_argument() {
        None => {}
        Some((attr, false)) => {
            statement.arg = element.attribute(attr).map(|s| s.to_string());
            if statement.arg.is_none() {
                return Err(syntax(
                    element,
                    format!("element '{}' is missing its '{}' attribute", kw, attr),
                ));
            }
        }
        Some((carrier, true)) => {
            // Argument carried in a mandatory first <text>/<value> child.
            statement.arg = Some(argument_from_child(element, kw, carrier)?);
            skip_first_child = true;
        }
    }

    for child in element.children.iter().skip(usize::from(skip_first_child)) {
        statement.children.push(element_to_statement(child, Some(kw))?);
    }

    Ok(statement)
}

/// Extract the argument of a meta statement from its `<text>`/`<value>`
/// child: the carrier must be present, unique, and come first.
fn argument_from_child(element: &Element, kw: Keyword, carrier: &str) -> Result<String> {
    let first = element.children.first().ok_or_else(|| {
        syntax(
            element,
            format!("element '{}' is missing its mandatory '{}' child", kw, carrier),
        )
    })?;

    let carrier_count = element
        .children
        .iter()
        .filter(|c| c.local == carrier && c.namespace.as_deref() == element.namespace.as_deref())
        .count();

    if first.local != carrier {
        return Err(syntax(
            first,
            format!("'{}' child of '{}' must come first", carrier, kw),
        ));
    }
    if carrier_count > 1 {
        return Err(syntax(
            element,
            format!("'{}' child of '{}' given more than once", carrier, kw),
        ));
    }

    Ok(first.text.clone().unwrap_or_default())
}

/// Extension instances keep their whole subtree as a generic statement.
/// Character data, if any, becomes the argument.
fn custom_statement(element: &Element, keyword: KeywordOrCustom) -> Statement {
    let mut arg = element.text.clone();
    if arg.is_none() {
        // Extension conventions vary; a lone 'name' or 'value' attribute
        // is the most common argument carrier.
        arg = element
            .attribute("name")
            .or_else(|| element.attribute("value"))
            .map(|s| s.to_string());
    }

    Statement {
        keyword,
        arg,
        children: element
            .children
            .iter()
            .map(|c| custom_statement(c, child_naming(c)))
            .collect(),
        line: element.line,
        column: element.column,
    }
}

fn child_naming(element: &Element) -> KeywordOrCustom {
    KeywordOrCustom::Custom(
        element.prefix.clone().unwrap_or_default(),
        element.local.clone(),
    )
}
