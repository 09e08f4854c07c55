//! YANG keyword enumeration and dispatch
//!
//! Maps statement identifiers (and XML-form element names) to a fixed
//! keyword enumeration, and records per keyword the argument it takes:
//! its kind, its XML attribute name, and whether the XML form carries it
//! in a child element instead of an attribute.

use std::collections::HashMap;
use std::fmt;

/// The YIN namespace URI of the XML surface form
pub const YIN_NAMESPACE: &str = "urn:ietf:params:xml:ns:yang:yin:1";

/// The fixed set of YANG statement keywords plus the two pseudo-keywords
/// used only by the XML form (`TEXT`, `VALUE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Keyword {
    Action,
    Anydata,
    Anyxml,
    Argument,
    Augment,
    Base,
    BelongsTo,
    Bit,
    Case,
    Choice,
    Config,
    Contact,
    Container,
    Default,
    Description,
    Deviate,
    Deviation,
    Enum,
    ErrorAppTag,
    ErrorMessage,
    Extension,
    Feature,
    FractionDigits,
    Grouping,
    Identity,
    IfFeature,
    Import,
    Include,
    Input,
    Key,
    Leaf,
    LeafList,
    Length,
    List,
    Mandatory,
    MaxElements,
    MinElements,
    Modifier,
    Module,
    Must,
    Namespace,
    Notification,
    OrderedBy,
    Organization,
    Output,
    Path,
    Pattern,
    Position,
    Prefix,
    Presence,
    Range,
    Reference,
    Refine,
    RequireInstance,
    Revision,
    RevisionDate,
    Rpc,
    Status,
    Submodule,
    Type,
    Typedef,
    Unique,
    Units,
    Uses,
    Value,
    When,
    YangVersion,
    YinElement,
    /// Pseudo-keyword: `<text>` argument carrier in the XML form
    Text,
    /// Pseudo-keyword: `<value>` argument carrier under `error-message`
    PseudoValue,
}

/// Result of keyword dispatch: a fixed keyword or an extension instance
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeywordOrCustom {
    /// A keyword from the fixed enumeration
    Keyword(Keyword),
    /// An extension instance: `(prefix, local-name)`
    Custom(String, String),
}

/// Required argument kind per keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// The keyword takes no argument
    None,
    /// A YANG identifier
    Identifier,
    /// An optionally prefixed identifier
    PrefixedIdentifier,
    /// Any YANG string
    String,
}

const KEYWORD_TABLE: &[(&str, Keyword)] = &[
    ("action", Keyword::Action),
    ("anydata", Keyword::Anydata),
    ("anyxml", Keyword::Anyxml),
    ("argument", Keyword::Argument),
    ("augment", Keyword::Augment),
    ("base", Keyword::Base),
    ("belongs-to", Keyword::BelongsTo),
    ("bit", Keyword::Bit),
    ("case", Keyword::Case),
    ("choice", Keyword::Choice),
    ("config", Keyword::Config),
    ("contact", Keyword::Contact),
    ("container", Keyword::Container),
    ("default", Keyword::Default),
    ("description", Keyword::Description),
    ("deviate", Keyword::Deviate),
    ("deviation", Keyword::Deviation),
    ("enum", Keyword::Enum),
    ("error-app-tag", Keyword::ErrorAppTag),
    ("error-message", Keyword::ErrorMessage),
    ("extension", Keyword::Extension),
    ("feature", Keyword::Feature),
    ("fraction-digits", Keyword::FractionDigits),
    ("grouping", Keyword::Grouping),
    ("identity", Keyword::Identity),
    ("if-feature", Keyword::IfFeature),
    ("import", Keyword::Import),
    ("include", Keyword::Include),
    ("input", Keyword::Input),
    ("key", Keyword::Key),
    ("leaf", Keyword::Leaf),
    ("leaf-list", Keyword::LeafList),
    ("length", Keyword::Length),
    ("list", Keyword::List),
    ("mandatory", Keyword::Mandatory),
    ("max-elements", Keyword::MaxElements),
    ("min-elements", Keyword::MinElements),
    ("modifier", Keyword::Modifier),
    ("module", Keyword::Module),
    ("must", Keyword::Must),
    ("namespace", Keyword::Namespace),
    ("notification", Keyword::Notification),
    ("ordered-by", Keyword::OrderedBy),
    ("organization", Keyword::Organization),
    ("output", Keyword::Output),
    ("path", Keyword::Path),
    ("pattern", Keyword::Pattern),
    ("position", Keyword::Position),
    ("prefix", Keyword::Prefix),
    ("presence", Keyword::Presence),
    ("range", Keyword::Range),
    ("reference", Keyword::Reference),
    ("refine", Keyword::Refine),
    ("require-instance", Keyword::RequireInstance),
    ("revision", Keyword::Revision),
    ("revision-date", Keyword::RevisionDate),
    ("rpc", Keyword::Rpc),
    ("status", Keyword::Status),
    ("submodule", Keyword::Submodule),
    ("type", Keyword::Type),
    ("typedef", Keyword::Typedef),
    ("unique", Keyword::Unique),
    ("units", Keyword::Units),
    ("uses", Keyword::Uses),
    ("value", Keyword::Value),
    ("when", Keyword::When),
    ("yang-version", Keyword::YangVersion),
    ("yin-element", Keyword::YinElement),
];

lazy_static::lazy_static! {
    static ref KEYWORDS_BY_NAME: HashMap<&'static str, Keyword> =
        KEYWORD_TABLE.iter().copied().collect();
}

impl Keyword {
    /// Look up a keyword by statement name. The pseudo-keywords are not
    /// reachable this way; they exist only through [`match_keyword`].
    pub fn from_name(name: &str) -> Option<Keyword> {
        KEYWORDS_BY_NAME.get(name).copied()
    }

    /// The statement name of this keyword
    pub fn name(&self) -> &'static str {
        match self {
            Keyword::Text => "text",
            Keyword::PseudoValue => "value",
            kw => KEYWORD_TABLE
                .iter()
                .find(|(_, k)| k == kw)
                .map(|(n, _)| *n)
                .unwrap_or(""),
        }
    }

    /// The argument kind the statement builder must enforce
    pub fn argument_kind(&self) -> ArgKind {
        use Keyword::*;
        match self {
            Input | Output => ArgKind::None,
            Action | Anydata | Anyxml | Argument | BelongsTo | Bit | Case | Choice | Container
            | Extension | Feature | Grouping | Identity | Import | Include | Leaf | LeafList
            | List | Module | Notification | Prefix | Rpc | Submodule | Typedef => {
                ArgKind::Identifier
            }
            Base | IfFeature | Type | Uses => ArgKind::PrefixedIdentifier,
            _ => ArgKind::String,
        }
    }

    /// The XML-form argument carrier: `(attribute-name, in-child-element)`.
    /// `None` when the keyword takes no argument.
    pub fn yin_argument(&self) -> Option<(&'static str, bool)> {
        use Keyword::*;
        match self {
            Input | Output => None,
            Augment | Deviation | Refine => Some(("target-node", false)),
            BelongsTo | Import | Include => Some(("module", false)),
            Must | When => Some(("condition", false)),
            Namespace => Some(("uri", false)),
            Revision | RevisionDate => Some(("date", false)),
            Unique => Some(("tag", false)),
            Contact | Description | Organization | Reference => Some(("text", true)),
            ErrorMessage => Some(("value", true)),
            Config | Default | Deviate | ErrorAppTag | FractionDigits | Key | Length
            | Mandatory | MaxElements | MinElements | Modifier | OrderedBy | Path | Pattern
            | Position | Prefix | Presence | Range | RequireInstance | Status | Units | Value
            | YangVersion | YinElement => Some(("value", false)),
            Text | PseudoValue => None,
            _ => Some(("name", false)),
        }
    }

    /// Body-ordering group of a direct `module`/`submodule` child
    pub fn body_group(&self) -> BodyGroup {
        use Keyword::*;
        match self {
            YangVersion | Namespace | Prefix | BelongsTo => BodyGroup::Header,
            Import | Include => BodyGroup::Linkage,
            Organization | Contact | Description | Reference => BodyGroup::Meta,
            Revision => BodyGroup::Revision,
            _ => BodyGroup::Body,
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl fmt::Display for KeywordOrCustom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeywordOrCustom::Keyword(kw) => write!(f, "{}", kw),
            KeywordOrCustom::Custom(prefix, name) => write!(f, "{}:{}", prefix, name),
        }
    }
}

/// Relative ordering groups for direct children of `module`/`submodule`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BodyGroup {
    /// yang-version, namespace, prefix, belongs-to
    Header,
    /// import, include
    Linkage,
    /// organization, contact, description, reference
    Meta,
    /// revision
    Revision,
    /// everything else
    Body,
}

/// Dispatch an XML-form element name to a keyword.
///
/// An element in the YIN namespace resolves by name alone; an element in
/// any other namespace is an extension instance; an element with no
/// resolvable namespace is rejected (`None`). The token `value` maps to
/// the `VALUE` pseudo-keyword only under `error-message`; the token
/// `text` always maps to the `TEXT` pseudo-keyword.
pub fn match_keyword(
    name: &str,
    prefix: Option<&str>,
    namespace: Option<&str>,
    parent: Option<Keyword>,
) -> Option<KeywordOrCustom> {
    let namespace = namespace?;

    if namespace != YIN_NAMESPACE {
        let prefix = prefix.unwrap_or("").to_string();
        return Some(KeywordOrCustom::Custom(prefix, name.to_string()));
    }

    if name == "text" {
        return Some(KeywordOrCustom::Keyword(Keyword::Text));
    }

    let kw = Keyword::from_name(name)?;
    if kw == Keyword::Value && parent == Some(Keyword::ErrorMessage) {
        return Some(KeywordOrCustom::Keyword(Keyword::PseudoValue));
    }
    Some(KeywordOrCustom::Keyword(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_roundtrip() {
        for (name, kw) in KEYWORD_TABLE {
            assert_eq!(Keyword::from_name(name), Some(*kw));
            assert_eq!(kw.name(), *name);
        }
    }

    #[test]
    fn test_argument_kinds() {
        assert_eq!(Keyword::Leaf.argument_kind(), ArgKind::Identifier);
        assert_eq!(Keyword::Type.argument_kind(), ArgKind::PrefixedIdentifier);
        assert_eq!(Keyword::Range.argument_kind(), ArgKind::String);
        assert_eq!(Keyword::Input.argument_kind(), ArgKind::None);
    }

    #[test]
    fn test_yin_arguments() {
        assert_eq!(Keyword::Leaf.yin_argument(), Some(("name", false)));
        assert_eq!(Keyword::Augment.yin_argument(), Some(("target-node", false)));
        assert_eq!(Keyword::Description.yin_argument(), Some(("text", true)));
        assert_eq!(Keyword::ErrorMessage.yin_argument(), Some(("value", true)));
        assert_eq!(Keyword::Namespace.yin_argument(), Some(("uri", false)));
        assert_eq!(Keyword::Input.yin_argument(), None);
    }

    #[test]
    fn test_match_keyword_yin_namespace() {
        let kw = match_keyword("leaf", None, Some(YIN_NAMESPACE), None);
        assert_eq!(kw, Some(KeywordOrCustom::Keyword(Keyword::Leaf)));
    }

    #[test]
    fn test_match_keyword_value_pseudo() {
        let kw = match_keyword(
            "value",
            None,
            Some(YIN_NAMESPACE),
            Some(Keyword::ErrorMessage),
        );
        assert_eq!(kw, Some(KeywordOrCustom::Keyword(Keyword::PseudoValue)));

        let kw = match_keyword("value", None, Some(YIN_NAMESPACE), Some(Keyword::Enum));
        assert_eq!(kw, Some(KeywordOrCustom::Keyword(Keyword::Value)));
    }

    #[test]
    fn test_match_keyword_custom() {
        let kw = match_keyword("note", Some("ext"), Some("urn:example:ext"), None);
        assert_eq!(
            kw,
            Some(KeywordOrCustom::Custom("ext".into(), "note".into()))
        );
    }

    #[test]
    fn test_match_keyword_no_namespace_rejected() {
        assert_eq!(match_keyword("leaf", None, None, None), None);
    }

    #[test]
    fn test_body_groups() {
        assert!(Keyword::Namespace.body_group() < Keyword::Import.body_group());
        assert!(Keyword::Import.body_group() < Keyword::Organization.body_group());
        assert!(Keyword::Organization.body_group() < Keyword::Revision.body_group());
        assert!(Keyword::Revision.body_group() < Keyword::Leaf.body_group());
    }
}
