//! Per-keyword sub-statement tables
//!
//! For every keyword the builder knows the permitted sub-statements and a
//! flag bundle per entry: unique, mandatory, must-be-first, and 1.1-only.
//! The XML argument carriers (`<text>`, `<value>`) are consumed by the XML
//! reader and never reach these tables.

use crate::keywords::Keyword;

/// Sub-statement may appear at most once
pub const UNIQUE: u8 = 0x01;
/// Sub-statement must appear
pub const MANDATORY: u8 = 0x02;
/// Sub-statement must appear before any sibling
pub const FIRST: u8 = 0x04;
/// Sub-statement requires YANG 1.1
pub const V11: u8 = 0x08;

type Rules = &'static [(Keyword, u8)];

use Keyword::*;

const MODULE_RULES: Rules = &[
    (YangVersion, UNIQUE),
    (Namespace, UNIQUE | MANDATORY),
    (Prefix, UNIQUE | MANDATORY),
    (Import, 0),
    (Include, 0),
    (Organization, UNIQUE),
    (Contact, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Revision, 0),
    (Extension, 0),
    (Feature, 0),
    (Identity, 0),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
    (Augment, 0),
    (Rpc, 0),
    (Notification, 0),
    (Deviation, 0),
];

const SUBMODULE_RULES: Rules = &[
    (YangVersion, UNIQUE),
    (BelongsTo, UNIQUE | MANDATORY),
    (Import, 0),
    (Include, 0),
    (Organization, UNIQUE),
    (Contact, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Revision, 0),
    (Extension, 0),
    (Feature, 0),
    (Identity, 0),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
    (Augment, 0),
    (Rpc, 0),
    (Notification, 0),
    (Deviation, 0),
];

const BELONGS_TO_RULES: Rules = &[(Prefix, UNIQUE | MANDATORY)];

const IMPORT_RULES: Rules = &[
    (Prefix, UNIQUE | MANDATORY),
    (RevisionDate, UNIQUE),
    (Description, UNIQUE | V11),
    (Reference, UNIQUE | V11),
];

const INCLUDE_RULES: Rules = &[
    (RevisionDate, UNIQUE),
    (Description, UNIQUE | V11),
    (Reference, UNIQUE | V11),
];

const REVISION_RULES: Rules = &[(Description, UNIQUE), (Reference, UNIQUE)];

const EXTENSION_RULES: Rules = &[
    (Argument, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const ARGUMENT_RULES: Rules = &[(YinElement, UNIQUE)];

const FEATURE_RULES: Rules = &[
    (IfFeature, 0),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const IDENTITY_RULES: Rules = &[
    (Base, 0),
    (IfFeature, V11),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const TYPEDEF_RULES: Rules = &[
    (Type, UNIQUE | MANDATORY),
    (Units, UNIQUE),
    (Default, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const GROUPING_RULES: Rules = &[
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
    (Action, V11),
    (Notification, V11),
];

const CONTAINER_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Must, 0),
    (Presence, UNIQUE),
    (Config, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
    (Action, V11),
    (Notification, V11),
];

const LEAF_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Type, UNIQUE | MANDATORY),
    (Units, UNIQUE),
    (Must, 0),
    (Default, UNIQUE),
    (Config, UNIQUE),
    (Mandatory, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const LEAF_LIST_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Type, UNIQUE | MANDATORY),
    (Units, UNIQUE),
    (Must, 0),
    (Default, V11),
    (Config, UNIQUE),
    (MinElements, UNIQUE),
    (MaxElements, UNIQUE),
    (OrderedBy, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const LIST_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Must, 0),
    (Key, UNIQUE),
    (Unique, 0),
    (Config, UNIQUE),
    (MinElements, UNIQUE),
    (MaxElements, UNIQUE),
    (OrderedBy, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
    (Action, V11),
    (Notification, V11),
];

const CHOICE_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Default, UNIQUE),
    (Config, UNIQUE),
    (Mandatory, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Case, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, V11),
    (Anydata, V11),
    (Anyxml, 0),
];

const CASE_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
];

const ANY_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Must, 0),
    (Config, UNIQUE),
    (Mandatory, UNIQUE),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const USES_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Refine, 0),
    (Augment, 0),
];

const REFINE_RULES: Rules = &[
    (IfFeature, V11),
    (Must, 0),
    (Presence, UNIQUE),
    (Default, 0),
    (Config, UNIQUE),
    (Mandatory, UNIQUE),
    (MinElements, UNIQUE),
    (MaxElements, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const AUGMENT_RULES: Rules = &[
    (When, UNIQUE),
    (IfFeature, 0),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Case, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
    (Action, V11),
    (Notification, V11),
];

const OPERATION_RULES: Rules = &[
    (IfFeature, 0),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Typedef, 0),
    (Grouping, 0),
    (Input, UNIQUE),
    (Output, UNIQUE),
];

const INOUT_RULES: Rules = &[
    (Must, V11),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
];

const NOTIFICATION_RULES: Rules = &[
    (IfFeature, 0),
    (Must, V11),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Typedef, 0),
    (Grouping, 0),
    (Container, 0),
    (Leaf, 0),
    (LeafList, 0),
    (List, 0),
    (Choice, 0),
    (Anydata, V11),
    (Anyxml, 0),
    (Uses, 0),
];

const DEVIATION_RULES: Rules = &[
    (Description, UNIQUE),
    (Reference, UNIQUE),
    (Deviate, MANDATORY),
];

const DEVIATE_RULES: Rules = &[
    (Type, UNIQUE),
    (Units, UNIQUE),
    (Must, 0),
    (Unique, 0),
    (Default, 0),
    (Config, UNIQUE),
    (Mandatory, UNIQUE),
    (MinElements, UNIQUE),
    (MaxElements, UNIQUE),
];

const TYPE_RULES: Rules = &[
    (FractionDigits, UNIQUE),
    (Range, UNIQUE),
    (Length, UNIQUE),
    (Pattern, 0),
    (Enum, 0),
    (Bit, 0),
    (Path, UNIQUE),
    (Base, 0),
    (RequireInstance, UNIQUE),
    (Type, 0),
];

const RESTRICTION_RULES: Rules = &[
    (ErrorMessage, UNIQUE),
    (ErrorAppTag, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const PATTERN_RULES: Rules = &[
    (Modifier, UNIQUE | V11),
    (ErrorMessage, UNIQUE),
    (ErrorAppTag, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const ENUM_RULES: Rules = &[
    (Value, UNIQUE),
    (IfFeature, V11),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const BIT_RULES: Rules = &[
    (Position, UNIQUE),
    (IfFeature, V11),
    (Status, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const MUST_RULES: Rules = &[
    (ErrorMessage, UNIQUE),
    (ErrorAppTag, UNIQUE),
    (Description, UNIQUE),
    (Reference, UNIQUE),
];

const WHEN_RULES: Rules = &[(Description, UNIQUE), (Reference, UNIQUE)];

const NO_SUBSTMTS: Rules = &[];

/// Permitted sub-statements of a keyword with their flag bundles
pub fn substmt_rules(parent: Keyword) -> Rules {
    match parent {
        Module => MODULE_RULES,
        Submodule => SUBMODULE_RULES,
        BelongsTo => BELONGS_TO_RULES,
        Import => IMPORT_RULES,
        Include => INCLUDE_RULES,
        Revision => REVISION_RULES,
        Extension => EXTENSION_RULES,
        Argument => ARGUMENT_RULES,
        Feature => FEATURE_RULES,
        Identity => IDENTITY_RULES,
        Typedef => TYPEDEF_RULES,
        Grouping => GROUPING_RULES,
        Container => CONTAINER_RULES,
        Leaf => LEAF_RULES,
        LeafList => LEAF_LIST_RULES,
        List => LIST_RULES,
        Choice => CHOICE_RULES,
        Case => CASE_RULES,
        Anydata | Anyxml => ANY_RULES,
        Uses => USES_RULES,
        Refine => REFINE_RULES,
        Augment => AUGMENT_RULES,
        Rpc | Action => OPERATION_RULES,
        Input | Output => INOUT_RULES,
        Notification => NOTIFICATION_RULES,
        Deviation => DEVIATION_RULES,
        Deviate => DEVIATE_RULES,
        Type => TYPE_RULES,
        Range | Length => RESTRICTION_RULES,
        Pattern => PATTERN_RULES,
        Enum => ENUM_RULES,
        Bit => BIT_RULES,
        Must => MUST_RULES,
        When => WHEN_RULES,
        _ => NO_SUBSTMTS,
    }
}
