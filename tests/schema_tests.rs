//! End-to-end schema pipeline tests: parse, compile, type values.

use yangschema::schema::compiled::CompiledNodeKind;
use yangschema::types::value::NoIdentities;
use yangschema::types::BuiltinType;
use yangschema::{Context, Error, SchemaFormat};

fn module(body: &str) -> String {
    format!(
        "module m {{ yang-version 1.1; namespace \"urn:tests:m\"; prefix m; {} }}",
        body
    )
}

fn compile(body: &str) -> std::sync::Arc<yangschema::schema::compiled::CompiledModule> {
    let mut ctx = Context::new();
    ctx.parse_module(&module(body), SchemaFormat::Yang).unwrap();
    ctx.compile_module("m").unwrap()
}

fn compile_err(body: &str) -> Error {
    let mut ctx = Context::new();
    ctx.parse_module(&module(body), SchemaFormat::Yang).unwrap();
    ctx.compile_module("m").unwrap_err()
}

fn leaf_type(
    compiled: &yangschema::schema::compiled::CompiledModule,
    name: &str,
) -> yangschema::types::CompiledType {
    let id = compiled.child_by_name(None, name).unwrap();
    match &compiled.node(id).kind {
        CompiledNodeKind::Leaf { type_, .. } => type_.clone(),
        other => panic!("expected leaf, got {:?}", other),
    }
}

#[test]
fn scenario_int8_range_and_default() {
    let compiled = compile(
        "leaf port { type int8 { range \"0 .. 50 | 127\"; } default \"20\"; }",
    );

    let id = compiled.child_by_name(None, "port").unwrap();
    match &compiled.node(id).kind {
        CompiledNodeKind::Leaf {
            type_,
            default,
            default_value,
            ..
        } => {
            assert_eq!(type_.base, BuiltinType::Int8);
            let intervals: Vec<(i128, i128)> = type_
                .range
                .as_ref()
                .unwrap()
                .intervals()
                .iter()
                .map(|i| (i.lo, i.hi))
                .collect();
            assert_eq!(intervals, vec![(0, 50), (127, 127)]);
            assert_eq!(default.as_deref(), Some("20"));

            let stored = default_value.as_ref().unwrap();
            assert_eq!(type_.print(stored), "20");
        }
        other => panic!("expected leaf, got {:?}", other),
    }
}

#[test]
fn scenario_default_out_of_bounds() {
    let err = compile_err(
        "leaf port { type int8 { range \"0 .. 50 | 127\"; } default \"128\"; }",
    );
    let message = format!("{}", err);
    assert!(matches!(err, Error::Validation(_)));
    assert!(message.contains("Invalid default - value does not fit the type"));
    assert!(message.contains("out of int8's min/max bounds"));
}

#[test]
fn scenario_default_outside_range() {
    let err = compile_err(
        "leaf port { type int8 { range \"0 .. 50 | 127\"; } default \"60\"; }",
    );
    let message = format!("{}", err);
    assert!(matches!(err, Error::Validation(_)));
    assert!(message.contains("does not satisfy the range constraint"));
}

#[test]
fn scenario_derived_restriction_not_more_limiting() {
    let err = compile_err(
        "typedef my { type int8 { range \"-128 .. -60 | -1 .. 1 | 60 .. 127\"; } } \
         leaf l { type my { range \"-80 .. 80\"; } }",
    );
    let message = format!("{}", err);
    assert!(matches!(err, Error::Validation(_)));
    assert!(message.contains("derived restriction (-80 .. 80) is not equally or more limiting"));
}

#[test]
fn scenario_decimal64_canonicalization() {
    let compiled = compile("leaf x { type decimal64 { fraction-digits 2; } }");
    let type_ = leaf_type(&compiled, "x");

    let v = type_.store("3.1", &NoIdentities).unwrap();
    assert_eq!(type_.print(&v), "3.10");
    assert!(type_.store("3.145", &NoIdentities).is_err());
    let v = type_.store("-0.00", &NoIdentities).unwrap();
    assert_eq!(type_.print(&v), "0.00");
}

#[test]
fn scenario_identity_dag() {
    let mut ctx = Context::new();
    ctx.parse_module(
        &module("identity a; identity b { base a; } identity c { base b; }"),
        SchemaFormat::Yang,
    )
    .unwrap();
    ctx.compile_module("m").unwrap();

    use yangschema::types::value::IdentityResolver;
    let a = ctx.resolve("m:a").unwrap();
    let c = ctx.resolve("m:c").unwrap();
    assert!(ctx.derived_from_or_self(&c, &a));
    assert!(!ctx.derived_from_or_self(&a, &c));
}

#[test]
fn scenario_yin_range_intervals() {
    let source = format!(
        "<module name=\"m\" xmlns=\"{}\">\
         <yang-version value=\"1.1\"/>\
         <namespace uri=\"urn:tests:m\"/>\
         <prefix value=\"m\"/>\
         <leaf name=\"port\"><type name=\"int8\">\
         <range value=\"min .. 10 | 11 .. 12 | 30\"/>\
         </type></leaf></module>",
        yangschema::YIN_NAMESPACE
    );
    let mut ctx = Context::new();
    ctx.parse_module(&source, SchemaFormat::Yin).unwrap();
    let compiled = ctx.compile_module("m").unwrap();

    let type_ = leaf_type(&compiled, "port");
    let intervals: Vec<(i128, i128)> = type_
        .range
        .as_ref()
        .unwrap()
        .intervals()
        .iter()
        .map(|i| (i.lo, i.hi))
        .collect();
    // 10 and 11 are adjacent but must remain two intervals.
    assert_eq!(intervals, vec![(-128, 10), (11, 12), (30, 30)]);
}

#[test]
fn scenario_value_compare() {
    let compiled = compile("leaf port { type int8; }");
    let type_ = leaf_type(&compiled, "port");

    let a = type_.store("5", &NoIdentities).unwrap();
    let b = type_.store("5", &NoIdentities).unwrap();
    assert!(type_.compare(&a, &b));

    let b = type_.store("10", &NoIdentities).unwrap();
    assert!(!type_.compare(&a, &b));
}

#[test]
fn typedef_chain_collapses_to_builtin() {
    let compiled = compile(
        "typedef base-port { type uint16 { range \"1 .. 1000\"; } } \
         typedef small-port { type base-port { range \"1 .. 100\"; } } \
         leaf p { type small-port { range \"10 .. 20\"; } }",
    );
    let type_ = leaf_type(&compiled, "p");
    assert_eq!(type_.base, BuiltinType::Uint16);
    let intervals: Vec<(i128, i128)> = type_
        .range
        .as_ref()
        .unwrap()
        .intervals()
        .iter()
        .map(|i| (i.lo, i.hi))
        .collect();
    assert_eq!(intervals, vec![(10, 20)]);
}

#[test]
fn typedef_default_inherited_and_validated() {
    let compiled = compile(
        "typedef rating { type uint8 { range \"0 .. 10\"; } default \"5\"; } \
         leaf r { type rating; }",
    );
    let id = compiled.child_by_name(None, "r").unwrap();
    match &compiled.node(id).kind {
        CompiledNodeKind::Leaf { default, .. } => {
            assert_eq!(default.as_deref(), Some("5"));
        }
        other => panic!("expected leaf, got {:?}", other),
    }

    let err = compile_err(
        "typedef rating { type uint8 { range \"0 .. 10\"; } default \"50\"; } \
         leaf r { type rating; }",
    );
    assert!(format!("{}", err).contains("Invalid default"));
}

#[test]
fn typedef_cycle_is_fatal() {
    let err = compile_err(
        "typedef a { type b; } typedef b { type a; } leaf x { type a; }",
    );
    assert!(matches!(err, Error::Denied(_)));
    assert!(format!("{}", err).contains("cyclically derived"));
}

#[test]
fn unresolved_import_is_fatal() {
    let err = compile_err("import missing { prefix miss; }");
    assert!(matches!(err, Error::Unresolved(_)));
    assert!(format!("{}", err).contains("unresolved import 'missing'"));
}

#[test]
fn import_with_pinned_revision() {
    let mut ctx = Context::new();
    ctx.parse_module(
        "module dep { namespace \"urn:dep\"; prefix d; revision 2020-01-01; \
         typedef t { type int8; } }",
        SchemaFormat::Yang,
    )
    .unwrap();
    ctx.parse_module(
        &module("import dep { prefix d; revision-date 2020-01-01; } leaf x { type d:t; }"),
        SchemaFormat::Yang,
    )
    .unwrap();
    ctx.compile_module("m").unwrap();

    let mut ctx = Context::new();
    ctx.parse_module(
        "module dep { namespace \"urn:dep\"; prefix d; revision 2020-01-01; }",
        SchemaFormat::Yang,
    )
    .unwrap();
    ctx.parse_module(
        &module("import dep { prefix d; revision-date 2021-06-30; }"),
        SchemaFormat::Yang,
    )
    .unwrap();
    let err = ctx.compile_module("m").unwrap_err();
    assert!(matches!(err, Error::Unresolved(_)));
}

#[test]
fn submodule_bodies_are_spliced() {
    let mut ctx = Context::new();
    ctx.parse_submodule(
        "submodule s { belongs-to m { prefix m; } \
         typedef shared { type int8; } leaf from-sub { type shared; } }",
        SchemaFormat::Yang,
    )
    .unwrap();
    ctx.parse_module(
        &module("include s; leaf from-main { type shared; }"),
        SchemaFormat::Yang,
    )
    .unwrap();
    let compiled = ctx.compile_module("m").unwrap();

    assert!(compiled.child_by_name(None, "from-sub").is_some());
    assert!(compiled.child_by_name(None, "from-main").is_some());
}

#[test]
fn include_of_foreign_submodule_denied() {
    let mut ctx = Context::new();
    ctx.parse_submodule(
        "submodule s { belongs-to other { prefix o; } }",
        SchemaFormat::Yang,
    )
    .unwrap();
    ctx.parse_module(&module("include s;"), SchemaFormat::Yang).unwrap();
    let err = ctx.compile_module("m").unwrap_err();
    assert!(matches!(err, Error::Denied(_)));
}

#[test]
fn uses_expansion_with_refine() {
    let compiled = compile(
        "grouping endpoint { leaf host { type string; } leaf port { type uint16; } } \
         container server { uses endpoint { refine port { default \"8080\"; } } }",
    );
    let server = compiled.child_by_name(None, "server").unwrap();
    let port = compiled.child_by_name(Some(server), "port").unwrap();
    match &compiled.node(port).kind {
        CompiledNodeKind::Leaf { default, .. } => {
            assert_eq!(default.as_deref(), Some("8080"));
        }
        other => panic!("expected leaf, got {:?}", other),
    }
    assert!(compiled.child_by_name(Some(server), "host").is_some());
}

#[test]
fn uses_cycle_is_fatal() {
    let err = compile_err(
        "grouping a { uses b; } grouping b { uses a; } container c { uses a; }",
    );
    assert!(matches!(err, Error::Denied(_)));
    assert!(format!("{}", err).contains("cyclically referenced"));
}

#[test]
fn augment_grafts_into_target() {
    let compiled = compile(
        "container system { leaf hostname { type string; } } \
         augment \"/system\" { leaf location { type string; } }",
    );
    let system = compiled.child_by_name(None, "system").unwrap();
    assert!(compiled.child_by_name(Some(system), "location").is_some());
}

#[test]
fn augment_duplicate_name_is_fatal() {
    let err = compile_err(
        "container system { leaf hostname { type string; } } \
         augment \"/system\" { leaf hostname { type string; } }",
    );
    let message = format!("{}", err);
    assert!(matches!(err, Error::Validation(_)));
    assert!(message.contains("duplicate child name"));
}

#[test]
fn augment_unresolved_target() {
    let err = compile_err("augment \"/nope\" { leaf x { type string; } }");
    assert!(matches!(err, Error::Unresolved(_)));
}

#[test]
fn feature_pruning() {
    let body = "feature ssh; \
                container transport { \
                  leaf ssh-port { if-feature ssh; type uint16; } \
                  leaf port { type uint16; } }";

    // Feature disabled: the guarded leaf is pruned.
    let compiled = compile(body);
    let transport = compiled.child_by_name(None, "transport").unwrap();
    assert!(compiled.child_by_name(Some(transport), "ssh-port").is_none());
    assert!(compiled.child_by_name(Some(transport), "port").is_some());

    // Feature enabled: the guarded leaf is kept.
    let mut ctx = Context::new();
    ctx.parse_module(&module(body), SchemaFormat::Yang).unwrap();
    ctx.enable_feature("m", "ssh");
    let compiled = ctx.compile_module("m").unwrap();
    let transport = compiled.child_by_name(None, "transport").unwrap();
    assert!(compiled.child_by_name(Some(transport), "ssh-port").is_some());
}

#[test]
fn leafref_resolves_referent_type() {
    let compiled = compile(
        "container box { leaf port { type int8 { range \"0 .. 50\"; } } \
         leaf alias { type leafref { path \"../port\"; } } }",
    );
    let container = compiled.child_by_name(None, "box").unwrap();
    let alias = compiled.child_by_name(Some(container), "alias").unwrap();
    match &compiled.node(alias).kind {
        CompiledNodeKind::Leaf { type_, .. } => {
            assert_eq!(type_.base, BuiltinType::Leafref);
            let realtype = type_.realtype.as_deref().unwrap();
            assert_eq!(realtype.base, BuiltinType::Int8);
            assert!(type_.store("20", &NoIdentities).is_ok());
            assert!(type_.store("60", &NoIdentities).is_err());
        }
        other => panic!("expected leaf, got {:?}", other),
    }
}

#[test]
fn leafref_missing_target_is_unresolved() {
    let err = compile_err("leaf alias { type leafref { path \"../gone\"; } }");
    assert!(matches!(err, Error::Unresolved(_)));
    assert!(format!("{}", err).contains("leafref target"));
}

#[test]
fn deviation_not_supported_removes_node() {
    let compiled = compile(
        "container box { leaf gone { type string; } leaf kept { type string; } } \
         deviation \"/box/gone\" { deviate not-supported; }",
    );
    let container = compiled.child_by_name(None, "box").unwrap();
    assert!(compiled.child_by_name(Some(container), "gone").is_none());
    assert!(compiled.child_by_name(Some(container), "kept").is_some());
}

#[test]
fn deviation_add_and_replace() {
    let compiled = compile(
        "leaf speed { type uint32; } \
         deviation \"/speed\" { deviate add { units \"bps\"; default \"1000\"; } }",
    );
    let id = compiled.child_by_name(None, "speed").unwrap();
    match &compiled.node(id).kind {
        CompiledNodeKind::Leaf { units, default, .. } => {
            assert_eq!(units.as_deref(), Some("bps"));
            assert_eq!(default.as_deref(), Some("1000"));
        }
        other => panic!("expected leaf, got {:?}", other),
    }

    let err = compile_err(
        "leaf speed { type uint32; default \"10\"; } \
         deviation \"/speed\" { deviate add { default \"1000\"; } }",
    );
    assert!(format!("{}", err).contains("conflicts with existing property"));
}

#[test]
fn config_inheritance_and_conflict() {
    let compiled = compile(
        "container state { config false; leaf counter { type uint64; } }",
    );
    let state = compiled.child_by_name(None, "state").unwrap();
    let counter = compiled.child_by_name(Some(state), "counter").unwrap();
    assert!(!compiled.node(counter).config);

    let err = compile_err(
        "container state { config false; leaf bad { config true; type uint64; } }",
    );
    assert!(format!("{}", err).contains("config true cannot be under config false"));
}

#[test]
fn status_inheritance_and_conflict() {
    let err = compile_err(
        "container old { status obsolete; leaf fresh { status current; type string; } }",
    );
    assert!(format!("{}", err).contains("conflicts with the parent's"));
}

#[test]
fn config_list_requires_key() {
    let err = compile_err("list entries { leaf name { type string; } }");
    assert!(format!("{}", err).contains("must have a key"));

    // A state list needs no key.
    compile("container state { config false; list entries { leaf name { type string; } } }");
}

#[test]
fn empty_enumeration_rejected() {
    let err = compile_err("leaf e { type enumeration; }");
    assert!(format!("{}", err).contains("at least one member"));

    let err = compile_err("leaf b { type bits; }");
    assert!(format!("{}", err).contains("at least one member"));
}

#[test]
fn enum_auto_values_and_uniqueness() {
    let compiled = compile(
        "leaf e { type enumeration { enum zero; enum five { value 5; } enum six; } }",
    );
    let type_ = leaf_type(&compiled, "e");
    let members: Vec<(String, i32)> = type_
        .enums
        .iter()
        .map(|m| (m.name.clone(), m.value))
        .collect();
    assert_eq!(
        members,
        vec![
            ("zero".to_string(), 0),
            ("five".to_string(), 5),
            ("six".to_string(), 6)
        ]
    );

    let err = compile_err("leaf e { type enumeration { enum a; enum a; } }");
    assert!(format!("{}", err).contains("duplicate enum member name"));

    let err =
        compile_err("leaf e { type enumeration { enum a { value 1; } enum b { value 1; } } }");
    assert!(format!("{}", err).contains("duplicate enum member value"));
}

#[test]
fn bit_positions_and_uniqueness() {
    let compiled = compile(
        "leaf b { type bits { bit alpha; bit beta { position 4; } bit gamma; } }",
    );
    let type_ = leaf_type(&compiled, "b");
    let members: Vec<(String, u32)> = type_
        .bits
        .iter()
        .map(|m| (m.name.clone(), m.position))
        .collect();
    assert_eq!(
        members,
        vec![
            ("alpha".to_string(), 0),
            ("beta".to_string(), 4),
            ("gamma".to_string(), 5)
        ]
    );

    let err = compile_err(
        "leaf b { type bits { bit x { position 2; } bit y { position 2; } } }",
    );
    assert!(format!("{}", err).contains("duplicate bit member position"));
}

#[test]
fn enum_subset_rules() {
    let compiled = compile(
        "typedef colors { type enumeration { enum red; enum green; enum blue; } } \
         leaf c { type colors { enum red; enum blue; } }",
    );
    let type_ = leaf_type(&compiled, "c");
    let names: Vec<&str> = type_.enums.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["red", "blue"]);
    // Inherited values survive the restriction.
    assert_eq!(type_.enums[1].value, 2);

    let err = compile_err(
        "typedef colors { type enumeration { enum red; enum green; } } \
         leaf c { type colors { enum yellow; } }",
    );
    assert!(format!("{}", err).contains("not defined in the base type"));

    let err = compile_err(
        "typedef colors { type enumeration { enum red; enum green; } } \
         leaf c { type colors { enum red { value 7; } } }",
    );
    assert!(format!("{}", err).contains("cannot be re-assigned"));
}

#[test]
fn identityref_requires_known_base() {
    let err = compile_err("leaf i { type identityref { base missing; } }");
    assert!(matches!(err, Error::Unresolved(_)));
}

#[test]
fn union_members_in_declaration_order() {
    let compiled = compile("leaf u { type union { type int8; type string; } }");
    let type_ = leaf_type(&compiled, "u");
    assert_eq!(type_.members.len(), 2);
    assert_eq!(type_.members[0].base, BuiltinType::Int8);
    assert_eq!(type_.members[1].base, BuiltinType::String);
}

#[test]
fn restriction_applicability() {
    let err = compile_err("leaf x { type boolean { range \"0 .. 1\"; } }");
    assert!(format!("{}", err).contains("not applicable"));

    let err = compile_err("leaf x { type int8 { length \"1 .. 2\"; } }");
    assert!(format!("{}", err).contains("not applicable"));

    let err = compile_err("leaf x { type int8 { pattern \"[0-9]\"; } }");
    assert!(format!("{}", err).contains("not applicable"));
}

#[test]
fn revisions_sorted_descending() {
    let mut ctx = Context::new();
    ctx.parse_module(
        "module r { namespace \"urn:r\"; prefix r; \
         revision 2019-04-01; revision 2021-11-12; revision 2020-06-30; }",
        SchemaFormat::Yang,
    )
    .unwrap();
    let compiled = ctx.compile_module("r").unwrap();
    let dates: Vec<&str> = compiled.revisions.iter().map(|r| r.date.as_str()).collect();
    assert_eq!(dates, vec!["2021-11-12", "2020-06-30", "2019-04-01"]);
}

#[test]
fn rpc_and_notification_compiled() {
    let compiled = compile(
        "rpc reboot { input { leaf delay { type uint32; } } output { leaf ok { type boolean; } } } \
         notification link-down { leaf ifname { type string; } }",
    );
    assert_eq!(compiled.rpcs.len(), 1);
    assert_eq!(compiled.notifications.len(), 1);

    let rpc = compiled.rpcs[0];
    let input = compiled.child_by_name(Some(rpc), "input").unwrap();
    let delay = compiled.child_by_name(Some(input), "delay").unwrap();
    assert!(!compiled.node(delay).config);
}

#[test]
fn bad_namespace_uri_rejected() {
    let mut ctx = Context::new();
    ctx.parse_module(
        "module m { namespace \"not a uri\"; prefix m; }",
        SchemaFormat::Yang,
    )
    .unwrap();
    let err = ctx.compile_module("m").unwrap_err();
    assert!(format!("{}", err).contains("namespace is not a valid URI"));
}

#[test]
fn schema_path_breadcrumbs() {
    let compiled = compile("container a { container b { leaf c { type string; } } }");
    let a = compiled.child_by_name(None, "a").unwrap();
    let b = compiled.child_by_name(Some(a), "b").unwrap();
    let c = compiled.child_by_name(Some(b), "c").unwrap();
    assert_eq!(compiled.path(c), "/m:a/b/c");
}
