//! Parse-print round trips and cross-form equivalence.

use yangschema::parser::{build::build_module, yang, yin};
use yangschema::printer;
use yangschema::{Context, SchemaFormat};

const COMPACT: &str = r#"module example {
  yang-version 1.1;
  namespace "urn:tests:example";
  prefix ex;

  import other { prefix oth; revision-date 2020-01-01; }

  organization "Example Org";
  contact "maintainers@example.invalid";
  description "An example schema with a bit of everything.";
  revision 2022-03-04 { description "Second cut."; }
  revision 2021-01-02;

  feature fast-path;

  identity transport;
  identity tcp { base transport; }

  typedef percent { type uint8 { range "0 .. 100"; } default "50"; }

  grouping endpoint {
    leaf host { type string { length "1 .. 253"; } }
    leaf port { type uint16; }
  }

  container server {
    presence "server is configured";
    uses endpoint { refine port { default "8080"; } }
    leaf-list alias { type string; ordered-by user; max-elements 8; }
    list client {
      key "name";
      unique "address";
      leaf name { type string; }
      leaf address { type string; }
      leaf weight { type percent; }
    }
    choice mode {
      case plain { leaf plain-port { type uint16; } }
      leaf tls-port { type uint16; }
    }
  }

  augment "/server" {
    leaf extra { if-feature fast-path; type string; }
  }

  rpc restart {
    input { leaf delay { type uint32; units "seconds"; } }
    output { leaf ok { type boolean; } }
  }

  notification restarted {
    leaf cause { type string; }
  }
}
"#;

#[test]
fn compact_parse_print_roundtrip() {
    let stmt = yang::parse_text(COMPACT).unwrap();
    let printed = printer::yang::print_statement(&stmt);
    let reparsed = yang::parse_text(&printed).unwrap();
    assert_eq!(stmt, reparsed);
}

#[test]
fn yin_parse_print_roundtrip() {
    let stmt = yang::parse_text(COMPACT).unwrap();
    let printed = printer::yin::print_statement(&stmt);
    let reparsed = yin::parse_text(&printed).unwrap();
    assert_eq!(stmt, reparsed);
}

#[test]
fn parsed_module_print_roundtrip() {
    let stmt = yang::parse_text(COMPACT).unwrap();
    let module = build_module(&stmt).unwrap();

    let printed = printer::print_yang(&module);
    let reparsed = build_module(&yang::parse_text(&printed).unwrap()).unwrap();

    // The statement trees lowered from both parses must be equal.
    assert_eq!(
        printer::module_to_statement(&module),
        printer::module_to_statement(&reparsed)
    );
}

#[test]
fn cross_form_parsed_trees_equal() {
    let stmt = yang::parse_text(COMPACT).unwrap();
    let module = build_module(&stmt).unwrap();

    // Convert to the XML form, read it back, and build again.
    let yin_text = printer::print_yin(&module);
    let yin_module = build_module(&yin::parse_text(&yin_text).unwrap()).unwrap();

    assert_eq!(
        printer::module_to_statement(&module),
        printer::module_to_statement(&yin_module)
    );
}

#[test]
fn cross_form_compiled_trees_equal() {
    let dep = "module other { namespace \"urn:tests:other\"; prefix oth; \
               revision 2020-01-01; }";

    let mut ctx_yang = Context::new();
    ctx_yang.parse_module(dep, SchemaFormat::Yang).unwrap();
    ctx_yang.parse_module(COMPACT, SchemaFormat::Yang).unwrap();
    let compiled_yang = ctx_yang.compile_module("example").unwrap();

    let yin_text = {
        let module = build_module(&yang::parse_text(COMPACT).unwrap()).unwrap();
        printer::print_yin(&module)
    };
    let mut ctx_yin = Context::new();
    ctx_yin.parse_module(dep, SchemaFormat::Yang).unwrap();
    ctx_yin.parse_module(&yin_text, SchemaFormat::Yin).unwrap();
    let compiled_yin = ctx_yin.compile_module("example").unwrap();

    assert_eq!(format!("{:?}", compiled_yang), format!("{:?}", compiled_yin));
}

#[test]
fn quoting_styles_are_equivalent() {
    let single = "module q { namespace 'urn:q'; prefix q; leaf l { type string; } }";
    let double = "module q { namespace \"urn:q\"; prefix q; leaf l { type string; } }";
    let concat = "module q { namespace \"urn:\" + \"q\"; prefix q; leaf l { type string; } }";

    let a = yang::parse_text(single).unwrap();
    let b = yang::parse_text(double).unwrap();
    let c = yang::parse_text(concat).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);
}
