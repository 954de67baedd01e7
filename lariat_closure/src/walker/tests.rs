use boa_interner::Interner;

use super::CaptureScanner;
use crate::{
    captures::{CaptureRecord, PropertySet},
    parse,
};

fn captures_with<F>(source: &str, is_global: F) -> CaptureRecord
where
    F: Fn(&str) -> bool,
{
    let interner = &mut Interner::default();
    let script = parse::parse_wrapped(source, interner).expect("test source should parse");
    let mut scanner = CaptureScanner::new(interner);
    scanner.scan_script(&script);
    scanner.finish(interner, is_global)
}

fn captures(source: &str) -> CaptureRecord {
    captures_with(source, |_| false)
}

fn required_names(record: &CaptureRecord) -> Vec<&str> {
    record.required().keys().map(String::as_str).collect()
}

fn property_of(record: &CaptureRecord, name: &str) -> (String, bool) {
    match record.required().get(name) {
        Some(PropertySet::Specific(properties)) if properties.len() == 1 => {
            (properties[0].name().to_owned(), properties[0].invoked())
        }
        other => panic!("expected a single property for `{name}`, got {other:?}"),
    }
}

#[test]
fn free_variable_is_captured_whole() {
    let record = captures("function f() { return free; }");
    assert_eq!(required_names(&record), ["free"]);
    assert!(record.required()["free"].is_all());
}

#[test]
fn parameter_shadows_capture() {
    let record = captures("function f(a) { return a + b; }");
    assert_eq!(required_names(&record), ["b"]);
}

#[test]
fn var_hoists_over_earlier_reference() {
    let record = captures("function f() { const r = v; var v = 1; return r; }");
    assert!(record.is_empty());
}

#[test]
fn block_scoped_binding_does_not_escape_its_block() {
    let record = captures("function f() { { let a = 1; } return a; }");
    assert_eq!(required_names(&record), ["a"]);
}

#[test]
fn block_scoped_binding_shadows_inside_its_block() {
    let record = captures("function f() { { let a = 1; return a; } }");
    assert!(record.is_empty());
}

#[test]
fn var_in_block_is_function_scoped() {
    let record = captures("function f() { { var v = 1; } return v; }");
    assert!(record.is_empty());
}

#[test]
fn catch_parameter_is_scoped_to_the_clause() {
    let record = captures("function f() { try { risky(); } catch (e) { return e; } }");
    assert_eq!(required_names(&record), ["risky"]);
}

#[test]
fn nested_function_sees_parent_var() {
    let record = captures("function f() { var v = 1; return function g() { return v; }; }");
    assert!(record.is_empty());
}

#[test]
fn nested_function_capture_merges_into_parent() {
    let record = captures("function f() { return function g() { return outer; }; }");
    assert_eq!(required_names(&record), ["outer"]);
}

#[test]
fn named_function_expression_sees_itself() {
    let record = captures("function rec(n) { return n === 0 ? 1 : rec(n - 1); }");
    assert!(record.is_empty());
}

#[test]
fn function_declaration_name_hoists() {
    let record = captures("function f() { return g(); function g() { return h; } }");
    assert_eq!(required_names(&record), ["h"]);
}

#[test]
fn property_read_is_narrowed() {
    let record = captures("function f() { return obj.bar; }");
    assert_eq!(property_of(&record, "obj"), ("bar".to_owned(), false));
}

#[test]
fn property_call_marks_invoked() {
    let record = captures("function f() { return obj.bar(); }");
    assert_eq!(property_of(&record, "obj"), ("bar".to_owned(), true));
}

#[test]
fn invoked_merges_with_plain_read() {
    let record = captures("function f() { obj.bar; return obj.bar(); }");
    assert_eq!(property_of(&record, "obj"), ("bar".to_owned(), true));
}

#[test]
fn whole_use_absorbs_property_narrowing() {
    let record = captures("function f() { obj.bar; return obj; }");
    assert!(record.required()["obj"].is_all());
}

#[test]
fn computed_member_defeats_narrowing() {
    let record = captures("function f(k) { return obj[k]; }");
    assert!(record.required()["obj"].is_all());
}

#[test]
fn typeof_identifier_is_optional() {
    let record = captures("function f() { return typeof maybe; }");
    assert!(record.required().is_empty());
    assert!(record.optional()["maybe"].is_all());
}

#[test]
fn typeof_this_is_optional() {
    let record = captures("function f() { return typeof this; }");
    assert!(record.required().is_empty());
    assert!(record.optional()["this"].is_all());
}

#[test]
fn typeof_member_operand_stays_required() {
    let record = captures("function f() { return typeof obj.bar; }");
    assert!(record.optional().is_empty());
    assert_eq!(property_of(&record, "obj"), ("bar".to_owned(), false));
}

#[test]
fn probed_and_used_name_is_required_only() {
    let record = captures("function f() { typeof x; return x.y; }");
    assert!(record.optional().is_empty());
    // The probe observed the whole value, which absorbs the narrowing.
    assert!(record.required()["x"].is_all());
}

#[test]
fn async_wrapper_is_transparent() {
    let record = captures(
        "function outer() { return __awaiter(this, void 0, void 0, function* () { return a; }); }",
    );
    assert_eq!(required_names(&record), ["a"]);
}

#[test]
fn this_property_in_outermost_function() {
    let record = captures("function f() { return this.x; }");
    assert_eq!(property_of(&record, "this"), ("x".to_owned(), false));
}

#[test]
fn this_in_nested_function_is_not_captured() {
    let record = captures("function f() { return function g() { return this.x; }; }");
    assert!(record.is_empty());
}

#[test]
fn this_through_arrow_is_captured() {
    let record = captures("function f() { return () => this.x; }");
    assert_eq!(property_of(&record, "this"), ("x".to_owned(), false));
}

#[test]
fn arguments_is_never_captured() {
    let record = captures("function f() { return arguments.length; }");
    assert!(record.is_empty());
}

#[test]
fn destructured_parameter_binds_and_defaults_capture() {
    let record = captures("({ x: y = z } = w) => y");
    assert_eq!(required_names(&record), ["z", "w"]);
}

#[test]
fn array_pattern_rest_binds() {
    let record = captures("function f() { const [head, ...tail] = source; return head + tail; }");
    assert_eq!(required_names(&record), ["source"]);
}

#[test]
fn for_of_binding_is_loop_scoped() {
    let record = captures("function f(xs) { for (const x of xs) { sink(x); } }");
    assert_eq!(required_names(&record), ["sink"]);
}

#[test]
fn for_loop_lexical_binding_is_loop_scoped() {
    let record = captures("function f() { for (let i = 0; i < limit; i++) { sink(i); } }");
    assert_eq!(required_names(&record), ["limit", "sink"]);
}

#[test]
fn switch_cases_share_one_scope() {
    let record = captures(
        "function f(x) { switch (x) { case 1: let a = 1; return a; default: return 0; } }",
    );
    assert!(record.is_empty());
}

#[test]
fn object_method_computed_name_captures() {
    let record = captures("function f() { return { [key]() { return v; } }; }");
    assert_eq!(required_names(&record), ["key", "v"]);
}

#[test]
fn shorthand_property_is_a_reference() {
    let record = captures("function f() { return { shared }; }");
    assert_eq!(required_names(&record), ["shared"]);
}

#[test]
fn class_expression_name_is_scoped_to_its_body() {
    let record = captures(
        "function f() { const C = class Inner { m() { return captured; } }; return C; }",
    );
    assert_eq!(required_names(&record), ["captured"]);
}

#[test]
fn class_declaration_binds_its_name() {
    let record = captures("function f() { class Local { } return new Local(); }");
    assert!(record.is_empty());
}

#[test]
fn class_heritage_is_walked() {
    let record = captures("function f() { return class extends Base { }; }");
    assert_eq!(required_names(&record), ["Base"]);
}

#[test]
fn module_pseudo_globals_are_filtered() {
    let record = captures("function f() { return require(\"fs\") + __dirname; }");
    assert!(record.is_empty());
}

#[test]
fn ambient_globals_are_filtered() {
    let record = captures_with("function f() { return console.log(x); }", |name| {
        name == "console"
    });
    assert_eq!(required_names(&record), ["x"]);
}
