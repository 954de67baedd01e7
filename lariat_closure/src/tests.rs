use crate::{analyze, FunctionAnalysis, FunctionKind, PropertySet};

/// A small stand-in for the host's ambient-global table.
fn is_global(name: &str) -> bool {
    const GLOBALS: [&str; 8] = [
        "Array", "JSON", "Math", "Object", "Promise", "Symbol", "console", "undefined",
    ];
    GLOBALS.contains(&name)
}

fn run(source: &str) -> FunctionAnalysis {
    analyze(source, is_global).expect("analysis should succeed")
}

fn single_property(analysis: &FunctionAnalysis, name: &str) -> (String, bool) {
    match analysis.captures().required().get(name) {
        Some(PropertySet::Specific(properties)) if properties.len() == 1 => {
            (properties[0].name().to_owned(), properties[0].invoked())
        }
        other => panic!("expected a single property for `{name}`, got {other:?}"),
    }
}

#[test]
fn expression_arrow_with_capture() {
    let analysis = run("x => x + y");
    assert!(analysis.normalized().is_arrow());
    assert_eq!(
        analysis.captures().required().keys().collect::<Vec<_>>(),
        ["y"]
    );
    assert!(analysis.captures().required()["y"].is_all());
    assert!(!analysis.uses_non_lexical_this());
}

#[test]
fn block_arrow_with_typeof() {
    let analysis = run("() => { return typeof maybe; }");
    assert!(analysis.normalized().is_arrow());
    assert!(analysis.captures().required().is_empty());
    assert!(analysis.captures().optional()["maybe"].is_all());
    assert!(!analysis.uses_non_lexical_this());
}

#[test]
fn method_with_property_access() {
    let analysis = run("foo() { return obj.bar(); }");
    assert_eq!(analysis.normalized().kind(), FunctionKind::Method);
    assert!(analysis
        .normalized()
        .expr_with_name()
        .expect("methods have a named form")
        .starts_with("function foo("));
    assert_eq!(single_property(&analysis, "obj"), ("bar".to_owned(), true));
    assert!(analysis.uses_non_lexical_this());
}

#[test]
fn generator_with_this() {
    let analysis = run("function* gen() { yield this.x; }");
    assert!(!analysis.normalized().is_arrow());
    assert_eq!(analysis.normalized().declaration_name(), Some("gen"));
    assert_eq!(single_property(&analysis, "this"), ("x".to_owned(), false));
    assert!(analysis.uses_non_lexical_this());
}

#[test]
fn class_with_extends_and_no_constructor() {
    let analysis = run("class C extends B { }");
    assert_eq!(analysis.normalized().kind(), FunctionKind::Constructor);
    assert_eq!(
        analysis.normalized().expr_without_name(),
        "function /*constructor*/() { super(); }"
    );
    assert!(analysis.captures().is_empty());
    assert!(analysis.uses_non_lexical_this());
}

#[test]
fn class_with_explicit_constructor() {
    let analysis = run("class P { constructor(name) { this.name = name; registry.add(this); } }");
    assert_eq!(analysis.normalized().kind(), FunctionKind::Constructor);
    // `this` escapes whole into `registry.add`, absorbing the narrowing.
    assert!(analysis.captures().required()["this"].is_all());
    assert_eq!(
        single_property(&analysis, "registry"),
        ("add".to_owned(), true)
    );
    assert!(analysis.uses_non_lexical_this());
}

#[test]
fn async_wrapper_spurious_this() {
    let analysis = run(
        "function outer() { return __awaiter(this, void 0, void 0, function* () { return a; }); }",
    );
    assert_eq!(
        analysis.captures().required().keys().collect::<Vec<_>>(),
        ["a"]
    );
    assert!(analysis.captures().required()["a"].is_all());
    assert!(!analysis.uses_non_lexical_this());
}

#[test]
fn destructuring_with_default() {
    let analysis = run("({ x: y = z } = w) => y");
    assert_eq!(
        analysis.captures().required().keys().collect::<Vec<_>>(),
        ["z", "w"]
    );
    assert!(analysis.captures().required()["z"].is_all());
    assert!(analysis.captures().required()["w"].is_all());
}

#[test]
fn arrow_capturing_this_is_an_error() {
    let error = analyze("() => this.foo", is_global).expect_err("arrow `this` must error");
    assert_eq!(
        error.to_string(),
        "arrow function captured 'this'; assign 'this' to another name outside the function and capture that"
    );
    let analysis = error.analysis().expect("analysis should still be populated");
    assert_eq!(single_property(analysis, "this"), ("foo".to_owned(), false));
}

#[test]
fn arrow_invariant_holds() {
    for source in ["x => x", "() => { return a; }", "({ q }) => q"] {
        let analysis = run(source);
        assert!(analysis.normalized().is_arrow());
        assert!(!analysis.uses_non_lexical_this());
    }
}

#[test]
fn required_and_optional_are_disjoint() {
    let analysis = run("function f() { typeof a; a.b; return typeof c; }");
    let required: Vec<_> = analysis.captures().required().keys().collect();
    let optional: Vec<_> = analysis.captures().optional().keys().collect();
    assert_eq!(required, ["a"]);
    assert_eq!(optional, ["c"]);
}

#[test]
fn globals_are_excluded() {
    let analysis = run("function f() { return Math.max(a, console.log(b)); }");
    assert_eq!(
        analysis.captures().required().keys().collect::<Vec<_>>(),
        ["a", "b"]
    );
}

#[test]
fn reanalyzing_the_anonymous_form_is_stable() {
    let sources = [
        "x => x + y",
        "foo() { return obj.bar(); }",
        "function* gen() { yield this.x; }",
        "function add(a, b) { return a + b + base; }",
    ];
    for source in sources {
        let first = run(source);
        let second = run(first.normalized().expr_without_name());
        assert_eq!(
            first.captures(),
            second.captures(),
            "captures changed when reanalyzing the normalized form of {source:?}"
        );
    }
}

#[test]
fn native_code_error_message() {
    let error = analyze("function () { [native code] }", is_global)
        .expect_err("native code must be rejected");
    assert_eq!(error.to_string(), "it was a native code function.");
    assert!(error.analysis().is_none());
}

#[test]
fn unrecognized_form_error_message() {
    let error = analyze("[Function: foo]", is_global).expect_err("opaque form must be rejected");
    assert_eq!(error.to_string(), "the function form was not understood.");
}

#[test]
fn method_without_this_still_binds_a_receiver() {
    // A method needs its receiver at call time even when the body never
    // mentions `this`.
    let analysis = run("size() { return backing.length; }");
    assert!(analysis.uses_non_lexical_this());
}

#[test]
fn plain_function_without_this_does_not_bind_a_receiver() {
    let analysis = run("function f() { return backing.length; }");
    assert!(!analysis.uses_non_lexical_this());
}
