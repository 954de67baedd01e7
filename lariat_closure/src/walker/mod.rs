//! Free-variable analysis of a parsed function.
//!
//! The walker traverses the syntax tree of a normalized function while
//! maintaining the lexical bookkeeping a host runtime would: a hoisted
//! function-var scope per function, a stack of block scopes for `let`,
//! `const` and catch bindings, and fresh scopes for every nested
//! function-like node. Identifiers that resolve to none of those scopes are
//! the function's captures.
//!
//! Scope state is saved on entry to each function-like node and restored on
//! exit; the child's captures are merged into the parent's after removing
//! everything the child declared itself. This makes `var` hoisting work
//! without a separate pre-pass: a reference recorded before its `var`
//! declaration was reached is cleaned up when the function exits.

use std::mem;
use std::ops::ControlFlow;

use boa_ast::{
    declaration::{Binding, Declaration, LexicalDeclaration, VarDeclaration, Variable},
    expression::{
        access::{PropertyAccess, PropertyAccessField, SimplePropertyAccess},
        operator::{unary::UnaryOp, Unary},
        Call, Expression, Identifier,
    },
    function::{
        ArrowFunction, AsyncArrowFunction, AsyncFunction, AsyncGenerator, Class, ClassElement,
        FormalParameterList, Function, Generator,
    },
    pattern::{ArrayPatternElement, ObjectPatternElement, Pattern},
    property::{MethodDefinition, PropertyDefinition, PropertyName},
    statement::{
        iteration::{ForInLoop, ForLoop, ForOfLoop, IterableLoopInitializer},
        Block, Catch, LabelledItem, Switch,
    },
    visitor::{VisitWith, Visitor},
    StatementList,
};
use boa_interner::{Interner, Sym};
use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use crate::{
    captures::{CaptureRecord, CaptureSet, CapturedProperty, PropertySet},
    lowering,
};

#[cfg(test)]
mod tests;

/// Names the host runtime injects into every module scope; they are never
/// captures.
const MODULE_PSEUDO_GLOBALS: [&str; 5] =
    ["__dirname", "__filename", "exports", "module", "require"];

/// How an identifier was used at one reference site.
enum Usage {
    /// The identifier's value escapes as a whole.
    Whole,
    /// Only the named property is touched; `invoked` marks a call of it.
    Member { name: Sym, invoked: bool },
}

/// Which output map a reference lands in.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// The identifier must resolve for the function to run.
    Required,
    /// The identifier is only probed, under a `typeof`.
    Optional,
}

/// Accumulated observations for one identifier. "All" is absorbing.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Uses {
    All,
    Members(IndexMap<Sym, bool>),
}

impl Uses {
    fn merge(&mut self, other: Self) {
        match (self, other) {
            (Self::All, _) => {}
            (this @ Self::Members(_), Self::All) => *this = Self::All,
            (Self::Members(mine), Self::Members(theirs)) => {
                for (name, invoked) in theirs {
                    *mine.entry(name).or_insert(false) |= invoked;
                }
            }
        }
    }
}

type VariableUses = IndexMap<Sym, Uses>;

fn merge_into(map: &mut VariableUses, sym: Sym, uses: Uses) {
    match map.get_mut(&sym) {
        Some(existing) => existing.merge(uses),
        None => {
            map.insert(sym, uses);
        }
    }
}

/// The `this` binding rule of a function-like node.
#[derive(Clone, Copy, PartialEq, Eq)]
enum ThisMode {
    /// Ordinary functions bind `this` and `arguments` themselves.
    Bound,
    /// Arrow functions leave both to the enclosing function.
    Lexical,
}

/// Where a binding pattern's names are declared.
#[derive(Clone, Copy, PartialEq, Eq)]
enum BindTarget {
    /// The hoisted scope of the current function: `var`, parameters.
    FunctionVar,
    /// The innermost block scope: `let`, `const`, catch parameters.
    Lexical,
}

/// Scans a parsed function for the identifiers it captures from its
/// enclosing environment.
pub(crate) struct CaptureScanner {
    this_sym: Sym,
    awaiter_sym: Sym,
    required: VariableUses,
    optional: VariableUses,
    function_vars: FxHashSet<Sym>,
    blocks: Vec<FxHashSet<Sym>>,
    entered_function: bool,
}

impl CaptureScanner {
    /// Creates a scanner. The interner is only needed up front, to intern
    /// the names the scanner recognizes structurally.
    pub(crate) fn new(interner: &mut Interner) -> Self {
        Self {
            this_sym: interner.get_or_intern("this"),
            awaiter_sym: interner.get_or_intern("__awaiter"),
            required: IndexMap::new(),
            optional: IndexMap::new(),
            function_vars: FxHashSet::default(),
            blocks: Vec::new(),
            entered_function: false,
        }
    }

    /// Scans a whole parsed script; the first function-like node found is
    /// the function under analysis.
    pub(crate) fn scan_script(&mut self, script: &StatementList) {
        let _ = self.visit_statement_list(script);
    }

    /// Scans a class constructor extracted by the classifier.
    pub(crate) fn scan_constructor(&mut self, constructor: &Function) {
        self.enter_function(
            None,
            constructor.parameters(),
            constructor.body().statements(),
            ThisMode::Bound,
        );
    }

    /// Resolves the accumulated observations into the public record,
    /// folding probed entries into definite ones and dropping ambient
    /// globals.
    pub(crate) fn finish<F>(self, interner: &Interner, is_global: F) -> CaptureRecord
    where
        F: Fn(&str) -> bool,
    {
        let Self {
            mut required,
            mut optional,
            ..
        } = self;

        // A name that is both probed and used stays required only; its
        // probed property observations fold into the required entry.
        let probed: Vec<Sym> = optional.keys().copied().collect();
        for sym in probed {
            if !required.contains_key(&sym) {
                continue;
            }
            if let Some(uses) = optional.shift_remove(&sym) {
                if let Some(existing) = required.get_mut(&sym) {
                    existing.merge(uses);
                }
            }
        }

        CaptureRecord::new(
            resolve(required, interner, &is_global),
            resolve(optional, interner, &is_global),
        )
    }

    fn is_bound(&self, sym: Sym) -> bool {
        self.blocks.iter().any(|scope| scope.contains(&sym))
            || self.function_vars.contains(&sym)
    }

    /// Records one reference site, unless the name is shadowed by a block
    /// scope or declared in the current function-var scope.
    fn reference(&mut self, sym: Sym, usage: Usage, placement: Placement) {
        if self.is_bound(sym) {
            return;
        }
        let uses = match usage {
            Usage::Whole => Uses::All,
            Usage::Member { name, invoked } => {
                let mut members = IndexMap::new();
                members.insert(name, invoked);
                Uses::Members(members)
            }
        };
        let map = match placement {
            Placement::Required => &mut self.required,
            Placement::Optional => &mut self.optional,
        };
        merge_into(map, sym, uses);
    }

    fn declare_function_var(&mut self, sym: Sym) {
        self.function_vars.insert(sym);
    }

    fn declare_lexical(&mut self, sym: Sym) {
        match self.blocks.last_mut() {
            Some(scope) => {
                scope.insert(sym);
            }
            None => {
                self.function_vars.insert(sym);
            }
        }
    }

    fn bind_name(&mut self, sym: Sym, target: BindTarget) {
        match target {
            BindTarget::FunctionVar => self.declare_function_var(sym),
            BindTarget::Lexical => self.declare_lexical(sym),
        }
    }

    /// Declares every name a binding introduces. Property-name keys of
    /// destructured fields introduce no bindings and are not walked.
    fn bind_binding(&mut self, binding: &Binding, target: BindTarget) {
        match binding {
            Binding::Identifier(ident) => self.bind_name(ident.sym(), target),
            Binding::Pattern(pattern) => self.bind_pattern_names(pattern, target),
        }
    }

    fn bind_pattern_names(&mut self, pattern: &Pattern, target: BindTarget) {
        match pattern {
            Pattern::Object(object) => {
                for element in object.bindings() {
                    match element {
                        ObjectPatternElement::SingleName { ident, .. }
                        | ObjectPatternElement::RestProperty { ident, .. } => {
                            self.bind_name(ident.sym(), target);
                        }
                        ObjectPatternElement::Pattern { pattern, .. } => {
                            self.bind_pattern_names(pattern, target);
                        }
                        // Assignment covers target existing bindings; they
                        // introduce nothing.
                        ObjectPatternElement::AssignmentPropertyAccess { .. }
                        | ObjectPatternElement::AssignmentRestPropertyAccess { .. } => {}
                    }
                }
            }
            Pattern::Array(array) => {
                for element in array.bindings() {
                    match element {
                        ArrayPatternElement::SingleName { ident, .. }
                        | ArrayPatternElement::SingleNameRest { ident } => {
                            self.bind_name(ident.sym(), target);
                        }
                        ArrayPatternElement::Pattern { pattern, .. }
                        | ArrayPatternElement::PatternRest { pattern } => {
                            self.bind_pattern_names(pattern, target);
                        }
                        ArrayPatternElement::Elision
                        | ArrayPatternElement::PropertyAccess { .. }
                        | ArrayPatternElement::PropertyAccessRest { .. } => {}
                    }
                }
            }
        }
    }

    /// Walks the default-value initializers of a binding for captures, after
    /// the binding's own names are in scope.
    fn walk_binding_initializers(&mut self, binding: &Binding) {
        if let Binding::Pattern(pattern) = binding {
            self.walk_pattern_initializers(pattern);
        }
    }

    fn walk_pattern_initializers(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Object(object) => {
                for element in object.bindings() {
                    match element {
                        ObjectPatternElement::SingleName {
                            default_init: Some(init),
                            ..
                        } => {
                            let _ = self.visit_expression(init);
                        }
                        ObjectPatternElement::Pattern {
                            pattern,
                            default_init,
                            ..
                        } => {
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                            self.walk_pattern_initializers(pattern);
                        }
                        _ => {}
                    }
                }
            }
            Pattern::Array(array) => {
                for element in array.bindings() {
                    match element {
                        ArrayPatternElement::SingleName {
                            default_init: Some(init),
                            ..
                        } => {
                            let _ = self.visit_expression(init);
                        }
                        ArrayPatternElement::Pattern {
                            pattern,
                            default_init,
                        } => {
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                            self.walk_pattern_initializers(pattern);
                        }
                        ArrayPatternElement::PatternRest { pattern } => {
                            self.walk_pattern_initializers(pattern);
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    /// Runs `walk` inside a fresh function scope, then restores the outer
    /// state and merges the captures that survived the child's declarations.
    fn enter_scope<W>(&mut self, name: Option<Sym>, mode: ThisMode, walk: W)
    where
        W: FnOnce(&mut Self),
    {
        let outermost = !self.entered_function;
        self.entered_function = true;

        let saved_required = mem::take(&mut self.required);
        let saved_optional = mem::take(&mut self.optional);
        let saved_vars = mem::take(&mut self.function_vars);
        let saved_depth = self.blocks.len();

        if let Some(sym) = name {
            self.function_vars.insert(sym);
        }
        if mode == ThisMode::Bound {
            self.function_vars.insert(Sym::ARGUMENTS);
            // The outermost function's receiver comes from its caller, so
            // `this` stays visible as a capturable name there.
            if !outermost {
                self.function_vars.insert(self.this_sym);
            }
        }
        // One scope for the body's lexical declarations.
        self.blocks.push(FxHashSet::default());

        walk(self);

        self.blocks.truncate(saved_depth);
        let vars = mem::replace(&mut self.function_vars, saved_vars);
        let required = mem::replace(&mut self.required, saved_required);
        let optional = mem::replace(&mut self.optional, saved_optional);

        // Anything the function declared itself is not a capture, even when
        // it was referenced before its declaration was reached.
        for (sym, uses) in required {
            if !vars.contains(&sym) {
                merge_into(&mut self.required, sym, uses);
            }
        }
        for (sym, uses) in optional {
            if !vars.contains(&sym) {
                merge_into(&mut self.optional, sym, uses);
            }
        }
    }

    /// Enters a function-like node: parameters bind first, then their
    /// defaults are walked for captures, then the body.
    fn enter_function(
        &mut self,
        name: Option<Sym>,
        parameters: &FormalParameterList,
        body: &StatementList,
        mode: ThisMode,
    ) {
        self.enter_scope(name, mode, |scanner| {
            for parameter in parameters.as_ref() {
                scanner.bind_binding(parameter.variable().binding(), BindTarget::FunctionVar);
            }
            for parameter in parameters.as_ref() {
                scanner.walk_binding_initializers(parameter.variable().binding());
                if let Some(init) = parameter.variable().init() {
                    let _ = scanner.visit_expression(init);
                }
            }
            let _ = scanner.visit_statement_list(body);
        });
    }

    /// One identifier-or-`this` on the left of a member access.
    fn member_access(&mut self, node: &SimplePropertyAccess, invoked: bool) -> ControlFlow<()> {
        match (node.target().flatten(), node.field()) {
            (Expression::Identifier(ident), PropertyAccessField::Const(field)) => {
                self.reference(
                    ident.sym(),
                    Usage::Member {
                        name: *field,
                        invoked,
                    },
                    Placement::Required,
                );
            }
            (Expression::This, PropertyAccessField::Const(field)) => {
                self.reference(
                    self.this_sym,
                    Usage::Member {
                        name: *field,
                        invoked,
                    },
                    Placement::Required,
                );
            }
            (Expression::Identifier(ident), PropertyAccessField::Expr(key)) => {
                // A computed member defeats per-property narrowing.
                self.reference(ident.sym(), Usage::Whole, Placement::Required);
                let _ = self.visit_expression(key);
            }
            (Expression::This, PropertyAccessField::Expr(key)) => {
                self.reference(self.this_sym, Usage::Whole, Placement::Required);
                let _ = self.visit_expression(key);
            }
            (target, PropertyAccessField::Const(_)) => {
                // The member name never refers to a lexical binding.
                let _ = self.visit_expression(target);
            }
            (target, PropertyAccessField::Expr(key)) => {
                let _ = self.visit_expression(target);
                let _ = self.visit_expression(key);
            }
        }
        ControlFlow::Continue(())
    }

    /// Walks a computed property key; literal keys reference nothing.
    fn computed_key(&mut self, name: &PropertyName) {
        if let Some(expression) = name.computed() {
            let _ = self.visit_expression(expression);
        }
    }

    /// Enters a method body. A method's own name is not in scope within
    /// itself.
    fn method(&mut self, method: &MethodDefinition) {
        match method {
            MethodDefinition::Get(function)
            | MethodDefinition::Set(function)
            | MethodDefinition::Ordinary(function) => {
                self.enter_function(None, function.parameters(), function.body().statements(), ThisMode::Bound);
            }
            MethodDefinition::Generator(generator) => {
                self.enter_function(
                    None,
                    generator.parameters(),
                    generator.body().statements(),
                    ThisMode::Bound,
                );
            }
            MethodDefinition::AsyncGenerator(generator) => {
                self.enter_function(
                    None,
                    generator.parameters(),
                    generator.body().statements(),
                    ThisMode::Bound,
                );
            }
            MethodDefinition::Async(function) => {
                self.enter_function(None, function.parameters(), function.body().statements(), ThisMode::Bound);
            }
        }
    }

    /// Walks a class body. The class's own name is visible inside the body
    /// only; methods, field initializers and static blocks bind their own
    /// receiver.
    fn class_body(&mut self, class: &Class) {
        if let Some(heritage) = class.super_ref() {
            let _ = self.visit_expression(heritage);
        }
        self.blocks.push(FxHashSet::default());
        if let Some(name) = class.name() {
            if let Some(scope) = self.blocks.last_mut() {
                scope.insert(name.sym());
            }
        }
        if let Some(constructor) = class.constructor() {
            self.enter_function(
                None,
                constructor.parameters(),
                constructor.body().statements(),
                ThisMode::Bound,
            );
        }
        for element in class.elements() {
            match element {
                ClassElement::MethodDefinition(name, method)
                | ClassElement::StaticMethodDefinition(name, method) => {
                    self.computed_key(name);
                    self.method(method);
                }
                ClassElement::FieldDefinition(name, initializer)
                | ClassElement::StaticFieldDefinition(name, initializer) => {
                    self.computed_key(name);
                    if let Some(init) = initializer {
                        self.enter_scope(None, ThisMode::Bound, |scanner| {
                            let _ = scanner.visit_expression(init);
                        });
                    }
                }
                ClassElement::PrivateMethodDefinition(_, method)
                | ClassElement::PrivateStaticMethodDefinition(_, method) => self.method(method),
                ClassElement::PrivateFieldDefinition(_, initializer)
                | ClassElement::PrivateStaticFieldDefinition(_, initializer) => {
                    if let Some(init) = initializer {
                        self.enter_scope(None, ThisMode::Bound, |scanner| {
                            let _ = scanner.visit_expression(init);
                        });
                    }
                }
                ClassElement::StaticBlock(statements) => {
                    self.enter_scope(None, ThisMode::Bound, |scanner| {
                        let _ = scanner.visit_statement_list(statements.statements());
                    });
                }
            }
        }
        self.blocks.pop();
    }

    fn declaration_list(&mut self, variables: &[Variable], target: BindTarget) {
        for variable in variables {
            self.bind_binding(variable.binding(), target);
            self.walk_binding_initializers(variable.binding());
            if let Some(init) = variable.init() {
                let _ = self.visit_expression(init);
            }
        }
    }

    /// A `for-in`/`for-of` head: declarations bind, everything else is a
    /// plain assignment target.
    fn loop_initializer(&mut self, initializer: &IterableLoopInitializer) {
        match initializer {
            IterableLoopInitializer::Identifier(ident) => {
                let _ = self.visit_identifier(ident);
            }
            IterableLoopInitializer::Access(access) => {
                let _ = self.visit_property_access(access);
            }
            IterableLoopInitializer::Var(variable) => {
                self.bind_binding(variable.binding(), BindTarget::FunctionVar);
                self.walk_binding_initializers(variable.binding());
            }
            IterableLoopInitializer::Let(binding) | IterableLoopInitializer::Const(binding) => {
                self.bind_binding(binding, BindTarget::Lexical);
                self.walk_binding_initializers(binding);
            }
            IterableLoopInitializer::Pattern(pattern) => {
                self.assignment_pattern(pattern);
            }
        }
    }

    /// A destructuring pattern over existing bindings: every single-name
    /// element is a reference, not a declaration.
    fn assignment_pattern(&mut self, pattern: &Pattern) {
        match pattern {
            Pattern::Object(object) => {
                for element in object.bindings() {
                    match element {
                        ObjectPatternElement::SingleName {
                            ident,
                            default_init,
                            ..
                        } => {
                            self.reference(ident.sym(), Usage::Whole, Placement::Required);
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                        }
                        ObjectPatternElement::RestProperty { ident, .. } => {
                            self.reference(ident.sym(), Usage::Whole, Placement::Required);
                        }
                        ObjectPatternElement::AssignmentPropertyAccess {
                            access,
                            default_init,
                            ..
                        } => {
                            let _ = self.visit_property_access(access);
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                        }
                        ObjectPatternElement::AssignmentRestPropertyAccess { access, .. } => {
                            let _ = self.visit_property_access(access);
                        }
                        ObjectPatternElement::Pattern {
                            pattern,
                            default_init,
                            ..
                        } => {
                            self.assignment_pattern(pattern);
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                        }
                    }
                }
            }
            Pattern::Array(array) => {
                for element in array.bindings() {
                    match element {
                        ArrayPatternElement::SingleName {
                            ident,
                            default_init,
                        } => {
                            self.reference(ident.sym(), Usage::Whole, Placement::Required);
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                        }
                        ArrayPatternElement::SingleNameRest { ident } => {
                            self.reference(ident.sym(), Usage::Whole, Placement::Required);
                        }
                        ArrayPatternElement::PropertyAccess { access }
                        | ArrayPatternElement::PropertyAccessRest { access } => {
                            let _ = self.visit_property_access(access);
                        }
                        ArrayPatternElement::Pattern {
                            pattern,
                            default_init,
                        } => {
                            self.assignment_pattern(pattern);
                            if let Some(init) = default_init {
                                let _ = self.visit_expression(init);
                            }
                        }
                        ArrayPatternElement::PatternRest { pattern } => {
                            self.assignment_pattern(pattern);
                        }
                        ArrayPatternElement::Elision => {}
                    }
                }
            }
        }
    }
}

/// Resolves interned observations into the public, name-keyed capture set,
/// dropping ambient globals and module pseudo-globals.
fn resolve<F>(uses: VariableUses, interner: &Interner, is_global: &F) -> CaptureSet
where
    F: Fn(&str) -> bool,
{
    let mut set = CaptureSet::new();
    for (sym, observed) in uses {
        let name = interner.resolve_expect(sym).to_string();
        if MODULE_PSEUDO_GLOBALS.contains(&name.as_str()) || is_global(&name) {
            continue;
        }
        let value = match observed {
            Uses::All => PropertySet::All,
            Uses::Members(members) => PropertySet::Specific(
                members
                    .into_iter()
                    .map(|(property, invoked)| {
                        CapturedProperty::new(
                            interner.resolve_expect(property).to_string(),
                            invoked,
                        )
                    })
                    .collect(),
            ),
        };
        set.insert(name, value);
    }
    set
}

impl<'ast> Visitor<'ast> for CaptureScanner {
    type BreakTy = ();

    fn visit_expression(&mut self, node: &'ast Expression) -> ControlFlow<()> {
        match node {
            // `this` is treated exactly like a captured identifier.
            Expression::This => {
                self.reference(self.this_sym, Usage::Whole, Placement::Required);
                ControlFlow::Continue(())
            }
            _ => node.visit_with(self),
        }
    }

    fn visit_identifier(&mut self, node: &'ast Identifier) -> ControlFlow<()> {
        self.reference(node.sym(), Usage::Whole, Placement::Required);
        ControlFlow::Continue(())
    }

    fn visit_unary(&mut self, node: &'ast Unary) -> ControlFlow<()> {
        if node.op() == UnaryOp::TypeOf {
            match node.target().flatten() {
                Expression::Identifier(ident) => {
                    self.reference(ident.sym(), Usage::Whole, Placement::Optional);
                    return ControlFlow::Continue(());
                }
                // `this` is probed like any other identifier.
                Expression::This => {
                    self.reference(self.this_sym, Usage::Whole, Placement::Optional);
                    return ControlFlow::Continue(());
                }
                _ => {}
            }
        }
        node.visit_with(self)
    }

    fn visit_simple_property_access(
        &mut self,
        node: &'ast SimplePropertyAccess,
    ) -> ControlFlow<()> {
        self.member_access(node, false)
    }

    fn visit_call(&mut self, node: &'ast Call) -> ControlFlow<()> {
        if let Some(wrapper) = lowering::async_wrapper_body(node, self.awaiter_sym) {
            // The lowered state machine runs with the enclosing `this`, so
            // it enters as an arrow; the wrapper call itself is invisible.
            self.enter_function(None, wrapper.parameters, wrapper.body, ThisMode::Lexical);
            return ControlFlow::Continue(());
        }
        match node.function().flatten() {
            Expression::PropertyAccess(PropertyAccess::Simple(access)) => {
                let _ = self.member_access(access, true);
            }
            callee => {
                let _ = self.visit_expression(callee);
            }
        }
        for argument in node.args() {
            let _ = self.visit_expression(argument);
        }
        ControlFlow::Continue(())
    }

    fn visit_block(&mut self, node: &'ast Block) -> ControlFlow<()> {
        self.blocks.push(FxHashSet::default());
        let result = node.visit_with(self);
        self.blocks.pop();
        result
    }

    fn visit_switch(&mut self, node: &'ast Switch) -> ControlFlow<()> {
        self.blocks.push(FxHashSet::default());
        let result = node.visit_with(self);
        self.blocks.pop();
        result
    }

    fn visit_catch(&mut self, node: &'ast Catch) -> ControlFlow<()> {
        self.blocks.push(FxHashSet::default());
        if let Some(parameter) = node.parameter() {
            self.bind_binding(parameter, BindTarget::Lexical);
            self.walk_binding_initializers(parameter);
        }
        let result = self.visit_block(node.block());
        self.blocks.pop();
        result
    }

    fn visit_var_declaration(&mut self, node: &'ast VarDeclaration) -> ControlFlow<()> {
        self.declaration_list(node.0.as_ref(), BindTarget::FunctionVar);
        ControlFlow::Continue(())
    }

    fn visit_lexical_declaration(&mut self, node: &'ast LexicalDeclaration) -> ControlFlow<()> {
        self.declaration_list(node.variable_list().as_ref(), BindTarget::Lexical);
        ControlFlow::Continue(())
    }

    fn visit_declaration(&mut self, node: &'ast Declaration) -> ControlFlow<()> {
        match node {
            // Hoistable declarations put their name in the enclosing
            // function-var scope; the name is also in scope inside.
            Declaration::Function(function) => {
                if let Some(name) = function.name() {
                    self.declare_function_var(name.sym());
                }
                self.enter_function(
                    function.name().map(Identifier::sym),
                    function.parameters(),
                    function.body().statements(),
                    ThisMode::Bound,
                );
            }
            Declaration::Generator(generator) => {
                if let Some(name) = generator.name() {
                    self.declare_function_var(name.sym());
                }
                self.enter_function(
                    generator.name().map(Identifier::sym),
                    generator.parameters(),
                    generator.body().statements(),
                    ThisMode::Bound,
                );
            }
            Declaration::AsyncFunction(function) => {
                if let Some(name) = function.name() {
                    self.declare_function_var(name.sym());
                }
                self.enter_function(
                    function.name().map(Identifier::sym),
                    function.parameters(),
                    function.body().statements(),
                    ThisMode::Bound,
                );
            }
            Declaration::AsyncGenerator(generator) => {
                if let Some(name) = generator.name() {
                    self.declare_function_var(name.sym());
                }
                self.enter_function(
                    generator.name().map(Identifier::sym),
                    generator.parameters(),
                    generator.body().statements(),
                    ThisMode::Bound,
                );
            }
            Declaration::Class(class) => {
                if let Some(name) = class.name() {
                    self.declare_lexical(name.sym());
                }
                self.class_body(class);
            }
            Declaration::Lexical(lexical) => return self.visit_lexical_declaration(lexical),
        }
        ControlFlow::Continue(())
    }

    fn visit_function(&mut self, node: &'ast Function) -> ControlFlow<()> {
        // Expression position; a source-present name is in scope only
        // within the function itself.
        let name = if node.has_binding_identifier() {
            node.name().map(Identifier::sym)
        } else {
            None
        };
        self.enter_function(name, node.parameters(), node.body().statements(), ThisMode::Bound);
        ControlFlow::Continue(())
    }

    fn visit_generator(&mut self, node: &'ast Generator) -> ControlFlow<()> {
        self.enter_function(
            node.name().map(Identifier::sym),
            node.parameters(),
            node.body().statements(),
            ThisMode::Bound,
        );
        ControlFlow::Continue(())
    }

    fn visit_async_function(&mut self, node: &'ast AsyncFunction) -> ControlFlow<()> {
        self.enter_function(
            node.name().map(Identifier::sym),
            node.parameters(),
            node.body().statements(),
            ThisMode::Bound,
        );
        ControlFlow::Continue(())
    }

    fn visit_async_generator(&mut self, node: &'ast AsyncGenerator) -> ControlFlow<()> {
        self.enter_function(
            node.name().map(Identifier::sym),
            node.parameters(),
            node.body().statements(),
            ThisMode::Bound,
        );
        ControlFlow::Continue(())
    }

    fn visit_arrow_function(&mut self, node: &'ast ArrowFunction) -> ControlFlow<()> {
        self.enter_function(None, node.parameters(), node.body().statements(), ThisMode::Lexical);
        ControlFlow::Continue(())
    }

    fn visit_async_arrow_function(&mut self, node: &'ast AsyncArrowFunction) -> ControlFlow<()> {
        self.enter_function(None, node.parameters(), node.body().statements(), ThisMode::Lexical);
        ControlFlow::Continue(())
    }

    fn visit_class(&mut self, node: &'ast Class) -> ControlFlow<()> {
        // Expression position; the name does not bind in the enclosing
        // scope.
        self.class_body(node);
        ControlFlow::Continue(())
    }

    fn visit_property_definition(&mut self, node: &'ast PropertyDefinition) -> ControlFlow<()> {
        match node {
            PropertyDefinition::IdentifierReference(ident) => {
                let _ = self.visit_identifier(ident);
            }
            PropertyDefinition::Property(name, value) => {
                self.computed_key(name);
                let _ = self.visit_expression(value);
            }
            PropertyDefinition::MethodDefinition(name, method) => {
                self.computed_key(name);
                self.method(method);
            }
            PropertyDefinition::SpreadObject(expression) => {
                let _ = self.visit_expression(expression);
            }
            PropertyDefinition::CoverInitializedName(ident, expression) => {
                let _ = self.visit_identifier(ident);
                let _ = self.visit_expression(expression);
            }
        }
        ControlFlow::Continue(())
    }

    fn visit_for_loop(&mut self, node: &'ast ForLoop) -> ControlFlow<()> {
        self.blocks.push(FxHashSet::default());
        if let Some(initializer) = node.init() {
            let _ = self.visit_for_loop_initializer(initializer);
        }
        if let Some(condition) = node.condition() {
            let _ = self.visit_expression(condition);
        }
        if let Some(step) = node.final_expr() {
            let _ = self.visit_expression(step);
        }
        let _ = self.visit_statement(node.body());
        self.blocks.pop();
        ControlFlow::Continue(())
    }

    fn visit_for_in_loop(&mut self, node: &'ast ForInLoop) -> ControlFlow<()> {
        self.blocks.push(FxHashSet::default());
        self.loop_initializer(node.initializer());
        let _ = self.visit_expression(node.target());
        let _ = self.visit_statement(node.body());
        self.blocks.pop();
        ControlFlow::Continue(())
    }

    fn visit_for_of_loop(&mut self, node: &'ast ForOfLoop) -> ControlFlow<()> {
        self.blocks.push(FxHashSet::default());
        self.loop_initializer(node.initializer());
        let _ = self.visit_expression(node.iterable());
        let _ = self.visit_statement(node.body());
        self.blocks.pop();
        ControlFlow::Continue(())
    }

    fn visit_labelled_item(&mut self, node: &'ast LabelledItem) -> ControlFlow<()> {
        match node {
            // Annex-B labelled function declarations hoist like any other.
            LabelledItem::Function(function) => {
                if let Some(name) = function.name() {
                    self.declare_function_var(name.sym());
                }
                self.enter_function(
                    function.name().map(Identifier::sym),
                    function.parameters(),
                    function.body().statements(),
                    ThisMode::Bound,
                );
                ControlFlow::Continue(())
            }
            LabelledItem::Statement(statement) => self.visit_statement(statement),
        }
    }
}
