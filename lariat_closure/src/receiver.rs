//! Detection of non-lexical `this` usage.
//!
//! A function that mentions `this` or `super` outside of nested non-arrow
//! functions needs a specific receiver at call time; the serializer has to
//! know, because it changes how the function is re-invoked remotely. Arrow
//! functions are transparent here: they do not rebind `this`, so a `this`
//! inside one belongs to the enclosing function.

use std::ops::ControlFlow;

use boa_ast::{
    expression::{access::SuperPropertyAccess, Call, Expression, SuperCall},
    function::{AsyncFunction, AsyncGenerator, Class, ClassElement, Function, Generator},
    try_break,
    visitor::{VisitWith, Visitor},
};
use boa_interner::Sym;

use crate::lowering;

/// Returns `true` if the outermost function-like node in `node` uses `this`
/// or `super` outside of any nested non-arrow function.
pub(crate) fn uses_non_lexical_this<N>(node: &N, awaiter: Sym) -> bool
where
    N: VisitWith,
{
    /// Visitor searching for a receiver-dependent token under barrier rules.
    struct ReceiverVisitor {
        awaiter: Sym,
        in_topmost: bool,
    }

    impl ReceiverVisitor {
        /// Descends into the first function met; every deeper non-arrow
        /// function rebinds `this` and is skipped.
        fn enter<F>(&mut self, walk: F) -> ControlFlow<()>
        where
            F: FnOnce(&mut Self) -> ControlFlow<()>,
        {
            if self.in_topmost {
                return ControlFlow::Continue(());
            }
            self.in_topmost = true;
            let result = walk(self);
            self.in_topmost = false;
            result
        }
    }

    impl<'ast> Visitor<'ast> for ReceiverVisitor {
        type BreakTy = ();

        fn visit_expression(&mut self, node: &'ast Expression) -> ControlFlow<()> {
            if matches!(node, Expression::This) {
                return ControlFlow::Break(());
            }
            node.visit_with(self)
        }

        fn visit_super_call(&mut self, _: &'ast SuperCall) -> ControlFlow<()> {
            ControlFlow::Break(())
        }

        fn visit_super_property_access(
            &mut self,
            _: &'ast SuperPropertyAccess,
        ) -> ControlFlow<()> {
            ControlFlow::Break(())
        }

        fn visit_function(&mut self, node: &'ast Function) -> ControlFlow<()> {
            self.enter(|visitor| node.visit_with(visitor))
        }

        fn visit_generator(&mut self, node: &'ast Generator) -> ControlFlow<()> {
            self.enter(|visitor| node.visit_with(visitor))
        }

        fn visit_async_function(&mut self, node: &'ast AsyncFunction) -> ControlFlow<()> {
            self.enter(|visitor| node.visit_with(visitor))
        }

        fn visit_async_generator(&mut self, node: &'ast AsyncGenerator) -> ControlFlow<()> {
            self.enter(|visitor| node.visit_with(visitor))
        }

        fn visit_class(&mut self, node: &'ast Class) -> ControlFlow<()> {
            // Heritage and computed member names evaluate in the enclosing
            // scope; everything else in a class binds its own receiver.
            if let Some(heritage) = node.super_ref() {
                try_break!(self.visit_expression(heritage));
            }
            for element in node.elements() {
                match element {
                    ClassElement::MethodDefinition(name, _)
                    | ClassElement::StaticMethodDefinition(name, _)
                    | ClassElement::FieldDefinition(name, _)
                    | ClassElement::StaticFieldDefinition(name, _) => {
                        try_break!(self.visit_property_name(name));
                    }
                    _ => {}
                }
            }
            ControlFlow::Continue(())
        }

        fn visit_call(&mut self, node: &'ast Call) -> ControlFlow<()> {
            if let Some(wrapper) = lowering::async_wrapper_body(node, self.awaiter) {
                // The `this` handed to the wrapper is an artifact of async
                // lowering; only the state-machine body counts.
                return self.visit_statement_list(wrapper.body);
            }
            node.visit_with(self)
        }
    }

    let mut visitor = ReceiverVisitor {
        awaiter,
        in_topmost: false,
    };
    node.visit_with(&mut visitor).is_break()
}

#[cfg(test)]
mod tests {
    use boa_interner::Interner;

    use super::uses_non_lexical_this;
    use crate::parse;

    fn detect(source: &str) -> bool {
        let interner = &mut Interner::default();
        let script = parse::parse_wrapped(source, interner).expect("test source should parse");
        let awaiter = interner.get_or_intern("__awaiter");
        uses_non_lexical_this(&script, awaiter)
    }

    #[test]
    fn this_in_topmost_function() {
        assert!(detect("function f() { return this.x; }"));
    }

    #[test]
    fn no_this_at_all() {
        assert!(!detect("function f(a) { return a + 1; }"));
    }

    #[test]
    fn this_in_nested_function_does_not_count() {
        assert!(!detect(
            "function f() { return function g() { return this.x; }; }"
        ));
    }

    #[test]
    fn this_in_nested_arrow_counts() {
        assert!(detect("function f() { return () => this.x; }"));
    }

    #[test]
    fn super_call_in_extracted_constructor_counts() {
        let interner = &mut Interner::default();
        let classified = crate::normalize::classify(
            "class C extends B { constructor() { super(); } }",
            interner,
        )
        .expect("class should classify");
        let constructor = classified.constructor.expect("constructor should be kept");
        let awaiter = interner.get_or_intern("__awaiter");
        assert!(uses_non_lexical_this(&constructor, awaiter));
    }

    #[test]
    fn awaiter_receiver_argument_is_spurious() {
        assert!(!detect(
            "function f() { return __awaiter(this, void 0, void 0, function* () { return 1; }); }"
        ));
    }

    #[test]
    fn this_inside_awaiter_body_counts() {
        assert!(detect(
            "function f() { return __awaiter(this, void 0, void 0, function* () { return this.x; }); }"
        ));
    }

    #[test]
    fn generator_with_this() {
        assert!(detect("function* gen() { yield this.x; }"));
    }
}
