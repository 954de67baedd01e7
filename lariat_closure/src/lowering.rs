//! Recognition of the compiler-lowered async wrapper.
//!
//! Down-level compilers rewrite `async function` bodies into a call of the
//! shape `__awaiter(this, void 0, void 0, function* () { … })`. The `this`
//! passed as the first argument is an artifact of the rewrite, not a genuine
//! receiver use, so both the free-variable walker and the `this` detector
//! treat the wrapper call as transparent and look only at the state-machine
//! function handed in as the fourth argument.

use boa_ast::{
    expression::{Call, Expression},
    function::FormalParameterList,
    StatementList,
};
use boa_interner::Sym;

/// The pieces of the state-machine function passed to the wrapper.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WrapperBody<'ast> {
    pub(crate) parameters: &'ast FormalParameterList,
    pub(crate) body: &'ast StatementList,
}

/// Matches `__awaiter(this, _, _, <function-like>)` and returns the parts of
/// the final argument. Any other call returns `None`.
pub(crate) fn async_wrapper_body<'ast>(call: &'ast Call, awaiter: Sym) -> Option<WrapperBody<'ast>> {
    let Expression::Identifier(callee) = call.function().flatten() else {
        return None;
    };
    if callee.sym() != awaiter {
        return None;
    }
    let args = call.args();
    if args.len() != 4 || !matches!(args[0].flatten(), Expression::This) {
        return None;
    }
    match args[3].flatten() {
        Expression::Function(function) => Some(WrapperBody {
            parameters: function.parameters(),
            body: function.body().statements(),
        }),
        Expression::Generator(generator) => Some(WrapperBody {
            parameters: generator.parameters(),
            body: generator.body().statements(),
        }),
        Expression::AsyncFunction(function) => Some(WrapperBody {
            parameters: function.parameters(),
            body: function.body().statements(),
        }),
        Expression::AsyncGenerator(generator) => Some(WrapperBody {
            parameters: generator.parameters(),
            body: generator.body().statements(),
        }),
        Expression::ArrowFunction(arrow) => Some(WrapperBody {
            parameters: arrow.parameters(),
            body: arrow.body().statements(),
        }),
        Expression::AsyncArrowFunction(arrow) => Some(WrapperBody {
            parameters: arrow.parameters(),
            body: arrow.body().statements(),
        }),
        _ => None,
    }
}
