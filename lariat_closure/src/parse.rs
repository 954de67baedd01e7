//! Thin adapter over the general-purpose ECMAScript parser.
//!
//! Many legal function-expression forms are not legal top-level declarations
//! (`function () {}`, `class {}`), so everything is parsed wrapped in
//! parentheses, which puts the form in expression position.

use boa_ast::{Expression, Statement, StatementList, StatementListItem};
use boa_interner::Interner;
use boa_parser::{Parser, Source};

/// Parses `source` wrapped in `(` and `)` and returns the resulting script.
///
/// The first parser diagnostic is surfaced as the error.
pub(crate) fn parse_wrapped(
    source: &str,
    interner: &mut Interner,
) -> Result<StatementList, boa_parser::Error> {
    let wrapped = format!("({source})");
    Parser::new(Source::from_bytes(&wrapped))
        .parse_script(interner)
        .map(|script| script.statements().clone())
}

/// Returns the expression of the first expression statement in `script`,
/// with any wrapping parentheses removed.
pub(crate) fn first_expression(script: &StatementList) -> Option<&Expression> {
    script.statements().iter().find_map(|item| {
        if let StatementListItem::Statement(Statement::Expression(expression)) = item {
            Some(expression.flatten())
        } else {
            None
        }
    })
}
