//! Host-stringification shape analysis.
//!
//! The host runtime's native stringification of a callable produces a
//! different textual shape for each kind of function: arrows keep their
//! source form, methods lose their `function` keyword, accessors gain one,
//! and classes stringify whole. This module recognizes each shape and
//! rebuilds a legal, re-parseable function expression from it, together
//! with the metadata the rest of the analyzer needs.
//!
//! Every shape-recognition heuristic lives here so that the whole set can
//! be re-tuned against observed host output as a unit.

use boa_ast::{
    expression::Expression,
    function::{Class, Function},
    Declaration, Statement, StatementList, StatementListItem,
};
use boa_interner::{Interner, ToInternedString};

use crate::{error::Error, parse};


/// ECMAScript reserved words. Any of these in name position cannot be
/// re-emitted as a function-expression binding.
const RESERVED_WORDS: [&str; 36] = [
    "break",
    "case",
    "catch",
    "class",
    "const",
    "continue",
    "debugger",
    "default",
    "delete",
    "do",
    "else",
    "enum",
    "export",
    "extends",
    "false",
    "finally",
    "for",
    "function",
    "if",
    "import",
    "in",
    "instanceof",
    "new",
    "null",
    "return",
    "super",
    "switch",
    "this",
    "throw",
    "true",
    "try",
    "typeof",
    "var",
    "void",
    "while",
    "with",
];

/// Placeholder embedded as the binding of anonymous named-function forms.
const SYNTHETIC_NAME: &str = "__computed";

/// The syntactic shape a stringified function was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    /// An arrow function with an expression body, `x => x + 1`.
    ArrowExpression,
    /// An arrow function with a block body, `x => { return x + 1; }`.
    ArrowBlock,
    /// A plain, generator or async function declaration or expression.
    Function,
    /// An object or class method, including generator and async methods.
    Method,
    /// A getter or setter.
    Accessor,
    /// A class constructor, extracted or synthesized from a class form.
    Constructor,
}

impl FunctionKind {
    /// Returns `true` for the two arrow shapes.
    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::ArrowExpression | Self::ArrowBlock)
    }

    /// Returns `true` for shapes that require a receiver at call time:
    /// methods, accessors and constructors.
    #[must_use]
    pub const fn binds_receiver(self) -> bool {
        matches!(self, Self::Method | Self::Accessor | Self::Constructor)
    }
}

/// A normalized, re-parseable rendition of a stringified function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedForm {
    expr_without_name: String,
    expr_with_name: Option<String>,
    declaration_name: Option<String>,
    kind: FunctionKind,
}

impl NormalizedForm {
    fn new(
        expr_without_name: String,
        expr_with_name: Option<String>,
        declaration_name: Option<String>,
        kind: FunctionKind,
    ) -> Self {
        Self {
            expr_without_name,
            expr_with_name,
            declaration_name,
            kind,
        }
    }

    fn arrow(source: &str, kind: FunctionKind) -> Self {
        Self::new(source.to_owned(), None, None, kind)
    }

    /// The anonymous rendition. Always present and always parses when
    /// wrapped in parentheses.
    #[must_use]
    pub fn expr_without_name(&self) -> &str {
        &self.expr_without_name
    }

    /// The rendition that embeds the function's name (or a synthetic
    /// placeholder) in binding position, so the serialized function can
    /// refer to itself. Never present for arrows.
    #[must_use]
    pub fn expr_with_name(&self) -> Option<&str> {
        self.expr_with_name.as_deref()
    }

    /// The declared name, when the input was a function declaration.
    #[must_use]
    pub fn declaration_name(&self) -> Option<&str> {
        self.declaration_name.as_deref()
    }

    /// The classified shape.
    #[must_use]
    pub const fn kind(&self) -> FunctionKind {
        self.kind
    }

    /// Returns `true` if the input was an arrow function.
    #[must_use]
    pub const fn is_arrow(&self) -> bool {
        self.kind.is_arrow()
    }
}

/// A classified input: the normalized form, plus the extracted constructor
/// node when the input was a class. Keeping the node lets the analyzer walk
/// constructor bodies without re-parsing `super` in a position a strict
/// parser rejects.
#[derive(Debug, Clone)]
pub(crate) struct Classified {
    pub(crate) form: NormalizedForm,
    pub(crate) constructor: Option<Function>,
}

impl Classified {
    fn plain(form: NormalizedForm) -> Self {
        Self {
            form,
            constructor: None,
        }
    }
}

/// Classifies a host-stringified function and produces its normalized form.
pub(crate) fn classify(source: &str, interner: &mut Interner) -> Result<Classified, Error> {
    let text = source.trim();

    if text.starts_with("[Function:") {
        // The host's opaque debug form carries no source.
        return Err(Error::UnrecognizedForm);
    }
    if text.contains("[native code]") {
        return Err(Error::NativeCode);
    }

    // Arrows, by text shape first: either no block at all, or an `=>`
    // before the first `{`.
    match text.find('{') {
        None if text.contains("=>") => {
            return Ok(Classified::plain(NormalizedForm::arrow(
                text,
                FunctionKind::ArrowExpression,
            )))
        }
        Some(brace) if text[..brace].contains("=>") => {
            return Ok(Classified::plain(NormalizedForm::arrow(
                text,
                FunctionKind::ArrowBlock,
            )))
        }
        _ => {}
    }

    // Accessor stringification of older hosts: `function get name() {}`.
    if let Some(tail) = text
        .strip_prefix("function get ")
        .or_else(|| text.strip_prefix("function set "))
    {
        return named_function(tail, false, FunctionKind::Accessor, false);
    }

    if let Some(tail) = text.strip_prefix("async function") {
        return named_function(tail, true, FunctionKind::Function, true);
    }
    if let Some(tail) = text.strip_prefix("function") {
        return named_function(tail, true, FunctionKind::Function, false);
    }

    if text.starts_with("class ") || text.starts_with("class{") {
        return classify_class(text, interner);
    }

    // A destructuring parameter list puts a `{` ahead of the `=>`, which
    // defeats the text tests above. Settle it by parsing.
    if text.contains("=>") && parses_as_arrow(text, interner) {
        let kind = match text.split_once("=>") {
            Some((_, body)) if body.trim_start().starts_with('{') => FunctionKind::ArrowBlock,
            _ => FunctionKind::ArrowExpression,
        };
        return Ok(Classified::plain(NormalizedForm::arrow(text, kind)));
    }

    // Everything else is a method-like form that lost its keyword in
    // stringification: `name() {}`, `*name() {}`, `async name() {}`,
    // `get name() {}`, `[expr]() {}`.
    let (tail, is_async) = match text.strip_prefix("async ") {
        Some(rest) => (rest, true),
        None => (text, false),
    };
    let (tail, kind) = if !is_async {
        match tail.strip_prefix("get ").or_else(|| tail.strip_prefix("set ")) {
            Some(rest) => (rest, FunctionKind::Accessor),
            None => (tail, FunctionKind::Method),
        }
    } else {
        (tail, FunctionKind::Method)
    };
    named_function(tail, false, kind, is_async)
}

/// Normalizes a named-function tail: an optional `*`, an optional name
/// segment, then the parameter list.
fn named_function(
    tail: &str,
    declaration: bool,
    kind: FunctionKind,
    is_async: bool,
) -> Result<Classified, Error> {
    let tail = tail.trim_start();
    let (tail, keyword) = match tail.strip_prefix('*') {
        Some(rest) => (
            rest.trim_start(),
            if is_async {
                "async function* "
            } else {
                "function* "
            },
        ),
        None => (tail, if is_async { "async function " } else { "function " }),
    };

    let Some(paren) = tail.find('(') else {
        return Err(Error::UnrecognizedForm);
    };
    let mut name = tail[..paren].trim();
    let rest = &tail[paren..];

    if name.is_empty() {
        return Ok(Classified::plain(NormalizedForm::new(
            format!("{keyword}{tail}"),
            Some(format!("{keyword}{SYNTHETIC_NAME}{rest}")),
            None,
            kind,
        )));
    }

    // A previously normalized form comes back with its name already
    // commented; unwrap it so re-analysis is stable.
    if let Some(inner) = name
        .strip_prefix("/*")
        .and_then(|inner| inner.strip_suffix("*/"))
    {
        name = inner.trim();
    }

    let declaration_name = if declaration {
        Some(name.to_owned())
    } else {
        None
    };

    if name.contains("*/") {
        // The name cannot be commented out safely; drop it instead.
        return Ok(Classified::plain(NormalizedForm::new(
            format!("{keyword}{rest}"),
            Some(format!("{keyword}{SYNTHETIC_NAME}{rest}")),
            declaration_name,
            kind,
        )));
    }

    let expr_with_name = if is_legal_identifier(name) {
        format!("{keyword}{name}{rest}")
    } else {
        format!("{keyword}/*{name}*/{rest}")
    };

    Ok(Classified::plain(NormalizedForm::new(
        format!("{keyword}/*{name}*/{rest}"),
        Some(expr_with_name),
        declaration_name,
        kind,
    )))
}

/// A class stringification: re-parse, find the class, and reduce it to its
/// constructor.
fn classify_class(text: &str, interner: &mut Interner) -> Result<Classified, Error> {
    let script = parse::parse_wrapped(text, interner).map_err(Error::class_parse)?;
    let Some(class) = first_class(&script) else {
        return Err(Error::class_shape(text));
    };

    let constructor = class.constructor().cloned();
    let tail = match &constructor {
        Some(function) => {
            // The tree keeps no source spans, so re-render the constructor
            // and strip the keyword back off to get the `(params) { body }`
            // tail.
            let rendered = Function::new(
                None,
                function.parameters().clone(),
                function.body().clone(),
            )
            .to_interned_string(interner);
            rendered
                .strip_prefix("function")
                .unwrap_or(&rendered)
                .trim_start()
                .to_owned()
        }
        None if class.super_ref().is_some() => "() { super(); }".to_owned(),
        None => "() { }".to_owned(),
    };

    Ok(Classified {
        form: NormalizedForm::new(
            format!("function /*constructor*/{tail}"),
            Some(format!("function constructor{tail}")),
            None,
            FunctionKind::Constructor,
        ),
        constructor,
    })
}

/// Finds the first class expression or declaration in a parsed script.
fn first_class(script: &StatementList) -> Option<&Class> {
    for item in script.statements() {
        match item {
            StatementListItem::Statement(Statement::Expression(expression)) => {
                if let Expression::Class(class) = expression.flatten() {
                    return Some(&**class);
                }
            }
            StatementListItem::Declaration(Declaration::Class(class)) => return Some(class),
            _ => {}
        }
    }
    None
}

/// Returns `true` if parenthesizing `text` yields an arrow function.
fn parses_as_arrow(text: &str, interner: &mut Interner) -> bool {
    let Ok(script) = parse::parse_wrapped(text, interner) else {
        return false;
    };
    matches!(
        parse::first_expression(&script),
        Some(Expression::ArrowFunction(_) | Expression::AsyncArrowFunction(_))
    )
}

/// Returns `true` if `name` can stand in function-expression binding
/// position.
fn is_legal_identifier(name: &str) -> bool {
    if RESERVED_WORDS.contains(&name) {
        return false;
    }
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_alphabetic() || first == '_' || first == '$')
        && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}
