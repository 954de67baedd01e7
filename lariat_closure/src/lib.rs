//! Lariat's **`lariat_closure`** crate implements the function parser and
//! free-variable analyzer behind Lariat's closure serializer.
//!
//! # Crate Overview
//! Serializing a live function value for execution in another process
//! starts from the host runtime's native stringification of that value.
//! This crate takes that string and produces everything the serializer
//! needs to know about it:
//!
//! - a normalized, re-parseable source form of the function
//!   ([`NormalizedForm`]), in two renditions: one anonymous, one with the
//!   function's name embedded so the emitted code can refer to itself;
//! - a classification of the function's syntactic shape
//!   ([`FunctionKind`]): arrow, plain function, method, accessor or class
//!   constructor;
//! - the set of identifiers the function captures from its enclosing
//!   lexical environment ([`CaptureRecord`]), distinguishing identifiers
//!   that must resolve from identifiers that are merely probed under
//!   `typeof`, and recording which properties of each capture are read and
//!   whether any of them is called;
//! - whether the function needs a specific receiver at call time
//!   (non-lexical `this`).
//!
//! The analyzer never executes the function and never resolves identifiers
//! against values; it is a pure, synchronous function of the source text
//! and an ambient-global predicate supplied by the caller. Parsing is done
//! by [`boa_parser`], and analysis walks the [`boa_ast`] syntax tree.
//!
//! # Example input shapes
//! The host stringifies each kind of callable differently; all of these are
//! accepted:
//!
//! ```text
//! x => x + y
//! (a, b) => { return a + b; }
//! function add(a, b) { return a + b; }
//! function* gen() { yield this.x; }
//! foo() { return obj.bar(); }
//! [Symbol.iterator]() { }
//! function get prop() { return inner; }
//! class C extends B { constructor(x) { super(); this.x = x; } }
//! function outer() { return __awaiter(this, void 0, void 0, function* () { return a; }); }
//! ```

#![warn(
    // rustc lint groups https://doc.rust-lang.org/rustc/lints/groups.html
    warnings,
    future_incompatible,
    let_underscore,
    nonstandard_style,
    rust_2018_compatibility,
    rust_2018_idioms,
    rust_2021_compatibility,
    unused,

    // rustc allowed-by-default lints https://doc.rust-lang.org/rustc/lints/listing/allowed-by-default.html
    missing_docs,
    macro_use_extern_crate,
    meta_variable_misuse,
    missing_abi,
    missing_copy_implementations,
    missing_debug_implementations,
    non_ascii_idents,
    noop_method_call,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_op_in_unsafe_fn,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications,

    // rustdoc lints https://doc.rust-lang.org/rustdoc/lints.html
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::missing_crate_level_docs,
    rustdoc::private_doc_tests,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls,

    // clippy categories https://doc.rust-lang.org/clippy/
    clippy::all,
    clippy::correctness,
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::pedantic,
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::too_many_lines,
    clippy::option_if_let_else
)]

mod captures;
mod error;
mod lowering;
mod normalize;
mod parse;
mod receiver;
mod walker;

#[cfg(test)]
mod tests;

pub use self::{
    captures::{CaptureRecord, CaptureSet, CapturedProperty, PropertySet},
    error::Error,
    normalize::{FunctionKind, NormalizedForm},
};

use boa_interner::Interner;

use self::walker::CaptureScanner;

/// The complete result of analyzing one host-stringified function.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAnalysis {
    normalized: NormalizedForm,
    captures: CaptureRecord,
    uses_non_lexical_this: bool,
}

impl FunctionAnalysis {
    /// The normalized, re-parseable source forms of the function.
    #[must_use]
    pub fn normalized(&self) -> &NormalizedForm {
        &self.normalized
    }

    /// The identifiers the function captures from its enclosing
    /// environment.
    #[must_use]
    pub fn captures(&self) -> &CaptureRecord {
        &self.captures
    }

    /// Returns `true` if the function requires a specific receiver at call
    /// time. Always `false` for arrows.
    #[must_use]
    pub const fn uses_non_lexical_this(&self) -> bool {
        self.uses_non_lexical_this
    }
}

/// Analyzes the host stringification of a function value.
///
/// `is_global` must return `true` for names that refer to the host
/// runtime's ambient globals; those are dropped from the capture record.
/// The contract is a pure function: the same source and predicate always
/// produce the same result.
///
/// # Errors
///
/// Returns an [`Error`] when the source matches no recognized
/// stringification shape, is a native-code function, is a class form that
/// cannot be understood, fails to parse after normalization, or is an
/// arrow function that captured `this` (the last carries the fully
/// populated analysis; see [`Error::analysis`]).
pub fn analyze<F>(source: &str, is_global: F) -> Result<FunctionAnalysis, Error>
where
    F: Fn(&str) -> bool,
{
    let mut interner = Interner::default();
    let normalize::Classified { form, constructor } = normalize::classify(source, &mut interner)?;

    let (captures, uses_non_lexical_this) = if form.kind() == FunctionKind::Constructor {
        let captures = match &constructor {
            Some(function) => {
                let mut scanner = CaptureScanner::new(&mut interner);
                scanner.scan_constructor(function);
                scanner.finish(&interner, &is_global)
            }
            // Synthesized constructors close over nothing.
            None => CaptureRecord::default(),
        };
        // Constructors are always invoked on a fresh receiver.
        (captures, true)
    } else {
        let preferred = form.expr_with_name().unwrap_or_else(|| form.expr_without_name());
        let script = parse::parse_wrapped(preferred, &mut interner).map_err(Error::parse)?;

        let mut scanner = CaptureScanner::new(&mut interner);
        scanner.scan_script(&script);
        let awaiter = interner.get_or_intern("__awaiter");
        let captures = scanner.finish(&interner, &is_global);

        let detected =
            !form.is_arrow() && receiver::uses_non_lexical_this(&script, awaiter);
        (captures, form.kind().binds_receiver() || detected)
    };

    let analysis = FunctionAnalysis {
        normalized: form,
        captures,
        uses_non_lexical_this,
    };

    if analysis.normalized.is_arrow() && analysis.captures.required().contains_key("this") {
        return Err(Error::ArrowCapturedThis(Box::new(analysis)));
    }

    Ok(analysis)
}
