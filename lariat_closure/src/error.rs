//! Error implementation for the function analyzer.

use std::fmt;

use crate::FunctionAnalysis;

/// An enum which represents errors encountered while classifying or
/// analyzing a stringified function.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// The text matched none of the recognized stringification shapes, or a
    /// recognized shape was missing its parameter list.
    UnrecognizedForm,

    /// The function is a host intrinsic and carries no source text.
    NativeCode,

    /// A class-shaped input failed to re-parse.
    ClassParse {
        /// The parser diagnostic produced for the class source.
        diagnostic: Box<str>,
    },

    /// A class-shaped input parsed, but contained no class.
    ClassShape {
        /// The offending source text.
        source: Box<str>,
    },

    /// The normalized form failed to parse. The classifier guarantees
    /// parseability of the forms it emits, so this indicates an analyzer bug
    /// or an unexpected host stringification.
    Parse {
        /// The parser diagnostic produced for the normalized form.
        diagnostic: Box<str>,
    },

    /// An arrow function captured `this` lexically. Serialized functions
    /// cannot reproduce the lexical receiver, so the caller must rename it.
    /// The analysis is still fully populated and can be inspected.
    ArrowCapturedThis(Box<FunctionAnalysis>),
}

impl Error {
    /// Creates a "class could not be parsed" error from a parser diagnostic.
    pub(crate) fn class_parse<D>(diagnostic: D) -> Self
    where
        D: fmt::Display,
    {
        Self::ClassParse {
            diagnostic: diagnostic.to_string().into_boxed_str(),
        }
    }

    /// Creates a "class form was not understood" error.
    pub(crate) fn class_shape<S>(source: S) -> Self
    where
        S: Into<String>,
    {
        Self::ClassShape {
            source: source.into().into_boxed_str(),
        }
    }

    /// Creates a "normalized form could not be parsed" error from a parser
    /// diagnostic.
    pub(crate) fn parse<D>(diagnostic: D) -> Self
    where
        D: fmt::Display,
    {
        Self::Parse {
            diagnostic: diagnostic.to_string().into_boxed_str(),
        }
    }

    /// Returns the analysis that was computed before the error was raised,
    /// if the error carries one.
    #[must_use]
    pub fn analysis(&self) -> Option<&FunctionAnalysis> {
        if let Self::ArrowCapturedThis(analysis) = self {
            Some(analysis)
        } else {
            None
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnrecognizedForm => write!(f, "the function form was not understood."),
            Self::NativeCode => write!(f, "it was a native code function."),
            Self::ClassParse { diagnostic } => {
                write!(f, "the class could not be parsed: {diagnostic}")
            }
            Self::ClassShape { source } => {
                write!(f, "the class form was not understood: {source}")
            }
            Self::Parse { diagnostic } => {
                write!(f, "the normalized function form could not be parsed: {diagnostic}")
            }
            Self::ArrowCapturedThis(_) => write!(
                f,
                "arrow function captured 'this'; assign 'this' to another name outside the function and capture that"
            ),
        }
    }
}

impl std::error::Error for Error {}
