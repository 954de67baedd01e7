//! Captured-variable records produced by the analyzer.
//!
//! A function's captured environment is described per identifier: either the
//! whole referent must be serialized, or only a recorded set of properties.
//! The distinction lets the serializer ship a small slice of a large object
//! when the function only ever touches a few of its members.

use indexmap::IndexMap;

/// A single property observed on a captured identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedProperty {
    name: String,
    invoked: bool,
}

impl CapturedProperty {
    /// Creates a new property observation.
    pub(crate) fn new(name: String, invoked: bool) -> Self {
        Self { name, invoked }
    }

    /// The property name as it appeared after the member-access dot.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// `true` if at least one access of this property was the callee of a
    /// call expression.
    #[must_use]
    pub const fn invoked(&self) -> bool {
        self.invoked
    }
}

/// What serialization must preserve for one captured identifier.
///
/// "Capture all" is absorbing: once any use of the identifier requires the
/// whole referent, per-property narrowing is no longer possible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertySet {
    /// Some use of the identifier requires its entire referent.
    All,
    /// Only the listed properties are read, in order of first sighting.
    Specific(Vec<CapturedProperty>),
}

impl PropertySet {
    /// Returns `true` if the whole referent must be captured.
    #[must_use]
    pub const fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// The recorded properties, or `None` when the whole referent is
    /// captured.
    #[must_use]
    pub fn properties(&self) -> Option<&[CapturedProperty]> {
        match self {
            Self::All => None,
            Self::Specific(properties) => Some(properties),
        }
    }
}

/// An insertion-ordered map from captured identifier to the uses observed
/// for it.
pub type CaptureSet = IndexMap<String, PropertySet>;

/// The captured lexical environment of one analyzed function.
///
/// `required` holds identifiers that must resolve for the function to run;
/// `optional` holds identifiers that are merely probed (the operand of a
/// `typeof`). The key sets are disjoint: a name that is both probed and used
/// is recorded as required only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureRecord {
    required: CaptureSet,
    optional: CaptureSet,
}

impl CaptureRecord {
    /// Creates a record from the two finished capture sets.
    pub(crate) fn new(required: CaptureSet, optional: CaptureSet) -> Self {
        Self { required, optional }
    }

    /// Identifiers the function needs resolved at serialization time.
    #[must_use]
    pub fn required(&self) -> &CaptureSet {
        &self.required
    }

    /// Identifiers the function only probes.
    #[must_use]
    pub fn optional(&self) -> &CaptureSet {
        &self.optional
    }

    /// Returns `true` when the function captures nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}
