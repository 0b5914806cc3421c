//! Document validation against a schema.
//!
//! Validation never stops at the first problem: every declared field is
//! checked, and every violation is merged into one [`ValidationReport`],
//! so an operator fixing a config file sees the full list in a single
//! pass. An empty report means the document is loadable and may be
//! handed to [`bind`](crate::bind).

use crate::schema::Schema;
use crate::Document;
use std::fmt;

/// Category of a single constraint violation.
///
/// The version category is distinguished from ordinary data errors so
/// that migration tooling can react to stale files differently from
/// typos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// A required path is absent from the document
    Missing,
    /// The value at the path has the wrong primitive shape
    WrongType,
    /// A numeric value lies strictly outside an inclusive bound
    OutOfRange,
    /// A value is not a member of the field's allowed set
    NotAllowed,
    /// The document's persisted schema version differs from the
    /// module's compiled-in version
    VersionMismatch,
}

/// One constraint violation: the exact dotted path plus a
/// human-readable reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Violation {
    pub path: String,
    pub kind: ViolationKind,
    pub reason: String,
}

impl Violation {
    pub fn missing(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(path, ViolationKind::Missing, reason)
    }

    pub fn wrong_type(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(path, ViolationKind::WrongType, reason)
    }

    pub fn out_of_range(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(path, ViolationKind::OutOfRange, reason)
    }

    pub fn not_allowed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::new(path, ViolationKind::NotAllowed, reason)
    }

    pub fn version_mismatch(reason: impl Into<String>) -> Self {
        Self::new(crate::document::VERSION_KEY, ViolationKind::VersionMismatch, reason)
    }

    fn new(path: impl Into<String>, kind: ViolationKind, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.path, self.reason)
    }
}

/// Aggregate of all violations found in one validation pass.
///
/// Ephemeral: produced and consumed within a single load operation.
/// An empty report is the precondition for binding.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    violations: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one violation to the report.
    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Moves every violation from `other` into this report.
    pub fn merge(&mut self, other: ValidationReport) {
        self.violations.extend(other.violations);
    }

    /// Whether the document was accepted.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Iterates violations in the order they were found.
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, violation) in self.violations.iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Checks `doc` against every field of `schema`, in declaration order.
///
/// Presence, primitive shape, and range or membership constraints are
/// all verified per field; reported violations from all fields are
/// merged. Paths not declared by the schema are ignored.
pub fn validate<C>(doc: &Document, schema: &Schema<C>) -> ValidationReport {
    let mut report = ValidationReport::new();
    for field in schema.fields() {
        let path = schema.path_of(field);
        for violation in field.check_loadable(doc, &path) {
            report.push(violation);
        }
    }
    report
}
