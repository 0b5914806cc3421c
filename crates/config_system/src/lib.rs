//! Declarative configuration schema generation, validation and binding
//! for the Palisade module suite.
//!
//! Each gameplay module declares its configurable values once, as an
//! ordered list of typed [`ConfigField`]s with defaults, bounds and
//! descriptions, collected into a versioned [`Schema`]. From that
//! single declaration the engine derives everything else:
//!
//! - **Schema rendering** — a fully commented, human-editable YAML
//!   document with every field set to its default, generated on first
//!   run and kept as living documentation.
//! - **Validation** — a parsed [`Document`] is checked field by field
//!   for presence, primitive shape and range/membership constraints;
//!   every violation is collected into one [`ValidationReport`] so the
//!   operator fixes the whole file in a single pass.
//! - **Binding** — a document with a clean report is committed onto the
//!   module's config struct through plain setter functions captured at
//!   declaration time. No reflection, no dynamic lookup.
//!
//! ## Error philosophy
//!
//! User and data errors (typos, out-of-range values, stale versions)
//! are never errors in the Rust sense: they are violations in a report,
//! addressed by exact dotted path, and the owning module refuses to
//! start rather than silently substituting defaults. Contract misuse —
//! binding an unvalidated document, declaring a default outside its own
//! bounds — is a bug in the framework's caller and is reported as one:
//! a [`SchemaError`] at registration time or a panic saying so.
//!
//! ## Lifecycle
//!
//! A [`ConfigModule`] owns one schema and walks
//! Unloaded → Loaded/Invalid per load attempt. Distinct modules share
//! no mutable state, so loading different modules concurrently needs no
//! locking; within one module the parse → validate → bind sequence is
//! strictly sequential and synchronous.

pub mod bind;
pub mod document;
pub mod error;
pub mod field;
pub mod module;
pub mod schema;
pub mod validate;

pub use bind::bind;
pub use document::{Document, DocumentValue, ScalarValue, VERSION_KEY};
pub use error::{ConfigError, SchemaError};
pub use field::{Bounds, ConfigField, FieldKind};
pub use module::{ConfigModule, ModuleState};
pub use schema::{Schema, SchemaBuilder};
pub use validate::{validate, ValidationReport, Violation, ViolationKind};
