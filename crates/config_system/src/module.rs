//! Per-unit load/validate/bind orchestration.
//!
//! A [`ConfigModule`] ties the schema, validator and binder together
//! for one named configuration unit and tracks its state. The load
//! pipeline is strictly sequential and synchronous: parse, version
//! gate, validate, bind. A document with any violation leaves the
//! module [`Invalid`](ModuleState::Invalid) and the target untouched —
//! the module fails closed instead of silently starting on defaults.

use crate::bind::bind;
use crate::document::Document;
use crate::error::ConfigError;
use crate::schema::Schema;
use crate::validate::{validate, ValidationReport, Violation};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Lifecycle state of one configuration unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleState {
    /// No load attempt has happened yet
    Unloaded,
    /// The last load attempt bound a consistent document
    Loaded,
    /// The last load attempt was rejected; a fresh load attempt is the
    /// only way back to `Loaded`
    Invalid,
}

/// Orchestrates loading one named configuration unit.
pub struct ConfigModule<C> {
    name: String,
    schema: Schema<C>,
    state: ModuleState,
}

impl<C> ConfigModule<C> {
    pub fn new(name: impl Into<String>, schema: Schema<C>) -> Self {
        Self {
            name: name.into(),
            schema,
            state: ModuleState::Unloaded,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> ModuleState {
        self.state
    }

    pub fn schema(&self) -> &Schema<C> {
        &self.schema
    }

    /// Renders the default config document for this unit, with a
    /// header naming the module.
    pub fn generate_default(&self) -> String {
        format!(
            "# Configuration for module '{}'.\n# This file was generated with default values.\n\n{}",
            self.name,
            self.schema.render()
        )
    }

    /// Loads a configuration from raw document text.
    ///
    /// The persisted schema version is checked first: on a mismatch the
    /// report carries exactly one version violation and field-level
    /// checks are skipped, so migration tooling can react before
    /// wading through data errors. Otherwise every field is validated,
    /// and only a clean report is bound onto `target`.
    ///
    /// Returns the report: empty means the module is now
    /// [`Loaded`](ModuleState::Loaded) and `target` fully populated;
    /// non-empty means [`Invalid`](ModuleState::Invalid) and `target`
    /// untouched. `Err` is reserved for unparseable input.
    pub fn load_str(&mut self, text: &str, target: &mut C) -> Result<ValidationReport, ConfigError> {
        let doc = Document::parse_str(text)?;

        let report = match self.check_version(&doc) {
            Some(violation) => {
                let mut report = ValidationReport::new();
                report.push(violation);
                report
            }
            None => validate(&doc, &self.schema),
        };

        if report.is_empty() {
            bind(&doc, &self.schema, target);
            self.state = ModuleState::Loaded;
            debug!(module = %self.name, "Configuration loaded");
        } else {
            self.state = ModuleState::Invalid;
            warn!(
                module = %self.name,
                violations = report.len(),
                "Configuration rejected"
            );
        }
        Ok(report)
    }

    /// Loads the configuration from a file, generating it first when
    /// absent.
    ///
    /// A missing file is synthesized from the schema's defaults and
    /// written to disk, then loaded through the ordinary pipeline — so
    /// the generated file proves itself valid on its very first read.
    pub fn load_path(&mut self, path: &Path, target: &mut C) -> Result<ValidationReport, ConfigError> {
        let text = if path.exists() {
            fs::read_to_string(path)
                .map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?
        } else {
            let rendered = self.generate_default();
            fs::write(path, &rendered)
                .map_err(|e| ConfigError::FileWrite(path.to_path_buf(), e))?;
            info!(module = %self.name, "Created default configuration file: {}", path.display());
            rendered
        };
        self.load_str(&text, target)
    }

    /// Compares the document's persisted version with the compiled-in
    /// schema version. A missing or non-integer version key falls in
    /// the same distinguished category as a stale one.
    fn check_version(&self, doc: &Document) -> Option<Violation> {
        let expected = i64::from(self.schema.version());
        match doc.version() {
            Some(found) if found == expected => None,
            Some(found) => Some(Violation::version_mismatch(format!(
                "document version {found} does not match schema version {expected}"
            ))),
            None => Some(Violation::version_mismatch(format!(
                "missing schema version (expected {expected})"
            ))),
        }
    }
}
