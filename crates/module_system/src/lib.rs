//! Module lifecycle management for the Palisade suite.
//!
//! Provides the [`Module`] trait that gameplay modules implement and
//! the [`ModuleRegistry`] that aggregates them: registration, config
//! loading for every registered module, and enable/disable in stable
//! name order. The registry is constructed where it is needed and
//! passed explicitly — there is no global singleton to retrieve it
//! from.
//!
//! Enabling fails closed: a module whose configuration is rejected is
//! reported and left disabled, without stopping the other modules from
//! enabling.

use config_system::{ConfigError, ValidationReport};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::{debug, error, info};

/// Errors raised by registry operations.
#[derive(Debug, Error)]
pub enum ModuleError {
    /// A module with the same name is already registered
    #[error("Module '{0}' is already registered")]
    AlreadyRegistered(String),

    /// No module with that name is registered
    #[error("Module '{0}' not found")]
    NotFound(String),
}

/// One gameplay module as the registry sees it.
///
/// Implementations own their config struct and their
/// [`ConfigModule`](config_system::ConfigModule); `load_config` runs
/// the parse/validate/bind pipeline against the module's file under
/// `config_dir` and hands back the report. `on_enable` is only called
/// after a clean report.
pub trait Module: Send {
    /// Stable module name; doubles as the config file stem.
    fn name(&self) -> &str;

    /// Loads (or generates) this module's configuration from `config_dir`.
    fn load_config(&mut self, config_dir: &Path) -> Result<ValidationReport, ConfigError>;

    /// Writes this module's default configuration file into
    /// `config_dir` without binding anything, returning its path.
    /// Existing files must be left untouched.
    fn write_default_config(&self, config_dir: &Path) -> Result<PathBuf, ConfigError>;

    /// Called once after the module's configuration bound cleanly.
    fn on_enable(&mut self) {}

    /// Called when the suite shuts down, for modules that were enabled.
    fn on_disable(&mut self) {}
}

/// Outcome of one module's enable attempt.
#[derive(Debug)]
pub enum ModuleStatus {
    /// Configuration bound cleanly and `on_enable` ran
    Enabled,
    /// Configuration was rejected; the report lists every violation
    Rejected(ValidationReport),
    /// The config file could not be read, written, or parsed at all
    Failed(ConfigError),
}

/// Per-module outcomes of an [`ModuleRegistry::enable_all`] pass.
#[derive(Debug, Default)]
pub struct EnableReport {
    outcomes: Vec<(String, ModuleStatus)>,
}

impl EnableReport {
    /// Whether every registered module enabled successfully.
    pub fn all_enabled(&self) -> bool {
        self.outcomes
            .iter()
            .all(|(_, status)| matches!(status, ModuleStatus::Enabled))
    }

    /// Iterates `(module name, status)` pairs in enable order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ModuleStatus)> {
        self.outcomes.iter().map(|(name, status)| (name.as_str(), status))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

/// Aggregates registered modules and drives their lifecycle.
///
/// Modules are kept sorted by name, so config loading and lifecycle
/// hooks run in a stable, predictable order. Registration is
/// serialized behind a mutex; the modules themselves share no mutable
/// state, so their load pipelines are independent of one another.
pub struct ModuleRegistry {
    modules: Mutex<BTreeMap<String, ModuleEntry>>,
}

struct ModuleEntry {
    module: Box<dyn Module>,
    enabled: bool,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            modules: Mutex::new(BTreeMap::new()),
        }
    }

    /// Registers a module; rejects duplicate names.
    pub fn register(&self, module: Box<dyn Module>) -> Result<(), ModuleError> {
        let name = module.name().to_string();
        let mut modules = self.modules.lock().expect("module registry lock poisoned");
        if modules.contains_key(&name) {
            return Err(ModuleError::AlreadyRegistered(name));
        }
        debug!(module = %name, "Registered module");
        modules.insert(
            name,
            ModuleEntry {
                module,
                enabled: false,
            },
        );
        Ok(())
    }

    /// Registered module names in sorted order.
    pub fn module_names(&self) -> Vec<String> {
        let modules = self.modules.lock().expect("module registry lock poisoned");
        modules.keys().cloned().collect()
    }

    /// Loads every module's configuration from `config_dir` and enables
    /// the ones whose report comes back clean.
    ///
    /// A rejected or failed module is logged and skipped; the rest of
    /// the suite still comes up. The returned report carries the
    /// outcome for every module in name order.
    pub fn enable_all(&self, config_dir: &Path) -> EnableReport {
        let mut modules = self.modules.lock().expect("module registry lock poisoned");
        let mut report = EnableReport::default();

        for (name, entry) in modules.iter_mut() {
            let status = match entry.module.load_config(config_dir) {
                Ok(violations) if violations.is_empty() => {
                    entry.module.on_enable();
                    entry.enabled = true;
                    info!(module = %name, "Enabled module");
                    ModuleStatus::Enabled
                }
                Ok(violations) => {
                    error!(
                        module = %name,
                        "Module configuration rejected, refusing to enable:\n{violations}"
                    );
                    ModuleStatus::Rejected(violations)
                }
                Err(e) => {
                    error!(module = %name, "Failed to load module configuration: {e}");
                    ModuleStatus::Failed(e)
                }
            };
            report.outcomes.push((name.clone(), status));
        }
        report
    }

    /// Disables every module that was previously enabled, in name order.
    pub fn disable_all(&self) {
        let mut modules = self.modules.lock().expect("module registry lock poisoned");
        for (name, entry) in modules.iter_mut() {
            if entry.enabled {
                entry.module.on_disable();
                entry.enabled = false;
                info!(module = %name, "Disabled module");
            }
        }
    }

    /// Writes the default configuration file for every registered
    /// module that does not have one yet.
    pub fn write_default_configs(&self, config_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
        let modules = self.modules.lock().expect("module registry lock poisoned");
        let mut written = Vec::new();
        for entry in modules.values() {
            written.push(entry.module.write_default_config(config_dir)?);
        }
        Ok(written)
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_system::{Bounds, ConfigField, ConfigModule, SchemaBuilder};
    use tempfile::TempDir;

    #[derive(Debug, Default)]
    struct TestConfig {
        limit: i64,
    }

    struct TestModule {
        config: TestConfig,
        module: ConfigModule<TestConfig>,
    }

    impl TestModule {
        fn new(name: &str) -> Self {
            let schema = SchemaBuilder::new(1)
                .field(ConfigField::long(
                    "limit",
                    10,
                    Bounds::new(Some(0), Some(100)),
                    |c: &mut TestConfig, v| c.limit = v,
                    "A limit.",
                ))
                .build()
                .unwrap();
            Self {
                config: TestConfig::default(),
                module: ConfigModule::new(name.to_string(), schema),
            }
        }

        fn config_path(&self, config_dir: &Path) -> PathBuf {
            config_dir.join(format!("{}.yml", self.module.name()))
        }
    }

    impl Module for TestModule {
        fn name(&self) -> &str {
            self.module.name()
        }

        fn load_config(&mut self, config_dir: &Path) -> Result<ValidationReport, ConfigError> {
            let path = self.config_path(config_dir);
            self.module.load_path(&path, &mut self.config)
        }

        fn write_default_config(&self, config_dir: &Path) -> Result<PathBuf, ConfigError> {
            let path = self.config_path(config_dir);
            if !path.exists() {
                std::fs::write(&path, self.module.generate_default())
                    .map_err(|e| ConfigError::FileWrite(path.clone(), e))?;
            }
            Ok(path)
        }
    }

    #[test]
    fn rejects_duplicate_registration() {
        let registry = ModuleRegistry::new();
        registry.register(Box::new(TestModule::new("alpha"))).unwrap();

        let result = registry.register(Box::new(TestModule::new("alpha")));
        assert!(matches!(result, Err(ModuleError::AlreadyRegistered(n)) if n == "alpha"));
    }

    #[test]
    fn module_names_are_sorted() {
        let registry = ModuleRegistry::new();
        registry.register(Box::new(TestModule::new("zeta"))).unwrap();
        registry.register(Box::new(TestModule::new("alpha"))).unwrap();
        registry.register(Box::new(TestModule::new("mid"))).unwrap();

        assert_eq!(registry.module_names(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn enable_all_generates_missing_configs_and_enables() {
        let dir = TempDir::new().unwrap();
        let registry = ModuleRegistry::new();
        registry.register(Box::new(TestModule::new("alpha"))).unwrap();
        registry.register(Box::new(TestModule::new("beta"))).unwrap();

        let report = registry.enable_all(dir.path());
        assert!(report.all_enabled());
        assert_eq!(report.len(), 2);
        assert!(dir.path().join("alpha.yml").exists());
        assert!(dir.path().join("beta.yml").exists());
    }

    #[test]
    fn a_rejected_module_does_not_stop_the_others() {
        let dir = TempDir::new().unwrap();
        // "bad" has an out-of-range value on disk; "good" is untouched.
        std::fs::write(dir.path().join("bad.yml"), "version: 1\nlimit: 9000\n").unwrap();

        let registry = ModuleRegistry::new();
        registry.register(Box::new(TestModule::new("bad"))).unwrap();
        registry.register(Box::new(TestModule::new("good"))).unwrap();

        let report = registry.enable_all(dir.path());
        assert!(!report.all_enabled());

        let outcomes: Vec<(&str, bool)> = report
            .iter()
            .map(|(name, status)| (name, matches!(status, ModuleStatus::Enabled)))
            .collect();
        assert_eq!(outcomes, vec![("bad", false), ("good", true)]);

        match report.iter().next().unwrap().1 {
            ModuleStatus::Rejected(violations) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations.iter().next().unwrap().path, "limit");
            }
            other => panic!("expected a rejection, got {other:?}"),
        };
    }

    #[test]
    fn write_default_configs_leaves_existing_files_alone() {
        let dir = TempDir::new().unwrap();
        let existing = dir.path().join("alpha.yml");
        std::fs::write(&existing, "version: 1\nlimit: 42\n").unwrap();

        let registry = ModuleRegistry::new();
        registry.register(Box::new(TestModule::new("alpha"))).unwrap();
        registry.register(Box::new(TestModule::new("beta"))).unwrap();

        let written = registry.write_default_configs(dir.path()).unwrap();
        assert_eq!(written.len(), 2);

        // The pre-existing file kept its contents.
        let content = std::fs::read_to_string(&existing).unwrap();
        assert!(content.contains("limit: 42"));
        // The missing one was generated with defaults.
        let generated = std::fs::read_to_string(dir.path().join("beta.yml")).unwrap();
        assert!(generated.contains("limit: 10"));
    }
}
