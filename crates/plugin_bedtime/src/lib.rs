//! Bedtime module: lets a configurable share of sleeping players
//! advance the world to morning.
//!
//! This crate holds the module's configuration unit and the pure sleep
//! accounting; the host-engine side (bed enter/leave events, world time
//! mutation, broadcasts) lives with the engine bindings and consumes
//! the bound [`BedtimeConfig`].

use config_system::{
    Bounds, ConfigError, ConfigField, ConfigModule, ModuleState, SchemaBuilder, SchemaError,
    ValidationReport,
};
use module_system::Module;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Config schema version; bump when fields are added, removed or
/// migrated.
pub const CONFIG_VERSION: u32 = 1;

/// Bound configuration for the bedtime module.
#[derive(Debug, Clone, PartialEq)]
pub struct BedtimeConfig {
    /// Fraction of sleeping players required to advance time.
    pub sleep_threshold: f64,
    /// Time of day in ticks to advance to.
    pub target_time: i64,
    /// Ticks over which the time change is interpolated.
    pub interpolation_ticks: i64,
}

impl Default for BedtimeConfig {
    fn default() -> Self {
        Self {
            sleep_threshold: 0.5,
            target_time: 1000,
            interpolation_ticks: 100,
        }
    }
}

impl BedtimeConfig {
    /// Whether the sleeping share of `total` players reaches the
    /// configured threshold (inclusive).
    pub fn enough_players_sleeping(&self, sleeping: u32, total: u32) -> bool {
        sleep_percentage(sleeping, total) >= self.sleep_threshold
    }
}

/// Fraction of players currently sleeping, in `[0.0, 1.0]`.
///
/// Zero sleepers is always `0.0`, including in an empty world.
pub fn sleep_percentage(sleeping: u32, total: u32) -> f64 {
    if sleeping == 0 || total == 0 {
        return 0.0;
    }
    f64::from(sleeping) / f64::from(total)
}

fn schema() -> Result<config_system::Schema<BedtimeConfig>, SchemaError> {
    SchemaBuilder::new(CONFIG_VERSION)
        .field(ConfigField::double(
            "sleep_threshold",
            0.5,
            Bounds::new(Some(0.0), Some(1.0)),
            |c: &mut BedtimeConfig, v| c.sleep_threshold = v,
            "The percentage of sleeping players required to advance time.",
        ))
        .field(ConfigField::long(
            "target_time",
            1000,
            Bounds::new(Some(0), Some(12000)),
            |c: &mut BedtimeConfig, v| c.target_time = v,
            "The target time in ticks [0-12000] to advance to. 1000 is just after sunrise.",
        ))
        .field(ConfigField::long(
            "interpolation_ticks",
            100,
            Bounds::new(Some(0), Some(1200)),
            |c: &mut BedtimeConfig, v| c.interpolation_ticks = v,
            "The interpolation time in ticks for a smooth change of time.",
        ))
        .build()
}

/// The bedtime module as registered with the suite's
/// [`ModuleRegistry`](module_system::ModuleRegistry).
pub struct BedtimeModule {
    config: BedtimeConfig,
    module: ConfigModule<BedtimeConfig>,
}

impl BedtimeModule {
    pub fn new() -> Result<Self, SchemaError> {
        Ok(Self {
            config: BedtimeConfig::default(),
            module: ConfigModule::new("bedtime", schema()?),
        })
    }

    /// The currently bound configuration. Only meaningful once the
    /// module's state is [`ModuleState::Loaded`].
    pub fn config(&self) -> &BedtimeConfig {
        &self.config
    }

    pub fn state(&self) -> ModuleState {
        self.module.state()
    }

    fn config_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(format!("{}.yml", self.module.name()))
    }
}

impl Module for BedtimeModule {
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

    fn on_enable(&mut self) {
        debug!(
            sleep_threshold = self.config.sleep_threshold,
            target_time = self.config.target_time,
            interpolation_ticks = self.config.interpolation_ticks,
            "Bedtime module enabled"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config_system::ViolationKind;
    use tempfile::TempDir;

    #[test]
    fn over_threshold_value_is_rejected_with_exact_path_and_reason() {
        let mut module = BedtimeModule::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("bedtime.yml"),
            "version: 1\nsleep_threshold: 1.5\n",
        )
        .unwrap();

        let report = module.load_config(dir.path()).unwrap();
        assert_eq!(report.len(), 1);

        let violation = report.iter().next().unwrap();
        assert_eq!(violation.path, "sleep_threshold");
        assert_eq!(violation.kind, ViolationKind::OutOfRange);
        assert!(violation.reason.contains("value 1.5 exceeds max 1.0"));

        // Fail closed: nothing was bound.
        assert_eq!(module.state(), ModuleState::Invalid);
        assert_eq!(*module.config(), BedtimeConfig::default());
    }

    #[test]
    fn omitted_target_time_binds_its_default() {
        let mut module = BedtimeModule::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("bedtime.yml"),
            "version: 1\nsleep_threshold: 0.75\ninterpolation_ticks: 40\n",
        )
        .unwrap();

        let report = module.load_config(dir.path()).unwrap();
        assert!(report.is_empty());
        assert_eq!(module.state(), ModuleState::Loaded);
        assert_eq!(module.config().target_time, 1000);
        assert_eq!(module.config().sleep_threshold, 0.75);
        assert_eq!(module.config().interpolation_ticks, 40);
    }

    #[test]
    fn first_run_generates_a_commented_default_file() {
        let mut module = BedtimeModule::new().unwrap();
        let dir = TempDir::new().unwrap();

        let report = module.load_config(dir.path()).unwrap();
        assert!(report.is_empty());
        assert_eq!(*module.config(), BedtimeConfig::default());

        let written = std::fs::read_to_string(dir.path().join("bedtime.yml")).unwrap();
        assert!(written.contains("version: 1"));
        assert!(written.contains("# The percentage of sleeping players required to advance time."));
        assert!(written.contains("# Range: [0, 12000]"));
        assert!(written.contains("target_time: 1000"));
    }

    #[test]
    fn stale_config_version_is_reported_before_field_errors() {
        let mut module = BedtimeModule::new().unwrap();
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("bedtime.yml"),
            "version: 0\nsleep_threshold: 99.0\n",
        )
        .unwrap();

        let report = module.load_config(dir.path()).unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report.iter().next().unwrap().kind, ViolationKind::VersionMismatch);
    }

    #[test]
    fn sleep_percentage_handles_empty_worlds() {
        assert_eq!(sleep_percentage(0, 0), 0.0);
        assert_eq!(sleep_percentage(0, 10), 0.0);
        assert_eq!(sleep_percentage(5, 10), 0.5);
        assert_eq!(sleep_percentage(10, 10), 1.0);
    }

    #[test]
    fn threshold_is_reached_inclusively() {
        let config = BedtimeConfig {
            sleep_threshold: 0.5,
            ..BedtimeConfig::default()
        };
        assert!(config.enough_players_sleeping(5, 10));
        assert!(config.enough_players_sleeping(6, 10));
        assert!(!config.enough_players_sleeping(4, 10));
    }
}
