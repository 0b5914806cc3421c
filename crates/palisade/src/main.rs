//! Entry point for the Palisade module suite.
//!
//! Builds the module registry, registers every module, loads (or
//! generates) the per-module config files, and enables the modules
//! whose configuration validated cleanly. Any rejected module is
//! reported with its full violation list and the process exits
//! non-zero, making this binary usable as a pre-deploy config check;
//! a game-engine host embeds [`ModuleRegistry`] directly instead.

use anyhow::Context;
use module_system::{ModuleRegistry, ModuleStatus};
use plugin_bedtime::BedtimeModule;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;

use cli::CliArgs;

// ============================================================================
// Logging Setup
// ============================================================================

/// Initialize the logging system.
fn setup_logging(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let registry = tracing_subscriber::registry().with(filter);

    if json_format {
        registry
            .with(fmt::layer().json().with_file(false).with_line_number(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_ansi(true).with_file(false).with_line_number(false))
            .init();
    }
}

// ============================================================================
// Startup
// ============================================================================

fn build_registry() -> anyhow::Result<ModuleRegistry> {
    let registry = ModuleRegistry::new();
    registry
        .register(Box::new(
            BedtimeModule::new().context("bedtime schema declaration is broken")?,
        ))
        .context("failed to register bedtime module")?;
    Ok(registry)
}

fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    setup_logging(&args.log_level, args.json_logs);

    std::fs::create_dir_all(&args.config_dir)
        .with_context(|| format!("failed to create config dir {}", args.config_dir.display()))?;

    let registry = build_registry()?;

    if args.generate {
        let written = registry
            .write_default_configs(&args.config_dir)
            .context("failed to write default configs")?;
        for path in written {
            info!("Config file ready: {}", path.display());
        }
        return Ok(());
    }

    let report = registry.enable_all(&args.config_dir);
    for (name, status) in report.iter() {
        match status {
            ModuleStatus::Enabled => {}
            ModuleStatus::Rejected(violations) => {
                error!("Module '{name}' refused to start; fix these and reload:\n{violations}");
            }
            ModuleStatus::Failed(e) => {
                error!("Module '{name}' could not load its configuration: {e}");
            }
        }
    }

    if !report.all_enabled() {
        registry.disable_all();
        std::process::exit(1);
    }

    info!("All {} module(s) enabled", report.len());
    registry.disable_all();
    Ok(())
}
