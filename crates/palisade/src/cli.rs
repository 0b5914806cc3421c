//! Command line interface for the Palisade module suite.

use clap::{Arg, Command};
use std::path::PathBuf;

/// Parsed command line arguments.
#[derive(Debug, Clone)]
pub struct CliArgs {
    pub config_dir: PathBuf,
    pub log_level: String,
    pub json_logs: bool,
    pub generate: bool,
}

impl CliArgs {
    /// Parse command line arguments.
    pub fn parse() -> Self {
        let matches = Command::new("Palisade")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Gameplay module suite with declarative, validated configuration")
            .arg(
                Arg::new("config-dir")
                    .short('c')
                    .long("config-dir")
                    .value_name("DIR")
                    .help("Directory holding per-module config files")
                    .default_value("config"),
            )
            .arg(
                Arg::new("log-level")
                    .short('l')
                    .long("log-level")
                    .value_name("LEVEL")
                    .help("Log level (trace, debug, info, warn, error)")
                    .default_value("info"),
            )
            .arg(
                Arg::new("json-logs")
                    .long("json-logs")
                    .help("Output logs in JSON format")
                    .action(clap::ArgAction::SetTrue),
            )
            .arg(
                Arg::new("generate")
                    .long("generate")
                    .help("Write default config files for all modules and exit")
                    .action(clap::ArgAction::SetTrue),
            )
            .get_matches();

        Self {
            config_dir: PathBuf::from(
                matches
                    .get_one::<String>("config-dir")
                    .expect("config-dir has a default"),
            ),
            log_level: matches
                .get_one::<String>("log-level")
                .expect("log-level has a default")
                .clone(),
            json_logs: matches.get_flag("json-logs"),
            generate: matches.get_flag("generate"),
        }
    }
}
