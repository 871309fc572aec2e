//! Command-line configuration, hand-parsed the way the original driver
//! does (`examples/original_source/source/compiler.c`'s `compileEx`
//! walks `argv` with `strcmp`, not a declarative flag parser), and the
//! way the teacher's `faxc-drv::Config` is built too.

use std::path::PathBuf;

use anyhow::{bail, Result};
use log::LevelFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    All,
    Finest,
    Finer,
    Fine,
    Debug,
    Configuration,
    Information,
    Warning,
    Severe,
    Error,
    None,
}

impl LogLevel {
    fn parse(name: &str) -> Option<LogLevel> {
        Some(match name {
            "all" => LogLevel::All,
            "finest" => LogLevel::Finest,
            "finer" => LogLevel::Finer,
            "fine" => LogLevel::Fine,
            "debug" => LogLevel::Debug,
            "configuration" => LogLevel::Configuration,
            "information" => LogLevel::Information,
            "warning" => LogLevel::Warning,
            "severe" => LogLevel::Severe,
            "error" => LogLevel::Error,
            "none" => LogLevel::None,
            _ => return None,
        })
    }

    /// Collapses the original's eleven named levels onto `log`'s five
    /// filters; `Finest`/`Finer`/`Fine`/`Debug`/`Configuration` all
    /// land on `Trace` since nothing in this crate distinguishes them
    /// further.
    pub fn to_filter(self) -> LevelFilter {
        match self {
            LogLevel::All | LogLevel::Finest | LogLevel::Finer | LogLevel::Fine | LogLevel::Debug | LogLevel::Configuration => {
                LevelFilter::Trace
            }
            LogLevel::Information => LevelFilter::Info,
            LogLevel::Warning => LevelFilter::Warn,
            LogLevel::Severe | LogLevel::Error => LevelFilter::Error,
            LogLevel::None => LevelFilter::Off,
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Warning
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub input_files: Vec<PathBuf>,
    pub dump_tokens: bool,
    pub dump_nodes: bool,
    pub footprint: bool,
    pub dump_instructions: bool,
    pub core_api: bool,
    pub log_level: LogLevel,
    pub show_help: bool,
    pub show_version: bool,
    /// Arguments captured after `--run`, forwarded to the compiled
    /// program once the driver has invoked the host C toolchain on the
    /// emitted source.
    pub run_args: Option<Vec<String>>,
}

impl Config {
    /// Mirrors `compileEx`'s loop: every `--flag` is matched by name,
    /// anything else accumulates as an input file path, and `--run`
    /// consumes the remainder of `argv` as arguments to forward rather
    /// than more flags.
    pub fn parse(args: &[String]) -> Result<Config> {
        let mut config = Config::default();
        let mut iter = args.iter().peekable();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--tokens" => config.dump_tokens = true,
                "--nodes" => config.dump_nodes = true,
                "--footprint" => config.footprint = true,
                "--instructions" => config.dump_instructions = true,
                "--core-api" => config.core_api = true,
                "--help" => config.show_help = true,
                "--version" => config.show_version = true,
                "--log" => {
                    let level = iter
                        .next()
                        .ok_or_else(|| anyhow::anyhow!("--log requires a level argument"))?;
                    config.log_level = LogLevel::parse(level)
                        .ok_or_else(|| anyhow::anyhow!("Unknown log level '{level}'"))?;
                }
                "--run" => {
                    config.run_args = Some(iter.by_ref().cloned().collect());
                    break;
                }
                flag if flag.starts_with("--") => {
                    bail!("Unknown flag `{flag}`");
                }
                file => config.input_files.push(PathBuf::from(file)),
            }
        }

        Ok(config)
    }
}
