//! The `kushc` driver: argument parsing, phase orchestration, and
//! diagnostic reporting, mirroring the teacher's `faxc-drv::{Config,
//! Session}` split (`faxc-drv/src/lib.rs`) but wired against the real
//! Kush pipeline (Lexer → Parser → Analyzer → Emitter) instead of the
//! teacher's MIR/LIR/LLVM backend, which has no counterpart here.
//!
//! `argv` is parsed by hand into a [`Config`], the same way the
//! original `kush` driver (`examples/original_source/source/compiler.c`,
//! `compileEx`) walks `argv` with `strcmp` rather than a declarative
//! flag library — the teacher's own `faxc-drv` does the same (no
//! `clap` in its dependency list either).

mod config;
mod diagnostics;
mod session;

pub use config::{Config, LogLevel};
pub use session::Session;

use anyhow::{bail, Result};

/// Entry point invoked by `main.rs`. Parses `argv`, initializes logging,
/// builds one [`Session`], and compiles every input file in sequence
/// (spec.md §5: "the driver processes input files sequentially").
pub fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::parse(&args)?;

    init_logging(config.log_level);

    if config.show_version {
        println!("kush v{}.{}", VERSION_MAJOR, VERSION_MINOR);
        return Ok(());
    }
    if config.show_help {
        print_help();
        return Ok(());
    }
    if config.input_files.is_empty() {
        bail!("Please specify input files.");
    }

    let mut session = Session::new(config);
    let succeeded = session.compile_all()?;

    if session.config().footprint {
        print_footprint();
    }

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}

/// The compiler's own release line, unrelated to the `.am` artifact
/// format version in `kushc-loader` (spec.md §4.7's major/minor gate
/// belongs to the artifact, not the compiler binary).
pub const VERSION_MAJOR: u32 = 0;
pub const VERSION_MINOR: u32 = 1;

fn init_logging(level: LogLevel) {
    env_logger::Builder::new()
        .filter_level(level.to_filter())
        .format_timestamp(None)
        .try_init()
        .ok();
}

fn print_help() {
    println!(
        "\
Usage:
    kushc [--tokens] [--nodes] [--footprint] [--instructions] [--core-api] [--log <level>] [--help] <inputFiles> [--run <arguments>]

Options:
    --tokens        Print the tokens recognized by the lexer.
    --nodes         Print the AST recognized by the parser.
    --footprint     Print diagnostic information about the memory footprint of the compiler.
    --instructions  Print the C source emitted for each compiled file.
    --core-api      Suppress the implicit `kush.core` import. Only meaningful when compiling the core module itself.
    --run           Compile, link with the host C toolchain, and run the result, forwarding the remaining arguments.
    --log <level>   Set the log verbosity (all, finest, finer, fine, debug, configuration, information, warning, severe, error, none).
    --help          Print this help message.
    --version       Print the current version of the compiler."
    );
}

/// Reads the process's own resident set size from `/proc/self/status`,
/// the same coarse metric the original `compileEx`'s `--footprint`
/// flag reports (`k_Memory_getFootprint`) — a diagnostic aid, not a
/// precise allocator accounting, so a missing `/proc` (non-Linux hosts)
/// degrades to a one-line notice rather than an error.
fn print_footprint() {
    let rss_kb = std::fs::read_to_string("/proc/self/status").ok().and_then(|status| {
        status
            .lines()
            .find(|line| line.starts_with("VmRSS:"))
            .and_then(|line| line.split_whitespace().nth(1))
            .and_then(|n| n.parse::<u64>().ok())
    });
    match rss_kb {
        Some(kb) => println!("Memory footprint = {:.2} KB", kb as f64),
        None => println!("Memory footprint: unavailable on this platform"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_constants_are_nonzero_major_minor_pair() {
        assert_eq!(VERSION_MAJOR, 0);
        assert_eq!(VERSION_MINOR, 1);
    }
}
