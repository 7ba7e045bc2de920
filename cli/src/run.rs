//! Runs a `main`-shaped symbol from a shared library in-process.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};
use argv_bridge::{ArgvBridge, BridgeConfig, NativeLibrary, OsArgs};
use structopt::StructOpt;

use crate::logger;

#[derive(StructOpt)]
#[structopt(
    name = "argv-bridge-cli",
    about = "Run a native command-line entry point from a shared library, in-process."
)]
pub struct Options {
    #[structopt(long, parse(from_os_str), help = "Shared library exporting the entry point.")]
    library: PathBuf,

    #[structopt(long, help = "Name of the `int (int argc, char **argv)` symbol to call.")]
    symbol: String,

    #[structopt(long, parse(from_os_str), help = "JSON file with bridge configuration.")]
    config: Option<PathBuf>,

    #[structopt(short, long, help = "Log invocation details to stderr.")]
    verbose: bool,

    #[structopt(long, help = "Print the invocation record as JSON on stderr.")]
    report: bool,

    #[structopt(
        name = "ARGS",
        parse(from_os_str),
        help = "Arguments passed as argv, starting with argv[0]."
    )]
    args: Vec<OsString>,
}

/// Returns the entry point's status, to be used as the process exit code.
pub fn run() -> Result<i32> {
    let options = Options::from_args();
    logger::init(options.verbose);
    run_with(options)
}

fn run_with(options: Options) -> Result<i32> {
    let bridge = ArgvBridge::new(load_config(options.config.as_deref())?);

    let library = NativeLibrary::load(&options.library)?;
    // SAFETY: the user names the symbol and vouches for its signature.
    let mut entry = unsafe { library.main_symbol(&options.symbol) }?;

    let invocation = bridge
        .invoke(&OsArgs(&options.args), &mut entry)
        .with_context(|| format!("Error invoking {}", entry.name()))?;

    if options.report {
        eprintln!("{}", invocation.to_json()?);
    }
    Ok(invocation.status.code())
}

fn load_config(path: Option<&Path>) -> Result<BridgeConfig> {
    let path = match path {
        Some(path) => path,
        None => return Ok(BridgeConfig::default()),
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Error reading config {}", path.display()))?;
    let config = BridgeConfig::from_json(&json)
        .with_context(|| format!("Error parsing config {}", path.display()))?;
    Ok(config)
}
