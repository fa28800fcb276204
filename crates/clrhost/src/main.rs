use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use clrhost_core::{exit_code, HostOptions};

/// Execute the specified managed assembly with the passed in arguments
#[derive(Parser, Debug)]
#[command(name = "clrhost", version)]
struct Args {
    /// Path to the CoreCLR files
    #[arg(short = 'c', long = "clr-path", value_name = "PATH")]
    clr_path: Option<PathBuf>,

    /// Enable tracing
    #[arg(short, long)]
    trace: bool,

    /// Managed assembly to run
    #[arg(value_name = "ASSEMBLY")]
    assembly: PathBuf,

    /// Arguments passed to the managed application
    #[arg(value_name = "ARGUMENTS", trailing_var_arg = true, allow_hyphen_values = true)]
    app_args: Vec<String>,
}

impl Args {
    /// Resolve paths and build the host options.
    fn into_options(self) -> anyhow::Result<HostOptions> {
        let managed_application = self.assembly.canonicalize().with_context(|| {
            format!("Cannot locate managed application: {}", self.assembly.display())
        })?;

        let clr_path = match self.clr_path {
            Some(path) => Some(
                path.canonicalize()
                    .with_context(|| format!("Cannot locate CLR files: {}", path.display()))?,
            ),
            None => None,
        };

        Ok(HostOptions {
            managed_application,
            clr_path,
            app_args: self.app_args,
        })
    }
}

fn init_tracing(trace: bool) {
    let default_level = if trace { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn launch(args: Args) -> anyhow::Result<i32> {
    let options = args.into_options()?;

    let result = clrhost_core::run(&options);
    match &result {
        Ok(outcome) => debug!("Exit code: {}", outcome.exit_code),
        Err(e) => error!("{}", e),
    }
    Ok(exit_code(&result))
}

fn main() {
    let args = Args::parse();
    init_tracing(args.trace);
    debug!("Tracing enabled");

    let code = match launch(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("clrhost: {:#}", e);
            1
        }
    };
    std::process::exit(code);
}
