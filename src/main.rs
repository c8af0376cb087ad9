use std::error::Error;

use clap::Parser;
use log::{debug, info};

mod args;
mod convert;

use crate::args::Args;
use crate::convert::{run_conversion, OutputType};

fn print_error(err: &dyn Error) {
    eprintln!("Error: {}", err);
    let mut source = err.source();
    while let Some(e) = source {
        eprintln!("  caused by: {}", e);
        source = e.source();
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    debug!("main: args: {:?}", args);

    let res = OutputType::from_name(args.output_type.as_deref())
        .and_then(|output_type| run_conversion(&args.input, output_type));
    match res {
        Ok(written) => {
            info!("Conversion done: {} files written", written.len());
        }
        Err(e) => {
            print_error(&e);
            std::process::exit(1);
        }
    }
}
