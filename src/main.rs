#![forbid(unsafe_code)]

//! mero: new-tab page CLI entry point.

use clap::Parser;

mod cli_app;

fn main() {
    let args = cli_app::Cli::parse();
    args.init_logging();
    if let Err(e) = cli_app::run(&args) {
        eprintln!("mero: {e}");
        std::process::exit(1);
    }
}
