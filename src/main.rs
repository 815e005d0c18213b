use clap::Parser;
use env_logger::Env;
use log::LevelFilter;

use crate::args::Args;

mod args;
mod election;

fn main() {
    let args = Args::parse();

    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if args.verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.init();

    if let Err(e) = election::run_election_cli(&args) {
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = snafu::ErrorCompat::backtrace(&e) {
            eprintln!("{}", bt);
        }
        std::process::exit(1);
    }
}
