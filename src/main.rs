use clap::Parser;
use log::LevelFilter;

use visage::cli::Args;
use visage::runner;

fn main() {
    let args = Args::parse();

    let level = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    if let Err(e) = runner::run_app(args) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
