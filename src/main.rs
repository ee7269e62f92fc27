//! srecflash - Motorola S-record memory image converter
//!
//! Converts between S-record files and raw binary images of a device's
//! memory. The address window of an image is given either directly with
//! `--start`/`--end` or by name from a TOML memory map.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, MapCommands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    match cli.command {
        Commands::Decode {
            input,
            output,
            window,
            fill,
            trim,
        } => commands::decode::run_decode(&input, &output, &window, fill, trim),
        Commands::Encode {
            input,
            output,
            window,
            record_size,
        } => commands::encode::run_encode(&input, &output, &window, record_size),
        Commands::Info { input } => commands::info::run_info(&input),
        Commands::Map(subcmd) => match subcmd {
            MapCommands::Show { file } => commands::map::cmd_show(&file),
        },
    }
}
