use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use imgshift_core::TargetFormat;
use imgshift_engine::EngineSettings;
use log::LevelFilter;

#[derive(Debug, Parser)]
#[command(name = "imgshift", version, about = "Convert an image to jpg, png, webp or gif")]
pub struct Cli {
    #[command(flatten)]
    pub log: LogArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Convert one file and exit.
    Convert(ConvertArgs),
    /// Interactive session: open, format, convert, repeat.
    Shell(EngineArgs),
}

#[derive(Debug, Args)]
pub struct LogArgs {
    /// off, error, warn, info, debug or trace.
    #[arg(long, global = true, default_value = "warn", value_parser = parse_level)]
    pub log_level: LevelFilter,

    /// Write logs to this file instead of the terminal.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EngineArgs {
    /// Directory converted files are saved into.
    #[arg(long, short, default_value = ".")]
    pub out: PathBuf,

    /// Give up on a conversion after this many seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,
}

impl EngineArgs {
    pub fn settings(&self) -> EngineSettings {
        EngineSettings {
            output_dir: self.out.clone(),
            conversion_timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Image file to convert.
    pub input: PathBuf,

    /// Target format: jpg, png, webp or gif.
    #[arg(long, short = 't', value_parser = parse_format)]
    pub to: TargetFormat,

    /// Print the delivery receipt as JSON.
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub engine: EngineArgs,
}

fn parse_format(raw: &str) -> Result<TargetFormat, String> {
    raw.parse().map_err(|err: imgshift_core::UnknownFormat| err.to_string())
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse()
        .map_err(|_| format!("unknown log level '{raw}'"))
}
