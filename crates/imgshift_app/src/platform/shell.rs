use std::path::PathBuf;

use imgshift_core::TargetFormat;

pub const HELP: &str = "\
Commands:
  open <path>                        pick the image to convert
  format <jpg|png|webp|gif|unset>    choose the target format
  convert                            convert and save
  status                             show the current state
  help                               show this help
  quit                               leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Open(PathBuf),
    Format(Option<TargetFormat>),
    Convert,
    Status,
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        match word.to_ascii_lowercase().as_str() {
            "" => Ok(ShellCommand::Empty),
            "open" if rest.is_empty() => Err("usage: open <path>".to_string()),
            "open" => Ok(ShellCommand::Open(PathBuf::from(rest))),
            "format" => TargetFormat::parse_selection(rest)
                .map(ShellCommand::Format)
                .map_err(|err| err.to_string()),
            "convert" => Ok(ShellCommand::Convert),
            "status" => Ok(ShellCommand::Status),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command '{other}', try 'help'")),
        }
    }
}
