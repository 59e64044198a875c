use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use imgshift_core::{update, AppState, DeliveryStatus, Msg, Prompt, WorkflowState};
use imgshift_engine::{EngineSettings, FileAcquirer};
use imgshift_logging::engine_debug;

use super::cli::{Cli, Command, ConvertArgs, EngineArgs};
use super::effects::EffectRunner;
use super::render::{receipt_json, render};
use super::shell::{ShellCommand, HELP};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run_app() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    super::logging::initialize(&cli.log);

    match cli.command {
        Command::Convert(args) => run_convert(args),
        Command::Shell(args) => run_shell(args),
    }
}

/// Owns the workflow state; the only place `update` is called from.
pub(crate) struct Session {
    state: AppState,
    runner: EffectRunner,
    acquirer: FileAcquirer,
}

impl Session {
    pub(crate) fn new(settings: EngineSettings) -> anyhow::Result<Self> {
        let runner = EffectRunner::new(settings).context("failed to start conversion engine")?;
        Ok(Self {
            state: AppState::new(),
            runner,
            acquirer: FileAcquirer,
        })
    }

    pub(crate) fn state(&self) -> &AppState {
        &self.state
    }

    /// Offers `path` as the dropped file. Returns whether it was acquired.
    pub(crate) fn open(&mut self, path: &Path) -> bool {
        let before = self.state.source().map(|source| source.id);
        let candidates = self.acquirer.candidates(&[path]);
        self.dispatch(Msg::FilesDropped(candidates));
        self.state.source().map(|source| source.id) != before
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) -> Vec<Prompt> {
        let state = std::mem::take(&mut self.state);
        let (state, effects) = update(state, msg);
        self.state = state;
        self.runner.enqueue(effects)
    }

    fn is_busy(&self) -> bool {
        match self.state.workflow() {
            WorkflowState::Converting => true,
            WorkflowState::Delivered => {
                matches!(self.state.view().delivery, Some(DeliveryStatus::Pending))
            }
            _ => false,
        }
    }

    /// Feeds engine events into the state until no run or delivery is pending.
    pub(crate) fn settle(&mut self) -> anyhow::Result<()> {
        while self.is_busy() {
            if let Some(msg) = self.runner.next_msg(POLL_INTERVAL)? {
                engine_debug!("Engine message {:?}", msg_kind(&msg));
                for prompt in self.dispatch(msg) {
                    engine_debug!("Prompt while settling: {}", prompt);
                }
            }
        }
        Ok(())
    }

    fn consume_dirty(&mut self) -> bool {
        self.state.consume_dirty()
    }
}

fn msg_kind(msg: &Msg) -> &'static str {
    match msg {
        Msg::ConversionFinished { .. } => "ConversionFinished",
        Msg::DeliveryFinished { .. } => "DeliveryFinished",
        _ => "other",
    }
}

fn run_convert(args: ConvertArgs) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(args.engine.settings())?;

    if !session.open(&args.input) {
        eprintln!("{} is not an image file", args.input.display());
        return Ok(ExitCode::FAILURE);
    }
    session.dispatch(Msg::FormatSelected(Some(args.to)));
    for prompt in session.dispatch(Msg::ConvertClicked) {
        eprintln!("{prompt}");
    }
    session.settle()?;

    let view = session.state().view();
    if let Some(failure) = &view.last_failure {
        eprintln!("Conversion failed: {failure}");
        return Ok(ExitCode::FAILURE);
    }
    match &view.delivery {
        Some(DeliveryStatus::Saved(receipt)) => {
            if args.json {
                println!("{}", receipt_json(&view, receipt)?);
            } else {
                println!("{}", receipt.location.display());
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(DeliveryStatus::Faulted(fault)) => {
            eprintln!("{fault}");
            Ok(ExitCode::FAILURE)
        }
        _ => {
            eprintln!("Conversion did not complete");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_shell(args: EngineArgs) -> anyhow::Result<ExitCode> {
    let mut session = Session::new(args.settings())?;
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    writeln!(
        stdout,
        "imgshift shell, saving into {}. Type 'help' for commands.",
        args.out.display()
    )?;
    print_view(&mut stdout, session.state())?;

    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(message) => {
                writeln!(stdout, "{message}")?;
                continue;
            }
        };

        let prompts = match command {
            ShellCommand::Open(path) => {
                if !session.open(&path) {
                    writeln!(stdout, "{} is not an image file", path.display())?;
                }
                Vec::new()
            }
            ShellCommand::Format(format) => session.dispatch(Msg::FormatSelected(format)),
            ShellCommand::Convert => {
                let prompts = session.dispatch(Msg::ConvertClicked);
                session.settle()?;
                prompts
            }
            ShellCommand::Status => {
                print_view(&mut stdout, session.state())?;
                continue;
            }
            ShellCommand::Help => {
                writeln!(stdout, "{HELP}")?;
                continue;
            }
            ShellCommand::Quit => break,
            ShellCommand::Empty => continue,
        };

        for prompt in prompts {
            writeln!(stdout, "{prompt}")?;
        }
        if session.consume_dirty() {
            print_view(&mut stdout, session.state())?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn print_view(out: &mut impl Write, state: &AppState) -> io::Result<()> {
    for line in render(&state.view()) {
        writeln!(out, "{line}")?;
    }
    Ok(())
}
