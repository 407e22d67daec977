// intcode: Intcode virtual machine runner and time-travel monitor

use std::fs;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use env_logger::Env;
use log::info;
use ratatui::{backend::CrosstermBackend, Terminal};

use intcode::interpreter::constants::DEFAULT_HISTORY_LIMIT;
use intcode::interpreter::debugger::Debugger;
use intcode::interpreter::engine::{Machine, MachineState};
use intcode::interpreter::errors::{MachineError, Port};
use intcode::memory::Cell;
use intcode::parser::{parse_literal, parse_program};
use intcode::ports::{ascii, QueuePorts};
use intcode::snapshot::Snapshot;
use intcode::ui::App;

#[derive(Parser, Debug)]
#[command(name = "intcode")]
#[command(about = "Run and inspect Intcode programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a program to completion, reading further input from stdin
    Run {
        /// Program file (comma-separated integers)
        program: PathBuf,

        /// Input values queued before the program starts
        #[arg(long, num_args = 1.., allow_negative_numbers = true)]
        input: Vec<Cell>,

        /// Exchange text: stdin lines become character codes, outputs print as characters
        #[arg(long, action = ArgAction::SetTrue)]
        ascii: bool,

        /// Resume from a saved snapshot instead of the program's initial state
        #[arg(long)]
        load_snapshot: Option<PathBuf>,

        /// Save a snapshot at halt, or when stdin ends while input is awaited
        #[arg(long)]
        save_snapshot: Option<PathBuf>,
    },

    /// Step through a program in the time-travel monitor
    Monitor {
        /// Program file (comma-separated integers)
        program: PathBuf,

        /// Input values queued before the program starts
        #[arg(long, num_args = 1.., allow_negative_numbers = true)]
        input: Vec<Cell>,

        /// Memory budget for the execution history, in bytes
        #[arg(long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        history_limit: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            program,
            input,
            ascii,
            load_snapshot,
            save_snapshot,
        } => {
            let machine = load_machine(&program, load_snapshot.as_deref())?;
            let ports = QueuePorts::with_inputs(input);
            if let Err(e) = run(machine, ports, ascii, save_snapshot.as_deref()) {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Monitor {
            program,
            input,
            history_limit,
        } => {
            let machine = load_machine(&program, None)?;
            let debugger = Debugger::new(machine, QueuePorts::with_inputs(input), history_limit)?;
            monitor(debugger)
        }
    }
}

fn load_machine(
    program: &Path,
    snapshot: Option<&Path>,
) -> Result<Machine, Box<dyn std::error::Error>> {
    if !program.exists() {
        eprintln!("Error: File '{}' not found", program.display());
        std::process::exit(1);
    }

    let source = fs::read_to_string(program)?;
    let cells = match parse_program(&source) {
        Ok(cells) => cells,
        Err(e) => {
            eprintln!("Parse error in {}: {}", program.display(), e);
            std::process::exit(1);
        }
    };
    info!("loaded {} cells from {}", cells.len(), program.display());

    let mut machine = Machine::new(cells);
    if let Some(path) = snapshot {
        machine.restore(Snapshot::load_from_path(path)?);
        info!("resuming from {}", path.display());
    }
    Ok(machine)
}

/// Parse one line of numeric input; values may be separated by commas or spaces
fn parse_input_line(line: &str) -> Result<Vec<Cell>, MachineError> {
    line.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(index, token)| parse_literal(token, index))
        .collect()
}

fn print_outputs(outputs: Vec<Cell>, as_text: bool) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    for value in &outputs {
        if as_text {
            write!(stdout, "{}", ascii::render(value))?;
        } else {
            writeln!(stdout, "{}", value)?;
        }
    }
    stdout.flush()
}

fn run(
    mut machine: Machine,
    mut ports: QueuePorts,
    as_text: bool,
    save_to: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let mut lines = stdin.lock().lines();

    loop {
        let state = machine.run_until_blocked(&mut ports);
        print_outputs(ports.drain_outputs(), as_text)?;

        match state? {
            MachineState::AwaitingInput => {
                if interactive {
                    eprint!("? ");
                    io::stderr().flush()?;
                }
                match lines.next() {
                    Some(line) => {
                        let line = line?;
                        if as_text {
                            ports.extend_inputs(ascii::encode_line(&line));
                        } else {
                            ports.extend_inputs(parse_input_line(&line)?);
                        }
                    }
                    None => {
                        return match save_to {
                            Some(path) => {
                                machine.save().save_to_path(path)?;
                                eprintln!(
                                    "Suspended awaiting input at position {}; snapshot saved to {}",
                                    machine.pc(),
                                    path.display()
                                );
                                Ok(())
                            }
                            None => Err(MachineError::PortClosed { port: Port::Input }.into()),
                        };
                    }
                }
            }
            _ => {
                if let Some(path) = save_to {
                    machine.save().save_to_path(path)?;
                }
                return Ok(());
            }
        }
    }
}

fn monitor(debugger: Debugger) -> Result<(), Box<dyn std::error::Error>> {
    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(debugger);
    let res = app.run(&mut terminal);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use intcode::memory::value::cells;

    #[test]
    fn test_parse_input_line() {
        assert_eq!(parse_input_line("1, 2 -3").unwrap(), cells([1, 2, -3]));
        assert!(parse_input_line("").unwrap().is_empty());
        assert!(parse_input_line("4 x").is_err());
    }
}
