//! Main TUI application state and logic

use crate::interpreter::debugger::{Advance, Debugger};
use crate::interpreter::errors::MachineError;
use crate::parser::parse_literal;
use crate::ui::panes::{self, StatusRenderData, TapeScrollState};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};
use std::io;
use std::time::{Duration, Instant};

/// Which pane is currently focused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusedPane {
    Tape,
    Output,
}

impl FocusedPane {
    pub fn next(self) -> Self {
        match self {
            FocusedPane::Tape => FocusedPane::Output,
            FocusedPane::Output => FocusedPane::Tape,
        }
    }
}

/// Status bar text for an error. Machine faults point at the way back.
fn status_for_error(error: &MachineError) -> String {
    if error.is_fatal() {
        format!("Machine faulted: {} (Left to step back)", error)
    } else {
        error.to_string()
    }
}

/// The main application state
pub struct App {
    pub debugger: Debugger,

    /// Currently focused pane
    pub focused_pane: FocusedPane,

    pub tape_scroll: TapeScrollState,
    pub output_scroll: usize,

    /// Whether the app should quit
    pub should_quit: bool,

    /// Status message to display
    pub status_message: String,

    /// Whether the last operation failed
    pub is_error: bool,

    /// Whether auto-play mode is active
    pub is_playing: bool,

    /// Last time a step was taken in play mode
    pub last_play_time: Instant,

    /// Last time space was pressed (for debouncing)
    pub last_space_press: Instant,

    /// Digits typed in input mode; `None` outside input mode
    pub input_buffer: Option<String>,
}

impl App {
    pub fn new(debugger: Debugger) -> Self {
        App {
            debugger,
            focused_pane: FocusedPane::Tape,
            tape_scroll: TapeScrollState::new(),
            output_scroll: 0,
            should_quit: false,
            status_message: String::from("Ready!"),
            is_error: false,
            is_playing: false,
            last_play_time: Instant::now(),
            last_space_press: Instant::now()
                .checked_sub(Duration::from_secs(1))
                .unwrap_or(Instant::now()),
            input_buffer: None,
        }
    }

    /// Run the TUI application
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.should_quit {
                break;
            }

            if self.is_playing && self.last_play_time.elapsed() >= Duration::from_millis(250) {
                match self.debugger.step_forward() {
                    Ok(Advance::Replayed) | Ok(Advance::Executed) => {
                        self.set_status("Playing...");
                        self.output_scroll = usize::MAX;
                    }
                    Ok(Advance::NeedsInput) => {
                        self.is_playing = false;
                        self.set_status("Waiting for input (press i)");
                    }
                    Ok(Advance::Halted) => {
                        self.is_playing = false;
                        self.set_status("Program halted");
                    }
                    Err(e) => {
                        self.is_playing = false;
                        self.set_error(&e);
                    }
                }
                self.last_play_time = Instant::now();
            }

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key);
                    }
                }
            }
        }

        Ok(())
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.is_error = false;
    }

    fn set_error(&mut self, error: &MachineError) {
        self.status_message = status_for_error(error);
        self.is_error = true;
    }

    /// Render the UI
    fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let main_chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(1)])
            .split(size);

        let pane_area = main_chunks[0];
        let status_area = main_chunks[1];

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(pane_area);

        // Right column: Registers (top) | Output (bottom)
        let right_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(10), Constraint::Min(0)])
            .split(columns[1]);

        panes::render_tape_pane(
            frame,
            columns[0],
            &self.debugger,
            self.focused_pane == FocusedPane::Tape,
            &mut self.tape_scroll,
        );

        panes::render_registers_pane(frame, right_rows[0], &self.debugger);

        panes::render_output_pane(
            frame,
            right_rows[1],
            self.debugger.outputs(),
            self.focused_pane == FocusedPane::Output,
            &mut self.output_scroll,
        );

        let machine = self.debugger.machine();
        let status = StatusRenderData {
            message: &self.status_message,
            current_step: self.debugger.history_position(),
            total_steps: self.debugger.total_frames(),
            is_error: self.is_error || machine.fault().is_some(),
            is_halted: machine.is_halted(),
            is_playing: self.is_playing,
            input_buffer: self.input_buffer.as_deref(),
            awaiting_input: self.debugger.awaiting_input(),
        };
        panes::render_status_bar(frame, status_area, &status);
    }

    /// Handle keyboard events
    fn handle_key_event(&mut self, key: KeyEvent) {
        if self.input_buffer.is_some() {
            self.handle_input_key(key);
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
            }
            KeyCode::Tab => {
                self.focused_pane = self.focused_pane.next();
            }
            KeyCode::Left => {
                self.is_playing = false;
                self.step_backward();
            }
            KeyCode::Right => {
                self.is_playing = false;
                self.step_forward();
            }
            KeyCode::Up => match self.focused_pane {
                FocusedPane::Tape => {
                    // Scrolling up makes the current row move down visually
                    if let Some(row) = self.tape_scroll.target_row {
                        self.tape_scroll.target_row = Some(row.saturating_add(1));
                    }
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_sub(1);
                }
            },
            KeyCode::Down => match self.focused_pane {
                FocusedPane::Tape => {
                    if let Some(row) = self.tape_scroll.target_row {
                        self.tape_scroll.target_row = Some(row.saturating_sub(1));
                    }
                }
                FocusedPane::Output => {
                    self.output_scroll = self.output_scroll.saturating_add(1);
                }
            },
            KeyCode::Char(' ') => {
                // Toggle auto-play mode (with 200ms debounce to prevent key repeat spam)
                if self.last_space_press.elapsed() >= Duration::from_millis(200) {
                    self.last_space_press = Instant::now();
                    self.is_playing = !self.is_playing;
                    if self.is_playing {
                        self.set_status("Playing...");
                    } else {
                        self.set_status("Paused");
                    }
                }
            }
            KeyCode::Enter => {
                self.is_playing = false;
                match self.debugger.run_to_end() {
                    Ok(Advance::NeedsInput) => self.set_status("Waiting for input (press i)"),
                    Ok(Advance::Halted) => self.set_status("Program halted"),
                    Ok(_) => self.set_status("Step limit reached"),
                    Err(e) => self.set_error(&e),
                }
                self.output_scroll = usize::MAX;
            }
            KeyCode::Backspace => {
                self.is_playing = false;
                match self.debugger.rewind_to_start() {
                    Ok(()) => self.set_status("Jumped to start"),
                    Err(e) => self.set_error(&e),
                }
                self.output_scroll = usize::MAX;
            }
            KeyCode::Char('r') => {
                self.is_playing = false;
                match self.debugger.restart() {
                    Ok(()) => self.set_status("Restarted; history cleared"),
                    Err(e) => self.set_error(&e),
                }
            }
            KeyCode::Char('i') => {
                self.is_playing = false;
                if self.debugger.awaiting_input() {
                    self.input_buffer = Some(String::new());
                    self.set_status("Enter a value");
                } else {
                    self.set_status("Machine is not waiting for input");
                }
            }
            _ => {}
        }
    }

    /// Keys while typing an input value
    fn handle_input_key(&mut self, key: KeyEvent) {
        let Some(buffer) = self.input_buffer.as_mut() else {
            return;
        };
        match key.code {
            KeyCode::Char(c @ '0'..='9') => buffer.push(c),
            KeyCode::Char('-') if buffer.is_empty() => buffer.push('-'),
            KeyCode::Backspace => {
                buffer.pop();
            }
            KeyCode::Esc => {
                self.input_buffer = None;
                self.set_status("Input cancelled");
            }
            KeyCode::Enter => match parse_literal(buffer.trim(), 0) {
                Ok(value) => {
                    let text = value.to_string();
                    self.input_buffer = None;
                    self.debugger.provide_input(value);
                    self.set_status(format!("Queued input {}", text));
                    self.step_forward();
                }
                Err(e) => self.set_error(&e),
            },
            _ => {}
        }
    }

    /// Step forward in execution
    fn step_forward(&mut self) {
        match self.debugger.step_forward() {
            Ok(Advance::Replayed) | Ok(Advance::Executed) => {
                self.set_status("Stepped forward");
                self.output_scroll = usize::MAX;
            }
            Ok(Advance::NeedsInput) => self.set_status("Waiting for input (press i)"),
            Ok(Advance::Halted) => self.set_status("Program halted"),
            Err(e) => self.set_error(&e),
        }
    }

    /// Step backward in execution
    fn step_backward(&mut self) {
        match self.debugger.step_backward() {
            Ok(()) => {
                self.set_status("Stepped backward");
                self.output_scroll = usize::MAX;
            }
            Err(MachineError::HistoryOperationFailed { message }) => {
                self.set_status(format!("Cannot step backward: {}", message));
            }
            Err(e) => self.set_error(&e),
        }
    }
}
